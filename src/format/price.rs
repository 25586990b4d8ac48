//! Colombian peso formatting (es-CO): `$ 18.900`.

/// Separator between the currency sign and the amount (no-break space).
pub const SIGN_SEPARATOR: char = '\u{a0}';

/// Formats whole pesos the way es-CO locales display COP, without decimals.
pub fn format_cop(amount: u64) -> String {
    format!("${}{}", SIGN_SEPARATOR, group_thousands(amount))
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cop() {
        assert_eq!(format_cop(0), "$\u{a0}0");
        assert_eq!(format_cop(950), "$\u{a0}950");
        assert_eq!(format_cop(1000), "$\u{a0}1.000");
        assert_eq!(format_cop(18900), "$\u{a0}18.900");
        assert_eq!(format_cop(125000), "$\u{a0}125.000");
        assert_eq!(format_cop(1234567), "$\u{a0}1.234.567");
    }
}
