//! 數值顯示格式

/// 以千分位逗號與固定小數位數格式化，例如 `12345.678` → `"12,345.68"`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // 四捨五入到零時不顯示負號
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// 價格顯示：兩位小數並加千分位
pub fn format_price(value: f64) -> String {
    format_thousands(value, 2)
}

/// 漲跌幅顯示：正數帶 `+`，兩位小數，例如 `"+5.00%"`、`"-1.25%"`、`"0.00%"`
pub fn format_change_pct(change: f64) -> String {
    let rounded = format!("{:.2}", change);
    if rounded == "0.00" || rounded == "-0.00" {
        "0.00%".to_string()
    } else if change > 0.0 {
        format!("+{}%", rounded)
    } else {
        format!("{}%", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(105.0, "105.00")]
    #[case(12_345.678, "12,345.68")]
    #[case(1_234_567.0, "1,234,567.00")]
    #[case(-9_876.5, "-9,876.50")]
    #[case(-0.001, "0.00")]
    #[case(0.0, "0.00")]
    fn test_format_price(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_price(value), expected);
    }

    #[test]
    fn test_format_thousands_without_decimals() {
        assert_eq!(format_thousands(1_000.0, 0), "1,000");
        assert_eq!(format_thousands(999.0, 0), "999");
    }

    #[rstest]
    #[case(5.0, "+5.00%")]
    #[case(-1.254, "-1.25%")]
    #[case(0.0, "0.00%")]
    #[case(-0.001, "0.00%")]
    fn test_format_change_pct(#[case] change: f64, #[case] expected: &str) {
        assert_eq!(format_change_pct(change), expected);
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert_eq!(format_price(f64::NAN), "NaN");
    }
}
