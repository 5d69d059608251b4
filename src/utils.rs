/// Formats an optional f64 to 4 decimal places, or returns "-" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "-".to_owned(),
    }
}

/// Formats a cell value so that parsing it back yields the same `f64`.
pub fn format_number(v: f64) -> String {
    format!("{v}")
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Replaces anything outside printable ASCII, for the standard PDF fonts.
pub fn ascii_only(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(1.5)), "1.5000");
        assert_eq!(fmt_opt(None), "-");
        assert_eq!(fmt_opt(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_number_roundtrips() {
        for v in [0.1 + 0.2, 1e-7, 123_456_789.125, -2.5] {
            assert_eq!(format_number(v).parse::<f64>().unwrap(), v);
        }
        assert_eq!(format_number(2.0), "2");
    }

    #[test]
    fn test_percentage_of_zero() {
        assert!(percentage(3, 0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_ascii_only() {
        assert_eq!(ascii_only("caf\u{e9}\tok"), "caf??ok");
    }
}
