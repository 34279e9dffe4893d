use super::raw::{ParseFailure, RawValue};

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Normalize a stored close price into a finite `f64`.
///
/// Text prices such as `"$171,39"` are cleaned of currency symbols and
/// whitespace, the first comma is read as a decimal point, and the longest
/// leading numeric prefix is parsed. Only the first comma is replaced, so a
/// thousands-separated `"1,234.56"` reads as `1.234`.
pub fn normalize_price(raw: &RawValue) -> Result<f64, ParseFailure> {
    match raw {
        RawValue::Numeric(v) if v.is_finite() => Ok(*v),
        RawValue::Numeric(_) => Err(ParseFailure::Invalid),
        RawValue::Missing => Err(ParseFailure::Missing),
        RawValue::Text(s) if s.is_empty() => Err(ParseFailure::Missing),
        RawValue::Text(s) => {
            let clean: String = s
                .chars()
                .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
                .collect();
            let clean = clean.replacen(',', ".", 1);
            leading_float(&clean)
                .filter(|v| v.is_finite())
                .ok_or(ParseFailure::Invalid)
        }
    }
}

/// Parse the longest prefix of `s` that reads as a decimal float, ignoring
/// whatever follows it.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        // A bare dot still belongs to the number when digits precede it.
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Result<f64, ParseFailure> {
        normalize_price(&RawValue::text(s))
    }

    #[test]
    fn numeric_input_is_returned_unchanged() {
        for v in [0.0, 171.39, -3.5, 1e-9, 123456789.0] {
            assert_eq!(normalize_price(&RawValue::Numeric(v)), Ok(v));
        }
    }

    #[test]
    fn non_finite_numeric_is_invalid() {
        assert_eq!(
            normalize_price(&RawValue::Numeric(f64::NAN)),
            Err(ParseFailure::Invalid)
        );
        assert_eq!(
            normalize_price(&RawValue::Numeric(f64::INFINITY)),
            Err(ParseFailure::Invalid)
        );
    }

    #[test]
    fn currency_string_with_decimal_comma() {
        assert_eq!(text("$171,39"), Ok(171.39));
        assert_eq!(text("171,39 €"), Ok(171.39));
        assert_eq!(text("£ 99.5"), Ok(99.5));
        assert_eq!(text("¥1200"), Ok(1200.0));
    }

    #[test]
    fn spaces_inside_the_number_are_stripped() {
        assert_eq!(text("€1 234,56"), Ok(1234.56));
    }

    // Known limitation: only the first comma becomes a decimal point, so a
    // thousands separator truncates the value.
    #[test]
    fn thousands_comma_truncates() {
        assert_eq!(text("1,234.56"), Ok(1.234));
        assert_eq!(text("$1,234,567"), Ok(1.234));
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        assert_eq!(text("42.5USD"), Ok(42.5));
        assert_eq!(text("7e2x"), Ok(700.0));
        assert_eq!(text("7e"), Ok(7.0));
    }

    #[test]
    fn dot_without_fraction_keeps_the_exponent() {
        assert_eq!(text("1.e5"), Ok(100000.0));
        assert_eq!(text("12."), Ok(12.0));
        assert_eq!(text("3.x"), Ok(3.0));
        assert_eq!(text(".5"), Ok(0.5));
        assert_eq!(text(".5e1"), Ok(5.0));
    }

    #[test]
    fn missing_and_empty_are_missing() {
        assert_eq!(normalize_price(&RawValue::Missing), Err(ParseFailure::Missing));
        assert_eq!(text(""), Err(ParseFailure::Missing));
    }

    #[test]
    fn unparseable_text_is_invalid() {
        assert_eq!(text("abc"), Err(ParseFailure::Invalid));
        assert_eq!(text("   "), Err(ParseFailure::Invalid));
        assert_eq!(text("$"), Err(ParseFailure::Invalid));
        assert_eq!(text("-."), Err(ParseFailure::Invalid));
        assert_eq!(text("Infinity"), Err(ParseFailure::Invalid));
    }
}
