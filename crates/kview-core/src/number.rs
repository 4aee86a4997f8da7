#![forbid(unsafe_code)]

//! Number/text conversions with the loose semantics form controls expect.

/// Render a number the way a text control displays it: integers without a
/// fractional part, `NaN`, `Infinity`, and `-0` shown as `0`.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else {
        format!("{n}")
    }
}

/// Coerce text to a number: surrounding whitespace is ignored, empty text is
/// `0`, and anything unparsable is `NaN`.
#[must_use]
pub fn parse_number(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Reject spellings the float parser accepts but controls do not ("inf", "nan").
    if t.chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_integers_without_fraction() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn parses_loosely() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
    }

    proptest::proptest! {
        #[test]
        fn finite_numbers_survive_display(n in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let back = parse_number(&format_number(n));
            proptest::prop_assert!(back == n, "{n} came back as {back}");
        }
    }
}
