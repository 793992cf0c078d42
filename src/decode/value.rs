//! Display formatting for raw shot values.

/// Raw value (in hundredths) at which the whole part renders as `X`.
const INNER_TEN: u32 = 1000;

/// Raw value at which the whole part renders as `*`.
const CENTRE_HIT: u32 = 1050;

/// Format a raw shot value for display.
///
/// The raw value is a signed count of hundredths. Its magnitude `m` is shown
/// with one truncated fractional digit:
///
/// - `m < 10` renders as the number (`7.4`)
/// - `10 <= m < 10.5` renders as `X` (`X.2`)
/// - `m >= 10.5` renders as `*` (`*.6`)
///
/// Integer arithmetic keeps the truncation exact, so `1020` is `X.2` and
/// never `X.1`.
pub fn format_value(raw: i16) -> String {
    let hundredths = i32::from(raw).unsigned_abs();
    let whole = hundredths / 100;
    let tenth = (hundredths % 100) / 10;

    if hundredths >= CENTRE_HIT {
        format!("*.{tenth}")
    } else if hundredths >= INNER_TEN {
        format!("X.{tenth}")
    } else {
        format!("{whole}.{tenth}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values() {
        assert_eq!(format_value(747), "7.4");
        assert_eq!(format_value(0), "0.0");
        assert_eq!(format_value(999), "9.9");
        assert_eq!(format_value(730), "7.3");
    }

    #[test]
    fn test_inner_ten() {
        assert_eq!(format_value(1000), "X.0");
        assert_eq!(format_value(1020), "X.2");
        assert_eq!(format_value(1049), "X.4");
    }

    #[test]
    fn test_centre_hit() {
        assert_eq!(format_value(1050), "*.5");
        assert_eq!(format_value(1060), "*.6");
        assert_eq!(format_value(1090), "*.9");
    }

    #[test]
    fn test_sign_is_ignored() {
        assert_eq!(format_value(-1055), "*.5");
        assert_eq!(format_value(-747), "7.4");
        assert_eq!(format_value(-1020), "X.2");
    }

    #[test]
    fn test_extreme_raw_values() {
        // i16::MIN has no positive counterpart in i16
        assert_eq!(format_value(i16::MIN), "*.6");
        assert_eq!(format_value(i16::MAX), "*.6");
    }
}
