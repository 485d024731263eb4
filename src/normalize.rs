//! Normalization of loosely-typed remote field values.
//!
//! The remote API represents missing data with a handful of textual markers
//! and formats large numbers with thousands separators. Every raw value maps
//! to a defined output; normalization never fails.

/// Target type tag for a raw remote field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Decimal,
    Text,
}

/// A normalized field value. Absence is explicit, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Absent,
    Int(i64),
    Decimal(f64),
    Text(String),
}

/// Markers the remote uses for missing data, matched case-insensitively.
const ABSENCE_MARKERS: &[&str] = &["", "unknown", "n/a", "none"];

/// Normalize a raw textual value against a target type tag.
///
/// Absence markers (and an absent input) normalize to [`Normalized::Absent`]
/// regardless of the target. Numeric targets strip commas before parsing and
/// fall back to `Absent` when the value still does not parse.
pub fn normalize(raw: Option<&str>, kind: ValueKind) -> Normalized {
    let Some(value) = raw else {
        return Normalized::Absent;
    };
    if ABSENCE_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
    {
        return Normalized::Absent;
    }
    match kind {
        ValueKind::Integer => parse_int(value).map_or(Normalized::Absent, Normalized::Int),
        ValueKind::Decimal => parse_decimal(value).map_or(Normalized::Absent, Normalized::Decimal),
        ValueKind::Text => Normalized::Text(value.to_string()),
    }
}

/// Parse an integer, tolerating thousands separators ("1,000").
pub fn parse_int(value: &str) -> Option<i64> {
    value.replace(',', "").parse().ok()
}

/// Parse a decimal, tolerating thousands separators ("1,234.56").
pub fn parse_decimal(value: &str) -> Option<f64> {
    value.replace(',', "").parse().ok()
}

/// Normalize to a nullable integer field.
pub fn int_field(raw: Option<&str>) -> Option<i64> {
    match normalize(raw, ValueKind::Integer) {
        Normalized::Int(v) => Some(v),
        _ => None,
    }
}

/// Normalize to a nullable decimal field.
pub fn decimal_field(raw: Option<&str>) -> Option<f64> {
    match normalize(raw, ValueKind::Decimal) {
        Normalized::Decimal(v) => Some(v),
        _ => None,
    }
}

/// Normalize to a nullable text field.
pub fn text_field(raw: Option<&str>) -> Option<String> {
    match normalize(raw, ValueKind::Text) {
        Normalized::Text(v) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_markers_normalize_to_absent_for_every_kind() {
        for marker in ["", "unknown", "n/a", "none"] {
            for kind in [ValueKind::Integer, ValueKind::Decimal, ValueKind::Text] {
                assert_eq!(normalize(Some(marker), kind), Normalized::Absent);
            }
        }
    }

    #[test]
    fn absence_markers_match_case_insensitively() {
        assert_eq!(
            normalize(Some("Unknown"), ValueKind::Text),
            Normalized::Absent
        );
        assert_eq!(
            normalize(Some("N/A"), ValueKind::Integer),
            Normalized::Absent
        );
        assert_eq!(
            normalize(Some("NONE"), ValueKind::Decimal),
            Normalized::Absent
        );
    }

    #[test]
    fn absent_input_normalizes_to_absent() {
        for kind in [ValueKind::Integer, ValueKind::Decimal, ValueKind::Text] {
            assert_eq!(normalize(None, kind), Normalized::Absent);
        }
    }

    #[test]
    fn integers_strip_thousands_separators() {
        assert_eq!(
            normalize(Some("1,000"), ValueKind::Integer),
            Normalized::Int(1000)
        );
        assert_eq!(normalize(Some("42"), ValueKind::Integer), Normalized::Int(42));
    }

    #[test]
    fn decimals_strip_thousands_separators() {
        assert_eq!(
            normalize(Some("1,234.56"), ValueKind::Decimal),
            Normalized::Decimal(1234.56)
        );
        assert_eq!(
            normalize(Some("3.14"), ValueKind::Decimal),
            Normalized::Decimal(3.14)
        );
    }

    #[test]
    fn non_numeric_values_normalize_to_absent_not_error() {
        assert_eq!(normalize(Some("abc"), ValueKind::Integer), Normalized::Absent);
        assert_eq!(normalize(Some("abc"), ValueKind::Decimal), Normalized::Absent);
        assert_eq!(
            normalize(Some("12 parsecs"), ValueKind::Integer),
            Normalized::Absent
        );
    }

    #[test]
    fn text_values_pass_through_unchanged() {
        assert_eq!(
            normalize(Some("blond"), ValueKind::Text),
            Normalized::Text("blond".to_string())
        );
    }

    #[test]
    fn field_wrappers_produce_nullable_values() {
        assert_eq!(int_field(Some("172")), Some(172));
        assert_eq!(int_field(Some("unknown")), None);
        assert_eq!(decimal_field(Some("1,234.56")), Some(1234.56));
        assert_eq!(decimal_field(Some("n/a")), None);
        assert_eq!(text_field(Some("19BBY")), Some("19BBY".to_string()));
        assert_eq!(text_field(Some("none")), None);
        assert_eq!(text_field(None), None);
    }
}
