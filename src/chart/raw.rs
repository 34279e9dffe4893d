use rusqlite::types::ValueRef;

/// A stored field whose type the record store does not guarantee.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Numeric(f64),
    Text(String),
    Missing,
}

#[cfg(test)]
impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<ValueRef<'_>> for RawValue {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null | ValueRef::Blob(_) => Self::Missing,
            ValueRef::Integer(i) => Self::Numeric(i as f64),
            ValueRef::Real(f) => Self::Numeric(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// One stored observation for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: RawValue,
    pub close: RawValue,
}

#[cfg(test)]
impl RawRecord {
    pub fn new(date: RawValue, close: RawValue) -> Self {
        Self { date, close }
    }
}

/// Why a raw field could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    Missing,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_values_map_onto_raw_variants() {
        assert_eq!(RawValue::from(ValueRef::Null), RawValue::Missing);
        assert_eq!(RawValue::from(ValueRef::Integer(171)), RawValue::Numeric(171.0));
        assert_eq!(RawValue::from(ValueRef::Real(171.39)), RawValue::Numeric(171.39));
        assert_eq!(
            RawValue::from(ValueRef::Text(b"$171,39")),
            RawValue::text("$171,39")
        );
        assert_eq!(RawValue::from(ValueRef::Blob(&[1, 2])), RawValue::Missing);
    }
}
