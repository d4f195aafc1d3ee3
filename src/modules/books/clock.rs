use time::OffsetDateTime;

/// Source of `insertedAt` / `updatedAt` timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        now.replace_millisecond(now.millisecond()).unwrap_or(now)
    }
}

/// Serde adapter writing UTC timestamps as `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Reading accepts any RFC 3339 timestamp.
pub mod iso_millis {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::format_description::FormatItem;
    use time::macros::format_description;
    use time::{OffsetDateTime, UtcOffset};

    const FORMAT: &[FormatItem<'static>] = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );

    pub fn format(value: OffsetDateTime) -> Result<String, time::error::Format> {
        value.to_offset(UtcOffset::UTC).format(FORMAT)
    }

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = format(*value).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn system_clock_is_utc_with_millisecond_precision() {
        let now = SystemClock.now();
        assert!(now.offset().is_utc());
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn timestamps_always_carry_three_fraction_digits() {
        assert_eq!(
            iso_millis::format(datetime!(2024-05-01 10:00 UTC)).unwrap(),
            "2024-05-01T10:00:00.000Z"
        );
        assert_eq!(
            iso_millis::format(datetime!(2024-05-01 10:00:00.5 UTC)).unwrap(),
            "2024-05-01T10:00:00.500Z"
        );
        assert_eq!(
            iso_millis::format(datetime!(2024-05-01 12:00:00.123456 +02:00)).unwrap(),
            "2024-05-01T10:00:00.123Z"
        );
    }

    #[test]
    fn system_clock_output_has_fixed_width() {
        let text = iso_millis::format(SystemClock.now()).unwrap();
        assert_eq!(text.len(), "2024-05-01T10:00:00.000Z".len());
        assert!(text.ends_with('Z'));
    }
}
