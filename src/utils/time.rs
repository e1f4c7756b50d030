use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `2024-05-01T09:30:00.123Z`, the shape browsers produce for `toISOString`.
const ISO_8601_MILLIS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Format a timestamp as UTC ISO-8601 with millisecond precision.
pub fn iso8601(datetime: OffsetDateTime) -> Result<String, time::error::Format> {
    datetime.to_offset(UtcOffset::UTC).format(ISO_8601_MILLIS)
}

/// Deserialize an RFC 3339 formatted string into an OffsetDateTime
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
}

/// Serialize an OffsetDateTime as UTC ISO-8601 with millisecond precision
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = iso8601(*datetime).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_in_utc_with_millis() {
        let dt = datetime!(2024-05-01 12:30:00.123456 +03:00);
        assert_eq!(iso8601(dt).unwrap(), "2024-05-01T09:30:00.123Z");
    }

    #[test]
    fn output_parses_back() {
        let dt = datetime!(2024-05-01 09:30:00.5 UTC);
        let s = iso8601(dt).unwrap();
        assert_eq!(OffsetDateTime::parse(&s, &Rfc3339).unwrap(), dt);
    }
}
