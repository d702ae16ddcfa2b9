use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A `timestamptz` column, serialized as RFC 3339.
#[derive(sqlx::Type, serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Timestamptz(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

impl std::fmt::Display for Timestamptz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}
