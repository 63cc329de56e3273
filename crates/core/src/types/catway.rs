//! Berth ("catway") business keys and classifications.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`CatwayNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatwayNumberError {
    /// The number is zero or negative.
    #[error("catway number must be a positive integer")]
    NotPositive,
    /// The number does not fit the storage column.
    #[error("catway number is too large")]
    TooLarge,
    /// The input is not an integer at all.
    #[error("catway number must be an integer")]
    NotANumber,
}

/// The user-facing number painted on a berth.
///
/// This is the business key berths are addressed by in URLs and in
/// reservations. It is unique across berths and always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CatwayNumber(i32);

impl CatwayNumber {
    /// Validate a raw integer as a berth number.
    ///
    /// # Errors
    ///
    /// Returns [`CatwayNumberError::NotPositive`] for values below 1 and
    /// [`CatwayNumberError::TooLarge`] for values beyond `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, CatwayNumberError> {
        if value < 1 {
            return Err(CatwayNumberError::NotPositive);
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| CatwayNumberError::TooLarge)
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for CatwayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CatwayNumber {
    type Err = CatwayNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| CatwayNumberError::NotANumber)?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for CatwayNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a berth type is outside the allowed set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("catway type must be \"long\" or \"short\" (got {0:?})")]
pub struct CatwayTypeError(pub String);

/// Length class of a berth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatwayType {
    /// Long berth, for larger boats.
    Long,
    /// Short berth.
    Short,
}

impl CatwayType {
    /// The stored/serialized representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for CatwayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatwayType {
    type Err = CatwayTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(CatwayTypeError(other.to_owned())),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CatwayNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CatwayNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let n = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(n))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CatwayNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catway_number_bounds() {
        assert_eq!(CatwayNumber::new(1).unwrap().as_i32(), 1);
        assert_eq!(CatwayNumber::new(0), Err(CatwayNumberError::NotPositive));
        assert_eq!(CatwayNumber::new(-4), Err(CatwayNumberError::NotPositive));
        assert_eq!(
            CatwayNumber::new(i64::from(i32::MAX) + 1),
            Err(CatwayNumberError::TooLarge)
        );
    }

    #[test]
    fn test_catway_number_from_path_segment() {
        assert_eq!("12".parse::<CatwayNumber>().unwrap().as_i32(), 12);
        assert_eq!(
            "twelve".parse::<CatwayNumber>(),
            Err(CatwayNumberError::NotANumber)
        );
    }

    #[test]
    fn test_catway_number_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<CatwayNumber>("0").is_err());
        assert_eq!(
            serde_json::from_str::<CatwayNumber>("3").unwrap().as_i32(),
            3
        );
    }

    #[test]
    fn test_catway_type_parse() {
        assert_eq!("long".parse::<CatwayType>().unwrap(), CatwayType::Long);
        assert_eq!("short".parse::<CatwayType>().unwrap(), CatwayType::Short);
        assert!("medium".parse::<CatwayType>().is_err());
        assert!("Long".parse::<CatwayType>().is_err());
    }

    #[test]
    fn test_catway_type_serde() {
        let json = serde_json::to_string(&CatwayType::Short).unwrap();
        assert_eq!(json, "\"short\"");
    }
}
