//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a post.
///
/// Assigned by storage on insert (a `SERIAL` column) and never reused or
/// changed for the lifetime of the row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i32);

impl PostId {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for PostId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for PostId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<PostId> for i32 {
    fn from(value: PostId) -> Self {
        value.0
    }
}

impl From<PostId> for i64 {
    fn from(value: PostId) -> Self {
        i64::from(value.0)
    }
}

/// Parses a path segment as a post id.
///
/// Anything that is not an integer is `InvalidId`. An integer too large for
/// the id column cannot name a stored post, so it is `NotFound`.
impl FromStr for PostId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wide = i64::from_str(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("PostId: {}", e)))?;
        let value = i32::try_from(wide).map_err(|_| DomainError::not_found(wide))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_ids() {
        assert_eq!("7".parse::<PostId>().unwrap(), PostId::new(7));
        assert_eq!(" 12 ".parse::<PostId>().unwrap().get(), 12);
    }

    #[test]
    fn rejects_non_integer_ids() {
        for raw in ["abc", "1.5", ""] {
            let err = raw.parse::<PostId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn out_of_range_integers_are_not_found() {
        assert_eq!(
            "99999999999".parse::<PostId>().unwrap_err(),
            DomainError::NotFound(99_999_999_999)
        );
        assert_eq!(
            "-3000000000".parse::<PostId>().unwrap_err(),
            DomainError::NotFound(-3_000_000_000)
        );
        assert_eq!("-5".parse::<PostId>().unwrap(), PostId::new(-5));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_value(PostId::new(3)).unwrap();
        assert_eq!(json, serde_json::json!(3));
    }
}
