// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Absolute CIM datetime values.

use crate::error::{CimError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// `yyyymmddhhmmss.mmmmmm` followed by a signed UTC offset in minutes.
const TIMESTAMP_PATTERN: &str = r"^[0-9]{14,}\.[0-9]{6,}[+-][0-9]{3,}$";

static TIMESTAMP_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn timestamp_re() -> Option<&'static Regex> {
    TIMESTAMP_RE
        .get_or_init(|| Regex::new(TIMESTAMP_PATTERN).ok())
        .as_ref()
}

/// A validated absolute CIM timestamp, kept in its wire form.
///
/// Interval datetimes (`ddddddddhhmmss.mmmmmm:000`) are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CimDateTime(String);

impl CimDateTime {
    /// Validate `text` against the absolute timestamp format.
    pub fn parse(text: &str) -> Result<Self> {
        if timestamp_re().is_some_and(|re| re.is_match(text)) {
            Ok(Self(text.to_string()))
        } else {
            Err(CimError::value(format!(
                "invalid datetime value {:?} (expected yyyymmddhhmmss.mmmmmm+utc)",
                text
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for CimDateTime {
    type Err = CimError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CimDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_absolute_timestamp() {
        let dt = CimDateTime::parse("20040101120000.000000+060").expect("valid");
        assert_eq!(dt.as_str(), "20040101120000.000000+060");
        assert!(CimDateTime::parse("20231231235959.123456-300").is_ok());
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        for text in [
            "\u{662}\u{660}\u{660}\u{664}0101120000.000000+060",
            "20040101120000.\u{FF10}00000+060",
            "20040101120000.000000+\u{966}60",
        ] {
            assert!(
                matches!(CimDateTime::parse(text), Err(CimError::Value(_))),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_rejects_garbage_and_intervals() {
        assert!(matches!(
            CimDateTime::parse("not-a-date"),
            Err(CimError::Value(_))
        ));
        assert!(CimDateTime::parse("00000001020304.000000:000").is_err());
        assert!(CimDateTime::parse("2004010112.000000+060").is_err());
        assert!(CimDateTime::parse("").is_err());
    }
}
