//! Backend server version

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Oldest backend server a pool will accept unless configured otherwise.
pub const MINIMUM_SERVER_VERSION: ServerVersion = ServerVersion::new(5, 0, 0);

/// A `major.minor.patch` server version.
///
/// Ordering is lexicographic over the three components, so
/// `5.7.44 < 8.0.0 < 8.0.36`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    major: u16,
    minor: u16,
    patch: u16,
}

impl ServerVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decode the packed `major * 10000 + minor * 100 + patch` form the MySQL
    /// client library reports.
    pub fn from_numeric(value: u64) -> Self {
        Self::new(
            (value / 10_000).min(u16::MAX as u64) as u16,
            ((value % 10_000) / 100) as u16,
            (value % 100) as u16,
        )
    }

    /// Encode into the packed numeric form.
    pub fn as_numeric(&self) -> u64 {
        self.major as u64 * 10_000 + self.minor as u64 * 100 + self.patch as u64
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn patch(&self) -> u16 {
        self.patch
    }
}

impl From<(u16, u16, u16)> for ServerVersion {
    fn from((major, minor, patch): (u16, u16, u16)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    /// Parse strings such as `8.0.36`, `10.11.6-MariaDB` or `5.7`.
    ///
    /// Anything after the leading digits of a component is ignored; missing
    /// minor or patch components default to zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '.');
        let mut next = |required: bool| -> Result<u16, Error> {
            let Some(part) = parts.next() else {
                return if required {
                    Err(Error::Config(format!("invalid server version '{}'", s)))
                } else {
                    Ok(0)
                };
            };
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return if required {
                    Err(Error::Config(format!("invalid server version '{}'", s)))
                } else {
                    Ok(0)
                };
            }
            digits
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("invalid server version '{}': {}", s, e)))
        };

        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerVersion> for String {
    fn from(version: ServerVersion) -> Self {
        version.to_string()
    }
}
