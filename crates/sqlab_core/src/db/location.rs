//! Connection string parsing.
//!
//! Accepted forms:
//! - `:memory:`, `sqlite::memory:`, `sqlite://:memory:` for a private in-memory store.
//! - `sqlite://<path>`, `sqlite:<path>`, `file:<path>[?params]` for a file.
//! - A bare filesystem path.
//!
//! Any other `<scheme>://` prefix is rejected: only the SQLite driver is linked.

use super::{DbError, DbResult};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const MEMORY_ALIASES: &[&str] = &[":memory:", "sqlite::memory:", "sqlite://:memory:"];

/// Resolved storage target for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

impl DbLocation {
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::InvalidLocation(
                "connection string cannot be empty".to_string(),
            ));
        }

        if MEMORY_ALIASES.contains(&trimmed) {
            return Ok(Self::Memory);
        }

        let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("file:") {
            // URI parameters (`?mode=rwc`) are not forwarded.
            rest.split('?').next().unwrap_or_default()
        } else if let Some((scheme, _)) = trimmed.split_once("://") {
            return Err(DbError::InvalidLocation(format!(
                "unsupported driver `{scheme}`; only sqlite is available"
            )));
        } else {
            trimmed
        };

        if path.is_empty() {
            return Err(DbError::InvalidLocation(format!(
                "connection string `{trimmed}` has no database path"
            )));
        }
        if path == ":memory:" {
            return Ok(Self::Memory);
        }

        Ok(Self::File(PathBuf::from(path)))
    }

    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

impl FromStr for DbLocation {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "sqlite::memory:"),
            Self::File(path) => write!(f, "sqlite://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DbLocation;
    use crate::db::DbError;
    use std::path::PathBuf;

    #[test]
    fn memory_aliases_resolve_to_memory() {
        for alias in [":memory:", "sqlite::memory:", "sqlite://:memory:", " sqlite::memory: "] {
            assert_eq!(DbLocation::parse(alias).unwrap(), DbLocation::Memory, "{alias}");
        }
    }

    #[test]
    fn sqlite_prefixes_strip_to_path() {
        assert_eq!(
            DbLocation::parse("sqlite:///var/lib/app.db").unwrap(),
            DbLocation::File(PathBuf::from("/var/lib/app.db"))
        );
        assert_eq!(
            DbLocation::parse("sqlite:data/app.db").unwrap(),
            DbLocation::File(PathBuf::from("data/app.db"))
        );
        assert_eq!(
            DbLocation::parse("file:app.db?mode=rwc").unwrap(),
            DbLocation::File(PathBuf::from("app.db"))
        );
        assert_eq!(
            DbLocation::parse("plain.db").unwrap(),
            DbLocation::File(PathBuf::from("plain.db"))
        );
    }

    #[test]
    fn foreign_drivers_and_empty_input_are_rejected() {
        let err = DbLocation::parse("postgresql://localhost/app").unwrap_err();
        assert!(matches!(err, DbError::InvalidLocation(message) if message.contains("postgresql")));

        assert!(matches!(
            DbLocation::parse("   "),
            Err(DbError::InvalidLocation(_))
        ));
        assert!(matches!(
            DbLocation::parse("sqlite://"),
            Err(DbError::InvalidLocation(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let file = DbLocation::File(PathBuf::from("/tmp/x.db"));
        assert_eq!(DbLocation::parse(&file.to_string()).unwrap(), file);
        assert_eq!(
            DbLocation::parse(&DbLocation::Memory.to_string()).unwrap(),
            DbLocation::Memory
        );
    }
}
