//! The `[datafile]` table every ruleset file starts with.

use rules_core::compat::check_capabilities;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatafileHeader {
    #[serde(default)]
    pub description: Option<String>,
    /// Capability string of the file.
    pub options: String,
    #[serde(default)]
    pub format_version: Option<u32>,
}

impl DatafileHeader {
    /// Checks capabilities and returns the file's format version.
    pub fn check(&self, file: &str, compat_mode: bool) -> Result<u32, LoadError> {
        check_capabilities(&self.options, self.format_version, compat_mode)
            .map_err(|source| LoadError::compat(file, source))
    }
}

/// Checks every header and makes sure they agree on one format version.
pub fn negotiate_version<'a>(
    headers: impl IntoIterator<Item = (&'a str, &'a DatafileHeader)>,
    compat_mode: bool,
) -> Result<u32, LoadError> {
    let mut version = None;
    for (file, header) in headers {
        let found = header.check(file, compat_mode)?;
        match version {
            None => version = Some(found),
            Some(expected) if expected != found => {
                return Err(LoadError::VersionMismatch {
                    file: file.to_owned(),
                    found,
                    expected,
                });
            }
            Some(_) => {}
        }
    }
    Ok(version.unwrap_or(rules_core::compat::RSFORMAT_CURRENT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::compat::{RSFORMAT_3_0, RSFORMAT_CURRENT, RULESET_CAPABILITIES, RULESET_COMPAT_CAP};

    fn header(options: &str, version: u32) -> DatafileHeader {
        DatafileHeader {
            description: None,
            options: options.to_owned(),
            format_version: Some(version),
        }
    }

    #[test]
    fn all_files_must_share_a_version() {
        let game = header(RULESET_CAPABILITIES, RSFORMAT_CURRENT);
        let units = header(RULESET_COMPAT_CAP, RSFORMAT_3_0);
        let err = negotiate_version([("game.toml", &game), ("units.toml", &units)], true).unwrap_err();
        assert!(matches!(err, LoadError::VersionMismatch { found: RSFORMAT_3_0, .. }));

        let version = negotiate_version([("game.toml", &game), ("units.toml", &game)], false).unwrap();
        assert_eq!(version, RSFORMAT_CURRENT);
    }

    #[test]
    fn old_headers_need_compat_mode() {
        let old = header(RULESET_COMPAT_CAP, RSFORMAT_3_0);
        assert!(old.check("game.toml", false).is_err());
        assert_eq!(old.check("game.toml", true).unwrap(), RSFORMAT_3_0);
    }
}
