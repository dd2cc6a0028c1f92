//! Capability strings and format version negotiation.
//!
//! A capability string is a list of tokens separated by whitespace or
//! commas. A token starting with `+` is mandatory: the other side must
//! know it too.

use super::{CompatError, RSFORMAT_CURRENT};

/// Capabilities of the current ruleset format.
pub const RULESET_CAPABILITIES: &str = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01";

/// Capabilities of the previous format, accepted in compatibility mode.
pub const RULESET_COMPAT_CAP: &str = "+Freeciv-3.0-ruleset";

/// Format version assumed when a datafile doesn't state one.
pub const DEFAULT_FORMAT_VERSION: u32 = 1;

fn tokens(caps: &str) -> impl Iterator<Item = &str> {
    caps.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
}

/// Whether every mandatory capability of `us` appears in `them`.
///
/// Tokens compare without their `+` marker, so `them` may list a
/// capability as optional that `us` requires.
pub fn has_capabilities(us: &str, them: &str) -> bool {
    tokens(us)
        .filter_map(|token| token.strip_prefix('+'))
        .all(|wanted| {
            tokens(them).any(|token| token.trim_start_matches('+') == wanted)
        })
}

/// Checks a datafile's `options` against the supported capabilities and
/// returns its format version.
///
/// In compatibility mode a datafile with exactly the previous format's
/// mandatory capabilities is accepted. Otherwise both sides have to know
/// each other's mandatory capabilities.
///
/// # Errors
///
/// Capability mismatches, versions newer than the current format and old
/// versions outside compatibility mode are fatal.
pub fn check_capabilities(
    options: &str,
    format_version: Option<u32>,
    compat_mode: bool,
) -> Result<u32, CompatError> {
    let compat_caps = compat_mode
        && has_capabilities(RULESET_COMPAT_CAP, options)
        && has_capabilities(options, RULESET_COMPAT_CAP);

    if !compat_caps {
        if !has_capabilities(RULESET_CAPABILITIES, options) {
            return Err(CompatError::Incompatible {
                found: options.to_owned(),
                supported: RULESET_CAPABILITIES.to_owned(),
            });
        }
        if !has_capabilities(options, RULESET_CAPABILITIES) {
            return Err(CompatError::UnsupportedOptions {
                found: options.to_owned(),
                supported: RULESET_CAPABILITIES.to_owned(),
            });
        }
    }

    let version = format_version.unwrap_or(DEFAULT_FORMAT_VERSION);
    if version > RSFORMAT_CURRENT {
        return Err(CompatError::FormatTooNew {
            version,
            current: RSFORMAT_CURRENT,
        });
    }
    if version < RSFORMAT_CURRENT && !compat_mode {
        return Err(CompatError::NeedsCompatMode { version });
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::RSFORMAT_3_0;

    #[test]
    fn mandatory_tokens_must_match() {
        assert!(has_capabilities("+a b", "a"));
        assert!(has_capabilities("+a b", "+a,c"));
        assert!(!has_capabilities("+a +b", "a"));
        // Optional tokens never fail the check.
        assert!(has_capabilities("b c", ""));
    }

    #[test]
    fn current_format_is_accepted() {
        let version = check_capabilities(RULESET_CAPABILITIES, Some(RSFORMAT_CURRENT), false).unwrap();
        assert_eq!(version, RSFORMAT_CURRENT);
    }

    #[test]
    fn old_format_needs_compat_mode() {
        let err = check_capabilities(RULESET_COMPAT_CAP, Some(RSFORMAT_3_0), false).unwrap_err();
        assert!(matches!(err, CompatError::Incompatible { .. }));

        let version = check_capabilities(RULESET_COMPAT_CAP, Some(RSFORMAT_3_0), true).unwrap();
        assert_eq!(version, RSFORMAT_3_0);
    }

    #[test]
    fn missing_version_defaults_to_one() {
        let version = check_capabilities(RULESET_COMPAT_CAP, None, true).unwrap();
        assert_eq!(version, DEFAULT_FORMAT_VERSION);

        let err = check_capabilities(RULESET_CAPABILITIES, None, false).unwrap_err();
        assert_eq!(err, CompatError::NeedsCompatMode { version: 1 });
    }

    #[test]
    fn unknown_mandatory_option_is_rejected() {
        let options = format!("{RULESET_CAPABILITIES} +Something-New");
        let err = check_capabilities(&options, Some(RSFORMAT_CURRENT), false).unwrap_err();
        assert!(matches!(err, CompatError::UnsupportedOptions { .. }));
    }

    #[test]
    fn future_format_is_rejected() {
        let err = check_capabilities(RULESET_CAPABILITIES, Some(RSFORMAT_CURRENT + 1), true).unwrap_err();
        assert!(matches!(err, CompatError::FormatTooNew { .. }));
    }
}
