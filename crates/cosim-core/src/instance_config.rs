//! VVC configuration strings
//!
//! The simulation describes each VVC with a comma-separated list of
//! `key=value` pairs where every value is an integer (booleans as 0/1):
//!
//! ```text
//! packet_based=1,enabled=0,timeout=1000
//! ```

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ConfigEntryError;

/// Static configuration attached to a VVC at registration time
pub type InstanceConfig = BTreeMap<String, i32>;

/// Parse a VVC configuration string
///
/// Empty segments (leading, trailing or doubled delimiters) are ignored.
/// An entry that is not exactly `key=value` is logged and skipped. An entry
/// whose value is not an integer stops parsing: the pairs read so far are
/// kept and the rest of the string is dropped.
pub fn parse_config_str(cfg_str: &str) -> InstanceConfig {
    let mut config = InstanceConfig::new();

    for item in split_non_empty(cfg_str, ',') {
        debug!("cfg_item=\"{}\"", item);

        match parse_entry(item) {
            Ok((key, value)) => {
                config.entry(key.to_string()).or_insert(value);
            }
            Err(e @ ConfigEntryError::MalformedPair(_)) => {
                warn!("Skipping config item in \"{}\": {}", cfg_str, e);
            }
            Err(e @ ConfigEntryError::InvalidInteger { .. }) => {
                warn!(
                    "Abandoning rest of config string \"{}\": {}",
                    cfg_str, e
                );
                break;
            }
        }
    }

    config
}

fn parse_entry(item: &str) -> Result<(&str, i32), ConfigEntryError> {
    let parts: Vec<&str> = split_non_empty(item, '=').collect();
    let [key, value] = parts.as_slice() else {
        return Err(ConfigEntryError::MalformedPair(item.to_string()));
    };

    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|_| ConfigEntryError::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
        })?;

    Ok((*key, value))
}

/// Split on a delimiter, dropping empty pieces
fn split_non_empty(s: &str, delim: char) -> impl Iterator<Item = &str> {
    s.split(delim).filter(|piece| !piece.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, i32)]) -> InstanceConfig {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_parse_simple_pairs() {
        assert_eq!(parse_config_str("a=1,b=2"), config(&[("a", 1), ("b", 2)]));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_config_str("").is_empty());
    }

    #[test]
    fn test_extra_delimiters_ignored() {
        assert_eq!(
            parse_config_str(",,packet_based=1,,enabled=0,"),
            config(&[("enabled", 0), ("packet_based", 1)])
        );
    }

    #[test]
    fn test_malformed_pair_is_skipped() {
        assert_eq!(
            parse_config_str("a=1,bad,c=3"),
            config(&[("a", 1), ("c", 3)])
        );
        assert_eq!(
            parse_config_str("a=1,x=2=3,c=3"),
            config(&[("a", 1), ("c", 3)])
        );
    }

    #[test]
    fn test_bad_integer_abandons_remainder() {
        // Pairs after the first non-integer value are dropped, even valid ones
        assert_eq!(parse_config_str("a=1,b=x,c=3"), config(&[("a", 1)]));
    }

    #[test]
    fn test_negative_and_large_values() {
        assert_eq!(
            parse_config_str("offset=-5,timeout=1000"),
            config(&[("offset", -5), ("timeout", 1000)])
        );
        // Out of i32 range is a parse failure
        assert_eq!(parse_config_str("a=1,big=99999999999"), config(&[("a", 1)]));
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        assert_eq!(parse_config_str("a=1,a=2"), config(&[("a", 1)]));
    }
}
