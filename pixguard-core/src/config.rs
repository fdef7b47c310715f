//! Engine configuration.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::codec::PayloadFormat;
use crate::error::{PixguardError, Result};
use crate::fingerprint::HashAlgorithm;

/// Declared payload length used by the original deployment.
pub const DEFAULT_FIXED_LENGTH: usize = 20;

/// Similarity below which a stored fingerprint is not reported as a match.
pub const DEFAULT_MATCH_FLOOR: f64 = 0.70;

/// Number of ranked matches kept in a detection report.
pub const DEFAULT_MAX_MATCHES: usize = 10;

/// What `embed` does when the payload does not fit in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Refuse with `InsufficientCapacity` before touching any pixel.
    #[default]
    Strict,
    /// Embed as many bits as fit and drop the rest.
    Truncate,
}

impl FromStr for CapacityPolicy {
    type Err = PixguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "truncate" => Ok(Self::Truncate),
            other => Err(PixguardError::InvalidConfig(format!(
                "unknown capacity policy '{other}'"
            ))),
        }
    }
}

/// Engine configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Declared payload length in bytes (default: 20)
    pub fixed_length: usize,
    /// Wire layout of the hidden payload (default: length-prefixed)
    pub payload_format: PayloadFormat,
    /// Behaviour on undersized images (default: strict)
    pub capacity_policy: CapacityPolicy,
    /// Fingerprint grid width (default: 8)
    pub sample_width: u32,
    /// Fingerprint grid height (default: 8)
    pub sample_height: u32,
    /// Fingerprint algorithm (default: average hash)
    pub hash_algorithm: HashAlgorithm,
    /// False-positive floor for detection (default: 0.70)
    pub match_floor: f64,
    /// Ranked matches kept per report (default: 10)
    pub max_matches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_length: DEFAULT_FIXED_LENGTH,
            payload_format: PayloadFormat::default(),
            capacity_policy: CapacityPolicy::default(),
            sample_width: 8,
            sample_height: 8,
            hash_algorithm: HashAlgorithm::default(),
            match_floor: DEFAULT_MATCH_FLOOR,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to their defaults. A variable that is set
    /// but does not parse is an `InvalidConfig` error, and the result is
    /// validated before it is returned.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from `lookup`, which maps a `PIXGUARD_*`
    /// variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let (sample_width, sample_height) = match lookup("PIXGUARD_SAMPLE_SIZE") {
            Some(v) => parse_sample_size(&v).ok_or_else(|| {
                PixguardError::InvalidConfig(format!("PIXGUARD_SAMPLE_SIZE: cannot parse '{v}'"))
            })?,
            None => (defaults.sample_width, defaults.sample_height),
        };

        let config = Self {
            fixed_length: parse_var(&lookup, "PIXGUARD_FIXED_LENGTH")?
                .unwrap_or(defaults.fixed_length),
            payload_format: parse_var(&lookup, "PIXGUARD_PAYLOAD_FORMAT")?
                .unwrap_or(defaults.payload_format),
            capacity_policy: parse_var(&lookup, "PIXGUARD_CAPACITY_POLICY")?
                .unwrap_or(defaults.capacity_policy),
            sample_width,
            sample_height,
            hash_algorithm: parse_var(&lookup, "PIXGUARD_HASH_ALGORITHM")?
                .unwrap_or(defaults.hash_algorithm),
            match_floor: parse_var(&lookup, "PIXGUARD_MATCH_FLOOR")?
                .unwrap_or(defaults.match_floor),
            max_matches: parse_var(&lookup, "PIXGUARD_MAX_MATCHES")?
                .unwrap_or(defaults.max_matches),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.fixed_length == 0 {
            return Err(PixguardError::InvalidConfig(
                "fixed_length must be at least 1".into(),
            ));
        }
        if self.fixed_length > usize::from(u16::MAX) {
            return Err(PixguardError::InvalidConfig(format!(
                "fixed_length {} exceeds {}",
                self.fixed_length,
                u16::MAX
            )));
        }
        if self.sample_width == 0 || self.sample_height == 0 {
            return Err(PixguardError::InvalidConfig(
                "sample grid must be at least 1x1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.match_floor) {
            return Err(PixguardError::InvalidConfig(format!(
                "match_floor {} is outside [0, 1]",
                self.match_floor
            )));
        }
        Ok(())
    }
}

/// Parse the variable `name` if it is set.
fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PixguardError::InvalidConfig(format!("{name}: cannot parse '{v}'"))),
        None => Ok(None),
    }
}

/// Parse `"16x16"` or `"16"` into a sample grid size.
pub fn parse_sample_size(value: &str) -> Option<(u32, u32)> {
    let value = value.trim().to_lowercase();
    match value.split_once('x') {
        Some((w, h)) => Some((w.trim().parse().ok()?, h.trim().parse().ok()?)),
        None => {
            let n = value.parse().ok()?;
            Some((n, n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.fixed_length, 20);
        assert_eq!(config.sample_width, 8);
        assert_eq!(config.sample_height, 8);
        assert_eq!(config.capacity_policy, CapacityPolicy::Strict);
        assert_eq!(config.payload_format, PayloadFormat::LengthPrefixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_fixed_length() {
        let config = EngineConfig {
            fixed_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PixguardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_fixed_length() {
        let config = EngineConfig {
            fixed_length: 70_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_floor_out_of_range() {
        let config = EngineConfig {
            match_floor: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_sample_size() {
        assert_eq!(parse_sample_size("8x8"), Some((8, 8)));
        assert_eq!(parse_sample_size("16X12"), Some((16, 12)));
        assert_eq!(parse_sample_size("32"), Some((32, 32)));
        assert_eq!(parse_sample_size("axb"), None);
        assert_eq!(parse_sample_size(""), None);
    }

    #[test]
    fn test_capacity_policy_from_str() {
        assert_eq!("strict".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Strict));
        assert_eq!(
            " Truncate ".parse::<CapacityPolicy>(),
            Ok(CapacityPolicy::Truncate)
        );
        assert!("lenient".parse::<CapacityPolicy>().is_err());
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("PIXGUARD_PAYLOAD_FORMAT", "sentinel"),
            ("PIXGUARD_CAPACITY_POLICY", "truncate"),
            ("PIXGUARD_SAMPLE_SIZE", "16x12"),
            ("PIXGUARD_MAX_MATCHES", " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.payload_format, PayloadFormat::Sentinel);
        assert_eq!(config.capacity_policy, CapacityPolicy::Truncate);
        assert_eq!((config.sample_width, config.sample_height), (16, 12));
        assert_eq!(config.max_matches, 3);
    }

    #[test]
    fn test_from_lookup_rejects_misspelled_values() {
        for (name, value) in [
            ("PIXGUARD_PAYLOAD_FORMAT", "sentinal"),
            ("PIXGUARD_CAPACITY_POLICY", "lenient"),
            ("PIXGUARD_HASH_ALGORITHM", "phash"),
            ("PIXGUARD_FIXED_LENGTH", "twenty"),
            ("PIXGUARD_MATCH_FLOOR", "high"),
            ("PIXGUARD_SAMPLE_SIZE", "8by8"),
        ] {
            let vars = [(name, value)];
            match EngineConfig::from_lookup(lookup(&vars)) {
                Err(PixguardError::InvalidConfig(msg)) => {
                    assert!(msg.contains(name), "{msg}");
                }
                other => panic!("{name}={value} should be rejected, got {other:?}"),
            }
        }
    }
}
