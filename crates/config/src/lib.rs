//! # Config - codec and loader settings
//!
//! Plain settings structs shared by the `bast` codec and the `loader`.
//! Defaults are suitable for most uses; every field can be overridden from
//! the environment:
//!
//! ```text
//! BAST_LOCATIONS          write source locations       (default: "true")
//! BAST_COMMENTS           write comments               (default: "true")
//! BAST_DESCRIPTIONS       write descriptions           (default: "true")
//! BAST_MAX_FILE_KB        largest file the loader reads (default: 65536 = 64 MiB)
//! BAST_ALLOW_NETWORK      allow http(s) sources        (default: "true")
//! BAST_HTTP_TIMEOUT_SECS  network fetch timeout        (default: 30)
//! ```
//!
//! Values that fail to parse fall back to the default.

/// Default upper bound on the size of a file the loader will read (64 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Default timeout for network fetches, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_or(key, if default { "true" } else { "false" })
        .parse()
        .unwrap_or(default)
}

/// Which optional sections the encoder writes.
///
/// Each flag maps onto one bit of the BAST header flags, so a reader always
/// knows which kinds of data the writer kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Write a location for every node.
    pub locations: bool,
    /// Keep line and block comments.
    pub comments: bool,
    /// Keep brief and full descriptions.
    pub descriptions: bool,
}

impl CodecConfig {
    /// Everything on. Decoding such a file reproduces the input tree exactly.
    pub const FULL: CodecConfig = CodecConfig {
        locations: true,
        comments: true,
        descriptions: true,
    };

    /// Structure only: no locations, comments or descriptions.
    pub const COMPACT: CodecConfig = CodecConfig {
        locations: false,
        comments: false,
        descriptions: false,
    };

    pub fn from_env() -> Self {
        Self {
            locations: env_bool("BAST_LOCATIONS", true),
            comments: env_bool("BAST_COMMENTS", true),
            descriptions: env_bool("BAST_DESCRIPTIONS", true),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::FULL
    }
}

/// Limits and switches for the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Files (or responses) larger than this are rejected before decoding.
    pub max_file_size: u64,
    /// Whether `http://` and `https://` sources may be fetched.
    pub allow_network: bool,
    pub http_timeout_secs: u64,
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_kb: u64 = env_or("BAST_MAX_FILE_KB", &(defaults.max_file_size / 1024).to_string())
            .parse()
            .unwrap_or(defaults.max_file_size / 1024);
        Self {
            max_file_size: max_kb.saturating_mul(1024),
            allow_network: env_bool("BAST_ALLOW_NETWORK", defaults.allow_network),
            http_timeout_secs: env_or(
                "BAST_HTTP_TIMEOUT_SECS",
                &defaults.http_timeout_secs.to_string(),
            )
            .parse()
            .unwrap_or(defaults.http_timeout_secs),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allow_network: true,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_defaults_keep_everything() {
        let c = CodecConfig::default();
        assert!(c.locations && c.comments && c.descriptions);
        assert_eq!(c, CodecConfig::FULL);
    }

    #[test]
    fn loader_defaults() {
        let c = LoaderConfig::default();
        assert_eq!(c.max_file_size, 64 * 1024 * 1024);
        assert!(c.allow_network);
        assert_eq!(c.http_timeout_secs, 30);
    }

    // Each test below uses variables no other test touches, so the tests can
    // run in parallel.

    #[test]
    fn env_overrides_codec_flags() {
        std::env::set_var("BAST_COMMENTS", "false");
        let c = CodecConfig::from_env();
        std::env::remove_var("BAST_COMMENTS");
        assert!(!c.comments);
        assert!(c.locations);
    }

    #[test]
    fn env_overrides_loader_limits_and_ignores_garbage() {
        std::env::set_var("BAST_MAX_FILE_KB", "4");
        std::env::set_var("BAST_HTTP_TIMEOUT_SECS", "soon");
        let c = LoaderConfig::from_env();
        std::env::remove_var("BAST_MAX_FILE_KB");
        std::env::remove_var("BAST_HTTP_TIMEOUT_SECS");
        assert_eq!(c.max_file_size, 4096);
        assert_eq!(c.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }
}
