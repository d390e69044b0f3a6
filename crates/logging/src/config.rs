//! crates/logging/src/config.rs
//! Subscriber configuration for diagnostic logging.

use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Configuration consumed by [`init_tracing`](crate::init_tracing).
///
/// The filter honours `RUST_LOG` first and falls back to
/// [`default_directive`](Self::default_directive).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogConfig {
    /// Directive applied when `RUST_LOG` is unset or unparsable.
    pub default_directive: String,
    /// Include the event target in each formatted line.
    pub with_target: bool,
    /// Emit ANSI colour escapes.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: DEFAULT_DIRECTIVE.to_owned(),
            with_target: true,
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Builds the filter, preferring `RUST_LOG` over the fallback directive.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| self.fallback_filter())
    }

    /// Builds the filter from the fallback directive alone.
    #[must_use]
    pub fn fallback_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.default_directive)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quiet() {
        let config = LogConfig::default();
        assert_eq!(config.default_directive, DEFAULT_DIRECTIVE);
        assert!(config.with_target);
        assert!(!config.ansi);
    }

    #[test]
    fn unparsable_directive_falls_back_to_warn() {
        let config = LogConfig {
            default_directive: "argon2=loudest".to_owned(),
            ..LogConfig::default()
        };
        assert_eq!(config.fallback_filter().to_string(), DEFAULT_DIRECTIVE);
    }

    #[test]
    fn fallback_filter_uses_configured_directive() {
        let config = LogConfig {
            default_directive: "argon2::select=debug".to_owned(),
            ..LogConfig::default()
        };
        assert_eq!(config.fallback_filter().to_string(), "argon2::select=debug");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip_preserves_fields() {
        let config = LogConfig {
            ansi: true,
            ..LogConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: LogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
