//! Construction-time configuration for the limiter, issuer, and service facade.
//!
//! [`ServiceConfig`] is the serde-facing document (plain seconds, optional URLs and paths).
//! Validation turns it into the typed [`LimiterConfig`] and [`IssuerConfig`] values the
//! components are built from; invalid settings never reach a running component.

// std
use std::{fs, path::PathBuf};
// self
use crate::{_prelude::*, error::ConfigError};

const DEFAULT_WINDOW_SECS: u64 = 60;
const DEFAULT_MAX_REQUESTS: usize = 10;
const DEFAULT_TOKEN_TTL_SECS: u64 = 20 * 60;
const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;
pub(crate) const DEFAULT_REAP_INTERVAL: Duration =
	Duration::seconds(DEFAULT_REAP_INTERVAL_SECS as i64);
// Ten years; keeps `now ± duration` far away from the representable date range.
const MAX_DURATION: Duration = Duration::days(3_650);

/// Sliding-window quota settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimiterConfig {
	/// Length of the trailing window.
	pub window: Duration,
	/// Requests admitted per identity within one window.
	pub max_requests: usize,
}
impl LimiterConfig {
	/// Validates and builds a limiter configuration.
	pub fn new(window: Duration, max_requests: usize) -> Result<Self, ConfigError> {
		if !window.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "window" });
		}
		if window > MAX_DURATION {
			return Err(ConfigError::DurationOutOfRange { field: "window" });
		}
		if max_requests == 0 {
			return Err(ConfigError::ZeroRequestQuota);
		}

		Ok(Self { window, max_requests })
	}
}
impl Default for LimiterConfig {
	fn default() -> Self {
		Self { window: Duration::seconds(60), max_requests: DEFAULT_MAX_REQUESTS }
	}
}

/// Token issuance settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerConfig {
	/// Lifetime of every issued token.
	pub ttl: Duration,
	/// When set, the first successful redemption consumes the token.
	pub single_use: bool,
}
impl IssuerConfig {
	/// Validates and builds an issuer configuration.
	pub fn new(ttl: Duration, single_use: bool) -> Result<Self, ConfigError> {
		if !ttl.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "ttl" });
		}
		if ttl > MAX_DURATION {
			return Err(ConfigError::DurationOutOfRange { field: "ttl" });
		}

		Ok(Self { ttl, single_use })
	}
}
impl Default for IssuerConfig {
	fn default() -> Self {
		Self { ttl: Duration::minutes(20), single_use: false }
	}
}

/// Serializable service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
	/// Sliding window length in seconds.
	pub window_secs: u64,
	/// Requests admitted per identity within one window.
	pub max_requests_per_window: usize,
	/// Token lifetime in seconds.
	pub token_ttl_secs: u64,
	/// Consume tokens on their first successful redemption.
	pub single_use: bool,
	/// Interval between background sweeps in seconds.
	pub reap_interval_secs: u64,
	/// Base URL download links are built from (`<base>/download/<token>`).
	pub download_base_url: Option<Url>,
	/// JSON snapshot file for outstanding tokens; persistence is off when unset.
	pub snapshot_path: Option<PathBuf>,
}
impl ServiceConfig {
	/// Parses a JSON document, reporting the offending field path on failure.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut deserializer = serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ConfigError::Malformed {
			path: e.path().to_string(),
			message: e.inner().to_string(),
		})
	}

	/// Reads and parses a JSON configuration file.
	pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
		let path = path.into();
		let contents = fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
			message: format!("{}: {e}", path.display()),
		})?;

		Self::from_json_str(&contents)
	}

	/// Validated limiter settings.
	pub fn limiter(&self) -> Result<LimiterConfig, ConfigError> {
		LimiterConfig::new(seconds("window_secs", self.window_secs)?, self.max_requests_per_window)
	}

	/// Validated issuer settings.
	pub fn issuer(&self) -> Result<IssuerConfig, ConfigError> {
		IssuerConfig::new(seconds("token_ttl_secs", self.token_ttl_secs)?, self.single_use)
	}

	/// Validated sweep interval.
	pub fn reap_interval(&self) -> Result<Duration, ConfigError> {
		seconds("reap_interval_secs", self.reap_interval_secs)
	}

	/// Validated download base URL, if one is configured.
	pub fn download_base(&self) -> Result<Option<Url>, ConfigError> {
		match &self.download_base_url {
			Some(url) if url.cannot_be_a_base() =>
				Err(ConfigError::InvalidDownloadBase { url: url.to_string() }),
			other => Ok(other.clone()),
		}
	}

	/// Validates every setting at once.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.limiter()?;
		self.issuer()?;
		self.reap_interval()?;
		self.download_base()?;

		Ok(())
	}
}
impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			window_secs: DEFAULT_WINDOW_SECS,
			max_requests_per_window: DEFAULT_MAX_REQUESTS,
			token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
			single_use: false,
			reap_interval_secs: DEFAULT_REAP_INTERVAL_SECS,
			download_base_url: None,
			snapshot_path: None,
		}
	}
}

fn seconds(field: &'static str, value: u64) -> Result<Duration, ConfigError> {
	if value == 0 {
		return Err(ConfigError::NonPositiveDuration { field });
	}

	match i64::try_from(value).map(Duration::seconds) {
		Ok(duration) if duration <= MAX_DURATION => Ok(duration),
		_ => Err(ConfigError::DurationOutOfRange { field }),
	}
}
