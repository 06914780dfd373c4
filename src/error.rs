//! Service-level error types shared across the limiter, issuer, link parser, and stores.

// self
use crate::{_prelude::*, limiter::RetryDirective};

/// Service-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Snapshot storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Invalid configuration; the component must not be used.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The inbound text is not a supported video link.
	#[error(transparent)]
	InvalidLink(#[from] crate::link::LinkError),
	/// Token redemption did not resolve.
	#[error(transparent)]
	Token(#[from] TokenError),

	/// The identity used up its quota for the current window.
	#[error("Request quota exhausted; retry at {}.", .directive.earliest_retry_at)]
	RateLimitExceeded {
		/// When and how long to wait before the next attempt.
		directive: RetryDirective,
	},
}

/// Configuration and validation failures raised at construction time.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A duration setting was zero or negative.
	#[error("The {field} setting must be a positive duration.")]
	NonPositiveDuration {
		/// Offending setting name.
		field: &'static str,
	},
	/// A duration setting does not fit the supported range.
	#[error("The {field} setting exceeds the supported range.")]
	DurationOutOfRange {
		/// Offending setting name.
		field: &'static str,
	},
	/// The request quota was zero.
	#[error("The max_requests_per_window setting must be at least 1.")]
	ZeroRequestQuota,
	/// The download base URL cannot carry path segments.
	#[error("Download base URL `{url}` cannot be used as a base.")]
	InvalidDownloadBase {
		/// URL that failed validation.
		url: String,
	},
	/// The configuration document could not be parsed.
	#[error("Configuration is malformed at `{path}`: {message}.")]
	Malformed {
		/// Field path reported by the parser.
		path: String,
		/// Parser message.
		message: String,
	},
	/// The configuration file could not be read.
	#[error("Configuration file could not be read: {message}.")]
	Unreadable {
		/// Underlying I/O message.
		message: String,
	},
}

/// Non-resolving outcomes of a token redemption, surfaced as errors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenError {
	/// No token with that id exists (never issued or already reaped).
	#[error("Token was not found.")]
	NotFound,
	/// The token outlived its expiry instant.
	#[error("Token expired at {expired_at}.")]
	Expired {
		/// Expiry instant recorded at issuance.
		expired_at: OffsetDateTime,
	},
	/// The token was already redeemed under single-use policy.
	#[error("Token has already been consumed.")]
	Consumed,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_service_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Service error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn config_errors_name_the_offending_field() {
		let error: Error = ConfigError::NonPositiveDuration { field: "token_ttl_secs" }.into();

		assert_eq!(error.to_string(), "The token_ttl_secs setting must be a positive duration.");
	}

	#[test]
	fn every_variant_comes_from_a_service_operation() {
		fn origin(error: &Error) -> &'static str {
			match error {
				Error::Storage(_) => "snapshot",
				Error::Config(_) => "config",
				Error::InvalidLink(_) => "link",
				Error::Token(_) => "redeem",
				Error::RateLimitExceeded { .. } => "admit",
			}
		}

		let now = OffsetDateTime::UNIX_EPOCH;
		let delay = crate::limiter::RateLimitDecision::Delay(RetryDirective::new(now, now));
		let errors: [Error; 5] = [
			StoreError::Backend { message: "disk full".into() }.into(),
			ConfigError::ZeroRequestQuota.into(),
			crate::link::LinkError::UnsupportedHost.into(),
			TokenError::NotFound.into(),
			delay.into_result().expect_err("A delay should convert into an error."),
		];

		assert_eq!(
			errors.iter().map(origin).collect::<Vec<_>>(),
			["snapshot", "config", "link", "redeem", "admit"]
		);
	}
}
