//! Sliding-window request quotas and short-lived download tokens for bot and API front ends.
//!
//! The crate pairs a per-identity [`RateLimiter`](limiter::RateLimiter) with a
//! [`TokenIssuer`](issuer::TokenIssuer) that mints opaque, expiring tokens bound to a
//! resource reference. [`TokenService`](service::TokenService) wires both together with video
//! link validation, and [`reap`] keeps per-identity and per-token state bounded.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod ident;
pub mod issuer;
pub mod limiter;
pub mod link;
pub mod obs;
pub mod reap;
pub mod service;
pub mod store;
pub mod token;

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		hash::Hash,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use tokio as _;
