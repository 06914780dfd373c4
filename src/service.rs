//! Request facade combining admission, link validation, issuance, and redemption.

// self
use crate::{
	_prelude::*,
	config::{DEFAULT_REAP_INTERVAL, IssuerConfig, LimiterConfig, ServiceConfig},
	error::ConfigError,
	ident::Identity,
	issuer::{Resolution, TokenIssuer},
	limiter::RateLimiter,
	link::VideoLink,
	reap::Reap,
	store::FileSnapshot,
	token::{Token, TokenId},
};

/// Everything a transport needs to answer an accepted download request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedDownload {
	/// Freshly issued token.
	pub token: Token,
	/// Link the token resolves to.
	pub link: VideoLink,
	/// Download URL carrying the token, when a base URL is configured.
	pub download_url: Option<Url>,
	/// Requests the identity has left in the current window.
	pub remaining: usize,
}

/// Rate-limited token service.
///
/// A download request is admitted by the [`RateLimiter`] first, so rejected links still count
/// against the quota. Only admitted requests carrying a recognised [`VideoLink`] reach the
/// [`TokenIssuer`].
pub struct TokenService<K = Identity> {
	limiter: RateLimiter<K>,
	issuer: TokenIssuer,
	download_base: Option<Url>,
	snapshot: Option<FileSnapshot>,
	reap_interval: Duration,
}
impl<K> TokenService<K>
where
	K: Clone + Eq + Hash,
{
	/// Creates a service from validated component settings.
	pub fn new(limiter: LimiterConfig, issuer: IssuerConfig) -> Self {
		Self {
			limiter: RateLimiter::new(limiter),
			issuer: TokenIssuer::new(issuer),
			download_base: None,
			snapshot: None,
			reap_interval: DEFAULT_REAP_INTERVAL,
		}
	}

	/// Builds a service from a configuration document, adopting tokens from the configured
	/// snapshot (if any).
	///
	/// Every setting is validated before anything is built.
	pub fn from_config(config: &ServiceConfig) -> Result<Self> {
		config.validate()?;

		let mut service = Self::new(config.limiter()?, config.issuer()?);

		service.download_base = config.download_base()?;
		service.reap_interval = config.reap_interval()?;

		if let Some(path) = &config.snapshot_path {
			service = service.with_snapshot(FileSnapshot::open(path)?)?;
		}

		Ok(service)
	}

	/// Sets the base URL download links are built from.
	pub fn with_download_base(mut self, base: Url) -> Result<Self, ConfigError> {
		if base.cannot_be_a_base() {
			return Err(ConfigError::InvalidDownloadBase { url: base.into() });
		}

		self.download_base = Some(base);

		Ok(self)
	}

	/// Sets the interval background sweeps run on.
	pub fn with_reap_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
		if !interval.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "reap_interval" });
		}

		self.reap_interval = interval;

		Ok(self)
	}

	/// Attaches a snapshot and adopts the unexpired tokens it holds.
	pub fn with_snapshot(mut self, snapshot: FileSnapshot) -> Result<Self> {
		self.issuer.import(snapshot.load()?);
		self.issuer.reap();
		self.snapshot = Some(snapshot);

		Ok(self)
	}

	/// Interval background sweeps run on.
	pub fn reap_interval(&self) -> Duration {
		self.reap_interval
	}

	/// Underlying rate limiter.
	pub fn limiter(&self) -> &RateLimiter<K> {
		&self.limiter
	}

	/// Underlying token issuer.
	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}

	/// Handles a download request at the current UTC instant.
	pub fn request(&self, identity: &K, text: &str) -> Result<IssuedDownload> {
		self.request_at(identity, text, OffsetDateTime::now_utc())
	}

	/// Handles a download request at `now`: admit, validate the link, issue a token.
	pub fn request_at(
		&self,
		identity: &K,
		text: &str,
		now: OffsetDateTime,
	) -> Result<IssuedDownload> {
		let remaining = self.limiter.evaluate_at(identity, now).into_result()?;
		let link = VideoLink::parse(text)?;
		let token = self.issuer.issue_at(link.reference(), now);
		let download_url = self.download_url(&token.id);

		Ok(IssuedDownload { token, link, download_url, remaining })
	}

	/// Redeems a token at the current UTC instant.
	pub fn redeem(&self, id: &str) -> Resolution {
		self.issuer.resolve(id)
	}

	/// Redeems a token at `now`.
	pub fn redeem_at(&self, id: &str, now: OffsetDateTime) -> Resolution {
		self.issuer.resolve_at(id, now)
	}

	/// Builds `<base>/download/<token>` when a base URL is configured.
	pub fn download_url(&self, id: &TokenId) -> Option<Url> {
		let mut url = self.download_base.clone()?;

		url.path_segments_mut().ok()?.pop_if_empty().push("download").push(id.expose());

		Some(url)
	}

	/// Writes outstanding tokens to the attached snapshot; returns how many were written.
	///
	/// Without a snapshot this is a no-op returning zero.
	pub fn persist(&self) -> Result<usize> {
		let Some(snapshot) = &self.snapshot else {
			return Ok(0);
		};

		Ok(snapshot.save_with(|| self.issuer.export())?)
	}
}
#[cfg(feature = "tokio")]
impl<K> TokenService<K>
where
	K: 'static + Clone + Eq + Hash + Send + Sync,
{
	/// Spawns a [`ReaperHandle`](crate::reap::ReaperHandle) sweeping this service on its
	/// configured interval.
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn_reaper(self: &Arc<Self>) -> crate::reap::ReaperHandle {
		crate::reap::ReaperHandle::spawn(self.clone(), self.reap_interval)
	}
}
impl<K> Reap for TokenService<K>
where
	K: Clone + Eq + Hash + Send + Sync,
{
	fn reap_at(&self, now: OffsetDateTime) -> usize {
		self.limiter.reap_at(now) + self.issuer.reap_at(now)
	}
}
impl<K> Debug for TokenService<K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenService")
			.field("limiter", &self.limiter)
			.field("issuer", &self.issuer)
			.field("download_base", &self.download_base)
			.field("snapshot", &self.snapshot)
			.field("reap_interval", &self.reap_interval)
			.finish()
	}
}
