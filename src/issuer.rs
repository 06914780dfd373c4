//! Short-lived token issuance and redemption.

mod resolution;

pub use resolution::*;

// std
use std::collections::hash_map::Entry;
// self
use crate::{
	_prelude::*,
	config::IssuerConfig,
	obs::{self, OpSpan, Operation},
	reap::Reap,
	token::{self, Reference, Token, TokenId, TokenStatus},
};

/// Issued token plus the status cell redemptions mutate.
#[derive(Debug)]
struct Slot {
	token: Token,
	status: Mutex<TokenStatus>,
}
impl Slot {
	fn new(token: Token) -> Self {
		let status = Mutex::new(token.status);

		Self { token, status }
	}

	fn snapshot(&self) -> Token {
		Token { status: *self.status.lock(), ..self.token.clone() }
	}
}

/// Mints opaque tokens bound to a [`Reference`] and redeems them until expiry.
///
/// Issuance is the only operation that creates state. Redemption may move a token from
/// [`TokenStatus::Active`] to a terminal status but never touches its reference or expiry.
/// Each token's status sits behind its own mutex, so under single-use policy exactly one of any
/// number of concurrent redemptions observes [`Resolution::Resolved`].
pub struct TokenIssuer {
	config: IssuerConfig,
	tokens: RwLock<HashMap<TokenId, Arc<Slot>>>,
}
impl TokenIssuer {
	/// Creates an issuer from a validated configuration.
	pub fn new(config: IssuerConfig) -> Self {
		Self { config, tokens: RwLock::new(HashMap::new()) }
	}

	/// Configuration the issuer was built with.
	pub fn config(&self) -> &IssuerConfig {
		&self.config
	}

	/// Issues a token at the current UTC instant.
	pub fn issue(&self, reference: Reference) -> Token {
		self.issue_at(reference, OffsetDateTime::now_utc())
	}

	/// Issues a token whose expiry is `now` plus the configured TTL.
	pub fn issue_at(&self, reference: Reference, now: OffsetDateTime) -> Token {
		let _span = OpSpan::new(Operation::Issue, "issue").entered();
		let token = loop {
			let id = TokenId::generate();
			let mut tokens = self.tokens.write();

			if let Entry::Vacant(entry) = tokens.entry(id.clone()) {
				let token = Token::new(id, reference, now, self.config.ttl);

				entry.insert(Arc::new(Slot::new(token.clone())));

				break token;
			}
		};

		obs::record_outcome(Operation::Issue, "issued");
		obs::trace_token(Operation::Issue, &token.id.fingerprint(), "issued");

		token
	}

	/// Redeems a token at the current UTC instant.
	pub fn resolve(&self, id: &str) -> Resolution {
		self.resolve_at(id, OffsetDateTime::now_utc())
	}

	/// Redeems a token at `now`.
	///
	/// The first redemption past the expiry instant records [`TokenStatus::Expired`]; later
	/// lookups short-circuit on that status.
	pub fn resolve_at(&self, id: &str, now: OffsetDateTime) -> Resolution {
		let _span = OpSpan::new(Operation::Resolve, "resolve").entered();
		let slot = self.tokens.read().get(id).cloned();
		let resolution = match slot {
			Some(slot) => self.transition(&slot, now),
			None => Resolution::NotFound,
		};
		let outcome = resolution.outcome();

		obs::record_outcome(Operation::Resolve, outcome.as_str());
		obs::trace_token(Operation::Resolve, &token::id::fingerprint(id), outcome.as_str());

		resolution
	}

	/// Returns a snapshot of a token without changing its status.
	pub fn get(&self, id: &str) -> Option<Token> {
		self.tokens.read().get(id).map(|slot| slot.snapshot())
	}

	/// Snapshots every retained token, e.g. for persistence.
	pub fn export(&self) -> Vec<Token> {
		self.tokens.read().values().map(|slot| slot.snapshot()).collect()
	}

	/// Adopts previously exported tokens, skipping ids that are already present.
	///
	/// Returns how many tokens were adopted.
	pub fn import<I>(&self, tokens: I) -> usize
	where
		I: IntoIterator<Item = Token>,
	{
		let mut map = self.tokens.write();
		let mut adopted = 0;

		for token in tokens {
			if let Entry::Vacant(entry) = map.entry(token.id.clone()) {
				entry.insert(Arc::new(Slot::new(token)));

				adopted += 1;
			}
		}

		adopted
	}

	/// Number of retained tokens.
	pub fn len(&self) -> usize {
		self.tokens.read().len()
	}

	/// Returns `true` when no token is retained.
	pub fn is_empty(&self) -> bool {
		self.tokens.read().is_empty()
	}

	fn transition(&self, slot: &Slot, now: OffsetDateTime) -> Resolution {
		let token = &slot.token;
		let mut status = slot.status.lock();

		match *status {
			TokenStatus::Consumed => Resolution::AlreadyConsumed,
			TokenStatus::Expired => Resolution::Expired { expired_at: token.expires_at },
			TokenStatus::Active if token.is_expired_at(now) => {
				*status = TokenStatus::Expired;

				Resolution::Expired { expired_at: token.expires_at }
			},
			TokenStatus::Active => {
				if self.config.single_use {
					*status = TokenStatus::Consumed;
				}

				Resolution::Resolved {
					reference: token.reference.clone(),
					expires_at: token.expires_at,
				}
			},
		}
	}
}
impl Reap for TokenIssuer {
	/// Removes tokens that are past expiry at `now` or already marked expired.
	///
	/// Consumed tokens are retained until their expiry so repeated redemptions keep reporting
	/// [`Resolution::AlreadyConsumed`] instead of [`Resolution::NotFound`].
	fn reap_at(&self, now: OffsetDateTime) -> usize {
		let _span = OpSpan::new(Operation::Reap, "issuer").entered();
		let mut tokens = self.tokens.write();
		let before = tokens.len();

		tokens.retain(|_, slot| {
			!slot.token.is_expired_at(now) && *slot.status.lock() != TokenStatus::Expired
		});

		let reaped = before - tokens.len();

		obs::record_count(Operation::Reap, "tokens", reaped);

		reaped
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("config", &self.config)
			.field("tokens", &self.tokens.read().len())
			.finish()
	}
}
