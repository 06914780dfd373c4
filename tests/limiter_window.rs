// crates.io
use time::{Duration, macros};
// self
use ephemeral_token_service::{
	config::LimiterConfig,
	error::Error,
	ident::Identity,
	limiter::{RateLimitDecision, RateLimiter},
	reap::Reap,
};

fn limiter(window_secs: i64, max_requests: usize) -> RateLimiter {
	RateLimiter::new(
		LimiterConfig::new(Duration::seconds(window_secs), max_requests)
			.expect("Limiter fixture config should be valid."),
	)
}

#[test]
fn sliding_window_admits_again_once_the_oldest_request_ages_out() {
	let limiter = limiter(60, 2);
	let user = Identity::from(7);
	let t0 = macros::datetime!(2025-03-01 09:00 UTC);

	assert!(limiter.admit_at(&user, t0));
	assert!(limiter.admit_at(&user, t0 + Duration::seconds(10)));
	assert!(!limiter.admit_at(&user, t0 + Duration::seconds(20)));
	assert!(!limiter.admit_at(&user, t0 + Duration::seconds(59)));
	assert!(limiter.admit_at(&user, t0 + Duration::seconds(61)));
	assert!(!limiter.admit_at(&user, t0 + Duration::seconds(62)));
}

#[test]
fn identities_are_limited_independently() {
	let limiter = limiter(60, 1);
	let t0 = macros::datetime!(2025-03-01 09:00 UTC);
	let alice = Identity::named("alice").expect("Named identity fixture should be valid.");
	let bob = Identity::named("bob").expect("Named identity fixture should be valid.");

	assert!(limiter.admit_at(&alice, t0));
	assert!(limiter.admit_at(&bob, t0));
	assert!(limiter.admit_at(&Identity::from(1), t0));
	assert!(!limiter.admit_at(&alice, t0 + Duration::seconds(1)));
	assert_eq!(limiter.tracked_identities(), 3);
}

#[test]
fn denial_reports_when_to_retry() {
	let limiter = limiter(30, 1);
	let user = Identity::from(99);
	let t0 = macros::datetime!(2025-03-01 09:00 UTC);

	assert!(limiter.evaluate_at(&user, t0).is_allow());

	let RateLimitDecision::Delay(directive) =
		limiter.evaluate_at(&user, t0 + Duration::seconds(12))
	else {
		panic!("Second request inside the window should be delayed.");
	};

	assert_eq!(directive.earliest_retry_at, t0 + Duration::seconds(30));
	assert_eq!(directive.recommended_backoff, Duration::seconds(18));

	let err = limiter
		.evaluate_at(&user, t0 + Duration::seconds(13))
		.into_result()
		.expect_err("Exhausted quota should surface as an error.");

	assert!(matches!(err, Error::RateLimitExceeded { .. }));
	assert_eq!(limiter.remaining_at(&user, t0 + Duration::seconds(31)), 1);
}

#[test]
fn reaping_forgets_idle_identities_only() {
	let limiter = limiter(60, 5);
	let t0 = macros::datetime!(2025-03-01 09:00 UTC);

	limiter.admit_at(&Identity::from(1), t0);
	limiter.admit_at(&Identity::from(2), t0 + Duration::seconds(45));

	assert_eq!(limiter.reap_at(t0 + Duration::seconds(90)), 1);
	assert_eq!(limiter.tracked_identities(), 1);
	assert_eq!(limiter.remaining_at(&Identity::from(2), t0 + Duration::seconds(90)), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_admissions_never_exceed_the_quota() {
	let limiter = std::sync::Arc::new(limiter(60, 5));
	let now = macros::datetime!(2025-03-01 09:00 UTC);
	let mut tasks = Vec::new();

	for _ in 0..32 {
		let limiter = limiter.clone();

		tasks.push(tokio::spawn(async move { limiter.admit_at(&Identity::from(3), now) }));
	}

	let mut admitted = 0;

	for task in tasks {
		if task.await.expect("Admission task should not panic.") {
			admitted += 1;
		}
	}

	assert_eq!(admitted, 5);
}
