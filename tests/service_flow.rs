// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use time::{Duration, OffsetDateTime, macros};
// self
use ephemeral_token_service::{
	config::ServiceConfig,
	error::{Error, TokenError},
	ident::Identity,
	issuer::ResolveOutcome,
	link::LinkKind,
	service::TokenService,
};

fn temp_snapshot(tag: &str) -> PathBuf {
	env::temp_dir().join(format!(
		"ephemeral_token_service_{tag}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	))
}

#[test]
fn configured_service_limits_issues_and_redeems() {
	let config = ServiceConfig::from_json_str(
		r#"{
			"window_secs": 60,
			"max_requests_per_window": 2,
			"token_ttl_secs": 300,
			"single_use": true,
			"download_base_url": "https://dl.example.com/"
		}"#,
	)
	.expect("Service config fixture should parse.");
	let service: TokenService =
		TokenService::from_config(&config).expect("Service should build from config.");
	let user = Identity::from(1001);
	let t0 = macros::datetime!(2025-09-01 18:00 UTC);
	let issued = service
		.request_at(&user, "https://youtube.com/shorts/abc123", t0)
		.expect("Short link should be issued.");

	assert_eq!(issued.link.kind, LinkKind::Short);
	assert_eq!(issued.remaining, 1);
	assert_eq!(
		issued.download_url.as_ref().map(|url| url.path().to_owned()),
		Some(format!("/download/{}", issued.token.id.expose()))
	);

	service
		.request_at(&user, "https://youtu.be/xyz", t0 + Duration::seconds(5))
		.expect("Second request inside the quota should be issued.");

	let err = service
		.request_at(&user, "https://youtu.be/xyz", t0 + Duration::seconds(10))
		.expect_err("Third request inside the window should be limited.");

	let Error::RateLimitExceeded { directive } = err else {
		panic!("Third request should fail with a rate limit error.");
	};

	assert_eq!(directive.earliest_retry_at, t0 + Duration::seconds(60));
	assert_eq!(
		service.redeem_at(issued.token.id.expose(), t0 + Duration::seconds(30)).into_result(),
		Ok(issued.link.reference())
	);
	assert_eq!(
		service.redeem_at(issued.token.id.expose(), t0 + Duration::seconds(31)).into_result(),
		Err(TokenError::Consumed)
	);
}

#[test]
fn snapshot_survives_a_restart() {
	let path = temp_snapshot("restart");
	let config = ServiceConfig { snapshot_path: Some(path.clone()), ..Default::default() };
	let first: TokenService =
		TokenService::from_config(&config).expect("Service should build with a fresh snapshot.");
	let issued = first
		.request(&Identity::from(5), "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
		.expect("Watch link should be issued.");

	assert_eq!(first.persist().expect("Snapshot should be written."), 1);

	drop(first);

	let second: TokenService =
		TokenService::from_config(&config).expect("Service should reload its snapshot.");

	assert_eq!(second.issuer().len(), 1);
	assert_eq!(second.redeem(issued.token.id.expose()).outcome(), ResolveOutcome::Resolved);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary token snapshot {}: {e}", path.display())
	});
}

#[test]
fn concurrent_persists_all_succeed() {
	let path = temp_snapshot("concurrent");
	let config = ServiceConfig {
		max_requests_per_window: 1_000,
		snapshot_path: Some(path.clone()),
		..Default::default()
	};
	let service: TokenService =
		TokenService::from_config(&config).expect("Service should build with a fresh snapshot.");

	for user in 0..200 {
		service
			.request(&Identity::from(user), "https://youtu.be/dQw4w9WgXcQ")
			.expect("Valid link should be issued.");
	}

	std::thread::scope(|scope| {
		for _ in 0..8 {
			scope.spawn(|| {
				for _ in 0..20 {
					assert_eq!(service.persist().expect("Concurrent persist should succeed."), 200);
				}
			});
		}
	});

	let reloaded: TokenService =
		TokenService::from_config(&config).expect("Service should reload its snapshot.");

	assert_eq!(reloaded.issuer().len(), 200);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary token snapshot {}: {e}", path.display())
	});
}

#[test]
fn invalid_configuration_is_rejected_before_serving() {
	let config = ServiceConfig { max_requests_per_window: 0, ..Default::default() };
	let err = TokenService::<Identity>::from_config(&config)
		.expect_err("A zero quota should be rejected.");

	assert!(matches!(err, Error::Config(_)));

	let config = ServiceConfig { reap_interval_secs: 0, ..Default::default() };

	assert!(TokenService::<Identity>::from_config(&config).is_err());
}
