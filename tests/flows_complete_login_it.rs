#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use social_oauth2_broker::{
	_preludet::*,
	error::ConfigError,
	flows::{LoginDecline, LoginOutcome, ReqwestLoginBroker, restore_return_url},
	provider::{ProviderKind, ProviderSettings},
};

const CLIENT_ID: &str = "3849613291";
const CLIENT_SECRET: &str = "s3cr3t-it";

fn url(raw: &str) -> Url {
	Url::parse(raw).expect("Test URL should parse successfully.")
}

#[tokio::test]
async fn weibo_login_runs_end_to_end() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let return_url = url("https://app.example.com/login/callback?__provider__=weibo&sid=42");
	let request = broker.build_login_url(&return_url).expect("Login URL should build.");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.form_urlencoded_tuple("code", "4a1b2c")
				.form_urlencoded_tuple("redirect_uri", "https://app.example.com/login/callback");
			then.status(200)
				.body("{\"access_token\":\"2.00T\",\"expires_in\":157679999,\"uid\":\"1404376560\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2/users/show.json")
				.query_param("access_token", "2.00T")
				.query_param("uid", "1404376560");
			then.status(200).body(
				"{\"id\":1404376560,\"idstr\":\"1404376560\",\"screen_name\":\"zaku\",\"name\":\"zaku\",\"avatar_large\":\"https://tva1.sinaimg.cn/large/0.jpg\"}",
			);
		})
		.await;
	let callback_query = format!("code=4a1b2c&state={}", urlencode(&request.state));
	let outcome = broker
		.complete_login(&return_url, &callback_query)
		.await
		.expect("Login should complete.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	let LoginOutcome::Authenticated { identity, token } = outcome else {
		panic!("Expected an authenticated outcome.");
	};

	assert_eq!(identity.id(), "1404376560");
	assert_eq!(identity.name(), "zaku");
	assert_eq!(identity.get("screen_name"), Some("zaku"));
	assert_eq!(token.correlation_id(), Some("1404376560"));

	let mut callback_url = request.redirect_uri.clone();

	callback_url.set_query(Some(&callback_query));

	assert_eq!(
		restore_return_url(&callback_url).as_str(),
		"https://app.example.com/login/callback?__provider__=weibo&sid=42&code=4a1b2c"
	);
}

#[tokio::test]
async fn provider_denial_is_a_decline() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(500);
		})
		.await;
	let outcome = broker
		.complete_login(
			&url("https://app.example.com/login/callback"),
			"error=access_denied&error_description=user+denied&state=",
		)
		.await
		.expect("A denial is not an error.");

	assert!(matches!(
		outcome,
		LoginOutcome::Declined(LoginDecline::ProviderDenied { ref error, ref description })
			if error == "access_denied" && description.as_deref() == Some("user denied")
	));
	assert_eq!(mock.hits_async().await, 0);

	let outcome = broker
		.complete_login(&url("https://app.example.com/login/callback"), "state=sid%3D1")
		.await
		.expect("A callback without code is not an error.");

	assert!(matches!(outcome, LoginOutcome::Declined(LoginDecline::MissingCode)));
	assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn empty_answers_are_declines() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Sohu, &server.base_url(), "sohu-app", CLIENT_SECRET);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2/token").query_param("code", "EMPTY");
			then.status(200);
		})
		.await;
	let outcome = broker
		.complete_login(&url("https://app.example.com/login/callback"), "code=EMPTY")
		.await
		.expect("An empty token body is not an error.");

	token_mock.assert_async().await;

	assert!(matches!(outcome, LoginOutcome::Declined(LoginDecline::NoToken)));

	let _token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2/token").query_param("code", "OK");
			then.status(200).body("access_token=T&open_id=SOHU42&expires_in=3600");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/pp/prv/1/user/get_info");
			then.status(200);
		})
		.await;
	let outcome = broker
		.complete_login(&url("https://app.example.com/login/callback"), "code=OK")
		.await
		.expect("An empty profile body is not an error.");

	profile_mock.assert_async().await;

	assert!(matches!(outcome, LoginOutcome::Declined(LoginDecline::NoProfile)));
	assert!(!outcome.is_authenticated());
}

#[tokio::test]
async fn cancellation_aborts_the_attempt() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(200)
				.delay(std::time::Duration::from_secs(3))
				.body("{\"access_token\":\"T\",\"uid\":\"U\"}");
		})
		.await;
	let err = broker
		.complete_login_until(
			&url("https://app.example.com/login/callback"),
			"code=SLOW",
			tokio::time::sleep(std::time::Duration::from_millis(100)),
		)
		.await
		.expect_err("The cancellation signal should win.");

	assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn resolved_cancellation_skips_every_provider_call() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200).body("{\"access_token\":\"T\",\"uid\":\"U\"}");
		})
		.await;
	let err = broker
		.complete_login_until(
			&url("https://app.example.com/login/callback"),
			"code=CODE",
			std::future::ready(()),
		)
		.await
		.expect_err("A resolved cancellation signal should win before any call.");

	assert!(matches!(err, Error::Cancelled));
	assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn unresolved_cancellation_does_not_interfere() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(
		ProviderKind::Weixin,
		&server.base_url(),
		"wx520c15f417810387",
		CLIENT_SECRET,
	);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/oauth2/access_token");
			then.status(200).body(
				"{\"access_token\":\"ACCESS_TOKEN\",\"expires_in\":7200,\"refresh_token\":\"R\",\"openid\":\"OPENID\",\"scope\":\"snsapi_base\"}",
			);
		})
		.await;
	let outcome = broker
		.complete_login_until(
			&url("http://weixinjs.guangchi.net/wx"),
			"code=061abc&state=",
			std::future::pending::<()>(),
		)
		.await
		.expect("Login should complete.");

	assert_eq!(outcome.identity().map(|identity| identity.id()), Some("OPENID"));
}

#[test]
fn empty_secret_is_rejected_before_any_call() {
	let err = ReqwestLoginBroker::for_provider(ProviderKind::Qq, "100330589", "")
		.expect_err("An empty secret must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::EmptyClientSecret)));
}

#[test]
fn settings_build_a_broker() {
	let settings: ProviderSettings = serde_json::from_str(
		r#"{"provider":"douban","client_id":"0b5405e19c58e4cc21fc11a4d50aae64","client_secret":"s3cr3t"}"#,
	)
	.expect("Settings should deserialize.");
	let broker =
		ReqwestLoginBroker::from_settings(settings).expect("Broker should build from settings.");

	assert_eq!(broker.provider_name(), "douban");
	assert!(!format!("{broker:?}").contains("s3cr3t"));
}

fn urlencode(raw: &str) -> String {
	url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
