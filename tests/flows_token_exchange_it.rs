#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use social_oauth2_broker::{
	_preludet::*,
	error::{ProtocolError, TransportError},
	flows::LoginBroker,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{Endpoint, ProviderConfig, ProviderKind},
};

const CLIENT_ID: &str = "3849613291";
const CLIENT_SECRET: &str = "s3cr3t-it";

fn return_url() -> Url {
	Url::parse("https://app.example.com/login/callback?__provider__=weibo&sid=42")
		.expect("Return URL should parse successfully.")
}

#[tokio::test]
async fn weibo_token_captures_uid_as_correlation() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "CODE")
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET)
				.form_urlencoded_tuple("redirect_uri", "https://app.example.com/login/callback");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"remind_in\":\"157679999\",\"expires_in\":157679999,\"uid\":\"U\"}");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("Token exchange should succeed.")
		.expect("Token response should carry an access token.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "T");
	assert_eq!(token.correlation_id(), Some("U"));
	assert!(token.expires_at.is_some());
	assert_eq!(token.extra.get("remind_in"), Some(&JsonValue::String("157679999".into())));
	assert!(!token.extra.contains_key("access_token"));
}

#[tokio::test]
async fn oversized_expires_in_leaves_expiry_unknown() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(200).body("{\"access_token\":\"T\",\"uid\":\"U\",\"expires_in\":1e30}");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("An oversized expiry is not an error.")
		.expect("Token response should carry an access token.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "T");
	assert_eq!(token.correlation_id(), Some("U"));
	assert_eq!(token.expires_at, None);
}

#[tokio::test]
async fn empty_token_body_means_no_token() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(200).body("");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("An empty body is not an error.");

	mock.assert_async().await;

	assert!(token.is_none());
}

#[tokio::test]
async fn token_without_access_token_means_no_token() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Renren, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/token");
			then.status(200).body("{\"expires_in\":2592000}");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("A body without a token is not an error.");

	assert!(token.is_none());
}

#[tokio::test]
async fn non_success_status_surfaces_transport_error() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Weibo, &server.base_url(), CLIENT_ID, CLIENT_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(503).header("retry-after", "30").body("upstream unavailable");
		})
		.await;
	let err = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect_err("HTTP 503 must surface as an error.");

	match err {
		Error::Transport(TransportError::HttpStatus {
			endpoint,
			status,
			retry_after,
			body_preview,
		}) => {
			assert_eq!(endpoint, Endpoint::Token);
			assert_eq!(status, 503);
			assert_eq!(retry_after, Some(Duration::seconds(30)));
			assert_eq!(body_preview.as_deref(), Some("upstream unavailable"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn wechat_errcode_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(
		ProviderKind::Weixin,
		&server.base_url(),
		"wx520c15f417810387",
		CLIENT_SECRET,
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/oauth2/access_token")
				.query_param("appid", "wx520c15f417810387")
				.query_param("secret", CLIENT_SECRET)
				.query_param("code", "STALE")
				.query_param("grant_type", "authorization_code");
			then.status(200).body("{\"errcode\":40029,\"errmsg\":\"invalid code\"}");
		})
		.await;
	let err = broker
		.exchange_code(&return_url(), "STALE")
		.await
		.expect_err("WeChat errcode must be reported.");

	mock.assert_async().await;

	let Error::Protocol(ProtocolError { provider, endpoint, code, message }) = err else {
		panic!("Expected a protocol error.");
	};

	assert_eq!(provider, "weixin");
	assert_eq!(endpoint, Endpoint::Token);
	assert_eq!(code, "40029");
	assert_eq!(message.as_deref(), Some("invalid code"));
}

#[tokio::test]
async fn qq_form_token_and_jsonp_lookup_resolve_openid() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Qq, &server.base_url(), "100330589", CLIENT_SECRET);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth2.0/token")
				.query_param("grant_type", "authorization_code")
				.query_param("client_id", "100330589")
				.query_param("redirect_uri", "https://app.example.com/login/callback");
			then.status(200).body("access_token=FE04&expires_in=7776000&refresh_token=88E4");
		})
		.await;
	let lookup_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2.0/me").form_urlencoded_tuple("access_token", "FE04");
			then.status(200)
				.body("callback( {\"client_id\":\"100330589\",\"openid\":\"1704D5F6C7E8\"} );\n");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("QQ exchange should succeed.")
		.expect("QQ exchange should yield a token.");

	token_mock.assert_async().await;
	lookup_mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "FE04");
	assert_eq!(token.correlation_id(), Some("1704D5F6C7E8"));
	assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("88E4"));
}

#[tokio::test]
async fn qq_lookup_without_openid_means_no_token() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Qq, &server.base_url(), "100330589", CLIENT_SECRET);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/token");
			then.status(200).body("access_token=FE04&expires_in=7776000");
		})
		.await;
	let _lookup_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2.0/me");
			then.status(200).body("callback( {\"client_id\":\"100330589\",\"openid\":\"\"} );");
		})
		.await;
	let token = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect("A lookup without an openid is not an error.");

	assert!(token.is_none());
}

#[tokio::test]
async fn qq_jsonp_error_on_token_endpoint_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(ProviderKind::Qq, &server.base_url(), "100330589", CLIENT_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/token");
			then.status(200)
				.body("callback( {\"error\":100019,\"error_description\":\"code to access token error\"} );");
		})
		.await;
	let err = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect_err("QQ JSONP errors must be reported.");

	assert!(matches!(
		err,
		Error::Protocol(ProtocolError { endpoint: Endpoint::Token, ref code, .. }) if code == "100019"
	));
}

#[tokio::test]
async fn slow_token_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let kind = ProviderKind::Weibo;
	let descriptor = rebase_descriptor(
		kind.descriptor().expect("Catalog descriptor should build."),
		&server.base_url(),
	);
	let config = ProviderConfig::new(descriptor, CLIENT_ID, CLIENT_SECRET)
		.expect("Provider configuration should build.");
	let http_client = ReqwestHttpClient::with_timeout(std::time::Duration::from_millis(200))
		.expect("Reqwest client should build.");
	let broker: ReqwestTestBroker = LoginBroker::with_http_client(
		config,
		kind.strategy(),
		http_client,
		Arc::new(ReqwestTransportErrorMapper),
	);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(200)
				.delay(std::time::Duration::from_secs(2))
				.body("{\"access_token\":\"T\",\"uid\":\"U\"}");
		})
		.await;
	let err = broker
		.exchange_code(&return_url(), "CODE")
		.await
		.expect_err("A response slower than the client timeout must fail.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::Timeout { endpoint: Endpoint::Token })
	));
}
