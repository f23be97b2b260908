//! Walks through a Weibo login: build the redirect, then finish it from the callback query.
//!
//! ```sh
//! cargo run --example complete_login
//! cargo run --example complete_login -- 'code=...&state=...'
//! ```
//!
//! The first run prints the authorization URL. Paste the query the provider appends to the
//! return URL as the first argument to exchange the code and print the normalized identity.

// std
use std::env;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use social_oauth2_broker::{
	flows::{LoginOutcome, ReqwestLoginBroker, restore_return_url},
	provider::ProviderSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings: ProviderSettings = serde_json::from_str(
		r#"{
			"provider": "weibo",
			"client_id": "3849613291",
			"client_secret": "demo-secret",
			"scopes": ["email"]
		}"#,
	)?;
	let broker = ReqwestLoginBroker::from_settings(settings)?;
	let return_url = Url::parse("https://app.example.com/login/callback?__provider__=weibo")?;
	let request = broker.build_login_url(&return_url)?;

	println!("Send your user to {}.", request.login_url);
	println!("The provider will echo state `{}`.", request.state);

	let Some(callback_query) = env::args().nth(1) else {
		println!("Pass the callback query as the first argument to complete the login.");

		return Ok(());
	};
	let mut callback_url = request.redirect_uri.clone();

	callback_url.set_query(Some(&callback_query));

	println!("The user came back from {}.", restore_return_url(&callback_url));

	match broker.complete_login(&return_url, &callback_query).await? {
		LoginOutcome::Authenticated { identity, token } => {
			println!("Signed in as {} ({}).", identity.name(), identity.id());
			println!("Token expires at {:?}.", token.expires_at);
		},
		LoginOutcome::Declined(reason) => println!("Login declined: {reason}."),
	}

	Ok(())
}
