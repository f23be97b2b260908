//! Built-in provider catalog.
//!
//! Each submodule pairs a descriptor (endpoints, default scopes, dialect) with the strategy
//! that reads its payloads. [`ProviderKind`] is the public handle used by settings files and
//! constructors.

mod baidu;
mod douban;
mod qq;
mod renren;
mod sohu;
mod sohu_weibo;
mod taobao;
mod weibo;
mod weixin;

pub use baidu::BaiduStrategy;
pub use douban::DoubanStrategy;
pub use qq::QqStrategy;
pub use renren::RenrenStrategy;
pub use sohu::SohuStrategy;
pub use sohu_weibo::SohuWeiboStrategy;
pub use taobao::TaobaoStrategy;
pub use weibo::WeiboStrategy;
pub use weixin::WeixinStrategy;

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{
		Endpoint, ProviderDescriptor, ProviderDescriptorBuilder, ProviderDescriptorError,
		ProviderStrategy, parse_endpoint,
	},
};

/// Built-in Chinese social-login providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Baidu Open Platform.
	Baidu,
	/// Douban.
	Douban,
	/// Tencent QQ Connect.
	Qq,
	/// Renren.
	Renren,
	/// Sohu Passport.
	Sohu,
	/// Sohu Weibo.
	SohuWeibo,
	/// Taobao Open Platform.
	Taobao,
	/// Sina Weibo.
	Weibo,
	/// WeChat official-account web authorization.
	Weixin,
}
impl ProviderKind {
	/// Every built-in provider.
	pub const ALL: [ProviderKind; 9] = [
		ProviderKind::Baidu,
		ProviderKind::Douban,
		ProviderKind::Qq,
		ProviderKind::Renren,
		ProviderKind::Sohu,
		ProviderKind::SohuWeibo,
		ProviderKind::Taobao,
		ProviderKind::Weibo,
		ProviderKind::Weixin,
	];

	/// Stable identifier, matching the serde representation.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Baidu => "baidu",
			ProviderKind::Douban => "douban",
			ProviderKind::Qq => "qq",
			ProviderKind::Renren => "renren",
			ProviderKind::Sohu => "sohu",
			ProviderKind::SohuWeibo => "sohu_weibo",
			ProviderKind::Taobao => "taobao",
			ProviderKind::Weibo => "weibo",
			ProviderKind::Weixin => "weixin",
		}
	}

	/// Builds the provider's descriptor.
	pub fn descriptor(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		match self {
			ProviderKind::Baidu => baidu::descriptor(),
			ProviderKind::Douban => douban::descriptor(),
			ProviderKind::Qq => qq::descriptor(),
			ProviderKind::Renren => renren::descriptor(),
			ProviderKind::Sohu => sohu::descriptor(),
			ProviderKind::SohuWeibo => sohu_weibo::descriptor(),
			ProviderKind::Taobao => taobao::descriptor(),
			ProviderKind::Weibo => weibo::descriptor(),
			ProviderKind::Weixin => weixin::descriptor(),
		}
	}

	/// Returns the strategy that interprets the provider's payloads.
	pub fn strategy(self) -> Arc<dyn ProviderStrategy> {
		match self {
			ProviderKind::Baidu => Arc::new(BaiduStrategy),
			ProviderKind::Douban => Arc::new(DoubanStrategy),
			ProviderKind::Qq => Arc::new(QqStrategy),
			ProviderKind::Renren => Arc::new(RenrenStrategy),
			ProviderKind::Sohu => Arc::new(SohuStrategy),
			ProviderKind::SohuWeibo => Arc::new(SohuWeiboStrategy),
			ProviderKind::Taobao => Arc::new(TaobaoStrategy),
			ProviderKind::Weibo => Arc::new(WeiboStrategy),
			ProviderKind::Weixin => Arc::new(WeixinStrategy),
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = UnknownProvider;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownProvider { name: s.to_owned() })
	}
}

/// Error returned when parsing an unknown provider name.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown provider `{name}`.")]
pub struct UnknownProvider {
	/// Name that failed to resolve.
	pub name: String,
}

/// Starts a descriptor with the three mandatory endpoints parsed from literals.
fn descriptor_builder(
	id: &str,
	authorization: &str,
	token: &str,
	user_info: &str,
) -> Result<ProviderDescriptorBuilder, ProviderDescriptorError> {
	let id = ProviderId::new(id).map_err(ProviderDescriptorError::InvalidId)?;

	Ok(ProviderDescriptor::builder(id)
		.authorization_endpoint(parse_endpoint(Endpoint::Authorization, authorization)?)
		.token_endpoint(parse_endpoint(Endpoint::Token, token)?)
		.user_info_endpoint(parse_endpoint(Endpoint::UserInfo, user_info)?))
}
