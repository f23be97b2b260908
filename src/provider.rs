//! Provider-facing descriptors (data), strategies (behavior), and the built-in catalog.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, default scopes, and the provider's OAuth dialect (`ProviderQuirks`: parameter
//! names, HTTP methods, response encodings, profile authentication style).
//! `strategy` defines [`ProviderStrategy`], the narrow hook that maps token and profile
//! payloads and detects provider error codes. `config` binds a descriptor to client
//! credentials, and `catalog` ships the built-in providers.

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod payload;
pub mod strategy;

pub use catalog::*;
pub use config::*;
pub use descriptor::*;
pub use strategy::*;
