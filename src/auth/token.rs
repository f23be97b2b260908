//! Token exchange results and redacting secret wrappers.

pub mod record;
pub mod secret;
