//! Contract interfaces consumed by the client
//!
//! - **Whitelist**: the Crypto Devs whitelist (join, membership, count, capacity)

pub mod whitelist;

pub use whitelist::{IWhitelist, WhitelistContract};
