//! Meta-progression persistence
//!
//! Features:
//! - Permanent currency and upgrade levels, carried between runs
//! - Shop pricing and purchase rules
//! - JSON files written through a temp file then renamed into place
//! - Corrupt or partial data degrades to defaults, never to an error at the call site

pub mod meta;
pub mod store;

pub use meta::{MetaProgress, MetaUpgrades, PurchaseError, ShopItem};
pub use store::{JsonStore, PersistError};
