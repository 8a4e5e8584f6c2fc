//! Access resolution over the ownership and topology caches.
//!
//! The session facade composes the lazily populated owner cache, the
//! eagerly built share topology, and live permission queries against the
//! share directory into the three-tier capability check (root / folder /
//! elements).

pub mod traits;

mod session;

pub use session::{SessionConfig, ShareSession, LOCAL_ROOT_SHARE_ID};

#[cfg(test)]
pub(crate) mod tests;
