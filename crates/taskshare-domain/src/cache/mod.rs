//! Ownership and share-topology caches.
//!
//! Two caches with deliberately different lifecycles:
//!
//! - [`OwnerCache`] is lazy: one memoized entry per first-accessed category,
//!   populated through a single-flight external lookup.
//! - [`ShareTopology`] is eager: the caller's whole incoming-share graph is
//!   fetched and indexed once, then published as an immutable snapshot.

pub mod owner;
pub mod topology;

pub use owner::{register_owner_cache_metrics, OwnerCache, OwnerCacheConfig};
pub use topology::ShareTopology;
