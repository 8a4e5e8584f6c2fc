//! taskshare-domain: Ownership and share resolution core
//!
//! This crate decides whether a caller may act on a shared task category
//! without querying the permission backend on every call:
//! - Lazy category→owner memoization with single-flight population
//! - Eager, immutable share-topology snapshot with reverse indices
//! - Three-tier capability checks (root / folder / elements)
//! - Composite sharing-identifier codec
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               taskshare-domain               │
//! ├─────────────────────────────────────────────┤
//! │  identity    - Profile identity value type  │
//! │  model       - Grants, permission surfaces  │
//! │  cache/      - Owner + topology caches      │
//! │  resolver/   - Session facade, collaborator │
//! │                traits                       │
//! │  sharing_id  - Composite identifier codec   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Only the share *topology* is cached; authorization outcomes are not.
//! Every check ends in a live permission query against the directory, so a
//! rights edit on an existing share takes effect on the next call, while
//! grant additions/removals become visible on session reopen or an explicit
//! `rebuild_topology()`.

pub mod cache;
pub mod error;
pub mod identity;
pub mod model;
pub mod resolver;
pub mod sharing_id;

mod sharing_id_proptest;

// Re-export commonly used types at the crate root
pub use cache::{OwnerCache, OwnerCacheConfig, ShareTopology};
pub use error::{ShareError, ShareResult};
pub use identity::ProfileId;
pub use model::{AccessLevel, CategoryId, FolderShareView, PermissionSet, ShareRoot};
pub use resolver::{SessionConfig, ShareSession, LOCAL_ROOT_SHARE_ID};
