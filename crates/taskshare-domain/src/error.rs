//! Error types for share resolution operations.

use thiserror::Error;

use crate::identity::ProfileId;
use crate::model::{AccessLevel, CategoryId};

/// Errors produced by ownership/share resolution.
///
/// `OwnerNotFound` and `AccessDenied` are expected, caller-visible outcomes.
/// `InconsistentTopology` and `Directory` indicate genuine faults and are
/// logged with full context at the site that raises them.
///
/// The enum is `Clone` because failed single-flight owner resolutions are
/// shared between coalesced waiters as `Arc<ShareError>` and handed back
/// to each caller by value.
#[derive(Debug, Clone, Error)]
pub enum ShareError {
    /// The category does not exist or has no resolvable owner.
    #[error("owner not found for category {category_id}")]
    OwnerNotFound { category_id: CategoryId },

    /// A topology invariant was violated (e.g. a shared folder with no
    /// share id in any index). Indicates a bug or an upstream data race,
    /// not a legitimate denial.
    #[error("inconsistent share topology: {message}")]
    InconsistentTopology { message: String },

    /// The action is well-formed but not granted to the caller.
    #[error("action '{action}' not allowed at {level} level on category {category_id} for {caller}")]
    AccessDenied {
        category_id: CategoryId,
        action: String,
        level: AccessLevel,
        caller: ProfileId,
    },

    /// A sharing identifier failed to parse.
    #[error("malformed sharing identifier: '{value}'")]
    MalformedSharingId { value: String },

    /// The share directory (or another collaborator) call failed.
    #[error("share directory error: {message}")]
    Directory { message: String },
}

/// Result type for share resolution operations.
pub type ShareResult<T> = Result<T, ShareError>;
