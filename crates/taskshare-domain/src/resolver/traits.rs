//! Traits for the external collaborators consumed by the resolver.

use async_trait::async_trait;

use crate::error::ShareResult;
use crate::identity::ProfileId;
use crate::model::{CategoryId, FolderGrant, PermissionSet, RootGrant};

/// Authoritative source of ownership and share grants.
///
/// Queried on owner-cache misses, once per session for the topology build,
/// and live on every permission check (`is_*_permitted`): only the share
/// *topology* is cached, never an authorization outcome, so a rights change
/// on an existing share takes effect on the next check.
#[async_trait]
pub trait ShareDirectory: Send + Sync {
    /// Resolves the owner of a category. `None` if the category does not
    /// exist (or was deleted).
    async fn find_owner(&self, category_id: CategoryId) -> ShareResult<Option<ProfileId>>;

    /// Lists the root-level grants incoming to `caller`, one row per grant.
    /// May contain duplicate share ids (upstream data-quality issue).
    async fn list_incoming_share_roots(
        &self,
        caller: &ProfileId,
    ) -> ShareResult<Vec<RootGrant>>;

    /// Lists the folder-level grants under one root share.
    async fn list_incoming_folder_shares(
        &self,
        root_share_id: &str,
    ) -> ShareResult<Vec<FolderGrant>>;

    /// The root-surface permission set granted on a share.
    async fn root_permissions(&self, share_id: &str) -> ShareResult<PermissionSet>;

    /// The folder-surface permission set granted on a share.
    async fn folder_permissions(&self, share_id: &str) -> ShareResult<PermissionSet>;

    /// The element-surface permission set granted on a share.
    async fn element_permissions(&self, share_id: &str) -> ShareResult<PermissionSet>;

    /// Whether `action` is currently granted on the root surface of a share.
    async fn is_root_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool>;

    /// Whether `action` is currently granted on the folder surface of a share.
    async fn is_folder_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool>;

    /// Whether `action` is currently granted on the element surface of a share.
    async fn is_elements_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool>;

    /// Maps an opaque user uid (as carried by wildcard grant rows) to a
    /// profile identity.
    async fn resolve_user_uid(&self, uid: &str) -> ShareResult<ProfileId>;
}

/// Enumerates the categories owned by a profile.
///
/// Needed to expand wildcard grants at topology build time; typically backed
/// by the category table of the owning service.
#[async_trait]
pub trait CategoryEnumerator: Send + Sync {
    /// Lists the ids of every category currently owned by `owner`.
    async fn list_categories_owned_by(
        &self,
        owner: &ProfileId,
    ) -> ShareResult<Vec<CategoryId>>;
}
