//! In-memory share directory implementation.
//!
//! Backs the `ShareDirectory` and `CategoryEnumerator` traits with DashMap
//! registries for thread-safe concurrent access without external locks.
//! Suitable for tests and single-process embedding; a production deployment
//! would put the platform's core share service behind the same traits.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::instrument;

use taskshare_domain::error::{ShareError, ShareResult};
use taskshare_domain::identity::ProfileId;
use taskshare_domain::model::{CategoryId, FolderGrant, PermissionSet, RootGrant};
use taskshare_domain::resolver::traits::{CategoryEnumerator, ShareDirectory};

/// In-memory implementation of the share directory.
///
/// # Performance Characteristics
///
/// - **Owner lookup**: O(1) (DashMap get)
/// - **Root grant listing**: O(1) per grantee bucket
/// - **Category enumeration**: O(N) over all categories (linear scan)
///
/// Grant mutators take effect immediately for permission queries; topology
/// listings are observed by a session on its next rebuild, matching the
/// stale-until-rebuild model of the domain caches.
#[derive(Debug, Default)]
pub struct MemoryShareDirectory {
    /// category id → owning profile.
    categories: DashMap<CategoryId, ProfileId>,
    /// grantee profile → incoming root grant rows, in grant order.
    root_grants: DashMap<ProfileId, Vec<RootGrant>>,
    /// root share id → folder grant rows under it.
    folder_grants: DashMap<String, Vec<FolderGrant>>,
    /// share id → permission set, per surface.
    root_perms: DashMap<String, PermissionSet>,
    folder_perms: DashMap<String, PermissionSet>,
    element_perms: DashMap<String, PermissionSet>,
    /// opaque user uid → profile.
    uids: DashMap<String, ProfileId>,
    next_category_id: AtomicI32,
}

impl MemoryShareDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self {
            next_category_id: AtomicI32::new(1),
            ..Self::default()
        }
    }

    /// Creates a new directory wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Creates a category owned by `owner` and returns its assigned id.
    /// Ids are never reused, even after removal.
    pub fn create_category(&self, owner: &ProfileId) -> CategoryId {
        let id = self.next_category_id.fetch_add(1, Ordering::SeqCst);
        self.categories.insert(id, owner.clone());
        id
    }

    /// Registers a category under an externally assigned id.
    pub fn put_category(&self, category_id: CategoryId, owner: &ProfileId) {
        self.categories.insert(category_id, owner.clone());
        // Keep assigned ids ahead of any externally chosen one.
        self.next_category_id
            .fetch_max(category_id.saturating_add(1), Ordering::SeqCst);
    }

    /// Removes a category. Returns true if it existed.
    pub fn remove_category(&self, category_id: CategoryId) -> bool {
        self.categories.remove(&category_id).is_some()
    }

    /// Maps an opaque user uid to a profile (wildcard grant rows carry the
    /// uid, not the profile).
    pub fn register_uid(&self, uid: &str, profile: &ProfileId) {
        self.uids.insert(uid.to_string(), profile.clone());
    }

    /// Records a root grant from `owner` into `grantee` with the given
    /// root-surface permissions.
    pub fn grant_root(
        &self,
        share_id: &str,
        owner: &ProfileId,
        grantee: &ProfileId,
        permissions: PermissionSet,
    ) {
        self.root_grants
            .entry(grantee.clone())
            .or_default()
            .push(RootGrant {
                share_id: share_id.to_string(),
                owner: owner.clone(),
            });
        self.root_perms.insert(share_id.to_string(), permissions);
    }

    /// Records a folder grant covering one category under a root share.
    pub fn grant_folder(
        &self,
        root_share_id: &str,
        folder_share_id: &str,
        category_id: CategoryId,
    ) {
        self.folder_grants
            .entry(root_share_id.to_string())
            .or_default()
            .push(FolderGrant::category(folder_share_id, category_id));
    }

    /// Records a wildcard folder grant under a root share. `owner_uid` must
    /// be registered via [`MemoryShareDirectory::register_uid`].
    pub fn grant_wildcard(&self, root_share_id: &str, folder_share_id: &str, owner_uid: &str) {
        self.folder_grants
            .entry(root_share_id.to_string())
            .or_default()
            .push(FolderGrant::wildcard(folder_share_id, owner_uid));
    }

    /// Replaces the root-surface permissions of a share.
    pub fn set_root_permissions(&self, share_id: &str, permissions: PermissionSet) {
        self.root_perms.insert(share_id.to_string(), permissions);
    }

    /// Replaces the folder-surface permissions of a share. Takes effect on
    /// the next check; no session rebuild required.
    pub fn set_folder_permissions(&self, share_id: &str, permissions: PermissionSet) {
        self.folder_perms.insert(share_id.to_string(), permissions);
    }

    /// Replaces the element-surface permissions of a share.
    pub fn set_element_permissions(&self, share_id: &str, permissions: PermissionSet) {
        self.element_perms.insert(share_id.to_string(), permissions);
    }

    fn perms_of(map: &DashMap<String, PermissionSet>, share_id: &str) -> PermissionSet {
        map.get(share_id)
            .map(|p| p.value().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ShareDirectory for MemoryShareDirectory {
    #[instrument(skip(self))]
    async fn find_owner(&self, category_id: CategoryId) -> ShareResult<Option<ProfileId>> {
        Ok(self.categories.get(&category_id).map(|o| o.value().clone()))
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn list_incoming_share_roots(
        &self,
        caller: &ProfileId,
    ) -> ShareResult<Vec<RootGrant>> {
        Ok(self
            .root_grants
            .get(caller)
            .map(|grants| grants.value().clone())
            .unwrap_or_default())
    }

    async fn list_incoming_folder_shares(
        &self,
        root_share_id: &str,
    ) -> ShareResult<Vec<FolderGrant>> {
        Ok(self
            .folder_grants
            .get(root_share_id)
            .map(|grants| grants.value().clone())
            .unwrap_or_default())
    }

    async fn root_permissions(&self, share_id: &str) -> ShareResult<PermissionSet> {
        Ok(Self::perms_of(&self.root_perms, share_id))
    }

    async fn folder_permissions(&self, share_id: &str) -> ShareResult<PermissionSet> {
        Ok(Self::perms_of(&self.folder_perms, share_id))
    }

    async fn element_permissions(&self, share_id: &str) -> ShareResult<PermissionSet> {
        Ok(Self::perms_of(&self.element_perms, share_id))
    }

    async fn is_root_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool> {
        Ok(Self::perms_of(&self.root_perms, share_id).grants(action))
    }

    async fn is_folder_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool> {
        Ok(Self::perms_of(&self.folder_perms, share_id).grants(action))
    }

    async fn is_elements_permitted(&self, share_id: &str, action: &str) -> ShareResult<bool> {
        Ok(Self::perms_of(&self.element_perms, share_id).grants(action))
    }

    async fn resolve_user_uid(&self, uid: &str) -> ShareResult<ProfileId> {
        self.uids
            .get(uid)
            .map(|p| p.value().clone())
            .ok_or_else(|| ShareError::Directory {
                message: format!("unknown user uid: {uid}"),
            })
    }
}

#[async_trait]
impl CategoryEnumerator for MemoryShareDirectory {
    async fn list_categories_owned_by(
        &self,
        owner: &ProfileId,
    ) -> ShareResult<Vec<CategoryId>> {
        let mut ids: Vec<CategoryId> = self
            .categories
            .iter()
            .filter(|entry| entry.value() == owner)
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
