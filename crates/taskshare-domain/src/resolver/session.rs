//! Session-scoped access resolution facade.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::{OwnerCache, OwnerCacheConfig, ShareTopology};
use crate::error::{ShareError, ShareResult};
use crate::identity::ProfileId;
use crate::model::{AccessLevel, CategoryId, FolderShareView, PermissionSet, ShareRoot};
use crate::sharing_id::encode_sharing_id;

use super::traits::{CategoryEnumerator, ShareDirectory};

/// Reserved root share id under which an owner's own categories are
/// addressed: the owner bypasses the share system entirely, so there is no
/// directory-assigned root to point at.
pub const LOCAL_ROOT_SHARE_ID: &str = "0";

/// Configuration for a [`ShareSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Platform-wide administrative privilege: every check passes
    /// unconditionally, before any cache or directory lookup.
    pub platform_admin: bool,
    /// Owner cache tuning.
    pub owner_cache: OwnerCacheConfig,
}

impl SessionConfig {
    /// Marks the session as running with platform administrator privilege.
    pub fn with_platform_admin(mut self, platform_admin: bool) -> Self {
        self.platform_admin = platform_admin;
        self
    }

    /// Sets the owner cache configuration.
    pub fn with_owner_cache(mut self, owner_cache: OwnerCacheConfig) -> Self {
        self.owner_cache = owner_cache;
        self
    }
}

/// Session-scoped ownership/share resolution.
///
/// One instance serves all requests of one logged-in caller and may be
/// shared across concurrent request handlers. The topology snapshot is
/// built eagerly by [`ShareSession::open`] and read, never mutated, by every
/// check; [`ShareSession::rebuild_topology`] swaps in a fresh snapshot when
/// the caller knows the share graph changed (stale-until-rebuild is the
/// accepted consistency model).
///
/// Permission outcomes are never cached: each check ends in a live
/// `is_*_permitted` directory query, so a rights edit on an existing share
/// is honored on the very next call.
pub struct ShareSession<D, E> {
    caller: ProfileId,
    platform_admin: bool,
    directory: Arc<D>,
    enumerator: Arc<E>,
    owner_cache: OwnerCache<D>,
    topology: RwLock<Arc<ShareTopology>>,
}

impl<D, E> ShareSession<D, E>
where
    D: ShareDirectory + 'static,
    E: CategoryEnumerator + 'static,
{
    /// Opens a session for `caller`, eagerly building its share topology.
    pub async fn open(
        caller: ProfileId,
        directory: Arc<D>,
        enumerator: Arc<E>,
    ) -> ShareResult<Self> {
        Self::open_with_config(caller, directory, enumerator, SessionConfig::default()).await
    }

    /// Opens a session with explicit configuration.
    pub async fn open_with_config(
        caller: ProfileId,
        directory: Arc<D>,
        enumerator: Arc<E>,
        config: SessionConfig,
    ) -> ShareResult<Self> {
        let topology = ShareTopology::build(&caller, &*directory, &*enumerator).await?;
        let owner_cache = OwnerCache::with_config(Arc::clone(&directory), config.owner_cache);
        Ok(Self {
            caller,
            platform_admin: config.platform_admin,
            directory,
            enumerator,
            owner_cache,
            topology: RwLock::new(Arc::new(topology)),
        })
    }

    /// The calling profile this session resolves access for.
    pub fn caller(&self) -> &ProfileId {
        &self.caller
    }

    /// Whether the session runs with platform administrator privilege.
    pub fn is_platform_admin(&self) -> bool {
        self.platform_admin
    }

    /// The current read-only topology snapshot.
    pub async fn topology(&self) -> Arc<ShareTopology> {
        Arc::clone(&*self.topology.read().await)
    }

    /// Rebuilds the topology from the directory and publishes the fresh
    /// snapshot. Checks running concurrently keep reading the snapshot they
    /// already hold.
    pub async fn rebuild_topology(&self) -> ShareResult<()> {
        let fresh =
            ShareTopology::build(&self.caller, &*self.directory, &*self.enumerator).await?;
        *self.topology.write().await = Arc::new(fresh);
        Ok(())
    }

    /// Resolves (and memoizes) the owner of a category.
    pub async fn resolve_owner(&self, category_id: CategoryId) -> ShareResult<ProfileId> {
        self.owner_cache.resolve(category_id).await
    }

    /// Drops the memoized owner of a category (deletion / ownership
    /// transfer escape hatch).
    pub async fn forget_owner(&self, category_id: CategoryId) {
        self.owner_cache.invalidate(category_id).await;
    }

    /// Checks that the caller may perform `action` on the category at the
    /// given permission surface.
    ///
    /// Decision order: platform-admin bypass, owner bypass, then the share
    /// path for the surface — at root the owner's root share; at folder and
    /// element level the owner's wildcard share first, falling through to
    /// the category's specific share. Every surviving candidate ends in a
    /// live directory permission query; exhausting all candidates yields
    /// [`ShareError::AccessDenied`].
    pub async fn check_access(
        &self,
        category_id: CategoryId,
        action: &str,
        level: AccessLevel,
    ) -> ShareResult<()> {
        if self.platform_admin {
            return Ok(());
        }

        // Owner always has full rights; shares only grant to non-owners.
        let owner = self.resolve_owner(category_id).await?;
        if owner == self.caller {
            return Ok(());
        }

        let topology = self.topology().await;
        match level {
            AccessLevel::Root => {
                let share_id = topology.root_share_for_owner(&owner).ok_or_else(|| {
                    self.inconsistent(
                        category_id,
                        action,
                        level,
                        format!("no root share indexed for owner {owner}"),
                    )
                })?;
                if self.directory.is_root_permitted(share_id, action).await? {
                    return Ok(());
                }
            }
            AccessLevel::Folder | AccessLevel::Elements => {
                // Wildcard grant of the owner, when present, is consulted
                // first; a denial there falls through to the specific share,
                // so a broader specific grant widens the wildcard (union).
                if let Some(wildcard_id) = topology.wildcard_share_for_owner(&owner) {
                    if self.surface_permitted(level, wildcard_id, action).await? {
                        return Ok(());
                    }
                }
                match topology.specific_share_for_folder(category_id) {
                    Some(share_id) => {
                        if self.surface_permitted(level, share_id, action).await? {
                            return Ok(());
                        }
                    }
                    None => {
                        // Indexed as accessible but addressable through no
                        // share at all: topology invariant violation.
                        if topology.contains_folder(category_id)
                            && topology.wildcard_share_for_folder(category_id).is_none()
                        {
                            return Err(self.inconsistent(
                                category_id,
                                action,
                                level,
                                "accessible category has no folder share id".to_string(),
                            ));
                        }
                    }
                }
            }
        }

        Err(ShareError::AccessDenied {
            category_id,
            action: action.to_string(),
            level,
            caller: self.caller.clone(),
        })
    }

    /// Non-throwing rights check for bulk filtering contexts.
    ///
    /// Maps [`ShareError::AccessDenied`] to `false` and logs-and-suppresses
    /// [`ShareError::InconsistentTopology`]; every other error (missing
    /// category, directory failure) propagates.
    pub async fn try_check_access(
        &self,
        category_id: CategoryId,
        action: &str,
        level: AccessLevel,
    ) -> ShareResult<bool> {
        match self.check_access(category_id, action, level).await {
            Ok(()) => Ok(true),
            Err(ShareError::AccessDenied { .. }) => Ok(false),
            Err(err @ ShareError::InconsistentTopology { .. }) => {
                warn!(category_id, action, %level, %err, "suppressed rights check failure");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Builds the composite identifier addressing `category_id`'s slot
    /// within its share root.
    ///
    /// The caller's own categories are addressed under the reserved local
    /// root [`LOCAL_ROOT_SHARE_ID`]; shared ones under the root share they
    /// were granted through.
    pub async fn build_sharing_id(&self, category_id: CategoryId) -> ShareResult<String> {
        let owner = self.resolve_owner(category_id).await?;
        if owner == self.caller {
            return Ok(encode_sharing_id(LOCAL_ROOT_SHARE_ID, category_id));
        }

        let topology = self.topology().await;
        let root_share_id = topology.root_share_for_folder(category_id).ok_or_else(|| {
            let err = ShareError::InconsistentTopology {
                message: format!("no root share indexed for category {category_id}"),
            };
            warn!(category_id, caller = %self.caller, %err, "sharing id build failed");
            err
        })?;
        Ok(encode_sharing_id(root_share_id, category_id))
    }

    /// The share roots visible to the caller (deduplicated, build-time
    /// permissions). Returns an owned copy; the snapshot stays frozen.
    pub async fn list_accessible_root_shares(&self) -> Vec<ShareRoot> {
        self.topology().await.share_roots().to_vec()
    }

    /// Every category id reachable through any grant, ascending.
    pub async fn list_accessible_folder_ids(&self) -> Vec<CategoryId> {
        self.topology().await.folder_ids().collect()
    }

    /// Per-folder effective share view under one root: the addressable
    /// share id (specific grant preferred over the wildcard it refines)
    /// plus the merged folder/element permission sets of every grant
    /// covering the folder.
    pub async fn folder_shares_under_root(
        &self,
        root_share_id: &str,
    ) -> ShareResult<Vec<(CategoryId, FolderShareView)>> {
        let topology = self.topology().await;
        let mut views = Vec::new();

        for &category_id in topology.folder_ids_under_root(root_share_id) {
            let specific = topology.specific_share_for_folder(category_id);
            let wildcard = topology.wildcard_share_for_folder(category_id);
            let Some(primary) = specific.or(wildcard) else {
                continue;
            };

            let mut folder_permissions = PermissionSet::new();
            let mut element_permissions = PermissionSet::new();
            for share_id in [wildcard, specific].into_iter().flatten() {
                folder_permissions.merge(&self.directory.folder_permissions(share_id).await?);
                element_permissions.merge(&self.directory.element_permissions(share_id).await?);
            }

            views.push((
                category_id,
                FolderShareView {
                    share_id: primary.to_string(),
                    folder_permissions,
                    element_permissions,
                },
            ));
        }

        Ok(views)
    }

    /// Dispatches the folder/element permission query for a share.
    async fn surface_permitted(
        &self,
        level: AccessLevel,
        share_id: &str,
        action: &str,
    ) -> ShareResult<bool> {
        match level {
            AccessLevel::Folder => self.directory.is_folder_permitted(share_id, action).await,
            AccessLevel::Elements => {
                self.directory.is_elements_permitted(share_id, action).await
            }
            // Root checks never reach here.
            AccessLevel::Root => Ok(false),
        }
    }

    fn inconsistent(
        &self,
        category_id: CategoryId,
        action: &str,
        level: AccessLevel,
        message: String,
    ) -> ShareError {
        let err = ShareError::InconsistentTopology { message };
        warn!(
            category_id,
            action,
            %level,
            caller = %self.caller,
            %err,
            "share topology invariant violated during rights check"
        );
        err
    }
}
