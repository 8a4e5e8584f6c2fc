//! Eager share-topology cache.
//!
//! One caller's entire incoming-share graph, fetched and indexed in a single
//! pass so that every later lookup (including the reverse ones: folder→share,
//! folder→root, owner→wildcard) is a pure in-memory read with no I/O.
//!
//! The structure reflects the share graph *as of build time* and is never
//! mutated afterwards; a session that wants to observe later grant changes
//! swaps in a freshly built snapshot (see `ShareSession::rebuild_topology`).
//!
//! # Wildcard expansion
//!
//! A wildcard grant covers whatever the grantor owns, present and future.
//! Membership is expanded eagerly here: every category currently owned by
//! the grantor is entered into the accessible set and the reverse indices,
//! so folder listing never needs an owner enumeration per call. The price
//! is that categories created after the build only appear after a rebuild.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use crate::error::ShareResult;
use crate::identity::ProfileId;
use crate::model::{CategoryId, FolderScope, ShareRoot};
use crate::resolver::traits::{CategoryEnumerator, ShareDirectory};

/// Immutable snapshot of the share graph visible to one caller.
///
/// Built once via [`ShareTopology::build`]; all accessors are borrowing
/// lookups into the frozen indices.
#[derive(Debug, Default)]
pub struct ShareTopology {
    /// Incoming share roots, deduplicated by share id, upstream order kept.
    roots: Vec<ShareRoot>,
    /// owner → root share id (one root per distinct owner).
    owner_to_root_share: HashMap<ProfileId, String>,
    /// owner → wildcard folder-share id, for owners that granted a wildcard.
    owner_to_wildcard_share: HashMap<ProfileId, String>,
    /// Every category id reachable through any grant.
    folder_ids: BTreeSet<CategoryId>,
    /// root share id → category ids under it (insertion order, no dupes).
    root_to_folders: HashMap<String, Vec<CategoryId>>,
    /// category id → the root share id it was granted under.
    folder_to_root_share: HashMap<CategoryId, String>,
    /// category id → specific folder-share id.
    folder_to_specific_share: HashMap<CategoryId, String>,
    /// category id → wildcard folder-share id it was expanded from.
    folder_to_wildcard_share: HashMap<CategoryId, String>,
}

impl ShareTopology {
    /// Creates an empty topology (a caller nobody shares with).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetches and indexes the full incoming-share graph for `caller`.
    ///
    /// Runs once per session, before the snapshot is published; afterwards
    /// every lookup is I/O-free. Duplicate root grants returned by the
    /// directory are collapsed (first occurrence wins) and logged, since a
    /// duplicate usually signals an upstream data-integrity problem rather
    /// than a legitimate second grant.
    pub async fn build<D, E>(
        caller: &ProfileId,
        directory: &D,
        enumerator: &E,
    ) -> ShareResult<Self>
    where
        D: ShareDirectory + ?Sized,
        E: CategoryEnumerator + ?Sized,
    {
        let mut topology = Self::empty();
        let mut seen_root_ids: HashSet<String> = HashSet::new();

        for grant in directory.list_incoming_share_roots(caller).await? {
            if !seen_root_ids.insert(grant.share_id.clone()) {
                warn!(
                    share_id = %grant.share_id,
                    owner = %grant.owner,
                    "duplicate incoming share root collapsed (first occurrence wins)"
                );
                continue;
            }

            let permissions = directory.root_permissions(&grant.share_id).await?;
            topology
                .owner_to_root_share
                .entry(grant.owner.clone())
                .or_insert_with(|| grant.share_id.clone());

            for folder in directory.list_incoming_folder_shares(&grant.share_id).await? {
                match &folder.scope {
                    FolderScope::Wildcard { owner_uid } => {
                        let grantor = directory.resolve_user_uid(owner_uid).await?;
                        topology
                            .owner_to_wildcard_share
                            .insert(grantor.clone(), folder.share_id.clone());
                        for category_id in
                            enumerator.list_categories_owned_by(&grantor).await?
                        {
                            topology.index_folder(&grant.share_id, category_id);
                            topology
                                .folder_to_wildcard_share
                                .insert(category_id, folder.share_id.clone());
                        }
                    }
                    FolderScope::Category(category_id) => {
                        topology.index_folder(&grant.share_id, *category_id);
                        topology
                            .folder_to_specific_share
                            .insert(*category_id, folder.share_id.clone());
                    }
                }
            }

            topology.roots.push(ShareRoot {
                share_id: grant.share_id,
                owner: grant.owner,
                permissions,
            });
        }

        Ok(topology)
    }

    /// Adds a category to the accessible set and the per-root indices.
    ///
    /// A category covered by both a wildcard and a specific grant under the
    /// same root is listed once; both share mappings are retained so the
    /// effective permissions can be merged at query time.
    fn index_folder(&mut self, root_share_id: &str, category_id: CategoryId) {
        self.folder_ids.insert(category_id);
        let under_root = self
            .root_to_folders
            .entry(root_share_id.to_string())
            .or_default();
        if !under_root.contains(&category_id) {
            under_root.push(category_id);
        }
        self.folder_to_root_share
            .entry(category_id)
            .or_insert_with(|| root_share_id.to_string());
    }

    /// The share roots visible to the caller, in upstream order.
    pub fn share_roots(&self) -> &[ShareRoot] {
        &self.roots
    }

    /// Every accessible category id, ascending.
    pub fn folder_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.folder_ids.iter().copied()
    }

    /// True if any grant covers the category.
    pub fn contains_folder(&self, category_id: CategoryId) -> bool {
        self.folder_ids.contains(&category_id)
    }

    /// Category ids granted under one root share.
    pub fn folder_ids_under_root(&self, root_share_id: &str) -> &[CategoryId] {
        self.root_to_folders
            .get(root_share_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The root share id a category was granted under.
    pub fn root_share_for_folder(&self, category_id: CategoryId) -> Option<&str> {
        self.folder_to_root_share
            .get(&category_id)
            .map(String::as_str)
    }

    /// The specific (non-wildcard) folder-share id covering a category.
    pub fn specific_share_for_folder(&self, category_id: CategoryId) -> Option<&str> {
        self.folder_to_specific_share
            .get(&category_id)
            .map(String::as_str)
    }

    /// The wildcard folder-share id a category was expanded from.
    pub fn wildcard_share_for_folder(&self, category_id: CategoryId) -> Option<&str> {
        self.folder_to_wildcard_share
            .get(&category_id)
            .map(String::as_str)
    }

    /// The wildcard folder-share id granted by an owner, if any.
    pub fn wildcard_share_for_owner(&self, owner: &ProfileId) -> Option<&str> {
        self.owner_to_wildcard_share.get(owner).map(String::as_str)
    }

    /// The root share id granted by an owner, if any.
    pub fn root_share_for_owner(&self, owner: &ProfileId) -> Option<&str> {
        self.owner_to_root_share.get(owner).map(String::as_str)
    }
}
