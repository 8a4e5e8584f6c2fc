//! Model types for share grants and permission surfaces.

use std::collections::BTreeSet;
use std::fmt;

use crate::identity::ProfileId;

/// Identifier of a category (folder). Stable for the category's lifetime
/// and never reused in-process after deletion.
pub type CategoryId = i32;

/// Which permission surface a check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// The whole share root (an owner's entire category space).
    Root,
    /// One category folder.
    Folder,
    /// Items (tasks) inside a folder.
    Elements,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Root => write!(f, "root"),
            AccessLevel::Folder => write!(f, "folder"),
            AccessLevel::Elements => write!(f, "elements"),
        }
    }
}

/// A set of opaque action strings granted on a share surface.
///
/// Actions are recognized by the permission directory (e.g. `READ`,
/// `UPDATE`, `DELETE`, `CREATE`, `MANAGE`); this type never interprets
/// them beyond membership. `merge` implements the union semantics used
/// when a wildcard grant and a specific grant cover the same folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    actions: BTreeSet<String>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from the given actions.
    pub fn of<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `action` is granted.
    pub fn grants(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// Returns true if no action is granted.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Merges another set into this one (union; never narrows).
    pub fn merge(&mut self, other: &PermissionSet) {
        self.actions
            .extend(other.actions.iter().cloned());
    }

    /// Iterates the granted actions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }
}

/// An incoming root-level grant row as returned by the share directory.
///
/// The directory may return the same root more than once (known upstream
/// data-quality issue); deduplication happens at topology build time.
#[derive(Debug, Clone)]
pub struct RootGrant {
    /// Authoritative-system-assigned share id. Opaque, stable.
    pub share_id: String,
    /// The owner whose category space this root grants into.
    pub owner: ProfileId,
}

/// A root share visible to the caller, with its live root-level permissions
/// as of topology build time.
#[derive(Debug, Clone)]
pub struct ShareRoot {
    pub share_id: String,
    pub owner: ProfileId,
    pub permissions: PermissionSet,
}

/// Scope of a folder-level grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderScope {
    /// Exactly one category.
    Category(CategoryId),
    /// All present and future categories owned by the identity behind
    /// `owner_uid`. Membership is dynamic, so the grant is keyed by owner
    /// rather than by category id and expanded at topology build time.
    Wildcard { owner_uid: String },
}

/// An incoming folder-level grant row as returned by the share directory.
#[derive(Debug, Clone)]
pub struct FolderGrant {
    pub share_id: String,
    pub scope: FolderScope,
}

impl FolderGrant {
    /// Creates a grant covering a single category.
    pub fn category(share_id: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            share_id: share_id.into(),
            scope: FolderScope::Category(category_id),
        }
    }

    /// Creates a wildcard grant covering all categories of an owner.
    pub fn wildcard(share_id: impl Into<String>, owner_uid: impl Into<String>) -> Self {
        Self {
            share_id: share_id.into(),
            scope: FolderScope::Wildcard {
                owner_uid: owner_uid.into(),
            },
        }
    }
}

/// Effective per-folder view under one share root: the addressable share id
/// plus the merged folder/element permission sets from every grant (wildcard
/// and specific) that covers the folder.
#[derive(Debug, Clone)]
pub struct FolderShareView {
    pub share_id: String,
    pub folder_permissions: PermissionSet,
    pub element_permissions: PermissionSet,
}
