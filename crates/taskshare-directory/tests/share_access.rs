//! End-to-end share access scenarios against the in-memory directory.

use std::sync::Arc;

use taskshare_directory::MemoryShareDirectory;
use taskshare_domain::sharing_id::parse_sharing_id;
use taskshare_domain::{
    AccessLevel, PermissionSet, ProfileId, ShareError, ShareSession, LOCAL_ROOT_SHARE_ID,
};

fn alice() -> ProfileId {
    ProfileId::new("acme.it", "alice")
}

fn bob() -> ProfileId {
    ProfileId::new("acme.it", "bob")
}

async fn open_session(
    caller: ProfileId,
    directory: &Arc<MemoryShareDirectory>,
) -> ShareSession<MemoryShareDirectory, MemoryShareDirectory> {
    ShareSession::open(caller, Arc::clone(directory), Arc::clone(directory))
        .await
        .unwrap()
}

#[tokio::test]
async fn no_shares_then_wildcard_read_grant() {
    // Owner A, caller B, no shares at all: folder READ is denied.
    let directory = MemoryShareDirectory::new_shared();
    let category_id = directory.create_category(&alice());
    directory.register_uid("uid-alice", &alice());

    let session = open_session(bob(), &directory).await;
    assert!(matches!(
        session
            .check_access(category_id, "READ", AccessLevel::Folder)
            .await,
        Err(ShareError::AccessDenied { .. })
    ));

    // A grants B read on her root with wildcard; after reopening the
    // session the same call succeeds.
    directory.grant_root("root-a", &alice(), &bob(), PermissionSet::of(["READ"]));
    directory.grant_wildcard("root-a", "wild-a", "uid-alice");
    directory.set_folder_permissions("wild-a", PermissionSet::of(["READ"]));

    let session = open_session(bob(), &directory).await;
    session
        .check_access(category_id, "READ", AccessLevel::Folder)
        .await
        .unwrap();

    // The wildcard covers categories created after the grant too, once the
    // topology is rebuilt.
    let newer = directory.create_category(&alice());
    session.rebuild_topology().await.unwrap();
    session
        .check_access(newer, "READ", AccessLevel::Folder)
        .await
        .unwrap();
}

#[tokio::test]
async fn owner_bypasses_share_system() {
    let directory = MemoryShareDirectory::new_shared();
    let category_id = directory.create_category(&alice());

    let session = open_session(alice(), &directory).await;
    for level in [AccessLevel::Root, AccessLevel::Folder, AccessLevel::Elements] {
        session
            .check_access(category_id, "MANAGE", level)
            .await
            .unwrap();
    }
    assert!(session
        .try_check_access(category_id, "DELETE", AccessLevel::Elements)
        .await
        .unwrap());
}

#[tokio::test]
async fn quiet_check_filters_unreadable_categories() {
    // Listing context: B silently skips categories it cannot read.
    let directory = MemoryShareDirectory::new_shared();
    let shared = directory.create_category(&alice());
    let private = directory.create_category(&alice());
    directory.grant_root("root-a", &alice(), &bob(), PermissionSet::new());
    directory.grant_folder("root-a", "fold-1", shared);
    directory.set_folder_permissions("fold-1", PermissionSet::of(["READ"]));

    let session = open_session(bob(), &directory).await;
    let mut readable = Vec::new();
    for id in [shared, private] {
        if session
            .try_check_access(id, "READ", AccessLevel::Folder)
            .await
            .unwrap()
        {
            readable.push(id);
        }
    }

    assert_eq!(readable, vec![shared]);
}

#[tokio::test]
async fn element_grants_control_task_operations() {
    let directory = MemoryShareDirectory::new_shared();
    let category_id = directory.create_category(&alice());
    directory.grant_root("root-a", &alice(), &bob(), PermissionSet::new());
    directory.grant_folder("root-a", "fold-1", category_id);
    directory.set_folder_permissions("fold-1", PermissionSet::of(["READ"]));
    directory.set_element_permissions("fold-1", PermissionSet::of(["CREATE", "UPDATE"]));

    let session = open_session(bob(), &directory).await;
    session
        .check_access(category_id, "CREATE", AccessLevel::Elements)
        .await
        .unwrap();
    session
        .check_access(category_id, "UPDATE", AccessLevel::Elements)
        .await
        .unwrap();
    assert!(matches!(
        session
            .check_access(category_id, "DELETE", AccessLevel::Elements)
            .await,
        Err(ShareError::AccessDenied { .. })
    ));
}

#[tokio::test]
async fn sharing_ids_round_trip_through_the_codec() {
    let directory = MemoryShareDirectory::new_shared();
    let own = directory.create_category(&alice());
    let foreign = directory.create_category(&bob());
    directory.grant_root("root-b", &bob(), &alice(), PermissionSet::new());
    directory.grant_folder("root-b", "fold-f", foreign);

    let session = open_session(alice(), &directory).await;

    let own_id = session.build_sharing_id(own).await.unwrap();
    assert_eq!(
        parse_sharing_id(&own_id).unwrap(),
        (LOCAL_ROOT_SHARE_ID.to_string(), own)
    );

    let foreign_id = session.build_sharing_id(foreign).await.unwrap();
    assert_eq!(
        parse_sharing_id(&foreign_id).unwrap(),
        ("root-b".to_string(), foreign)
    );
}

#[tokio::test]
async fn folder_listing_merges_grants_per_root() {
    let directory = MemoryShareDirectory::new_shared();
    let first = directory.create_category(&alice());
    let second = directory.create_category(&alice());
    directory.register_uid("uid-alice", &alice());
    directory.grant_root("root-a", &alice(), &bob(), PermissionSet::of(["READ"]));
    directory.grant_wildcard("root-a", "wild-a", "uid-alice");
    directory.grant_folder("root-a", "fold-2", second);
    directory.set_folder_permissions("wild-a", PermissionSet::of(["READ"]));
    directory.set_folder_permissions("fold-2", PermissionSet::of(["READ", "UPDATE"]));

    let session = open_session(bob(), &directory).await;

    let roots = session.list_accessible_root_shares().await;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].owner, alice());

    let views = session.folder_shares_under_root("root-a").await.unwrap();
    assert_eq!(views.len(), 2);
    let (_, refined) = views.iter().find(|(id, _)| *id == second).unwrap();
    assert_eq!(refined.share_id, "fold-2");
    assert_eq!(
        refined.folder_permissions,
        PermissionSet::of(["READ", "UPDATE"])
    );

    assert_eq!(
        session.list_accessible_folder_ids().await,
        vec![first, second]
    );
}

#[tokio::test]
async fn deleted_category_stops_resolving_after_invalidation() {
    let directory = MemoryShareDirectory::new_shared();
    let category_id = directory.create_category(&alice());

    let session = open_session(alice(), &directory).await;
    assert_eq!(session.resolve_owner(category_id).await.unwrap(), alice());

    // The deleting caller invalidates the memoized owner; later checks see
    // the category as gone instead of serving a stale owner.
    directory.remove_category(category_id);
    session.forget_owner(category_id).await;

    assert!(matches!(
        session.resolve_owner(category_id).await,
        Err(ShareError::OwnerNotFound { .. })
    ));
}
