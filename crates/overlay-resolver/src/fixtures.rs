//! Shared test data: a host category with a branch table, inheritance and
//! hostgroup membership.

use overlay_store::InMemoryStore;
use overlay_types::{BranchId, Row};

pub(crate) const HOST_COLUMNS: [&str; 6] = [
    "id",
    "object_name",
    "object_type",
    "disabled",
    "display_name",
    "address",
];

pub(crate) fn branch() -> BranchId {
    BranchId::from_bytes([0xb1; 16])
}

pub(crate) fn other_branch() -> BranchId {
    BranchId::from_bytes([0xb2; 16])
}

/// Empty host tables.
pub(crate) fn empty_host_store() -> InMemoryStore {
    let store = InMemoryStore::default();
    store.create_table("icinga_host", HOST_COLUMNS).unwrap();
    store
        .create_table(
            "branched_icinga_host",
            HOST_COLUMNS
                .iter()
                .skip(1)
                .chain(&["object_id", "branch_uuid", "deleted"])
                .copied(),
        )
        .unwrap();
    store
        .create_table("icinga_host_inheritance", ["host_id", "parent_host_id"])
        .unwrap();
    store
        .create_table("icinga_hostgroup", ["id", "object_name", "object_type", "disabled"])
        .unwrap();
    store
        .create_table("icinga_hostgroup_host_resolved", ["hostgroup_id", "host_id"])
        .unwrap();
    store
}

pub(crate) fn host(id: i64, name: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("object_name", name)
        .with("object_type", "object")
        .with("disabled", "n")
}

/// A delta of `object_id` (`None` for a new object) in `branch`.
pub(crate) fn delta(object_id: Option<i64>, branch: BranchId) -> Row {
    Row::new()
        .with("object_id", object_id)
        .with("branch_uuid", branch)
}

/// Hosts web1..web3, db1 and a template; web2 is overridden, web3 deleted
/// and new1 created in [`branch`]; another branch renames db1.
pub(crate) fn host_store() -> InMemoryStore {
    let store = empty_host_store();
    store
        .insert_all(
            "icinga_host",
            [
                host(1, "web1").with("address", "10.0.0.1"),
                host(2, "web2").with("address", "10.0.0.2"),
                host(3, "web3").with("address", "10.0.0.3"),
                host(4, "db1").with("address", "10.0.1.1"),
                host(5, "generic-host").with("object_type", "template"),
            ],
        )
        .unwrap();
    store
        .insert_all(
            "branched_icinga_host",
            [
                delta(Some(2), branch())
                    .with("address", "192.168.0.2")
                    .with("disabled", "y"),
                delta(Some(3), branch()).with("deleted", "y"),
                delta(None, branch())
                    .with("object_name", "new1")
                    .with("object_type", "object")
                    .with("disabled", "n")
                    .with("address", "10.0.9.9"),
                delta(Some(4), other_branch()).with("object_name", "db-renamed"),
            ],
        )
        .unwrap();
    store
        .insert_all(
            "icinga_host_inheritance",
            [1, 2, 3].map(|id| Row::new().with("host_id", id).with("parent_host_id", 5)),
        )
        .unwrap();
    store
        .insert_all(
            "icinga_hostgroup",
            [Row::new().with("id", 20).with("object_name", "webservers")],
        )
        .unwrap();
    store
        .insert_all(
            "icinga_hostgroup_host_resolved",
            [1, 2].map(|id| Row::new().with("hostgroup_id", 20).with("host_id", id)),
        )
        .unwrap();
    store
}

pub(crate) fn names(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r.get("object_name").to_string()).collect()
}
