//! Property tests over randomly generated base data and branch deltas.

use std::collections::BTreeSet;

use overlay_store::InMemoryStore;
use overlay_types::{Flag, ObjectType, Principal, Row};
use proptest::prelude::*;

use crate::factory::TableFactory;
use crate::fixtures::{branch, delta, empty_host_store, host, other_branch};
use crate::resolver::{ObjectsResolver, QuerySpec};
use crate::PAGE_SIZE;

#[derive(Clone, Debug)]
enum Change {
    Keep,
    Override {
        rename: bool,
        address: Option<String>,
        disabled: Option<bool>,
    },
    Delete,
}

#[derive(Clone, Debug)]
struct BaseObject {
    id: i64,
    name: String,
    template: bool,
    change: Change,
    /// Renamed in another branch.
    foreign: bool,
}

#[derive(Clone, Debug)]
struct NewObject {
    name: String,
    template: bool,
}

#[derive(Clone, Debug)]
struct Dataset {
    base: Vec<BaseObject>,
    new: Vec<NewObject>,
}

/// What a listing row is expected to contain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Expected {
    name: String,
    id: Option<i64>,
    address: Option<String>,
}

fn change() -> impl Strategy<Value = Change> {
    prop_oneof![
        3 => Just(Change::Keep),
        2 => (any::<bool>(), proptest::option::of("[0-9]{1,3}"), proptest::option::of(any::<bool>()))
            .prop_map(|(rename, address, disabled)| Change::Override { rename, address, disabled }),
        1 => Just(Change::Delete),
    ]
}

fn dataset(max_base: usize) -> impl Strategy<Value = Dataset> {
    (
        prop::collection::vec(("[a-c]{1,2}", any::<bool>(), change(), any::<bool>()), 0..max_base),
        prop::collection::vec(("[a-c]{1,2}", any::<bool>()), 0..4),
    )
        .prop_map(|(base, new)| Dataset {
            base: base
                .into_iter()
                .enumerate()
                .map(|(i, (prefix, template, change, foreign))| BaseObject {
                    id: i as i64 + 1,
                    name: format!("{prefix}-{i}"),
                    template,
                    change,
                    foreign,
                })
                .collect(),
            new: new
                .into_iter()
                .enumerate()
                .map(|(j, (prefix, template))| NewObject {
                    name: format!("{prefix}-n{j}"),
                    template,
                })
                .collect(),
        })
}

fn type_of(template: bool) -> ObjectType {
    if template {
        ObjectType::Template
    } else {
        ObjectType::Object
    }
}

fn base_address(id: i64) -> String {
    format!("10.0.0.{id}")
}

impl Dataset {
    /// Load into a store; `with_branch` controls whether deltas of the
    /// active branch are written at all.
    fn store(&self, with_branch: bool) -> InMemoryStore {
        let store = empty_host_store();
        for b in &self.base {
            store
                .insert(
                    "icinga_host",
                    host(b.id, &b.name)
                        .with("object_type", type_of(b.template))
                        .with("address", base_address(b.id)),
                )
                .unwrap();
            if b.foreign {
                store
                    .insert(
                        "branched_icinga_host",
                        delta(Some(b.id), other_branch()).with("object_name", format!("x-{}", b.name)),
                    )
                    .unwrap();
            }
            if !with_branch {
                continue;
            }
            let row = match &b.change {
                Change::Keep => None,
                Change::Delete => Some(delta(Some(b.id), branch()).with("deleted", Flag::Yes)),
                Change::Override {
                    rename,
                    address,
                    disabled,
                } => Some(
                    delta(Some(b.id), branch())
                        .with("object_name", rename.then(|| format!("{}-r", b.name)))
                        .with("address", address.clone())
                        .with("disabled", disabled.map(Flag::from))
                        .with("deleted", Flag::No),
                ),
            };
            if let Some(row) = row {
                store.insert("branched_icinga_host", row).unwrap();
            }
        }
        if with_branch {
            for n in &self.new {
                store
                    .insert(
                        "branched_icinga_host",
                        delta(None, branch())
                            .with("object_name", n.name.as_str())
                            .with("object_type", type_of(n.template))
                            .with("disabled", Flag::No),
                    )
                    .unwrap();
            }
        }
        store
    }

    /// Effective rows of `object_type` in the branch, sorted, one page.
    fn expected(&self, object_type: ObjectType) -> Vec<Expected> {
        let mut out: Vec<Expected> = self
            .base
            .iter()
            .filter(|b| type_of(b.template) == object_type)
            .filter_map(|b| match &b.change {
                Change::Delete => None,
                Change::Keep => Some(Expected {
                    name: b.name.clone(),
                    id: Some(b.id),
                    address: Some(base_address(b.id)),
                }),
                Change::Override { rename, address, .. } => Some(Expected {
                    name: if *rename {
                        format!("{}-r", b.name)
                    } else {
                        b.name.clone()
                    },
                    id: Some(b.id),
                    address: Some(address.clone().unwrap_or_else(|| base_address(b.id))),
                }),
            })
            .chain(
                self.new
                    .iter()
                    .filter(|n| type_of(n.template) == object_type)
                    .map(|n| Expected {
                        name: n.name.clone(),
                        id: None,
                        address: None,
                    }),
            )
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out.truncate(PAGE_SIZE);
        out
    }
}

fn resolver(store: &InMemoryStore, principal: Principal, object_type: ObjectType) -> ObjectsResolver {
    let mut r = TableFactory::default().create("host", store).unwrap();
    r.set_principal(principal).filter_object_type(object_type);
    r
}

fn fetch(store: &InMemoryStore, principal: Principal, object_type: ObjectType, in_branch: bool) -> Vec<Row> {
    let spec = if in_branch {
        QuerySpec::new("host").with_branch(branch())
    } else {
        QuerySpec::new("host")
    };
    resolver(store, principal, object_type).fetch(store, &spec).unwrap()
}

fn admin() -> Principal {
    Principal::new("admin")
}

fn observed(rows: &[Row]) -> Vec<Expected> {
    rows.iter()
        .map(|r| Expected {
            name: r.get("object_name").to_string(),
            id: r.get_int("id"),
            address: r.get_str("address").map(str::to_string),
        })
        .collect()
}

fn object_types() -> impl Strategy<Value = ObjectType> {
    prop_oneof![Just(ObjectType::Object), Just(ObjectType::Template)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// A branch without deltas of its own lists exactly the base data.
    #[test]
    fn prop_empty_branch_equals_base(data in dataset(12), ty in object_types()) {
        let store = data.store(false);
        let base = fetch(&store, admin(), ty, false);
        let branched = fetch(&store, admin(), ty, true);
        prop_assert_eq!(base, branched);
    }

    /// Overridden columns read from the delta, NULL delta columns from the base.
    #[test]
    fn prop_override_correctness(data in dataset(12), ty in object_types()) {
        let store = data.store(true);
        let rows = observed(&fetch(&store, admin(), ty, true));
        let mut expected = data.expected(ty);
        let mut rows_sorted = rows.clone();
        expected.sort();
        rows_sorted.sort();
        prop_assert_eq!(rows_sorted, expected);
    }

    /// No identity deleted in the branch is listed.
    #[test]
    fn prop_deletion_suppression(data in dataset(12), ty in object_types()) {
        let store = data.store(true);
        let ids: BTreeSet<i64> = fetch(&store, admin(), ty, true)
            .iter()
            .filter_map(|r| r.get_int("id"))
            .collect();
        for b in data.base.iter().filter(|b| matches!(b.change, Change::Delete)) {
            prop_assert!(!ids.contains(&b.id));
        }
    }

    /// Objects created in the branch are listed, without an identity.
    #[test]
    fn prop_new_objects_included(data in dataset(12), ty in object_types()) {
        let store = data.store(true);
        let rows = fetch(&store, admin(), ty, true);
        for n in data.new.iter().filter(|n| type_of(n.template) == ty) {
            let row = rows.iter().find(|r| r.get_str("object_name") == Some(n.name.as_str()));
            prop_assert!(row.is_some(), "missing new object {}", n.name);
            prop_assert!(row.map_or(false, |r| r.get("id").is_null()));
        }
    }

    /// Every identity and every name appears at most once.
    #[test]
    fn prop_no_duplication(data in dataset(12), ty in object_types()) {
        let store = data.store(true);
        let rows = fetch(&store, admin(), ty, true);
        let ids: Vec<i64> = rows.iter().filter_map(|r| r.get_int("id")).collect();
        let unique_ids: BTreeSet<i64> = ids.iter().copied().collect();
        prop_assert_eq!(ids.len(), unique_ids.len());
        let names: BTreeSet<String> = rows.iter().map(|r| r.get("object_name").to_string()).collect();
        prop_assert_eq!(names.len(), rows.len());
    }

    /// Only rows of the requested type are listed, in both fragments.
    #[test]
    fn prop_type_isolation(data in dataset(12), ty in object_types(), in_branch in any::<bool>()) {
        let store = data.store(true);
        for row in fetch(&store, admin(), ty, in_branch) {
            prop_assert_eq!(row.get_str("object_type"), Some(ty.as_str()));
        }
    }

    /// Listings are sorted by name, cut to one page and repeatable.
    #[test]
    fn prop_order_and_page_stability(data in dataset(130), in_branch in any::<bool>()) {
        let store = data.store(true);
        let first = fetch(&store, admin(), ObjectType::Object, in_branch);
        let second = fetch(&store, admin(), ObjectType::Object, in_branch);
        prop_assert!(first.len() <= PAGE_SIZE);
        let names: Vec<String> = first.iter().map(|r| r.get("object_name").to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(&names, &sorted);
        prop_assert_eq!(first, second);
        if in_branch {
            let expected: Vec<String> = data.expected(ObjectType::Object).into_iter().map(|e| e.name).collect();
            prop_assert_eq!(names, expected);
        }
    }

    /// Restrictions only ever remove rows.
    #[test]
    fn prop_restrictions_narrow(
        data in dataset(12),
        pattern in "[a-c]\\*",
        members in prop::collection::btree_set(1i64..13, 0..6),
        in_branch in any::<bool>(),
    ) {
        let store = data.store(true);
        store.insert("icinga_hostgroup", Row::new().with("id", 1).with("object_name", "grp")).unwrap();
        for id in &members {
            store
                .insert("icinga_hostgroup_host_resolved", Row::new().with("hostgroup_id", 1).with("host_id", *id))
                .unwrap();
        }

        let all: BTreeSet<Expected> = observed(&fetch(&store, admin(), ObjectType::Object, in_branch)).into_iter().collect();

        let by_name = Principal::new("n").with_restriction("director/host/filter-by-name", pattern.as_str());
        let named: BTreeSet<Expected> = observed(&fetch(&store, by_name, ObjectType::Object, in_branch)).into_iter().collect();
        prop_assert!(named.is_subset(&all));
        let prefix = pattern.trim_end_matches('*');
        prop_assert!(named.iter().all(|e| e.name.starts_with(prefix)));

        let by_group = Principal::new("g").with_restriction("director/filter/hostgroups", "grp");
        let grouped: BTreeSet<Expected> = observed(&fetch(&store, by_group, ObjectType::Object, in_branch)).into_iter().collect();
        prop_assert!(grouped.is_subset(&all));
        prop_assert!(grouped.iter().all(|e| e.id.map_or(false, |id| members.contains(&id))));

        let both = Principal::new("b")
            .with_restriction("director/host/filter-by-name", pattern.as_str())
            .with_restriction("director/filter/hostgroups", "grp");
        let narrowest: BTreeSet<Expected> = observed(&fetch(&store, both, ObjectType::Object, in_branch)).into_iter().collect();
        prop_assert!(narrowest.is_subset(&named));
        prop_assert!(narrowest.is_subset(&grouped));
    }
}
