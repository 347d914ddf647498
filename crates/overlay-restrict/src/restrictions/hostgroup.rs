use overlay_query::{Expr, Fragment, Predicate, Query, Select};
use overlay_store::Store;
use overlay_types::{Principal, Value};
use tracing::debug;

use crate::error::RestrictResult;
use crate::restriction::Restriction;

/// Permission carrying the hostgroups a principal may see.
pub const HOSTGROUP_PERMISSION: &str = "director/filter/hostgroups";

const HOSTGROUP_TABLE: &str = "icinga_hostgroup";
const RESOLVED_MEMBERSHIP_TABLE: &str = "icinga_hostgroup_host_resolved";

/// Limits hosts to members of the allowed hostgroups, and hostgroups to the
/// allowed ones.
///
/// Other categories are not affected. Group names are resolved to ids once,
/// at construction; names that do not exist grant nothing.
#[derive(Clone, Debug)]
pub struct HostgroupRestriction {
    short_type: String,
    /// `None` when the principal is unrestricted.
    allowed: Option<AllowedGroups>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AllowedGroups {
    names: Vec<String>,
    ids: Vec<i64>,
}

impl HostgroupRestriction {
    pub fn new(store: &dyn Store, principal: &Principal, short_type: &str) -> RestrictResult<Self> {
        let names: Vec<String> = principal
            .restriction_values(HOSTGROUP_PERMISSION)
            .into_iter()
            .map(str::to_string)
            .collect();
        let allowed = if names.is_empty() {
            None
        } else {
            let ids = Self::resolve_ids(store, &names)?;
            debug!(
                principal = %principal.name,
                groups = names.len(),
                resolved = ids.len(),
                "hostgroup restriction resolved"
            );
            Some(AllowedGroups { names, ids })
        };
        Ok(Self {
            short_type: short_type.to_string(),
            allowed,
        })
    }

    fn resolve_ids(store: &dyn Store, names: &[String]) -> RestrictResult<Vec<i64>> {
        let query: Query = Select::from_table(HOSTGROUP_TABLE, "hg")
            .column("id", Expr::col("hg", "id"))
            .filter(
                Expr::col("hg", "object_name")
                    .in_list(names.iter().map(|n| Value::from(n.as_str())).collect()),
            )
            .order_by(Expr::col("hg", "id"))
            .into();
        Ok(store
            .execute(&query)?
            .iter()
            .filter_map(|row| row.get_int("id"))
            .collect())
    }

    /// Allowed hostgroup ids, `None` when unrestricted.
    pub fn allowed_ids(&self) -> Option<&[i64]> {
        self.allowed.as_ref().map(|a| a.ids.as_slice())
    }
}

impl Restriction for HostgroupRestriction {
    fn name(&self) -> &str {
        HOSTGROUP_PERMISSION
    }

    fn is_active(&self) -> bool {
        self.allowed.is_some() && matches!(self.short_type.as_str(), "host" | "hostgroup")
    }

    fn apply(&self, select: &mut Select, fragment: Fragment) {
        let Some(allowed) = &self.allowed else {
            return;
        };
        match self.short_type.as_str() {
            "host" => {
                if allowed.ids.is_empty() {
                    select.add_filter(Predicate::False);
                    return;
                }
                let members = Select::from_table(RESOLVED_MEMBERSHIP_TABLE, "hgh")
                    .column("host_id", Expr::col("hgh", "host_id"))
                    .filter(
                        Expr::col("hgh", "hostgroup_id")
                            .in_list(allowed.ids.iter().map(|id| Value::from(*id)).collect()),
                    );
                select.add_filter(fragment.identity().in_select(members));
            }
            "hostgroup" => {
                select.add_filter(
                    fragment.effective("object_name").in_list(
                        allowed
                            .names
                            .iter()
                            .map(|n| Value::from(n.as_str()))
                            .collect(),
                    ),
                );
            }
            _ => {}
        }
    }
}
