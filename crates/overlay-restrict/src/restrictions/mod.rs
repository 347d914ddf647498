//! Built-in restrictions.

pub mod hostgroup;
pub mod name_filter;

pub use hostgroup::HostgroupRestriction;
pub use name_filter::NameFilterRestriction;
