use overlay_query::{escape_like, Fragment, Predicate, Select};
use overlay_types::Principal;

use crate::restriction::Restriction;

/// Limits objects to names matching the principal's glob patterns.
///
/// Permission `director/<short>/filter-by-name`; `*` matches any run of
/// characters. Patterns are OR-ed. Without patterns the principal is not
/// restricted.
#[derive(Clone, Debug)]
pub struct NameFilterRestriction {
    name: String,
    patterns: Vec<String>,
}

impl NameFilterRestriction {
    pub fn new(principal: &Principal, short_type: &str) -> Self {
        let name = Self::permission(short_type);
        let patterns = principal
            .restriction_values(&name)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self { name, patterns }
    }

    pub fn permission(short_type: &str) -> String {
        format!("director/{short_type}/filter-by-name")
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Translate a `*` glob into a LIKE pattern.
pub fn glob_to_like(glob: &str) -> String {
    glob.split('*')
        .map(escape_like)
        .collect::<Vec<_>>()
        .join("%")
}

impl Restriction for NameFilterRestriction {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        !self.patterns.is_empty()
    }

    fn apply(&self, select: &mut Select, fragment: Fragment) {
        if !self.is_active() {
            return;
        }
        let name = fragment.effective("object_name");
        select.add_filter(Predicate::or(
            self.patterns
                .iter()
                .map(|p| name.clone().like(glob_to_like(p), false))
                .collect(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_query::Expr;

    fn select() -> Select {
        Select::from_table("icinga_host", "o").column("id", Expr::col("o", "id"))
    }

    #[test]
    fn glob_translation_escapes_like_wildcards() {
        assert_eq!(glob_to_like("web*"), "web%");
        assert_eq!(glob_to_like("*_db*"), "%\\_db%");
        assert_eq!(glob_to_like("exact"), "exact");
    }

    #[test]
    fn no_patterns_means_unrestricted() {
        let r = NameFilterRestriction::new(&Principal::new("alice"), "host");
        assert!(!r.is_active());
        let mut s = select();
        r.apply(&mut s, Fragment::Base);
        assert!(s.filters.is_empty());
    }

    #[test]
    fn permission_is_scoped_by_short_type() {
        let p = Principal::new("bob").with_restriction("director/service_set/filter-by-name", "linux*");
        assert!(!NameFilterRestriction::new(&p, "host").is_active());
        let r = NameFilterRestriction::new(&p, "service_set");
        assert_eq!(r.name(), "director/service_set/filter-by-name");
        assert_eq!(r.patterns(), ["linux*"]);
    }

    #[test]
    fn patterns_are_ored_on_effective_name() {
        let p = Principal::new("carol").with_restriction("director/host/filter-by-name", "web*, db*");
        let r = NameFilterRestriction::new(&p, "host");
        let mut s = select();
        r.apply(&mut s, Fragment::Overridden);
        let name = Fragment::Overridden.effective("object_name");
        assert_eq!(
            s.filters,
            vec![Predicate::or(vec![
                name.clone().like("web%", false),
                name.like("db%", false),
            ])]
        );
    }
}
