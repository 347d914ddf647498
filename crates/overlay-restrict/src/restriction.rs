use overlay_query::{Fragment, Select};

/// A named access-control condition.
///
/// Implementations hold everything they need, principal grants included,
/// from construction on. Applying is pure query mutation: no store access,
/// no other side effects.
pub trait Restriction: Send + Sync {
    /// Unique name, usually the permission it enforces.
    fn name(&self) -> &str;

    /// Returns `true` when the principal is actually limited by this rule.
    fn is_active(&self) -> bool;

    /// Narrow `select`, reading columns through `fragment`.
    ///
    /// Must only add conditions. An inactive restriction leaves `select`
    /// untouched.
    fn apply(&self, select: &mut Select, fragment: Fragment);
}

impl<T: Restriction + ?Sized> Restriction for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn apply(&self, select: &mut Select, fragment: Fragment) {
        (**self).apply(select, fragment)
    }
}
