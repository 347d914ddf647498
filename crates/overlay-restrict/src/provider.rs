use overlay_store::Store;
use overlay_types::Principal;
use tracing::debug;

use crate::chain::RestrictionChain;
use crate::error::{RestrictError, RestrictResult};
use crate::restrictions::{HostgroupRestriction, NameFilterRestriction};

/// Builds the restriction chain for a principal and category.
pub trait RestrictionProvider: Send + Sync {
    /// Restrictions for `principal` querying category `short_type`.
    ///
    /// Fails with [`RestrictError::Unauthenticated`] when there is no
    /// principal.
    fn restrictions(
        &self,
        store: &dyn Store,
        principal: Option<&Principal>,
        short_type: &str,
    ) -> RestrictResult<RestrictionChain>;
}

/// Hostgroup restriction followed by the name filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRestrictionProvider;

impl RestrictionProvider for DefaultRestrictionProvider {
    fn restrictions(
        &self,
        store: &dyn Store,
        principal: Option<&Principal>,
        short_type: &str,
    ) -> RestrictResult<RestrictionChain> {
        let principal = principal.ok_or(RestrictError::Unauthenticated)?;
        let chain = RestrictionChain::new()
            .with(Box::new(HostgroupRestriction::new(store, principal, short_type)?))
            .with(Box::new(NameFilterRestriction::new(principal, short_type)));
        debug!(
            principal = %principal.name,
            short_type,
            active = ?chain.active_names(),
            "restriction chain built"
        );
        Ok(chain)
    }
}
