//! Role to partition and document-label resolution.
//!
//! Three cases, decided on canonical role names:
//!
//! | Role          | Partitions                  | Documents          |
//! |---------------|-----------------------------|--------------------|
//! | administrative| all                         | all                |
//! | general       | labeled general             | general            |
//! | any other     | labeled own or general      | own and general    |
//!
//! "Any other" means a role in the known-role registry. A role outside it
//! (and not one of the two special roles) sees nothing; a gate built with
//! [`AccessGate::new`] starts with an empty registry.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use quarry_cache::{Ttl, TtlCache};
use quarry_core::role::canonicalize;
use quarry_core::{Partition, PartitionCatalog, Role, VisibilityFilter};

/// Which cached access decisions to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    Role(Role),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Admin,
    General,
    Member,
    Unknown,
}

pub struct AccessGate {
    catalog: Arc<dyn PartitionCatalog>,
    admin_role: String,
    general_role: String,
    known_roles: RwLock<BTreeSet<String>>,
    partitions: TtlCache<Role, Arc<[Partition]>>,
    filters: TtlCache<Role, VisibilityFilter>,
}

impl AccessGate {
    pub fn new(
        catalog: Arc<dyn PartitionCatalog>,
        admin_role: impl AsRef<str>,
        general_role: impl AsRef<str>,
    ) -> Self {
        Self {
            catalog,
            admin_role: canonicalize(admin_role.as_ref()),
            general_role: canonicalize(general_role.as_ref()),
            known_roles: RwLock::new(BTreeSet::new()),
            partitions: TtlCache::new(),
            filters: TtlCache::new(),
        }
    }

    /// Replace the registry of roles that resolve to their own label.
    #[must_use]
    pub fn with_known_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles = roles
            .into_iter()
            .map(|r| canonicalize(r.as_ref()))
            .filter(|r| !r.is_empty())
            .collect();
        self.known_roles = RwLock::new(roles);
        self
    }

    #[must_use]
    pub fn admin_role(&self) -> &str {
        &self.admin_role
    }

    #[must_use]
    pub fn general_role(&self) -> &str {
        &self.general_role
    }

    #[must_use]
    pub fn is_general(&self, role: &Role) -> bool {
        role.as_str() == self.general_role
    }

    #[must_use]
    pub fn is_admin(&self, role: &Role) -> bool {
        role.as_str() == self.admin_role
    }

    /// Add a role to the registry and drop any decision cached for it.
    pub fn register_role(&self, role: &Role) {
        self.known_roles.write().insert(role.as_str().to_string());
        self.invalidate_access(&AccessScope::Role(role.clone()));
    }

    /// Remove a role from the registry and drop any decision cached for it.
    pub fn forget_role(&self, role: &Role) {
        self.known_roles.write().remove(role.as_str());
        self.invalidate_access(&AccessScope::Role(role.clone()));
    }

    /// Names of the partitions `role` may query.
    ///
    /// Never fails: a catalog error yields an empty set, which callers
    /// must read as "no structured data available".
    pub async fn allowed_partitions(&self, role: &Role) -> BTreeSet<String> {
        self.partitions_for(role)
            .await
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// The partitions `role` may query, with their columns.
    pub async fn partitions_for(&self, role: &Role) -> Arc<[Partition]> {
        if let Some(hit) = self.partitions.get(role) {
            return hit;
        }

        let generation = self.partitions.generation();
        let tier = self.tier(role);
        if tier == Tier::Unknown {
            tracing::debug!(role = %role, "role not registered, no partitions");
            let empty: Arc<[Partition]> = Arc::from(Vec::new());
            self.partitions
                .put_if_current(role.clone(), Arc::clone(&empty), Ttl::Never, generation);
            return empty;
        }

        let all = match self.catalog.partitions().await {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!(role = %role, %e, "partition catalog unavailable, denying structured access");
                return Arc::from(Vec::new());
            }
        };

        let allowed: Arc<[Partition]> = all
            .into_iter()
            .filter(|p| match tier {
                Tier::Admin => true,
                Tier::General => p.is_labeled(&self.general_role),
                Tier::Member => role.matches_label(&p.label) || p.is_labeled(&self.general_role),
                Tier::Unknown => false,
            })
            .collect();

        tracing::debug!(role = %role, count = allowed.len(), "resolved allowed partitions");
        if !self
            .partitions
            .put_if_current(role.clone(), Arc::clone(&allowed), Ttl::Never, generation)
        {
            tracing::debug!(role = %role, "access invalidated during lookup, not caching");
        }
        allowed
    }

    /// The document labels `role` may read.
    #[must_use]
    pub fn document_visibility_filter(&self, role: &Role) -> VisibilityFilter {
        if let Some(hit) = self.filters.get(role) {
            return hit;
        }
        let generation = self.filters.generation();
        let filter = match self.tier(role) {
            Tier::Admin => VisibilityFilter::All,
            Tier::General => VisibilityFilter::labels([self.general_role.as_str()]),
            Tier::Member => VisibilityFilter::labels([role.as_str(), self.general_role.as_str()]),
            Tier::Unknown => VisibilityFilter::Labels(BTreeSet::new()),
        };
        self.filters
            .put_if_current(role.clone(), filter.clone(), Ttl::Never, generation);
        filter
    }

    /// The filter for the shared scope only.
    #[must_use]
    pub fn general_filter(&self) -> VisibilityFilter {
        VisibilityFilter::labels([self.general_role.as_str()])
    }

    /// Drop cached access decisions. Takes effect for the very next lookup.
    pub fn invalidate_access(&self, scope: &AccessScope) {
        match scope {
            AccessScope::Role(role) => {
                self.partitions.invalidate(role);
                self.filters.invalidate(role);
            }
            AccessScope::All => {
                self.partitions.invalidate_all();
                self.filters.invalidate_all();
            }
        }
        tracing::debug!(?scope, "access cache invalidated");
    }

    fn tier(&self, role: &Role) -> Tier {
        if self.is_admin(role) {
            return Tier::Admin;
        }
        if self.is_general(role) {
            return Tier::General;
        }
        if self.known_roles.read().contains(role.as_str()) {
            Tier::Member
        } else {
            Tier::Unknown
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("admin_role", &self.admin_role)
            .field("general_role", &self.general_role)
            .field("cached_roles", &self.partitions.entry_count())
            .finish_non_exhaustive()
    }
}
