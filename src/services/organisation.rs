//! Organisation lookup service
//!
//! Assembles one canonical [`Organisation`] per request from the loaded EDM
//! tables. Nothing is cached; every lookup reads the store.

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Organisation;

#[derive(Clone)]
pub struct OrganisationService {
    database: Database,
}

impl OrganisationService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Resolve an identity to its organisation. `None` when the identity is
    /// not mapped or its entity row is missing.
    pub async fn resolve(&self, identity: Uuid) -> AppResult<Option<Organisation>> {
        let Some(factset_id) = self.database.factset_id_for(&identity).await? else {
            return Ok(None);
        };

        let Some(entity) = self.database.get_entity(&factset_id).await? else {
            warn!("Identity {} maps to {} which has no entity row", identity, factset_id);
            return Ok(None);
        };

        let mut organisation = Organisation::from_entity(identity, &entity);

        if let Some(structure) = self.database.get_structure(&factset_id).await? {
            organisation.apply_structure(&structure);
        }

        for name in self.database.get_names(&factset_id).await? {
            organisation.apply_name(&name);
        }

        // Loaded for completeness; nothing in the canonical form derives from it yet.
        let changes = self.database.get_changes(&factset_id).await?;
        debug!("{} has {} change rows", factset_id, changes.len());

        for identifier in self.database.get_identifiers(&factset_id).await? {
            organisation.apply_identifier(&identifier);
        }

        Ok(Some(organisation))
    }

    /// Number of loaded entity rows
    pub async fn count(&self) -> AppResult<i64> {
        Ok(self.database.count_entities().await?)
    }

    /// Every mapped identity, in no guaranteed order
    pub fn identities(&self) -> BoxStream<'_, AppResult<String>> {
        self.database
            .stream_identities()
            .map(|row| row.map_err(AppError::from))
            .boxed()
    }
}
