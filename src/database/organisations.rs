use futures::stream::BoxStream;
use sqlx::Row;
use uuid::Uuid;

use super::Database;
use crate::models::*;

impl Database {
    /// FactSet id mapped to `identity`, if any
    pub async fn factset_id_for(&self, identity: &Uuid) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT factset_entity_id FROM uuid_to_fsid WHERE uuid = ? LIMIT 1")
            .bind(identity.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.try_get("factset_entity_id")).transpose()
    }

    pub async fn get_entity(&self, factset_id: &str) -> Result<Option<EntityRecord>, sqlx::Error> {
        let row = sqlx::query(&EntityRecord::select_by_entity_sql())
            .bind(factset_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(EntityRecord::from_row).transpose()
    }

    pub async fn get_structure(
        &self,
        factset_id: &str,
    ) -> Result<Option<StructureRecord>, sqlx::Error> {
        let row = sqlx::query(&StructureRecord::select_by_entity_sql())
            .bind(factset_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(StructureRecord::from_row).transpose()
    }

    pub async fn get_names(&self, factset_id: &str) -> Result<Vec<NameRecord>, sqlx::Error> {
        self.fetch_records(factset_id).await
    }

    pub async fn get_changes(&self, factset_id: &str) -> Result<Vec<ChangeRecord>, sqlx::Error> {
        self.fetch_records(factset_id).await
    }

    pub async fn get_identifiers(
        &self,
        factset_id: &str,
    ) -> Result<Vec<IdentifierRecord>, sqlx::Error> {
        self.fetch_records(factset_id).await
    }

    /// All rows of one table for an entity, in load order
    async fn fetch_records<R: SourceRecord>(&self, factset_id: &str) -> Result<Vec<R>, sqlx::Error> {
        let rows = sqlx::query(&R::select_by_entity_sql())
            .bind(factset_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(R::from_row).collect()
    }

    /// Number of loaded entity rows
    pub async fn count_entities(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM fs_entity")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_identities(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM uuid_to_fsid")
            .fetch_one(&self.pool)
            .await
    }

    /// Every FactSet id in the entity table, streamed
    pub fn stream_factset_ids(&self) -> BoxStream<'_, Result<String, sqlx::Error>> {
        sqlx::query_scalar("SELECT factset_entity_id FROM fs_entity").fetch(&self.pool)
    }

    /// Every mapped identity, streamed in no particular order
    pub fn stream_identities(&self) -> BoxStream<'_, Result<String, sqlx::Error>> {
        sqlx::query_scalar("SELECT uuid FROM uuid_to_fsid").fetch(&self.pool)
    }
}
