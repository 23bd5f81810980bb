use futures::TryStreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::database::Database;
use crate::errors::{ImportError, ImportResult};
use crate::utils::entity_uuid;

/// Builds `uuid_to_fsid` from the loaded entity table.
///
/// A reader task streams every FactSet id into a bounded channel; the caller
/// derives each identity and inserts it inside one transaction, committed
/// only after the reader has finished cleanly. Either the whole mapping is
/// durable or none of it is.
pub struct IdentityMappingBuilder {
    database: Database,
    channel_capacity: usize,
}

impl IdentityMappingBuilder {
    pub fn new(database: Database, channel_capacity: usize) -> Self {
        Self {
            database,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Returns the number of mapping rows written
    pub async fn build(&self) -> ImportResult<u64> {
        let (id_tx, mut id_rx) = mpsc::channel::<String>(self.channel_capacity);

        let reader_db = self.database.clone();
        let reader = tokio::spawn(async move {
            let mut ids = reader_db.stream_factset_ids();
            while let Some(factset_id) = ids.try_next().await? {
                if id_tx.send(factset_id).await.is_err() {
                    return Err(ImportError::channel_closed("identity mapping"));
                }
            }
            Ok::<(), ImportError>(())
        });

        let pool = self.database.pool();
        let mut tx = pool.begin().await?;
        let mut mapped = 0u64;

        while let Some(factset_id) = id_rx.recv().await {
            sqlx::query("INSERT INTO uuid_to_fsid (uuid, factset_entity_id) VALUES (?, ?)")
                .bind(entity_uuid(&factset_id).to_string())
                .bind(&factset_id)
                .execute(&mut *tx)
                .await?;

            mapped += 1;
            if mapped % 100_000 == 0 {
                debug!("Mapped {} identities", mapped);
            }
        }

        reader.await??;
        tx.commit().await?;

        info!("Mapped {} identities", mapped);
        Ok(mapped)
    }
}
