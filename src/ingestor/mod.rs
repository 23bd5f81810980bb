//! Bulk import of an EDM archive.
//!
//! One loader task per recognized archive entry runs concurrently; a single
//! throughput monitor counts their rows. Once every loader has joined, the
//! identity mapping is built from the complete entity table. Any failure
//! aborts the import: batches already committed stay in the store, nothing
//! is retried.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::config::ImportConfig;
use crate::database::Database;
use crate::errors::{ImportError, ImportResult};
use crate::models::SourceTable;

pub mod batch_loader;
pub mod identity_mapping;
pub mod legacy_decoder;
pub mod row_scanner;
pub mod throughput_monitor;

pub use batch_loader::BatchLoader;
pub use identity_mapping::IdentityMappingBuilder;
pub use legacy_decoder::LegacyDecoder;
pub use row_scanner::RowScanner;
pub use throughput_monitor::{progress_channel, ThroughputMonitor};

/// Outcome of a completed import
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub tables_loaded: Vec<(SourceTable, u64)>,
    pub skipped_entries: Vec<String>,
    pub rows_loaded: u64,
    pub identities_mapped: u64,
    pub elapsed: Duration,
}

pub struct ImportService {
    database: Database,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(database: Database, config: ImportConfig) -> Self {
        Self { database, config }
    }

    pub async fn run(&self, archive: &Path) -> ImportResult<ImportSummary> {
        let started = Instant::now();
        let entries = archive_entries(archive.to_path_buf()).await?;

        let (progress_tx, progress_rx) = progress_channel(self.config.progress_channel_capacity);
        let monitor = ThroughputMonitor::new(self.config.progress_interval()).spawn(progress_rx);

        let loader = BatchLoader::new(self.database.pool(), self.config.batch_size, progress_tx);
        let mut loaders = JoinSet::new();
        let mut skipped_entries = Vec::new();

        for name in entries {
            match SourceTable::from_file_name(&name) {
                Some(table) => {
                    let loader = loader.clone();
                    let archive = archive.to_path_buf();
                    loaders.spawn(async move {
                        loader
                            .load_entry(archive, table)
                            .await
                            .map(|rows| (table, rows))
                    });
                }
                None => {
                    warn!("We have no use for {} - skipping", name);
                    skipped_entries.push(name);
                }
            }
        }
        // Loader tasks hold the remaining progress senders.
        drop(loader);

        let mut tables_loaded = Vec::new();
        while let Some(joined) = loaders.join_next().await {
            tables_loaded.push(joined??);
        }

        let rows_loaded = monitor.await?;

        info!("Creating uuid mapping");
        let identities_mapped =
            IdentityMappingBuilder::new(self.database.clone(), self.config.mapping_channel_capacity)
                .build()
                .await?;
        info!("Done uuid mapping");

        Ok(ImportSummary {
            tables_loaded,
            skipped_entries,
            rows_loaded,
            identities_mapped,
            elapsed: started.elapsed(),
        })
    }
}

/// Entry names of the archive, in archive order
pub async fn archive_entries(archive: PathBuf) -> ImportResult<Vec<String>> {
    tokio::task::spawn_blocking(move || {
        let mut zip = ZipArchive::new(BufReader::new(File::open(&archive)?))?;
        (0..zip.len())
            .map(|i| Ok::<_, ImportError>(zip.by_index_raw(i)?.name().to_string()))
            .collect()
    })
    .await?
}
