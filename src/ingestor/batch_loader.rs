use sqlx::{Pool, Sqlite};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use zip::ZipArchive;

use super::legacy_decoder::LegacyDecoder;
use super::row_scanner::RowScanner;
use super::throughput_monitor::ProgressSender;
use crate::errors::{ImportError, ImportResult};
use crate::models::*;

pub type RecordSender<R> = mpsc::Sender<ImportResult<R>>;
pub type RecordReceiver<R> = mpsc::Receiver<ImportResult<R>>;

/// Loads one archive entry into its table, committing every `batch_size`
/// rows. One loader value is cloned into every per-file task.
#[derive(Clone)]
pub struct BatchLoader {
    pool: Pool<Sqlite>,
    batch_size: usize,
    progress: ProgressSender,
}

impl BatchLoader {
    pub fn new(pool: Pool<Sqlite>, batch_size: usize, progress: ProgressSender) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
            progress,
        }
    }

    /// Load the entry backing `table` from the archive at `archive`.
    /// Returns the number of rows inserted.
    pub async fn load_entry(&self, archive: PathBuf, table: SourceTable) -> ImportResult<u64> {
        match table {
            SourceTable::Entity => self.load_table::<EntityRecord>(archive).await,
            SourceTable::Structure => self.load_table::<StructureRecord>(archive).await,
            SourceTable::Names => self.load_table::<NameRecord>(archive).await,
            SourceTable::Changes => self.load_table::<ChangeRecord>(archive).await,
            SourceTable::Identifiers => self.load_table::<IdentifierRecord>(archive).await,
        }
    }

    async fn load_table<R: SourceRecord>(&self, archive: PathBuf) -> ImportResult<u64> {
        info!("Loading {} into {}", R::TABLE.file_name(), R::TABLE);

        let (record_tx, record_rx) = mpsc::channel(self.batch_size);
        let reader = tokio::task::spawn_blocking(move || read_entry::<R>(&archive, record_tx));

        let inserted = self.insert_records::<R>(record_rx).await;
        reader.await?;
        let inserted = inserted?;

        info!("Loaded {} rows into {}", inserted, R::TABLE);
        Ok(inserted)
    }

    /// Insert every record received, in order. The first error received or
    /// raised ends the load without committing the open batch.
    pub async fn insert_records<R: SourceRecord>(
        &self,
        mut records: RecordReceiver<R>,
    ) -> ImportResult<u64> {
        let sql = R::insert_sql();
        let mut tx = self.pool.begin().await?;
        let mut in_batch = 0usize;
        let mut inserted = 0u64;

        while let Some(record) = records.recv().await {
            let record = record?;

            let mut query = sqlx::query(&sql);
            for value in record.values() {
                query = query.bind(value);
            }
            query.execute(&mut *tx).await.map_err(|e| {
                error!("Failed to insert row {} into {}: {}", inserted + 1, R::TABLE, e);
                e
            })?;

            inserted += 1;
            if self.progress.send(()).await.is_err() {
                return Err(ImportError::channel_closed("progress"));
            }

            in_batch += 1;
            if in_batch == self.batch_size {
                tx.commit().await?;
                debug!("Committed batch of {} rows into {}", in_batch, R::TABLE);
                tx = self.pool.begin().await?;
                in_batch = 0;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

/// Blocking half of a load: decode and scan one archive entry, sending typed
/// records downstream. Any failure is delivered as the last item.
fn read_entry<R: SourceRecord>(archive: &Path, records: RecordSender<R>) {
    if let Err(e) = scan_entry::<R>(archive, &records) {
        // Ignored when the inserter has already stopped.
        let _ = records.blocking_send(Err(e));
    }
}

fn scan_entry<R: SourceRecord>(archive: &Path, records: &RecordSender<R>) -> ImportResult<()> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    let entry = zip.by_name(R::TABLE.file_name())?;

    scan_rows(BufReader::new(LegacyDecoder::new(entry)), records)
}

/// Typed records from decoded text. A read error ends the rows like end of
/// input does, so whatever was sent before it still gets committed.
fn scan_rows<R: SourceRecord, B: BufRead>(reader: B, records: &RecordSender<R>) -> ImportResult<()> {
    let file_name = R::TABLE.file_name();
    let mut scanner = RowScanner::new(file_name, reader)?;
    check_header::<R>(scanner.header());

    while let Some(row) = scanner.next() {
        let record = R::from_fields(row).map_err(|found| ImportError::ColumnCount {
            file: file_name.to_string(),
            line: scanner.line(),
            expected: R::COLUMNS.len(),
            found,
        })?;

        if records.blocking_send(Ok(record)).is_err() {
            return Err(ImportError::channel_closed(file_name));
        }
    }

    Ok(())
}

/// Columns are bound by position, so a header that disagrees with the
/// declared layout is worth a warning.
fn check_header<R: SourceRecord>(header: &[String]) {
    let matches = header.len() == R::COLUMNS.len()
        && header
            .iter()
            .zip(R::COLUMNS)
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected));

    if !matches {
        warn!(
            "Header of {} does not match {} columns: {:?}",
            R::TABLE.file_name(),
            R::TABLE,
            header
        );
    }
}
