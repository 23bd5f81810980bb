#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use edm_orgs::config::{DatabaseConfig, ImportConfig};
use edm_orgs::database::Database;
use edm_orgs::errors::ImportResult;
use edm_orgs::ingestor::{ImportService, ImportSummary};

pub const STORE_NAME: &str = "edm_test";

pub const ENTITY_HEADER: &str = "\"FACTSET_ENTITY_ID\"|\"ENTITY_NAME\"|\"ENTITY_PROPER_NAME\"|\"PRIMARY_SIC_CODE\"|\"INDUSTRY_CODE\"|\"SECTOR_CODE\"|\"ISO_COUNTRY\"|\"METRO_AREA\"|\"STATE_PROVINCE\"|\"ZIP_POSTAL_CODE\"|\"WEB_SITE\"|\"ENTITY_TYPE\"|\"ENTITY_SUB_TYPE\"|\"YEAR_FOUNDED\"|\"ISO_COUNTRY_INCORP\"|\"ISO_COUNTRY_COR\"|\"NACE_CODE\"";
pub const STRUCTURE_HEADER: &str =
    "\"FACTSET_ENTITY_ID\"|\"FACTSET_PARENT_ENTITY_ID\"|\"FACTSET_ULTIMATE_PARENT_ENTITY_ID\"";
pub const NAMES_HEADER: &str = "\"FACTSET_ENTITY_ID\"|\"ENTITY_NAME_TYPE\"|\"ENTITY_NAME_VALUE\"";
pub const CHANGES_HEADER: &str = "\"FACTSET_ENTITY_ID\"|\"CHANGE_TYPE\"|\"CHANGE_DATE\"|\"OLD_VALUE\"|\"NEW_VALUE\"|\"AUDIT_TYPE\"|\"COMMENTS\"|\"AUDIT_ID\"";
pub const IDENTIFIERS_HEADER: &str = "\"FACTSET_ENTITY_ID\"|\"ENTITY_ID_TYPE\"|\"ENTITY_ID_VALUE\"";

pub const ACME_LEI: &str = "5493001KJTIIGC8Y1R12";

/// Quote every field and join with the EDM delimiter
pub fn row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect::<Vec<_>>()
        .join("|")
}

pub fn entity_row(id: &str, name: &str, proper_name: &str, entity_type: &str, industry: &str) -> String {
    row(&[
        id, name, proper_name, "", industry, "", "US", "", "NY", "10001", "", entity_type, "",
        "1999", "US", "US", "",
    ])
}

/// File contents with Windows line endings, header first
pub fn file(header: &str, rows: &[String]) -> Vec<u8> {
    let mut text = String::from(header);
    text.push_str("\r\n");
    for r in rows {
        text.push_str(r);
        text.push_str("\r\n");
    }
    text.into_bytes()
}

pub fn write_archive(dir: &Path, entries: &[(&str, Vec<u8>)]) -> PathBuf {
    let path = dir.join("edm.zip");
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    for (name, contents) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Two entities: 123 (Acme, public, fully populated) and 789 (Widgets,
/// private, bare). 123 has parent 456, which is not loaded.
pub fn standard_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        (
            "edm_entity.txt",
            file(
                ENTITY_HEADER,
                &[
                    entity_row("123", "ACME", "Acme Inc", "PUB", "1234"),
                    entity_row("789", "WIDGETS", "Widgets Ltd", "PVT", ""),
                ],
            ),
        ),
        (
            "edm_entity_structure.txt",
            file(STRUCTURE_HEADER, &[row(&["123", "456", "456"])]),
        ),
        (
            "edm_entity_names.txt",
            file(
                NAMES_HEADER,
                &[
                    row(&["123", "FORMER_NAME", "Acme Old"]),
                    row(&["123", "LEGAL_NAME", "Acme Incorporated"]),
                    row(&["123", "SHORT_NAME", "Acme"]),
                    row(&["123", "TRADE_DBA_NAME", "Acme"]),
                    row(&["123", "TRADE_DBA_NAME", "ACME"]),
                    row(&["123", "LOCAL_NAME", "Akme"]),
                    row(&["123", "NICKNAME", "Acmey"]),
                ],
            ),
        ),
        (
            "edm_entity_changes.txt",
            file(
                CHANGES_HEADER,
                &[row(&[
                    "123", "NAME", "2019-01-01", "Acme Old", "Acme Inc", "U", "", "1",
                ])],
            ),
        ),
        (
            "edm_entity_identifiers.txt",
            file(
                IDENTIFIERS_HEADER,
                &[row(&["123", "LEI", ACME_LEI]), row(&["123", "XYZ", "foo"])],
            ),
        ),
        ("README.txt", b"not an EDM file".to_vec()),
    ]
}

pub fn database_config(dir: &Path) -> DatabaseConfig {
    DatabaseConfig {
        data_dir: dir.join("data"),
        ..Default::default()
    }
}

pub struct Imported {
    pub dir: TempDir,
    pub database: Database,
    pub result: ImportResult<ImportSummary>,
}

pub async fn import_entries(entries: &[(&str, Vec<u8>)], import: ImportConfig) -> Imported {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(dir.path(), entries);
    let database = Database::create(&database_config(dir.path()), STORE_NAME)
        .await
        .unwrap();

    let result = ImportService::new(database.clone(), import).run(&archive).await;

    Imported {
        dir,
        database,
        result,
    }
}

pub async fn import_standard() -> Imported {
    import_entries(&standard_entries(), ImportConfig::default()).await
}

/// Map `factset_id` to its identity without loading an entity row for it
pub async fn insert_dangling_mapping(database: &Database, factset_id: &str) -> uuid::Uuid {
    let identity = edm_orgs::utils::entity_uuid(factset_id);
    sqlx::query("INSERT INTO uuid_to_fsid (uuid, factset_entity_id) VALUES (?, ?)")
        .bind(identity.to_string())
        .bind(factset_id)
        .execute(&database.pool())
        .await
        .unwrap();
    identity
}
