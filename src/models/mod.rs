use sqlx::{sqlite::SqliteRow, Row};
use std::fmt;

pub mod organisation;

pub use organisation::{AlternativeIdentifiers, Organisation, OrganisationType};

/// The five EDM files this system understands, one table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Entity,
    Structure,
    Names,
    Changes,
    Identifiers,
}

impl SourceTable {
    pub const ALL: [SourceTable; 5] = [
        SourceTable::Entity,
        SourceTable::Structure,
        SourceTable::Names,
        SourceTable::Changes,
        SourceTable::Identifiers,
    ];

    /// Match an archive entry name to its table
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.file_name() == name)
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SourceTable::Entity => "edm_entity.txt",
            SourceTable::Structure => "edm_entity_structure.txt",
            SourceTable::Names => "edm_entity_names.txt",
            SourceTable::Changes => "edm_entity_changes.txt",
            SourceTable::Identifiers => "edm_entity_identifiers.txt",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            SourceTable::Entity => "fs_entity",
            SourceTable::Structure => "fs_structure",
            SourceTable::Names => "fs_names",
            SourceTable::Changes => "fs_changes",
            SourceTable::Identifiers => "fs_identifiers",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row of one EDM table with an explicit column-to-field binding.
///
/// `COLUMNS` is the vendor's column order. `from_fields` consumes fields in
/// that order and `values` yields them back in that order, so the insert
/// statement never depends on struct layout.
pub trait SourceRecord: Sized + Send + 'static {
    const TABLE: SourceTable;
    const COLUMNS: &'static [&'static str];

    /// Build a record from a scanned row. Returns the number of fields found
    /// when it differs from `COLUMNS.len()`.
    fn from_fields(fields: Vec<String>) -> Result<Self, usize>;

    fn values(&self) -> Vec<&str>;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;

    fn insert_sql() -> String {
        let placeholders = vec!["?"; Self::COLUMNS.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::TABLE.table_name(),
            Self::COLUMNS.join(", "),
            placeholders
        )
    }

    fn select_by_entity_sql() -> String {
        format!(
            "SELECT {} FROM {} WHERE factset_entity_id = ? ORDER BY rowid",
            Self::COLUMNS.join(", "),
            Self::TABLE.table_name()
        )
    }
}

/// `edm_entity.txt`: one row per FactSet entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityRecord {
    pub factset_entity_id: String,
    pub entity_name: String,
    pub entity_proper_name: String,
    pub primary_sic_code: String,
    pub industry_code: String,
    pub sector_code: String,
    pub iso_country: String,
    pub metro_area: String,
    pub state_province: String,
    pub zip_postal_code: String,
    pub web_site: String,
    pub entity_type: String,
    pub entity_sub_type: String,
    pub year_founded: String,
    pub iso_country_incorp: String,
    pub iso_country_cor: String,
    pub nace_code: String,
}

impl SourceRecord for EntityRecord {
    const TABLE: SourceTable = SourceTable::Entity;
    const COLUMNS: &'static [&'static str] = &[
        "factset_entity_id",
        "entity_name",
        "entity_proper_name",
        "primary_sic_code",
        "industry_code",
        "sector_code",
        "iso_country",
        "metro_area",
        "state_province",
        "zip_postal_code",
        "web_site",
        "entity_type",
        "entity_sub_type",
        "year_founded",
        "iso_country_incorp",
        "iso_country_cor",
        "nace_code",
    ];

    fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let [factset_entity_id, entity_name, entity_proper_name, primary_sic_code, industry_code, sector_code, iso_country, metro_area, state_province, zip_postal_code, web_site, entity_type, entity_sub_type, year_founded, iso_country_incorp, iso_country_cor, nace_code]: [String; 17] =
            fields.try_into().map_err(|f: Vec<String>| f.len())?;

        Ok(Self {
            factset_entity_id,
            entity_name,
            entity_proper_name,
            primary_sic_code,
            industry_code,
            sector_code,
            iso_country,
            metro_area,
            state_province,
            zip_postal_code,
            web_site,
            entity_type,
            entity_sub_type,
            year_founded,
            iso_country_incorp,
            iso_country_cor,
            nace_code,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.factset_entity_id.as_str(),
            self.entity_name.as_str(),
            self.entity_proper_name.as_str(),
            self.primary_sic_code.as_str(),
            self.industry_code.as_str(),
            self.sector_code.as_str(),
            self.iso_country.as_str(),
            self.metro_area.as_str(),
            self.state_province.as_str(),
            self.zip_postal_code.as_str(),
            self.web_site.as_str(),
            self.entity_type.as_str(),
            self.entity_sub_type.as_str(),
            self.year_founded.as_str(),
            self.iso_country_incorp.as_str(),
            self.iso_country_cor.as_str(),
            self.nace_code.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            factset_entity_id: row.try_get("factset_entity_id")?,
            entity_name: row.try_get("entity_name")?,
            entity_proper_name: row.try_get("entity_proper_name")?,
            primary_sic_code: row.try_get("primary_sic_code")?,
            industry_code: row.try_get("industry_code")?,
            sector_code: row.try_get("sector_code")?,
            iso_country: row.try_get("iso_country")?,
            metro_area: row.try_get("metro_area")?,
            state_province: row.try_get("state_province")?,
            zip_postal_code: row.try_get("zip_postal_code")?,
            web_site: row.try_get("web_site")?,
            entity_type: row.try_get("entity_type")?,
            entity_sub_type: row.try_get("entity_sub_type")?,
            year_founded: row.try_get("year_founded")?,
            iso_country_incorp: row.try_get("iso_country_incorp")?,
            iso_country_cor: row.try_get("iso_country_cor")?,
            nace_code: row.try_get("nace_code")?,
        })
    }
}

/// `edm_entity_structure.txt`: parent and ultimate parent of an entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructureRecord {
    pub factset_entity_id: String,
    pub factset_parent_entity_id: String,
    pub factset_ultimate_parent_entity_id: String,
}

impl SourceRecord for StructureRecord {
    const TABLE: SourceTable = SourceTable::Structure;
    const COLUMNS: &'static [&'static str] = &[
        "factset_entity_id",
        "factset_parent_entity_id",
        "factset_ultimate_parent_entity_id",
    ];

    fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let [factset_entity_id, factset_parent_entity_id, factset_ultimate_parent_entity_id]: [String; 3] =
            fields.try_into().map_err(|f: Vec<String>| f.len())?;

        Ok(Self {
            factset_entity_id,
            factset_parent_entity_id,
            factset_ultimate_parent_entity_id,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.factset_entity_id.as_str(),
            self.factset_parent_entity_id.as_str(),
            self.factset_ultimate_parent_entity_id.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            factset_entity_id: row.try_get("factset_entity_id")?,
            factset_parent_entity_id: row.try_get("factset_parent_entity_id")?,
            factset_ultimate_parent_entity_id: row.try_get("factset_ultimate_parent_entity_id")?,
        })
    }
}

/// `edm_entity_names.txt`: zero or more typed names per entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameRecord {
    pub factset_entity_id: String,
    pub entity_name_type: String,
    pub entity_name_value: String,
}

impl SourceRecord for NameRecord {
    const TABLE: SourceTable = SourceTable::Names;
    const COLUMNS: &'static [&'static str] =
        &["factset_entity_id", "entity_name_type", "entity_name_value"];

    fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let [factset_entity_id, entity_name_type, entity_name_value]: [String; 3] =
            fields.try_into().map_err(|f: Vec<String>| f.len())?;

        Ok(Self {
            factset_entity_id,
            entity_name_type,
            entity_name_value,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.factset_entity_id.as_str(),
            self.entity_name_type.as_str(),
            self.entity_name_value.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            factset_entity_id: row.try_get("factset_entity_id")?,
            entity_name_type: row.try_get("entity_name_type")?,
            entity_name_value: row.try_get("entity_name_value")?,
        })
    }
}

/// `edm_entity_changes.txt`: audit trail of attribute changes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeRecord {
    pub factset_entity_id: String,
    pub change_type: String,
    pub change_date: String,
    pub old_value: String,
    pub new_value: String,
    pub audit_type: String,
    pub comments: String,
    pub audit_id: String,
}

impl SourceRecord for ChangeRecord {
    const TABLE: SourceTable = SourceTable::Changes;
    const COLUMNS: &'static [&'static str] = &[
        "factset_entity_id",
        "change_type",
        "change_date",
        "old_value",
        "new_value",
        "audit_type",
        "comments",
        "audit_id",
    ];

    fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let [factset_entity_id, change_type, change_date, old_value, new_value, audit_type, comments, audit_id]: [String; 8] =
            fields.try_into().map_err(|f: Vec<String>| f.len())?;

        Ok(Self {
            factset_entity_id,
            change_type,
            change_date,
            old_value,
            new_value,
            audit_type,
            comments,
            audit_id,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.factset_entity_id.as_str(),
            self.change_type.as_str(),
            self.change_date.as_str(),
            self.old_value.as_str(),
            self.new_value.as_str(),
            self.audit_type.as_str(),
            self.comments.as_str(),
            self.audit_id.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            factset_entity_id: row.try_get("factset_entity_id")?,
            change_type: row.try_get("change_type")?,
            change_date: row.try_get("change_date")?,
            old_value: row.try_get("old_value")?,
            new_value: row.try_get("new_value")?,
            audit_type: row.try_get("audit_type")?,
            comments: row.try_get("comments")?,
            audit_id: row.try_get("audit_id")?,
        })
    }
}

/// `edm_entity_identifiers.txt`: third-party identifiers per entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierRecord {
    pub factset_entity_id: String,
    pub entity_id_type: String,
    pub entity_id_value: String,
}

impl SourceRecord for IdentifierRecord {
    const TABLE: SourceTable = SourceTable::Identifiers;
    const COLUMNS: &'static [&'static str] =
        &["factset_entity_id", "entity_id_type", "entity_id_value"];

    fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let [factset_entity_id, entity_id_type, entity_id_value]: [String; 3] =
            fields.try_into().map_err(|f: Vec<String>| f.len())?;

        Ok(Self {
            factset_entity_id,
            entity_id_type,
            entity_id_value,
        })
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.factset_entity_id.as_str(),
            self.entity_id_type.as_str(),
            self.entity_id_value.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            factset_entity_id: row.try_get("factset_entity_id")?,
            entity_id_type: row.try_get("entity_id_type")?,
            entity_id_value: row.try_get("entity_id_value")?,
        })
    }
}
