//! Canonical organisation representation served by the transformer API.
//!
//! The classification and dispatch rules that turn EDM rows into an
//! [`Organisation`] live here as plain methods so they can be exercised
//! without a database.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{EntityRecord, IdentifierRecord, NameRecord, StructureRecord};
use crate::utils::{classification_uuid, entity_uuid};

/// Entity type code of publicly listed companies
pub const PUBLIC_COMPANY_CODE: &str = "PUB";
/// Entity type code of extinct entities; currently classified like any other
/// non-public entity
pub const EXTINCT_CODE: &str = "EXT";
/// Identifier type carrying the Legal Entity Identifier
pub const LEI_IDENTIFIER_TYPE: &str = "LEI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganisationType {
    PublicCompany,
    Organisation,
}

impl OrganisationType {
    pub fn from_entity_type(code: &str) -> Self {
        match code {
            PUBLIC_COMPANY_CODE => OrganisationType::PublicCompany,
            EXTINCT_CODE => OrganisationType::Organisation,
            _ => OrganisationType::Organisation,
        }
    }
}

/// Name types of `edm_entity_names.txt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameType {
    Former,
    Short,
    Legal,
    TradeDba,
    Local,
}

impl NameType {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "FORMER_NAME" => Some(NameType::Former),
            "SHORT_NAME" => Some(NameType::Short),
            "LEGAL_NAME" => Some(NameType::Legal),
            "TRADE_DBA_NAME" => Some(NameType::TradeDba),
            "LOCAL_NAME" => Some(NameType::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeIdentifiers {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uuids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub factset_identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lei_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub kind: OrganisationType,
    pub proper_name: String,
    pub pref_label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub legal_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hidden_label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trade_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub former_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_classification: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_organisation: Option<Uuid>,
    pub alternative_identifiers: AlternativeIdentifiers,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_of_incorporation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub year_founded: String,
}

impl Organisation {
    /// Start an organisation from its entity row. `uuid` is the identity the
    /// entity was looked up by.
    pub fn from_entity(uuid: Uuid, entity: &EntityRecord) -> Self {
        let industry_classification = if entity.industry_code.is_empty() {
            None
        } else {
            Some(classification_uuid(&entity.industry_code))
        };

        Self {
            uuid,
            kind: OrganisationType::from_entity_type(&entity.entity_type),
            proper_name: entity.entity_proper_name.clone(),
            pref_label: entity.entity_proper_name.clone(),
            legal_name: String::new(),
            short_name: String::new(),
            hidden_label: entity.entity_name.clone(),
            trade_names: Vec::new(),
            local_names: Vec::new(),
            former_names: Vec::new(),
            industry_classification,
            parent_organisation: None,
            alternative_identifiers: AlternativeIdentifiers {
                uuids: vec![uuid],
                factset_identifier: entity.factset_entity_id.clone(),
                lei_code: String::new(),
            },
            postal_code: entity.zip_postal_code.clone(),
            country_code: entity.iso_country.clone(),
            country_of_incorporation: entity.iso_country_incorp.clone(),
            year_founded: entity.year_founded.clone(),
        }
    }

    /// Point at the parent's derived identity. The parent does not have to be
    /// loaded: its identity is a pure function of its FactSet id.
    pub fn apply_structure(&mut self, structure: &StructureRecord) {
        if !structure.factset_parent_entity_id.is_empty() {
            self.parent_organisation = Some(entity_uuid(&structure.factset_parent_entity_id));
        }
    }

    /// Scalar names are last-wins, list names keep row order and duplicates.
    pub fn apply_name(&mut self, name: &NameRecord) {
        let value = name.entity_name_value.clone();
        match NameType::parse(&name.entity_name_type) {
            Some(NameType::Former) => self.former_names.push(value),
            Some(NameType::Short) => self.short_name = value,
            Some(NameType::Legal) => self.legal_name = value,
            Some(NameType::TradeDba) => self.trade_names.push(value),
            Some(NameType::Local) => self.local_names.push(value),
            None => warn!(
                "Unknown name type {} for {} - skipping",
                name.entity_name_type, name.factset_entity_id
            ),
        }
    }

    pub fn apply_identifier(&mut self, identifier: &IdentifierRecord) {
        match identifier.entity_id_type.as_str() {
            LEI_IDENTIFIER_TYPE => {
                self.alternative_identifiers.lei_code = identifier.entity_id_value.clone()
            }
            other => warn!(
                "Unknown identifier type {} for {} - skipping",
                other, identifier.factset_entity_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entity(id: &str, entity_type: &str, proper_name: &str) -> EntityRecord {
        EntityRecord {
            factset_entity_id: id.to_string(),
            entity_type: entity_type.to_string(),
            entity_proper_name: proper_name.to_string(),
            ..Default::default()
        }
    }

    fn name(tag: &str, value: &str) -> NameRecord {
        NameRecord {
            factset_entity_id: "123".to_string(),
            entity_name_type: tag.to_string(),
            entity_name_value: value.to_string(),
        }
    }

    #[test]
    fn test_entity_type_classification() {
        assert_eq!(
            OrganisationType::from_entity_type("PUB"),
            OrganisationType::PublicCompany
        );
        assert_eq!(
            OrganisationType::from_entity_type("EXT"),
            OrganisationType::Organisation
        );
        assert_eq!(
            OrganisationType::from_entity_type("PVT"),
            OrganisationType::Organisation
        );
        assert_eq!(
            OrganisationType::from_entity_type(""),
            OrganisationType::Organisation
        );
    }

    #[test]
    fn test_from_entity_copies_attributes() {
        let uuid = entity_uuid("123");
        let mut record = entity("123", "PUB", "Acme Inc");
        record.entity_name = "ACME INC".to_string();
        record.zip_postal_code = "10001".to_string();
        record.iso_country = "US".to_string();
        record.iso_country_incorp = "US".to_string();
        record.year_founded = "1901".to_string();
        record.industry_code = "4100".to_string();

        let org = Organisation::from_entity(uuid, &record);

        assert_eq!(org.kind, OrganisationType::PublicCompany);
        assert_eq!(org.proper_name, "Acme Inc");
        assert_eq!(org.pref_label, "Acme Inc");
        assert_eq!(org.hidden_label, "ACME INC");
        assert_eq!(org.postal_code, "10001");
        assert_eq!(org.country_code, "US");
        assert_eq!(org.country_of_incorporation, "US");
        assert_eq!(org.year_founded, "1901");
        assert_eq!(org.industry_classification, Some(classification_uuid("4100")));
        assert_eq!(org.alternative_identifiers.uuids, vec![uuid]);
        assert_eq!(org.alternative_identifiers.factset_identifier, "123");
    }

    #[test]
    fn test_empty_industry_code_has_no_classification() {
        let org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PVT", "Acme"));
        assert_eq!(org.industry_classification, None);
    }

    #[test]
    fn test_name_dispatch() {
        let mut org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PUB", "Acme"));
        for record in [
            name("LEGAL_NAME", "Acme Incorporated"),
            name("TRADE_DBA_NAME", "Acme"),
            name("TRADE_DBA_NAME", "ACME"),
            name("FORMER_NAME", "Acme Widgets"),
            name("FORMER_NAME", "Acme Widgets"),
            name("SHORT_NAME", "Acme Co"),
            name("SHORT_NAME", "Acme"),
            name("LOCAL_NAME", "Acmé"),
            name("NICKNAME", "Roadrunner's Bane"),
        ] {
            org.apply_name(&record);
        }

        assert_eq!(org.legal_name, "Acme Incorporated");
        assert_eq!(org.trade_names, vec!["Acme", "ACME"]);
        assert_eq!(org.former_names, vec!["Acme Widgets", "Acme Widgets"]);
        assert_eq!(org.short_name, "Acme");
        assert_eq!(org.local_names, vec!["Acmé"]);
    }

    #[test]
    fn test_structure_parent_is_derived() {
        let mut org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PUB", "Acme"));
        org.apply_structure(&StructureRecord {
            factset_entity_id: "123".to_string(),
            factset_parent_entity_id: "456".to_string(),
            factset_ultimate_parent_entity_id: String::new(),
        });
        assert_eq!(org.parent_organisation, Some(entity_uuid("456")));

        let mut orphan = Organisation::from_entity(entity_uuid("789"), &entity("789", "PUB", "Orphan"));
        orphan.apply_structure(&StructureRecord {
            factset_entity_id: "789".to_string(),
            ..Default::default()
        });
        assert_eq!(orphan.parent_organisation, None);
    }

    #[test]
    fn test_identifier_dispatch() {
        let mut org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PUB", "Acme"));
        org.apply_identifier(&IdentifierRecord {
            factset_entity_id: "123".to_string(),
            entity_id_type: "XYZ".to_string(),
            entity_id_value: "foo".to_string(),
        });
        assert!(org.alternative_identifiers.lei_code.is_empty());

        for lei in ["5493001KJTIIGC8Y1R12", "529900T8BM49AURSDO55"] {
            org.apply_identifier(&IdentifierRecord {
                factset_entity_id: "123".to_string(),
                entity_id_type: "LEI".to_string(),
                entity_id_value: lei.to_string(),
            });
        }
        assert_eq!(org.alternative_identifiers.lei_code, "529900T8BM49AURSDO55");
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PUB", "Acme Inc"));
        let value: Value = serde_json::to_value(&org).unwrap();

        assert_eq!(
            value,
            json!({
                "uuid": "be4eca7a-2cd2-33fa-a1d7-4a3c963a407f",
                "type": "PublicCompany",
                "properName": "Acme Inc",
                "prefLabel": "Acme Inc",
                "alternativeIdentifiers": {
                    "uuids": ["be4eca7a-2cd2-33fa-a1d7-4a3c963a407f"],
                    "factsetIdentifier": "123"
                }
            })
        );
    }

    #[test]
    fn test_serialization_field_names() {
        let mut org = Organisation::from_entity(entity_uuid("123"), &entity("123", "PVT", "Acme"));
        org.apply_name(&name("TRADE_DBA_NAME", "Acme"));
        org.apply_structure(&StructureRecord {
            factset_entity_id: "123".to_string(),
            factset_parent_entity_id: "456".to_string(),
            factset_ultimate_parent_entity_id: String::new(),
        });
        org.apply_identifier(&IdentifierRecord {
            factset_entity_id: "123".to_string(),
            entity_id_type: "LEI".to_string(),
            entity_id_value: "LEI123".to_string(),
        });

        let value: Value = serde_json::to_value(&org).unwrap();
        assert_eq!(value["type"], "Organisation");
        assert_eq!(value["tradeNames"], json!(["Acme"]));
        assert_eq!(
            value["parentOrganisation"],
            "158fe2ec-fd04-3d84-9b4d-cef1870ea9a0"
        );
        assert_eq!(value["alternativeIdentifiers"]["leiCode"], "LEI123");

        let back: Organisation = serde_json::from_value(value).unwrap();
        assert_eq!(back, org);
    }
}
