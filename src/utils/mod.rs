pub mod deterministic_uuid;

pub use deterministic_uuid::{classification_uuid, entity_uuid, namespaced_uuid, NAMESPACE};
