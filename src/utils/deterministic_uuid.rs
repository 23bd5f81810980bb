//! Deterministic UUID Generation
//!
//! Every identity the system hands out is a version-3 UUID derived from the
//! nil namespace. The same inputs always produce the same UUID, across runs
//! and across processes, which is what lets the lookup side compute a parent
//! organisation's identity without it ever being stored.
//!
//! Two derivations exist and must never be swapped:
//!
//! - [`entity_uuid`] hashes the MD5 digest of the natural key, not the key
//!   itself.
//! - [`classification_uuid`] hashes the raw industry code bytes.

use uuid::Uuid;

/// The all-zero namespace shared by every derivation.
pub const NAMESPACE: Uuid = Uuid::nil();

/// Name-based (MD5, version 3) UUID of `input` within `namespace`.
pub fn namespaced_uuid(namespace: &Uuid, input: &[u8]) -> Uuid {
    Uuid::new_v3(namespace, input)
}

/// Stable identity of an entity, derived from its FactSet entity id.
///
/// # Examples
///
/// ```rust
/// use edm_orgs::utils::entity_uuid;
///
/// let parent = entity_uuid("000C7F-E");
/// assert_eq!(parent, entity_uuid("000C7F-E"));
/// ```
pub fn entity_uuid(factset_id: &str) -> Uuid {
    let digest = md5::compute(factset_id.as_bytes());
    namespaced_uuid(&NAMESPACE, &digest.0)
}

/// Identity of an industry classification code.
pub fn classification_uuid(industry_code: &str) -> Uuid {
    namespaced_uuid(&NAMESPACE, industry_code.as_bytes())
}
