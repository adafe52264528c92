//! Well-known field and storage naming conventions.
//!
//! These constants are shared with the schema declaration: an entity opts
//! into soft delete by carrying the three metadata fields, and the draft
//! overlay for a storage name is addressed by a deterministic suffix.

/// Boolean flag set when a record is hidden.
pub const IS_DELETED: &str = "is_deleted";

/// Timestamp of the hide operation (microseconds since Unix epoch).
pub const DELETED_AT: &str = "deleted_at";

/// Actor that performed the hide operation.
pub const DELETED_BY: &str = "deleted_by";

/// Read-only display alias for [`IS_DELETED`], filter-equivalent to it.
pub const IS_DELETED_DISPLAY: &str = "is_deleted_display";

/// Draft overlay virtual key: `false` marks an unconfirmed (staged) row.
pub const IS_ACTIVE: &str = "is_active";

/// Virtual keys that belong to the draft overlay, never to the entity.
pub const DRAFT_VIRTUAL_KEYS: [&str; 3] = ["is_active", "has_active", "has_draft"];

/// Suffix of the overlay storage area for a committed storage name.
pub const DRAFTS_SUFFIX: &str = "_drafts";

/// Fallback actor identity when the request carries none.
pub const SYSTEM_ACTOR: &str = "system";

/// Overlay storage name for a committed storage name.
pub fn draft_storage_name(storage: &str) -> String {
    format!("{storage}{DRAFTS_SUFFIX}")
}

/// Whether a storage name addresses a draft overlay area.
pub fn is_draft_storage(storage: &str) -> bool {
    storage.ends_with(DRAFTS_SUFFIX)
}
