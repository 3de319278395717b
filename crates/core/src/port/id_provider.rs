// ID Provider Port

/// Item-ID source (allows fixed IDs in tests).
///
/// IDs only ever appear in logs and wire responses; the queue itself is
/// positional and never looks an item up by ID.
pub trait IdProvider: Send + Sync {
    /// Generate a unique ID for a newly admitted item
    fn generate_id(&self) -> String;
}

/// UUID v4 source (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
