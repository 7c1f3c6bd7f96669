use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a bulk write; `ids` follow the order of the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub message: String,
    pub count: usize,
    pub ids: Vec<Uuid>,
}

impl BulkResult {
    pub fn created(model: &str, ids: Vec<Uuid>) -> Self {
        Self {
            message: format!("Created multiple {}s in the database.", model),
            count: ids.len(),
            ids,
        }
    }

    pub fn upserted(model: &str, ids: Vec<Uuid>) -> Self {
        Self {
            message: format!("Created or updated multiple {}s in the database.", model),
            count: ids.len(),
            ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub message: String,
    pub count: u64,
}

impl DeleteResult {
    pub fn deleted(model: &str, count: u64) -> Self {
        let quantity = if count == 1 { "one".to_string() } else { count.to_string() };
        let noun = if count == 1 { model.to_string() } else { format!("{}s", model) };
        Self {
            message: format!("Deleted {} {} from the database.", quantity, noun),
            count,
        }
    }
}
