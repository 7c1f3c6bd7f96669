use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table name under the shared alias
pub const CRITIC_TABLE: &str = "critic";

/// Reviewer visible to every tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Critic {
    pub id: Uuid,
    pub name: String,
    pub publication: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCritic {
    pub name: String,
    #[serde(default)]
    pub publication: Option<String>,
}
