use serde::{Deserialize, Serialize};

use crate::db::DbError;

/// PostgreSQL truncates identifiers longer than this
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Abstract namespace a table is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaAlias {
    Tenant,
    Shared,
}

/// Concrete schema each alias resolves to for one session.
///
/// `None` means no remapping: tables under that alias are rendered
/// unqualified and resolve through the connection's `search_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBinding {
    pub tenant: Option<String>,
    pub shared: Option<String>,
}

impl SchemaBinding {
    pub fn schema_for(&self, alias: SchemaAlias) -> Option<&str> {
        match alias {
            SchemaAlias::Tenant => self.tenant.as_deref(),
            SchemaAlias::Shared => self.shared.as_deref(),
        }
    }

    /// Quoted, schema-qualified table name for use in SQL text
    pub fn table(&self, alias: SchemaAlias, table: &str) -> String {
        match self.schema_for(alias) {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(table)),
            None => quote_ident(table),
        }
    }
}

/// Map a schema name to the binding a session should use.
///
/// The shared schema disables tenant tables and keeps shared tables in place;
/// any other name points tenant tables at that schema and unqualifies shared ones.
pub fn resolve_context(schema_name: &str, shared_schema: &str) -> SchemaBinding {
    if schema_name == shared_schema {
        SchemaBinding {
            tenant: None,
            shared: Some(shared_schema.to_string()),
        }
    } else {
        SchemaBinding {
            tenant: Some(schema_name.to_string()),
            shared: None,
        }
    }
}

/// Accept only lowercase `[a-z_][a-z0-9_]*` names that fit in an identifier
pub fn validate_identifier(name: &str) -> Result<(), DbError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

/// Database names are always quoted, so any non-empty name without NUL that
/// fits in an identifier is accepted, including mixed case and dashes
pub fn validate_database_name(name: &str) -> Result<(), DbError> {
    if !name.is_empty() && !name.contains('\0') && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(DbError::InvalidIdentifier(name.to_string()))
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
