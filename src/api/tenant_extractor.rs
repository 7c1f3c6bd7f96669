use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::db::{validate_identifier, DbError};

pub const TENANT_HEADER: &str = "x-tenant-schema";

/// Which schema a request should be bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSelector {
    Shared,
    Tenant(String),
}

impl SchemaSelector {
    /// Schema name to hand to `DatabaseContext::with_session`
    pub fn schema_name<'a>(&'a self, shared_schema: &'a str) -> &'a str {
        match self {
            SchemaSelector::Shared => shared_schema,
            SchemaSelector::Tenant(name) => name,
        }
    }
}

/// Axum extractor for the tenant schema.
///
/// Reads the `X-Tenant-Schema` header. Requests without it are bound to the
/// shared schema; malformed schema names are rejected with 400.
#[async_trait]
impl<S> FromRequestParts<S> for SchemaSelector
where
    S: Send + Sync,
{
    type Rejection = DbError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match extract_header_value(&parts.headers, TENANT_HEADER) {
            Some(schema) => {
                validate_identifier(&schema)?;
                Ok(SchemaSelector::Tenant(schema))
            }
            None => Ok(SchemaSelector::Shared),
        }
    }
}

/// Extract header value as string
fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<SchemaSelector, DbError> {
        let mut builder = Request::builder().uri("/api/v1/book");
        if let Some(value) = header {
            builder = builder.header(TENANT_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SchemaSelector::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_tenant_header_extraction() {
        let selector = extract(Some("tenant_42")).await.unwrap();
        assert_eq!(selector, SchemaSelector::Tenant("tenant_42".to_string()));
        assert_eq!(selector.schema_name("shared"), "tenant_42");
    }

    #[tokio::test]
    async fn test_missing_header_selects_shared() {
        let selector = extract(None).await.unwrap();
        assert_eq!(selector, SchemaSelector::Shared);
        assert_eq!(selector.schema_name("shared"), "shared");

        assert_eq!(extract(Some("  ")).await.unwrap(), SchemaSelector::Shared);
    }

    #[tokio::test]
    async fn test_invalid_schema_is_rejected() {
        let err = extract(Some("tenant; DROP SCHEMA shared")).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidIdentifier(_)));
    }
}
