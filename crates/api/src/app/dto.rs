use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use admindeck_core::{DomainError, DomainResult, PostId, TestId};

use crate::rpc::RpcError;

/// Deserialize a procedure's JSON input, reporting schema mismatches
/// (including malformed UUIDs) as a client error.
pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, RpcError> {
    serde_json::from_value(input).map_err(|e| RpcError::bad_request(format!("Invalid input: {e}")))
}

/// Treat empty/whitespace descriptions as absent, like the dashboard UI does.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreatePostInput {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty(&self.title, "Title is required")
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostInput {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdatePostInput {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty(&self.title, "Title is required")
    }
}

#[derive(Debug, Deserialize)]
pub struct DeletePostInput {
    pub id: PostId,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTestInput {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty(&self.name, "Name is required")
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTestInput {
    pub id: TestId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateTestInput {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty(&self.name, "Name is required")
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteTestInput {
    pub id: TestId,
}

fn require_non_empty(value: &str, message: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        Err(DomainError::validation(message))
    } else {
        Ok(())
    }
}
