//! Async metadata providers injected by the host.
//!
//! The engines never fetch anything themselves: fields, sources, and
//! enrichment policies are supplied through this trait. Each suggestion or
//! quick-fix request works from a single snapshot of provider responses;
//! results from different requests are never merged.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// A field visible at some pipeline position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDescriptor {
    pub name: String,
    #[serde(rename = "sourceIndices")]
    pub source_indices: Vec<String>,
    #[serde(rename = "matchField")]
    pub match_field: String,
    #[serde(rename = "enrichFields")]
    pub enrich_fields: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait ResourceCallbacks {
    /// Fields effective after executing `query_prefix` (the pipeline
    /// restricted to the stages before the position of interest). A stage
    /// that re-declares fields hides the upstream schema from later stages.
    async fn get_fields_for(&self, query_prefix: &str) -> CoreResult<Vec<FieldDescriptor>>;

    async fn get_sources(&self) -> CoreResult<Vec<SourceDescriptor>>;

    async fn get_policies(&self) -> CoreResult<Vec<PolicyDescriptor>>;
}

/// Fixed in-memory provider, for hosts with a static schema and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCallbacks {
    pub fields: Vec<FieldDescriptor>,
    pub sources: Vec<SourceDescriptor>,
    pub policies: Vec<PolicyDescriptor>,
}

impl ResourceCallbacks for StaticCallbacks {
    async fn get_fields_for(&self, _query_prefix: &str) -> CoreResult<Vec<FieldDescriptor>> {
        Ok(self.fields.clone())
    }

    async fn get_sources(&self) -> CoreResult<Vec<SourceDescriptor>> {
        Ok(self.sources.clone())
    }

    async fn get_policies(&self) -> CoreResult<Vec<PolicyDescriptor>> {
        Ok(self.policies.clone())
    }
}
