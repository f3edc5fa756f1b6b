//! Durable workflow orchestration, one module per workflow.

pub mod article;
pub mod company_profile;
pub mod country_guide;
pub mod deps;
pub mod news_monitor;
pub mod retry;
pub mod segment_video;
pub mod topic_cluster;
pub mod types;

pub use deps::PipelineDeps;

/// Bridges `serde::{Serialize, Deserialize}` to the Restate SDK's custom
/// serialization traits without needing the `Json<>` wrapper.
#[macro_export]
macro_rules! impl_restate_serde {
    ($type:ty) => {
        impl restate_sdk::serde::Serialize for $type {
            type Error = serde_json::Error;

            fn serialize(&self) -> Result<bytes::Bytes, Self::Error> {
                serde_json::to_vec(self).map(bytes::Bytes::from)
            }
        }

        impl restate_sdk::serde::Deserialize for $type {
            type Error = serde_json::Error;

            fn deserialize(bytes: &mut bytes::Bytes) -> Result<Self, Self::Error> {
                serde_json::from_slice(bytes)
            }
        }

        impl restate_sdk::serde::PayloadMetadata for $type {}
    };
}

/// Implements the Restate SDK serialization traits for `Vec<T>` (needed
/// because the blanket serde bridge above can't cover foreign `Vec<T>`).
#[macro_export]
macro_rules! impl_restate_serde_vec {
    ($type:ty) => {
        impl restate_sdk::serde::Serialize for Vec<$type> {
            type Error = serde_json::Error;

            fn serialize(&self) -> Result<bytes::Bytes, Self::Error> {
                serde_json::to_vec(self).map(bytes::Bytes::from)
            }
        }

        impl restate_sdk::serde::Deserialize for Vec<$type> {
            type Error = serde_json::Error;

            fn deserialize(bytes: &mut bytes::Bytes) -> Result<Self, Self::Error> {
                serde_json::from_slice(bytes)
            }
        }

        impl restate_sdk::serde::PayloadMetadata for Vec<$type> {}
    };
}

/// Reads the `"status"` key from Restate workflow state, defaulting to
/// `"pending"` for a freshly-started invocation. Every workflow's
/// `get_status` shared handler delegates here.
pub async fn read_workflow_status(ctx: &restate_sdk::prelude::SharedWorkflowContext<'_>) -> Result<String, restate_sdk::prelude::HandlerError> {
    use restate_sdk::context::ContextReadState;
    Ok(ctx.get::<String>("status").await?.unwrap_or_else(|| "pending".to_string()))
}
