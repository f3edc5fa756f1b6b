use serde::{Deserialize, Serialize};

/// The failure taxonomy every external-service adapter normalizes into.
/// Workflow code classifies failures with a single `match` regardless of
/// which adapter produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum AdapterErrorKind {
    #[error("required credential or endpoint is unset")]
    ConfigMissing,
    #[error("credentials present but rejected")]
    Auth,
    #[error("rate limited by upstream")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned a 5xx")]
    Upstream5xx,
    #[error("upstream returned a non-auth 4xx")]
    Upstream4xx,
    #[error("response could not be parsed")]
    Parse,
    #[error("LLM output failed schema validation")]
    SchemaValidation,
    #[error("service billing limit reached")]
    Quota,
    #[error("unique-constraint violation outside the upsert path")]
    Duplicate,
    #[error("crawl too short to be useful")]
    Paywalled,
}

impl AdapterErrorKind {
    /// Only these kinds are worth a caller-side retry.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            AdapterErrorKind::RateLimited | AdapterErrorKind::Upstream5xx | AdapterErrorKind::Timeout
        )
    }

    /// True when the owning phase can degrade instead of failing outright
    /// (config missing on an optional adapter, KG sync, image gen).
    pub fn is_fatal_for_optional_phase(self) -> bool {
        !matches!(self, AdapterErrorKind::ConfigMissing)
    }
}

/// Every adapter call returns its payload (or error) alongside a
/// best-effort cost estimate, even on failure,.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterOutcome<T> {
    pub result: Result<T, AdapterErrorKind>,
    pub cost_usd: f64,
}

impl<T> AdapterOutcome<T> {
    pub fn ok(value: T, cost_usd: f64) -> Self {
        Self { result: Ok(value), cost_usd }
    }

    pub fn err(kind: AdapterErrorKind, cost_usd: f64) -> Self {
        Self { result: Err(kind), cost_usd }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("required input was empty: {0}")]
    EmptyInput(String),
    #[error(transparent)]
    Adapter(#[from] AdapterErrorKind),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_documented_kinds_retry() {
        let retryable: Vec<AdapterErrorKind> = [
            AdapterErrorKind::ConfigMissing,
            AdapterErrorKind::Auth,
            AdapterErrorKind::RateLimited,
            AdapterErrorKind::Timeout,
            AdapterErrorKind::Upstream5xx,
            AdapterErrorKind::Upstream4xx,
            AdapterErrorKind::Parse,
            AdapterErrorKind::SchemaValidation,
            AdapterErrorKind::Quota,
            AdapterErrorKind::Duplicate,
            AdapterErrorKind::Paywalled,
        ]
        .into_iter()
        .filter(|k| k.is_retryable())
        .collect();

        assert_eq!(
            retryable,
            vec![AdapterErrorKind::RateLimited, AdapterErrorKind::Upstream5xx, AdapterErrorKind::Timeout]
        );
    }
}
