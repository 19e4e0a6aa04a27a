//! Demo binary error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}
