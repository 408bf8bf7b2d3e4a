//! Render-time error classification.
//!
//! Load-time failures live in `data::DataError` and abort startup; everything
//! here only aborts the render cycle that raised it.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Which party has to act to fix a render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Data,
    ExternalService,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationIssue {
    #[error("view `{view}` needs column `{column}`, which is not in the loaded table")]
    MissingColumn {
        view: &'static str,
        column: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationIssue),
    #[error("Data error: {0}")]
    Data(#[from] PolarsError),
    #[error("Map tile service error: {0}")]
    ExternalService(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Configuration(_) => ErrorKind::Configuration,
            RenderError::Data(_) | RenderError::Export(_) => ErrorKind::Data,
            RenderError::ExternalService(_) => ErrorKind::ExternalService,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let missing = RenderError::from(ConfigurationIssue::MissingColumn {
            view: "Offence",
            column: "offence",
        });
        assert_eq!(missing.kind(), ErrorKind::Configuration);
        assert!(missing.to_string().contains("`offence`"));

        let tiles = RenderError::ExternalService("token rejected".into());
        assert_eq!(tiles.kind(), ErrorKind::ExternalService);
    }
}
