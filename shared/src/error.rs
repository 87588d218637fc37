use thiserror::Error;

use crate::{
    graphics::OutputError, models::config::ConfigurationError,
    networking::error::TransportError,
};

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum FraktError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type FraktResult<T> = Result<T, FraktError>;
