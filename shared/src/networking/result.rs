use super::error::TransportError;

pub type TransportResult<T> = Result<T, TransportError>;
