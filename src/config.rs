//! Engine configuration: the two knobs validated at the library boundary.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("buffer_capacity must be positive, got {0}")]
    NonPositiveBufferCapacity(usize),
}

/// `{symbol, buffer_capacity}` — the only configuration the core takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub symbol: String,
    pub buffer_capacity: usize,
}

impl EngineConfig {
    pub fn new(symbol: impl Into<String>, buffer_capacity: usize) -> Result<Self, ConfigError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if buffer_capacity == 0 {
            return Err(ConfigError::NonPositiveBufferCapacity(buffer_capacity));
        }
        Ok(Self { symbol, buffer_capacity })
    }
}
