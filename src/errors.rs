use thiserror::Error;

/// Main error type for the quoting core.
///
/// Out-of-range skews and negative spreads are never errors: both calculators
/// clamp. Only an undefined conversion or a genuine overflow halts a call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A divisor was zero (a zero mid price, or a zero bucket level)
    #[error("Division by zero: {context}")]
    DivisionByZero { context: &'static str },

    /// Checked fixed-point arithmetic left the representable range
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    /// Bucket definition that cannot produce spread terms
    #[error("Invalid bucket: {0}")]
    InvalidBucket(String),

    /// Configuration value failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// TOML parse or serialization error
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Filesystem error while loading or writing a config file
    #[error("I/O error: {0}")]
    Io(String),
}

// Convenience constructors for common error patterns
impl Error {
    /// Create an overflow error tagged with the failing operation
    pub fn overflow(operation: &'static str) -> Self {
        Error::Overflow { operation }
    }

    /// Create a division-by-zero error with context
    pub fn division_by_zero(context: &'static str) -> Self {
        Error::DivisionByZero { context }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigParse(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::ConfigParse(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
