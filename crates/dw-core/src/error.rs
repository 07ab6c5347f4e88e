use thiserror::Error;

/// The main error type for dw-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Request signing error
  #[error("Signing error: {0}")]
  Signing(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// Request did not complete within the configured timeout
  #[error("Request timed out: {0}")]
  Timeout(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// Filesystem error
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Result type alias for dw-* crates
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display() {
    let err = Error::Timeout("OKX after 15000ms".to_string());
    assert_eq!(err.to_string(), "Request timed out: OKX after 15000ms");

    let err = Error::Config("Invalid API_TIMEOUT".to_string());
    assert!(err.to_string().contains("API_TIMEOUT"));
  }

  #[test]
  fn test_error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err = Error::from(io_err);
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("read-only"));
  }
}
