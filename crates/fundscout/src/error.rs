use thiserror::Error;

/// Why a submit or export flow stopped.
///
/// Every variant is caught at the flow boundary and shown through the view;
/// callers get the same value back for exit codes and tests.
#[derive(Debug, Error)]
pub enum FormError {
  /// Bad client input. Never sent over the network.
  #[error("{0}")]
  Validation(String),

  /// Non-2xx response from the backend
  #[error("{message}")]
  Server { status: u16, message: String },

  /// The body did not have the content type the flow expects
  #[error("{message}: {snippet}")]
  Protocol { message: String, snippet: String },

  /// The request could not complete
  #[error("Network error: {0}")]
  Network(String),

  /// The view could not hand the exported document to the user
  #[error("Download failed: {0}")]
  Download(String),
}

impl FormError {
  pub fn validation(message: impl Into<String>) -> Self {
    FormError::Validation(message.into())
  }

  /// Short machine-friendly name of the variant
  pub fn kind(&self) -> &'static str {
    match self {
      FormError::Validation(_) => "validation",
      FormError::Server { .. } => "server",
      FormError::Protocol { .. } => "protocol",
      FormError::Network(_) => "network",
      FormError::Download(_) => "download",
    }
  }
}

impl From<reqwest::Error> for FormError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      FormError::Network(format!("request timed out: {err}"))
    } else if err.is_connect() {
      FormError::Network(format!("could not reach server: {err}"))
    } else {
      FormError::Network(err.to_string())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_protocol_error_display_includes_snippet() {
    let err = FormError::Protocol {
      message: "Expected JSON but received text/html".to_string(),
      snippet: "<!DOCTYPE html>".to_string(),
    };
    assert_eq!(err.to_string(), "Expected JSON but received text/html: <!DOCTYPE html>");
    assert_eq!(err.kind(), "protocol");
  }

  #[test]
  fn test_server_error_display_is_message_only() {
    let err = FormError::Server { status: 400, message: "Missing required field: currency".into() };
    assert_eq!(err.to_string(), "Missing required field: currency");
  }
}
