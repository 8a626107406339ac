//! Response classification shared by the submit and export flows

use bytes::Bytes;
use serde_json::Value;

/// Raw body characters kept for diagnostics
pub const SNIPPET_LIMIT: usize = 200;

const PDF_MIME: &str = "application/pdf";

/// What came back over the wire, before any interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
  pub status: u16,
  pub content_type: Option<String>,
  pub body: Bytes,
}

/// A response body sorted by its declared content type. Each flow decides
/// which variants it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
  Json(Value),
  /// An `application/pdf` document
  Binary(Bytes),
  /// Wrong content type, or JSON that does not parse. Carries a body prefix.
  Unexpected { content_type: Option<String>, snippet: String },
}

impl RawResponse {
  pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
    Self { status, content_type: content_type.map(str::to_string), body: body.into() }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Lower-cased media type without parameters, e.g. `application/json`
  pub fn mime(&self) -> Option<String> {
    self
      .content_type
      .as_deref()
      .and_then(|value| value.split(';').next())
      .map(|essence| essence.trim().to_ascii_lowercase())
      .filter(|essence| !essence.is_empty())
  }

  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.body).into_owned()
  }

  /// First [`SNIPPET_LIMIT`] characters of the body
  pub fn snippet(&self) -> String {
    self.text().chars().take(SNIPPET_LIMIT).collect()
  }

  /// The `error` field of a JSON body, if the body has one
  pub fn error_field(&self) -> Option<String> {
    let value: Value = serde_json::from_slice(&self.body).ok()?;
    match value.get("error")? {
      Value::String(message) if !message.trim().is_empty() => Some(message.trim().to_string()),
      Value::Object(details) => {
        details.get("message").and_then(Value::as_str).map(|message| message.trim().to_string())
      }
      _ => None,
    }
  }
}

fn is_json_mime(mime: &str) -> bool {
  mime == "application/json" || mime.ends_with("+json")
}

/// Sort a response body by content type alone
pub fn classify(response: &RawResponse) -> Classified {
  let unexpected = || Classified::Unexpected {
    content_type: response.content_type.clone(),
    snippet: response.snippet(),
  };

  match response.mime().as_deref() {
    Some(mime) if is_json_mime(mime) => match serde_json::from_slice(&response.body) {
      Ok(value) => Classified::Json(value),
      Err(_) => unexpected(),
    },
    Some(PDF_MIME) => Classified::Binary(response.body.clone()),
    _ => unexpected(),
  }
}
