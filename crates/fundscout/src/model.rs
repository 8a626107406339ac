//! Wire types for the recommendation backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Separator between a support record's type and topic
pub const TYPE_TOPIC_SEPARATOR: &str = " — ";

/// One matched fund, kept exactly as the backend sent it.
///
/// The object is never rebuilt from typed fields, so an exported fund is
/// byte-for-byte the JSON value that was received (numbers, `null`s and
/// unknown keys included). Display code goes through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fund(Map<String, Value>);

impl Fund {
  pub fn named(name: &str) -> Self {
    Self::default().with("fund_name", name)
  }

  /// Set `key` to `value`
  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.0.insert(key.to_string(), value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  /// The received object
  pub fn fields(&self) -> &Map<String, Value> {
    &self.0
  }

  /// `key` as display text; absent and `null` are `None`, numbers and
  /// booleans are printed as JSON
  pub fn text(&self, key: &str) -> Option<String> {
    self.get(key).filter(|value| !value.is_null()).map(scalar_text)
  }

  pub fn fund_name(&self) -> Option<String> {
    self.text("fund_name")
  }

  pub fn organization(&self) -> Option<String> {
    self.text("organization")
  }

  pub fn location(&self) -> Option<String> {
    self.text("location")
  }

  pub fn status(&self) -> Option<String> {
    self.text("status")
  }

  pub fn amount(&self) -> Option<String> {
    self.text("amount")
  }

  pub fn link(&self) -> Option<String> {
    self.text("link")
  }

  pub fn description(&self) -> Option<String> {
    self.text("description")
  }

  pub fn support_topic(&self) -> Option<SupportTopic> {
    self.get("support_type_and_topic").filter(|value| !value.is_null()).map(SupportTopic::from)
  }

  /// Normalized text of `support_type_and_topic`, empty when absent
  pub fn support_text(&self) -> String {
    self.support_topic().as_ref().map(SupportTopic::display_text).unwrap_or_default()
  }
}

impl From<Map<String, Value>> for Fund {
  fn from(fields: Map<String, Value>) -> Self {
    Self(fields)
  }
}

/// `support_type_and_topic` arrives in several shapes depending on how the
/// fund was scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportTopic {
  Text(String),
  List(Vec<SupportEntry>),
  Record(Map<String, Value>),
  Other(Value),
}

/// One item of a support list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportEntry {
  Text(String),
  Record(Map<String, Value>),
  Other(Value),
}

impl From<&Value> for SupportTopic {
  fn from(value: &Value) -> Self {
    serde_json::from_value(value.clone()).unwrap_or_else(|_| SupportTopic::Other(value.clone()))
  }
}

impl SupportTopic {
  pub fn display_text(&self) -> String {
    match self {
      SupportTopic::Text(text) => text.clone(),
      SupportTopic::List(entries) => entries
        .iter()
        .map(SupportEntry::display_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("; "),
      SupportTopic::Record(record) => record_text(record),
      SupportTopic::Other(value) => scalar_text(value),
    }
  }
}

impl SupportEntry {
  pub fn display_text(&self) -> String {
    match self {
      SupportEntry::Text(text) => text.clone(),
      SupportEntry::Record(record) => record_text(record),
      SupportEntry::Other(value) => scalar_text(value),
    }
  }
}

/// `type — topic`, or the raw JSON when neither key yields any text
fn record_text(record: &Map<String, Value>) -> String {
  let joined = format!(
    "{}{TYPE_TOPIC_SEPARATOR}{}",
    scalar_text(record.get("type").unwrap_or(&Value::Null)).trim(),
    scalar_text(record.get("topic").unwrap_or(&Value::Null)).trim()
  );
  let trimmed = joined.trim_matches(|c| c == ' ' || c == '—');

  if trimmed.is_empty() {
    Value::Object(record.clone()).to_string()
  } else {
    trimmed.to_string()
  }
}

fn scalar_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

/// The last successful `/submit` answer, as cached by the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
  #[serde(default, deserialize_with = "text")]
  pub llm_summary: String,
  #[serde(default)]
  pub recommended_funds: Vec<Fund>,
}

impl RecommendationResult {
  /// True when there is a summary or at least one fund to show
  pub fn has_content(&self) -> bool {
    !self.llm_summary.trim().is_empty() || !self.recommended_funds.is_empty()
  }
}

/// Body of a `/submit` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
  #[serde(default, deserialize_with = "optional_text")]
  pub status: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub llm_summary: Option<String>,
  #[serde(default)]
  pub recommended_funds: Option<Vec<Fund>>,
  #[serde(default)]
  pub error: Option<Value>,
}

impl From<SubmitResponse> for RecommendationResult {
  fn from(response: SubmitResponse) -> Self {
    Self {
      llm_summary: response.llm_summary.unwrap_or_default(),
      recommended_funds: response.recommended_funds.unwrap_or_default(),
    }
  }
}

/// Accepts strings, numbers and booleans; `null` becomes `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(Value::Null) => None,
    Some(value) => Some(scalar_text(&value)),
  })
}

/// Like [`optional_text`], with `null` read as an empty string
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  optional_text(deserializer).map(Option::unwrap_or_default)
}
