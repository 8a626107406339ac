//! Payload Builder: turns the on-screen form into a request body

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::FormError;
use crate::model::{text, Fund};

/// Largest integer an `f64` holds exactly; bigger amounts stay floats on the wire
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Raw form state, exactly as the user typed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
  #[serde(deserialize_with = "text")]
  pub project_title: String,
  #[serde(deserialize_with = "text")]
  pub project_location: String,
  #[serde(deserialize_with = "text")]
  pub project_type: String,
  #[serde(deserialize_with = "text")]
  pub project_desc: String,
  #[serde(deserialize_with = "text")]
  pub project_stage: String,
  #[serde(deserialize_with = "text")]
  pub currency: String,
  #[serde(deserialize_with = "text")]
  pub amount_requested: String,
  /// Values of the checked `support_needed` checkboxes
  pub support_needed: Vec<String>,
}

/// Validated application, built fresh for every submit and export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPayload {
  pub project_title: String,
  pub project_location: String,
  pub project_type: String,
  pub project_desc: String,
  pub project_stage: String,
  pub currency: String,
  #[serde(serialize_with = "serialize_amount")]
  pub amount_requested: f64,
  pub support_needed: BTreeSet<String>,
}

/// `/export_pdf` body: the application plus the results the user was shown
#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
  #[serde(flatten)]
  pub application: ApplicationPayload,
  pub llm_summary: &'a str,
  pub recommended_funds: &'a [Fund],
}

/// Validate `form` and build the payload. Fails before any request is made.
pub fn build_payload(form: &FormState) -> Result<ApplicationPayload, FormError> {
  let project_title = required("project_title", &form.project_title)?;
  let project_location = required("project_location", &form.project_location)?;
  let project_type = required("project_type", &form.project_type)?;
  let project_desc = required("project_desc", &form.project_desc)?;
  let project_stage = required("project_stage", &form.project_stage)?;
  let amount_requested = parse_amount(&form.amount_requested)?;
  let currency = required("currency", &form.currency)?;

  let support_needed: BTreeSet<String> = form
    .support_needed
    .iter()
    .map(|value| value.trim())
    .filter(|value| !value.is_empty())
    .map(str::to_string)
    .collect();
  if support_needed.is_empty() {
    return Err(missing("support_needed"));
  }

  Ok(ApplicationPayload {
    project_title,
    project_location,
    project_type,
    project_desc,
    project_stage,
    currency,
    amount_requested,
    support_needed,
  })
}

/// Parse the amount field: a finite number, zero or more
pub fn parse_amount(raw: &str) -> Result<f64, FormError> {
  let raw = raw.trim();
  let invalid = || {
    FormError::validation(format!(
      "Amount requested must be a non-negative number (got {:?})",
      raw
    ))
  };

  if raw.is_empty() {
    return Err(FormError::validation("Amount requested must be a non-negative number"));
  }

  let amount: f64 = raw.parse().map_err(|_| invalid())?;
  if !amount.is_finite() || amount < 0.0 {
    return Err(invalid());
  }

  // -0 parses fine but should not leak onto the wire
  Ok(amount.abs())
}

fn required(field: &str, value: &str) -> Result<String, FormError> {
  let value = value.trim();
  if value.is_empty() {
    Err(missing(field))
  } else {
    Ok(value.to_string())
  }
}

fn missing(field: &str) -> FormError {
  FormError::validation(format!("Missing required field: {field}"))
}

/// Whole amounts go out as integers, the way a browser would send them
fn serialize_amount<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  if amount.fract() == 0.0 && amount.abs() <= MAX_EXACT_INTEGER {
    serializer.serialize_i64(*amount as i64)
  } else {
    serializer.serialize_f64(*amount)
  }
}
