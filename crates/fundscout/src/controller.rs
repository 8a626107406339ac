//! Form Controller: the one submit / render / export flow

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoints;
use crate::error::FormError;
use crate::model::{RecommendationResult, SubmitResponse};
use crate::payload::{build_payload, ApplicationPayload, ExportRequest};
use crate::progress::{self, ProgressSettings, ProgressTicker};
use crate::render::{render, NO_RESULTS};
use crate::response::{classify, Classified, RawResponse};
use crate::transport::Transport;
use crate::view::View;

pub const EXPORT_FILENAME: &str = "funding_results.pdf";

const PROGRESS_TEXT: &str = "Finding matching funds...";
const DONE_TEXT: &str = "Done";
const FAILED_TEXT: &str = "Failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
  Idle,
  Validating,
  Requesting,
  Rendering,
  Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
  /// Nothing cached to export; no request was sent
  Skipped,
  Downloaded { bytes: usize },
}

pub struct FormController<T, V> {
  transport: T,
  view: V,
  endpoints: Endpoints,
  progress: ProgressSettings,
  cache: Option<RecommendationResult>,
  state: SubmitState,
}

impl<T: Transport, V: View> FormController<T, V> {
  pub fn new(transport: T, view: V, endpoints: Endpoints, progress: ProgressSettings) -> Self {
    Self { transport, view, endpoints, progress, cache: None, state: SubmitState::Idle }
  }

  pub fn state(&self) -> SubmitState {
    self.state
  }

  pub fn view(&self) -> &V {
    &self.view
  }

  /// The most recent successful recommendation, if any
  pub fn cached(&self) -> Option<&RecommendationResult> {
    self.cache.as_ref()
  }

  /// Whether the export action should be offered
  pub fn export_available(&self) -> bool {
    self.cache.as_ref().is_some_and(RecommendationResult::has_content)
  }

  /// Run the submit flow against the current form.
  ///
  /// Any error has already been shown through the view when this returns.
  /// The cache is only ever replaced by a successful response.
  pub async fn submit(&mut self) -> Result<(), FormError> {
    self.state = SubmitState::Validating;
    let payload = match self.view.read_form().and_then(|form| build_payload(&form)) {
      Ok(payload) => payload,
      Err(err) => {
        warn!(error = %err, "submit rejected before sending");
        self.view.show_error(&err.to_string());
        self.state = SubmitState::Error;
        return Err(err);
      }
    };

    self.view.clear_results();
    self.view.set_submit_enabled(false);
    self.state = SubmitState::Requesting;
    self.view.show_progress(0, PROGRESS_TEXT);

    let outcome = self.request_recommendations(&payload).await;
    self.view.set_submit_enabled(true);

    match outcome {
      Ok(result) => {
        self.state = SubmitState::Rendering;
        self.show(&result);
        info!(funds = result.recommended_funds.len(), "recommendations received");
        self.cache = Some(result);

        self.view.show_progress(100, DONE_TEXT);
        self.pause_then_hide_progress().await;
        self.state = SubmitState::Idle;
        Ok(())
      }
      Err(err) => {
        warn!(error = %err, kind = err.kind(), "submit failed");
        self.view.show_error(&err.to_string());
        self.view.fail_progress(FAILED_TEXT);
        self.pause_then_hide_progress().await;
        self.state = SubmitState::Error;
        Err(err)
      }
    }
  }

  /// Run the export flow: current form plus the cached results, as a PDF.
  ///
  /// A no-op when nothing exportable is cached. Never touches the cache.
  pub async fn export(&self) -> Result<ExportOutcome, FormError> {
    let Some(cached) = self.cache.as_ref().filter(|cached| cached.has_content()) else {
      debug!("export requested without results; ignoring");
      return Ok(ExportOutcome::Skipped);
    };

    let document = match self.request_export(cached).await {
      Ok(document) => document,
      Err(err) => {
        warn!(error = %err, kind = err.kind(), "export failed");
        self.view.show_error(&err.to_string());
        return Err(err);
      }
    };

    let bytes = document.len();
    if let Err(err) = self.view.trigger_download(document, EXPORT_FILENAME) {
      self.view.show_error(&err.to_string());
      return Err(err);
    }

    info!(bytes, "export downloaded");
    Ok(ExportOutcome::Downloaded { bytes })
  }

  fn show(&self, result: &RecommendationResult) {
    let rendered = render(result);
    if rendered.has_content() {
      self.view.show_results(&rendered);
      self.view.set_export_visible(true);
    } else {
      self.view.show_notice(NO_RESULTS);
      self.view.set_export_visible(false);
    }
  }

  async fn pause_then_hide_progress(&self) {
    if self.view.is_interactive() {
      tokio::time::sleep(self.progress.hide_delay()).await;
    }
    self.view.hide_progress();
  }

  async fn request_recommendations(
    &self,
    payload: &ApplicationPayload,
  ) -> Result<RecommendationResult, FormError> {
    let body = encode(payload)?;
    let mut ticker = ProgressTicker::new(&self.progress);
    let view = &self.view;

    let response = progress::drive(
      self.transport.post_json(&self.endpoints.submit, &body),
      &mut ticker,
      |percent| view.show_progress(percent, PROGRESS_TEXT),
    )
    .await?;

    interpret_submit(&response)
  }

  async fn request_export(&self, cached: &RecommendationResult) -> Result<Bytes, FormError> {
    let application = self.view.read_form().and_then(|form| build_payload(&form))?;
    let request = ExportRequest {
      application,
      llm_summary: &cached.llm_summary,
      recommended_funds: &cached.recommended_funds,
    };
    let body = encode(&request)?;

    let response = self.transport.post_json(&self.endpoints.export, &body).await?;
    interpret_export(&response)
  }
}

fn encode(body: &impl Serialize) -> Result<Value, FormError> {
  serde_json::to_value(body)
    .map_err(|err| FormError::validation(format!("Could not encode the form: {err}")))
}

/// `/submit`: 2xx with a JSON body, else the body's `error` field
pub fn interpret_submit(response: &RawResponse) -> Result<RecommendationResult, FormError> {
  if !response.is_success() {
    let message = response.error_field().unwrap_or_else(|| {
      format!("The server could not process the request (HTTP {}).", response.status)
    });
    return Err(FormError::Server { status: response.status, message });
  }

  match classify(response) {
    Classified::Json(value) => serde_json::from_value::<SubmitResponse>(value)
      .map(RecommendationResult::from)
      .map_err(|err| FormError::Protocol {
        message: format!("The server's response has an unexpected shape ({err})"),
        snippet: response.snippet(),
      }),
    Classified::Unexpected { content_type, snippet } => Err(FormError::Protocol {
      message: format!(
        "Expected JSON from the server but received {}",
        content_type.as_deref().unwrap_or("no content type")
      ),
      snippet,
    }),
    Classified::Binary(_) => Err(FormError::Protocol {
      message: "Expected JSON from the server but received a binary document".to_string(),
      snippet: response.snippet(),
    }),
  }
}

/// `/export_pdf`: 2xx with a PDF body, else the raw body text
fn interpret_export(response: &RawResponse) -> Result<Bytes, FormError> {
  if !response.is_success() {
    let text = response.text();
    let message = if text.trim().is_empty() {
      format!("PDF export failed (HTTP {}).", response.status)
    } else {
      text.trim().to_string()
    };
    return Err(FormError::Server { status: response.status, message });
  }

  match classify(response) {
    Classified::Binary(document) => Ok(document),
    Classified::Unexpected { content_type, snippet } => Err(FormError::Protocol {
      message: format!(
        "Expected a PDF from the server but received {}",
        content_type.as_deref().unwrap_or("no content type")
      ),
      snippet,
    }),
    Classified::Json(_) => Err(FormError::Protocol {
      message: "Expected a PDF from the server but received JSON".to_string(),
      snippet: response.snippet(),
    }),
  }
}
