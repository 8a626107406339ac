use std::path::Path;

use anyhow::{anyhow, Context, Result};
use colored::*;
use tracing::debug;

use crate::cli::display;
use crate::cli::terminal::{load_form, TerminalView};
use crate::config::Config;
use crate::controller::{interpret_submit, ExportOutcome, FormController};
use crate::payload::build_payload;
use crate::render::render;
use crate::response::RawResponse;
use crate::transport::HttpTransport;

/// Options for the `submit` command
#[derive(Debug, Default)]
pub struct SubmitOptions<'a> {
  pub export: bool,
  pub html: Option<&'a Path>,
}

/// Submit the form for recommendations, then optionally export the PDF.
///
/// A [`crate::FormError`] coming out of here has already been reported.
pub async fn submit(config: &Config, form: &Path, options: SubmitOptions<'_>) -> Result<()> {
  let endpoints = config.endpoints()?;
  let transport = HttpTransport::new(config.timeout())
    .map_err(|err| anyhow!("Could not build the HTTP client: {err}"))?;
  debug!(submit = %endpoints.submit, export = %endpoints.export, "resolved endpoints");

  let mut view = TerminalView::new(form, &config.download_dir);
  if let Some(html) = options.html {
    view = view.with_html_output(html);
  }

  let mut controller = FormController::new(transport, view, endpoints, config.progress);
  controller.submit().await?;

  if !options.export {
    if controller.export_available() {
      display::info(&format!("Run again with {} to download the PDF", "--export".cyan()));
    }
    return Ok(());
  }

  match controller.export().await? {
    ExportOutcome::Downloaded { .. } => {}
    ExportOutcome::Skipped => display::warn("Nothing to export: no funds were recommended"),
  }
  Ok(())
}

/// Render a saved `/submit` response body without contacting the server
pub fn render_saved(response: &Path, html: Option<&Path>) -> Result<()> {
  let body = std::fs::read(response)
    .with_context(|| format!("Could not read response file {}", response.display()))?;
  let raw = RawResponse::new(200, Some("application/json"), body);

  let result = interpret_submit(&raw).inspect_err(|err| display::error(&err.to_string()))?;
  let rendered = render(&result);
  println!("{}", display::rendered_text(&rendered));

  if let Some(html) = html {
    std::fs::write(html, rendered.to_html())
      .with_context(|| format!("Could not write {}", html.display()))?;
    display::info(&format!("Results markup written to {}", html.display()));
  }
  Ok(())
}

/// Build the payload from a form file and print it, without sending anything
pub fn validate(form: &Path) -> Result<()> {
  let payload = load_form(form)
    .and_then(|state| build_payload(&state))
    .inspect_err(|err| display::error(&err.to_string()))?;

  println!("{}", serde_json::to_string_pretty(&payload)?);
  display::success("Form is valid");
  Ok(())
}
