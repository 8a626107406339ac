//! Terminal rendering surface for the form controller

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use colored::*;
use console::Term;
use tracing::debug;

use crate::cli::display;
use crate::error::FormError;
use crate::payload::FormState;
use crate::render::Rendered;
use crate::view::View;

/// Read a form from a YAML (or JSON) file
pub fn load_form(path: &Path) -> Result<FormState, FormError> {
  let content = fs::read_to_string(path).map_err(|err| {
    FormError::validation(format!("Could not read form file {}: {err}", path.display()))
  })?;
  serde_yaml::from_str(&content).map_err(|err| {
    FormError::validation(format!("Could not parse form file {}: {err}", path.display()))
  })
}

/// A [`View`] backed by a form file and the terminal.
///
/// The form is re-read from disk on every `read_form`, so edits between a
/// submit and an export are picked up the same way a browser form would be.
pub struct TerminalView {
  form_path: PathBuf,
  html_out: Option<PathBuf>,
  download_dir: PathBuf,
  term: Term,
  progress_drawn: Cell<bool>,
  submit_enabled: Cell<bool>,
  export_visible: Cell<bool>,
  downloaded: RefCell<Option<PathBuf>>,
}

impl TerminalView {
  pub fn new(form_path: impl Into<PathBuf>, download_dir: impl Into<PathBuf>) -> Self {
    Self {
      form_path: form_path.into(),
      html_out: None,
      download_dir: download_dir.into(),
      term: Term::stderr(),
      progress_drawn: Cell::new(false),
      submit_enabled: Cell::new(true),
      export_visible: Cell::new(false),
      downloaded: RefCell::new(None),
    }
  }

  /// Also write the results markup to `path` whenever results are shown
  pub fn with_html_output(mut self, path: impl Into<PathBuf>) -> Self {
    self.html_out = Some(path.into());
    self
  }

  pub fn submit_enabled(&self) -> bool {
    self.submit_enabled.get()
  }

  pub fn export_visible(&self) -> bool {
    self.export_visible.get()
  }

  /// Where the last download was written
  pub fn downloaded(&self) -> Option<PathBuf> {
    self.downloaded.borrow().clone()
  }

  fn draw_progress(&self, line: &str) {
    if !self.term.is_term() {
      return;
    }
    let _ = self.term.clear_line();
    let _ = self.term.write_str(line);
    self.progress_drawn.set(true);
  }

  fn clear_progress(&self) {
    if self.progress_drawn.replace(false) {
      let _ = self.term.clear_line();
    }
  }

  /// Write the markup if an output file is set; failures are warned about.
  /// Returns whether a file was written.
  fn write_html(&self, rendered: &Rendered) -> bool {
    let Some(path) = &self.html_out else {
      return false;
    };
    match fs::write(path, rendered.to_html()) {
      Ok(()) => {
        display::info(&format!("Results markup written to {}", path.display()));
        true
      }
      Err(err) => {
        display::warn(&format!("Could not write {}: {err}", path.display()));
        false
      }
    }
  }
}

impl View for TerminalView {
  fn read_form(&self) -> Result<FormState, FormError> {
    debug!(path = %self.form_path.display(), "reading form");
    load_form(&self.form_path)
  }

  fn clear_results(&self) {
    self.clear_progress();
  }

  fn show_progress(&self, percent: u8, text: &str) {
    self.draw_progress(&display::progress_line(percent, text));
  }

  fn fail_progress(&self, text: &str) {
    if self.progress_drawn.get() {
      self.draw_progress(&format!("{}", text.red().bold()));
      let _ = self.term.write_line("");
      self.progress_drawn.set(false);
    }
  }

  fn hide_progress(&self) {
    self.clear_progress();
  }

  fn is_interactive(&self) -> bool {
    self.term.is_term()
  }

  fn show_error(&self, message: &str) {
    self.clear_progress();
    display::error(message);
  }

  fn show_notice(&self, message: &str) {
    self.clear_progress();
    display::warn(message);
    self.write_html(&Rendered::Empty);
  }

  fn show_results(&self, rendered: &Rendered) {
    self.clear_progress();
    println!("{}", display::rendered_text(rendered));
    self.write_html(rendered);
  }

  fn set_submit_enabled(&self, enabled: bool) {
    self.submit_enabled.set(enabled);
  }

  fn set_export_visible(&self, visible: bool) {
    self.export_visible.set(visible);
  }

  fn trigger_download(&self, document: Bytes, filename: &str) -> Result<(), FormError> {
    let path = self.download_dir.join(filename);
    fs::create_dir_all(&self.download_dir)
      .and_then(|()| fs::write(&path, &document))
      .map_err(|err| FormError::Download(format!("Could not save {}: {err}", path.display())))?;

    display::success(&format!("Saved {} ({} bytes)", path.display(), document.len()));
    *self.downloaded.borrow_mut() = Some(path);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::{tempdir, NamedTempFile};

  fn form_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_load_yaml_form() {
    let file = form_file(
      "project_title: Night Train\nproject_location: Lyon\namount_requested: 25000\n\
       support_needed:\n  - development\n  - distribution\n",
    );

    let form = load_form(file.path()).unwrap();
    assert_eq!(form.project_title, "Night Train");
    assert_eq!(form.amount_requested, "25000");
    assert_eq!(form.support_needed, vec!["development", "distribution"]);
    assert_eq!(form.currency, "");
  }

  #[test]
  fn test_load_json_form() {
    let file = form_file(r#"{"project_title": "Night Train", "amount_requested": "12.5"}"#);
    let form = load_form(file.path()).unwrap();
    assert_eq!(form.amount_requested, "12.5");
  }

  #[test]
  fn test_missing_form_is_validation_error() {
    let err = load_form(Path::new("/no/such/form.yaml")).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("/no/such/form.yaml"));
  }

  #[test]
  fn test_form_is_reread_each_time() {
    let mut file = form_file("project_title: First\n");
    let view = TerminalView::new(file.path(), ".");
    assert_eq!(view.read_form().unwrap().project_title, "First");

    file.as_file_mut().set_len(0).unwrap();
    let mut handle = file.reopen().unwrap();
    handle.write_all(b"project_title: Second\n").unwrap();
    assert_eq!(view.read_form().unwrap().project_title, "Second");
  }

  #[test]
  fn test_download_writes_into_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("exports");
    let view = TerminalView::new("form.yaml", &target);

    view.trigger_download(Bytes::from_static(b"%PDF-1.4"), "funding_results.pdf").unwrap();

    let saved = view.downloaded().unwrap();
    assert_eq!(saved, target.join("funding_results.pdf"));
    assert_eq!(fs::read(saved).unwrap(), b"%PDF-1.4");
  }

  #[test]
  fn test_controls_track_state() {
    let view = TerminalView::new("form.yaml", ".");
    assert!(view.submit_enabled());
    assert!(!view.export_visible());

    view.set_submit_enabled(false);
    view.set_export_visible(true);
    assert!(!view.submit_enabled());
    assert!(view.export_visible());
  }

  #[test]
  fn test_results_markup_written() {
    let dir = tempdir().unwrap();
    let html = dir.path().join("results.html");
    let view = TerminalView::new("form.yaml", ".").with_html_output(&html);

    view.show_results(&Rendered::Results { summary: Some("Go".into()), rows: vec![] });
    assert!(fs::read_to_string(&html).unwrap().contains("<p>Go</p>"));

    view.show_notice("nothing");
    assert!(fs::read_to_string(&html).unwrap().contains("no-results"));
  }

  #[test]
  fn test_unwritable_markup_path_is_reported() {
    let dir = tempdir().unwrap();
    let html = dir.path().join("missing").join("results.html");
    let view = TerminalView::new("form.yaml", ".").with_html_output(&html);

    assert!(!view.write_html(&Rendered::Empty));
    view.show_notice("nothing");
    assert!(!html.exists());
  }

  #[test]
  fn test_no_markup_path_writes_nothing() {
    let view = TerminalView::new("form.yaml", ".");
    assert!(!view.write_html(&Rendered::Empty));
  }
}
