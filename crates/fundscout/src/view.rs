use bytes::Bytes;

use crate::error::FormError;
use crate::payload::FormState;
use crate::render::Rendered;

/// Everything the controller needs from a rendering surface.
///
/// Methods take `&self`; surfaces that keep state (a DOM, a terminal) use
/// interior mutability, the way an event-driven UI would.
pub trait View {
  /// Current on-screen form state. Never a cached copy.
  fn read_form(&self) -> Result<FormState, FormError>;

  /// Remove previous results and messages
  fn clear_results(&self);

  fn show_progress(&self, percent: u8, text: &str);

  /// Leave the indicator up, marked as failed
  fn fail_progress(&self, text: &str);

  fn hide_progress(&self);

  /// Whether someone is watching the indicator. When false the controller
  /// hides it at once instead of leaving the final state up for a moment.
  fn is_interactive(&self) -> bool {
    true
  }

  fn show_error(&self, message: &str);

  fn show_notice(&self, message: &str);

  fn show_results(&self, rendered: &Rendered);

  fn set_submit_enabled(&self, enabled: bool);

  fn set_export_visible(&self, visible: bool);

  /// Offer `document` to the user under `filename`. The view owns the bytes
  /// from here on and must not keep them once the hand-off is done.
  fn trigger_download(&self, document: Bytes, filename: &str) -> Result<(), FormError>;
}
