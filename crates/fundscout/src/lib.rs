//! Fundscout - Film Funding Application Client
//!
//! Collects a film project's funding application, asks the matching backend
//! for recommended funds, renders what comes back and exports the same data
//! as a PDF. All rendering surfaces plug in through [`view::View`]; all HTTP
//! goes through [`transport::Transport`].

pub mod cli;
pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod payload;
pub mod progress;
pub mod render;
pub mod response;
pub mod transport;
pub mod view;

pub use config::Config;
pub use controller::{ExportOutcome, FormController, SubmitState, EXPORT_FILENAME};
pub use endpoint::Endpoints;
pub use error::FormError;
pub use model::{Fund, RecommendationResult, SupportTopic};
pub use payload::{build_payload, ApplicationPayload, FormState};
pub use render::{render, Rendered};
pub use transport::{HttpTransport, Transport};
pub use view::View;
