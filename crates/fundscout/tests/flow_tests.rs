
use std::time::Duration;

use fundscout::progress::ProgressSettings;
use fundscout::{Endpoints, ExportOutcome, FormController, HttpTransport, EXPORT_FILENAME};
use recording_view::{valid_form, Event, RecordingView};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF: &[u8] = b"%PDF-1.4\n%fake\n";

fn settings() -> ProgressSettings {
  ProgressSettings { tick_ms: 20, step: 5, ceiling: 90, hide_delay_ms: 0 }
}

fn endpoints(server: &MockServer) -> Endpoints {
  let base = Url::parse(&format!("{}/film-funding/api", server.uri())).unwrap();
  Endpoints::from_base(&base).unwrap()
}

fn controller(
  server: &MockServer,
  timeout: Duration,
) -> FormController<HttpTransport, RecordingView> {
  FormController::new(
    HttpTransport::new(timeout).unwrap(),
    RecordingView::new(valid_form()),
    endpoints(server),
    settings(),
  )
}

fn funds() -> Value {
  json!([
    {
      "fund_name": "Auvergne-Rhône-Alpes Cinéma",
      "organization": "AURA Cinéma",
      "support_type_and_topic": [{"type": "Grant", "topic": "Documentary"}, "Co-production"],
      "location": "France",
      "status": "Open",
      "amount": "up to €100,000",
      "link": "https://example.org/aura",
      "deadline": "2026-12-01"
    },
    {
      "fund_name": "Sleeper Fund",
      "support_type_and_topic": "Development",
      "amount": ""
    },
    {
      "fund_name": "Festival Fund",
      "amount": 5000,
      "status": null,
      "support_type_and_topic": null,
      "score": 0.82
    }
  ])
}

async fn mount_submit(server: &MockServer, response: ResponseTemplate) {
  Mock::given(method("POST"))
    .and(path("/film-funding/api/submit"))
    .respond_with(response)
    .mount(server)
    .await;
}

async fn mount_export(server: &MockServer, response: ResponseTemplate) {
  Mock::given(method("POST"))
    .and(path("/film-funding/api/export_pdf"))
    .respond_with(response)
    .mount(server)
    .await;
}

async fn request_bodies(server: &MockServer, endpoint: &str) -> Vec<Value> {
  server
    .received_requests()
    .await
    .unwrap_or_default()
    .iter()
    .filter(|request| request.url.path().ends_with(endpoint))
    .map(|request| request.body_json::<Value>().unwrap())
    .collect()
}

#[tokio::test]
async fn test_submit_then_export_sends_what_was_shown() {
  let server = MockServer::start().await;
  mount_submit(
    &server,
    ResponseTemplate::new(200).set_body_json(json!({
      "status": "ok",
      "llm_summary": "Start with the regional fund.\nThen apply for development support.",
      "recommended_funds": funds(),
    })),
  )
  .await;
  mount_export(&server, ResponseTemplate::new(200).set_body_raw(PDF.to_vec(), "application/pdf"))
    .await;

  let mut controller = controller(&server, Duration::from_secs(5));
  controller.submit().await.unwrap();

  let submitted = request_bodies(&server, "/submit").await;
  assert_eq!(submitted.len(), 1);
  assert_eq!(submitted[0]["amount_requested"], json!(25000));
  assert_eq!(submitted[0]["support_needed"], json!(["co-production", "development"]));

  let shown = controller.view().last_results().unwrap();
  assert_eq!(shown.rows().len(), 3);
  assert_eq!(shown.rows()[0].support, "Grant — Documentary; Co-production");
  assert_eq!(shown.rows()[1].amount, "N/A");
  assert_eq!(shown.rows()[2].amount, "5000");
  assert_eq!(shown.rows()[2].status, "");
  assert_eq!(controller.view().export_visible(), Some(true));

  let outcome = controller.export().await.unwrap();
  assert_eq!(outcome, ExportOutcome::Downloaded { bytes: PDF.len() });

  let exported = request_bodies(&server, "/export_pdf").await;
  assert_eq!(exported.len(), 1);
  assert_eq!(exported[0]["recommended_funds"], funds());
  assert_eq!(
    exported[0]["llm_summary"],
    json!("Start with the regional fund.\nThen apply for development support.")
  );
  assert_eq!(exported[0]["project_title"], json!("Night Train"));
  assert_eq!(exported[0]["amount_requested"], json!(25000));

  let events = controller.view().events();
  assert!(events.contains(&Event::Download(EXPORT_FILENAME.to_string(), PDF.len())));
  assert_eq!(controller.view().downloads.borrow()[0].as_ref(), PDF);
}

#[tokio::test]
async fn test_html_fallback_page_is_protocol_error() {
  let server = MockServer::start().await;
  let page = format!("<!doctype html><html><body>{}</body></html>", "x".repeat(500));
  mount_submit(&server, ResponseTemplate::new(200).set_body_raw(page, "text/html")).await;

  let mut controller = controller(&server, Duration::from_secs(5));
  let err = controller.submit().await.unwrap_err();

  assert_eq!(err.kind(), "protocol");
  let fundscout::FormError::Protocol { snippet, .. } = &err else {
    panic!("expected a protocol error, got {err:?}");
  };
  assert!(snippet.starts_with("<!doctype html>"));
  assert!(snippet.chars().count() <= 200);

  assert!(controller.view().last_results().is_none());
  assert!(controller.cached().is_none());
  assert!(controller.view().events().contains(&Event::ProgressFailed));
}

#[tokio::test]
async fn test_server_error_message_is_shown() {
  let server = MockServer::start().await;
  mount_submit(
    &server,
    ResponseTemplate::new(400).set_body_json(json!({"error": "Missing required field: currency"})),
  )
  .await;

  let mut controller = controller(&server, Duration::from_secs(5));
  let err = controller.submit().await.unwrap_err();

  assert_eq!(err.kind(), "server");
  assert_eq!(controller.view().errors(), vec!["Missing required field: currency".to_string()]);
  assert_eq!(controller.view().events().last(), Some(&Event::ProgressHidden));
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
  let server = MockServer::start().await;
  mount_submit(&server, ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;

  let mut controller = controller(&server, Duration::from_secs(5));
  controller.view().edit(|form| form.amount_requested = "-5".into());

  let err = controller.submit().await.unwrap_err();
  assert_eq!(err.kind(), "validation");
  assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
  let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
  let port = listener.local_addr().unwrap().port();
  drop(listener);

  let base = Url::parse(&format!("http://127.0.0.1:{port}/api")).unwrap();
  let mut controller = FormController::new(
    HttpTransport::new(Duration::from_secs(5)).unwrap(),
    RecordingView::new(valid_form()),
    Endpoints::from_base(&base).unwrap(),
    settings(),
  );

  let err = controller.submit().await.unwrap_err();
  assert_eq!(err.kind(), "network");
  assert!(controller.view().events().contains(&Event::SubmitEnabled(true)));
}

#[tokio::test]
async fn test_slow_server_times_out() {
  let server = MockServer::start().await;
  mount_submit(
    &server,
    ResponseTemplate::new(200)
      .set_body_json(json!({"status": "ok", "recommended_funds": []}))
      .set_delay(Duration::from_secs(3)),
  )
  .await;

  let mut controller = controller(&server, Duration::from_millis(300));
  let err = controller.submit().await.unwrap_err();

  assert_eq!(err.kind(), "network");
  assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_failed_export_keeps_results() {
  let server = MockServer::start().await;
  mount_submit(
    &server,
    ResponseTemplate::new(200).set_body_json(json!({
      "status": "ok",
      "llm_summary": "One fund fits.",
      "recommended_funds": [{"fund_name": "Only Fund"}],
    })),
  )
  .await;
  mount_export(
    &server,
    ResponseTemplate::new(500).set_body_raw("PDF generation failed", "text/plain"),
  )
  .await;

  let mut controller = controller(&server, Duration::from_secs(5));
  controller.submit().await.unwrap();

  let err = controller.export().await.unwrap_err();
  assert_eq!(err.kind(), "server");
  assert_eq!(controller.view().errors(), vec!["PDF generation failed".to_string()]);
  assert!(controller.view().downloads.borrow().is_empty());
  assert!(controller.export_available());
  assert_eq!(controller.cached().unwrap().llm_summary, "One fund fits.");
}
