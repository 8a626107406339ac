//! Result Renderer: a pure projection of a [`RecommendationResult`].
//!
//! The cached result stays authoritative; nothing here is read back.

use std::fmt::Write as _;

use url::Url;
use v_htmlescape::escape;

use crate::model::{Fund, RecommendationResult};

pub const NO_RESULTS: &str = "No matching funds were found for this project.";
pub const SUMMARY_HEADING: &str = "AI Recommendation";
pub const MISSING_AMOUNT: &str = "N/A";
pub const LINK_LABEL: &str = "Open";
pub const COLUMNS: [&str; 8] =
  ["#", "Fund Name", "Organization", "Type / Support", "Location", "Status", "Amount", "Link"];

/// One table row, already normalized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundRow {
  /// 1-based position in `recommended_funds`
  pub index: usize,
  pub fund_name: String,
  pub organization: String,
  pub support: String,
  pub location: String,
  pub status: String,
  pub amount: String,
  /// Only http(s) links survive
  pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
  /// Neither a summary nor any fund: show the "no results" notice only
  Empty,
  Results { summary: Option<String>, rows: Vec<FundRow> },
}

pub fn render(result: &RecommendationResult) -> Rendered {
  let summary = Some(result.llm_summary.trim())
    .filter(|summary| !summary.is_empty())
    .map(|summary| summary.replace("\r\n", "\n"));
  let rows: Vec<FundRow> =
    result.recommended_funds.iter().enumerate().map(|(i, fund)| fund_row(i + 1, fund)).collect();

  if summary.is_none() && rows.is_empty() {
    Rendered::Empty
  } else {
    Rendered::Results { summary, rows }
  }
}

/// Markup for `result`, as it would be placed into the results container
pub fn render_html(result: &RecommendationResult) -> String {
  render(result).to_html()
}

fn fund_row(index: usize, fund: &Fund) -> FundRow {
  let field = |value: Option<String>| value.unwrap_or_default().trim().to_string();
  let amount = field(fund.amount());

  FundRow {
    index,
    fund_name: field(fund.fund_name()),
    organization: field(fund.organization()),
    support: fund.support_text(),
    location: field(fund.location()),
    status: field(fund.status()),
    amount: if amount.is_empty() { MISSING_AMOUNT.to_string() } else { amount },
    link: fund.link().as_deref().and_then(web_link),
  }
}

/// `link` when it is an absolute http(s) URL; anything else is not offered
/// as a hyperlink
fn web_link(link: &str) -> Option<String> {
  let link = link.trim();
  let url = Url::parse(link).ok()?;
  matches!(url.scheme(), "http" | "https").then(|| link.to_string())
}

impl FundRow {
  /// Cell texts in [`COLUMNS`] order; the link cell shows its label
  pub fn cells(&self) -> [String; 8] {
    [
      self.index.to_string(),
      self.fund_name.clone(),
      self.organization.clone(),
      self.support.clone(),
      self.location.clone(),
      self.status.clone(),
      self.amount.clone(),
      self.link.as_ref().map(|_| LINK_LABEL.to_string()).unwrap_or_default(),
    ]
  }
}

impl Rendered {
  pub fn has_content(&self) -> bool {
    !matches!(self, Rendered::Empty)
  }

  pub fn rows(&self) -> &[FundRow] {
    match self {
      Rendered::Empty => &[],
      Rendered::Results { rows, .. } => rows,
    }
  }

  pub fn summary(&self) -> Option<&str> {
    match self {
      Rendered::Empty => None,
      Rendered::Results { summary, .. } => summary.as_deref(),
    }
  }

  pub fn to_html(&self) -> String {
    let mut html = String::new();

    let Rendered::Results { summary, rows } = self else {
      let _ = write!(html, r#"<p class="no-results">{}</p>"#, escape(NO_RESULTS));
      return html;
    };

    if let Some(summary) = summary {
      let body = escape(summary).to_string().replace('\n', "<br>");
      let _ = write!(
        html,
        r#"<section class="results-summary"><h3>{}</h3><p>{body}</p></section>"#,
        escape(SUMMARY_HEADING)
      );
    }

    if !rows.is_empty() {
      html.push_str(r#"<table class="results-table"><thead><tr>"#);
      for column in COLUMNS {
        let _ = write!(html, "<th>{}</th>", escape(column));
      }
      html.push_str("</tr></thead><tbody>");
      for row in rows {
        write_row(&mut html, row);
      }
      html.push_str("</tbody></table>");
    }

    html
  }
}

fn write_row(html: &mut String, row: &FundRow) {
  html.push_str("<tr>");
  let texts = [
    &row.fund_name,
    &row.organization,
    &row.support,
    &row.location,
    &row.status,
    &row.amount,
  ];
  let _ = write!(html, "<td>{}</td>", row.index);
  for text in texts {
    let _ = write!(html, "<td>{}</td>", escape(text));
  }
  match &row.link {
    Some(link) => {
      let _ = write!(
        html,
        r#"<td><a href="{}" target="_blank" rel="noopener noreferrer">{LINK_LABEL}</a></td>"#,
        escape(link)
      );
    }
    None => html.push_str("<td></td>"),
  }
  html.push_str("</tr>");
}
