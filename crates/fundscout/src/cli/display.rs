//! Display formatting utilities for CLI output
//!
//! Status lines go to stderr with a coloured bracketed prefix; results go to
//! stdout so they can be piped.

use colored::*;

use crate::render::{FundRow, Rendered, COLUMNS, NO_RESULTS, SUMMARY_HEADING};

const PREFIX_WIDTH: usize = 7;
const BAR_WIDTH: usize = 30;
pub const TEXT_WIDTH: usize = 80;

fn format_prefix(color: Color, prefix: &str) -> String {
  let pad = PREFIX_WIDTH.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<pad$}", prefix.color(color).bold(), "")
}

fn log(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    eprintln!("{prefix} {line}");
  }
}

pub fn info(message: &str) {
  log(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  log(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  log(Color::Red, "error", message);
}

pub fn success(message: &str) {
  log(Color::Green, "sccs", message);
}

pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Heading framed by rule lines, `width` wide
pub fn banner(title: &str, width: usize) -> String {
  let rule = banner_line(width, '=');
  format!("{rule}\n{}\n{rule}", title.bold())
}

/// `[######------]  45% text`
pub fn progress_line(percent: u8, text: &str) -> String {
  let percent = percent.min(100);
  let filled = BAR_WIDTH * usize::from(percent) / 100;
  format!(
    "[{}{}] {percent:>3}% {text}",
    banner_line(filled, '#').cyan(),
    banner_line(BAR_WIDTH - filled, '-').dimmed()
  )
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// One fund as a labelled block; empty fields are left out
pub fn fund_block(row: &FundRow) -> String {
  let cells = row.cells();
  let title = if row.fund_name.is_empty() { "(unnamed fund)" } else { row.fund_name.as_str() };
  let mut block = format!("{} {}", format!("{}.", row.index).cyan(), title.yellow().bold());

  // Skip "#" and "Fund Name"; show the link target instead of its label
  for (column, cell) in COLUMNS.iter().zip(cells.iter()).skip(2) {
    let value =
      if *column == "Link" { row.link.as_deref().unwrap_or_default() } else { cell.as_str() };
    if !value.is_empty() {
      block.push_str(&format!("\n   {:<16}{value}", format!("{column}:").dimmed()));
    }
  }

  block
}

/// Plain-terminal rendition of a [`Rendered`] result
pub fn rendered_text(rendered: &Rendered) -> String {
  let Rendered::Results { summary, rows } = rendered else {
    return NO_RESULTS.to_string();
  };

  let mut sections = Vec::new();
  if let Some(summary) = summary {
    let wrapped = wrap_text(summary, TEXT_WIDTH).join("\n");
    sections.push(format!("{}\n{wrapped}", banner(SUMMARY_HEADING, TEXT_WIDTH)));
  }
  if !rows.is_empty() {
    let heading = banner(&format!("Recommended Funds ({})", rows.len()), TEXT_WIDTH);
    let blocks: Vec<String> = rows.iter().map(fund_block).collect();
    sections.push(format!("{heading}\n{}", blocks.join("\n\n")));
  }

  sections.join("\n\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plain<T>(f: impl FnOnce() -> T) -> T {
    colored::control::set_override(false);
    f()
  }

  fn row() -> FundRow {
    FundRow {
      index: 2,
      fund_name: "Doc Fund".into(),
      organization: "Film Board".into(),
      support: "Grant — Documentary".into(),
      location: String::new(),
      status: "Open".into(),
      amount: "N/A".into(),
      link: Some("https://example.org/doc".into()),
    }
  }

  #[test]
  fn test_wrap_text_respects_width() {
    let lines = wrap_text("one two three four five", 9);
    assert_eq!(lines, vec!["one two", "three", "four five"]);
  }

  #[test]
  fn test_wrap_text_keeps_blank_paragraphs() {
    assert_eq!(wrap_text("a\n\nb", 80), vec!["a", "", "b"]);
  }

  #[test]
  fn test_prefix_padding() {
    let prefix = plain(|| format_prefix(Color::Blue, "info"));
    assert_eq!(prefix, "[info] ");
    assert_eq!(plain(|| format_prefix(Color::Red, "error")), "[error]");
  }

  #[test]
  fn test_progress_line() {
    let line = plain(|| progress_line(50, "Working"));
    assert_eq!(line, format!("[{}{}]  50% Working", "#".repeat(15), "-".repeat(15)));
    assert!(plain(|| progress_line(250, "")).contains("100%"));
  }

  #[test]
  fn test_fund_block_skips_empty_fields() {
    let block = plain(|| fund_block(&row()));
    assert!(block.starts_with("2. Doc Fund"));
    assert!(block.contains("Type / Support: Grant — Documentary"));
    assert!(block.contains("https://example.org/doc"));
    assert!(!block.contains("Location"));
  }

  #[test]
  fn test_rendered_text() {
    assert_eq!(rendered_text(&Rendered::Empty), NO_RESULTS);

    let text = plain(|| {
      rendered_text(&Rendered::Results { summary: Some("Apply early.".into()), rows: vec![row()] })
    });
    assert!(text.contains(SUMMARY_HEADING));
    assert!(text.contains("Apply early."));
    assert!(text.contains("Recommended Funds (1)"));
  }
}
