//! Where the two backend endpoints live

use url::{ParseError, Url};

pub const SUBMIT_ENDPOINT: &str = "submit";
pub const EXPORT_ENDPOINT: &str = "export_pdf";

/// Fully resolved endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
  pub submit: Url,
  pub export: Url,
}

impl Endpoints {
  /// Endpoints under an explicit API base such as `https://host/api`
  pub fn from_base(base: &Url) -> Result<Self, ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    Ok(Self { submit: base.join(SUBMIT_ENDPOINT)?, export: base.join(EXPORT_ENDPOINT)? })
  }

  /// Endpoints for a page served at `page_path` on `server`
  pub fn for_page(server: &Url, page_path: &str, mount_prefix: &str) -> Result<Self, ParseError> {
    let base = server.join(&api_path(page_path, mount_prefix))?;
    Self::from_base(&base)
  }
}

/// `{prefix}/api` when the page sits at or under the mount prefix, else `/api`
pub fn api_path(page_path: &str, mount_prefix: &str) -> String {
  let prefix = mount_prefix.trim_end_matches('/');
  if prefix.is_empty() {
    return "/api".to_string();
  }

  let prefix = if prefix.starts_with('/') { prefix.to_string() } else { format!("/{prefix}") };
  let mounted = page_path == prefix
    || page_path.strip_prefix(prefix.as_str()).is_some_and(|rest| rest.starts_with('/'));

  if mounted {
    format!("{prefix}/api")
  } else {
    "/api".to_string()
  }
}
