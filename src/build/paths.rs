//! Path utilities.
//!
//! This module handles:
//! - Output paths of pages, derived from the `url` front matter field
//! - The site name and default output directory of a site root

use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;

use super::document::{FrontMatterDocument, URL_KEY};

/// Output file for a page whose `url` points at the site root.
pub const INDEX_FILE: &str = "index.html";

const HTML_EXTENSION: &str = "html";

/// Compute the output path of a page, relative to the output directory.
///
/// - No front matter, no `url`, or a `url` that is empty once trimmed and
///   stripped of one leading and one trailing `/`: the page's own filename.
/// - A `url` of exactly `/`: `index.html`.
/// - A `url` whose last segment has no extension gets `.html` appended;
///   one that already has an extension is used as is.
///
/// # Examples
/// ```ignore
/// url: about       => "about.html"
/// url: /about/     => "about.html"
/// url: about.html  => "about.html"
/// url: /feed.xml   => "feed.xml"
/// url: blog/first  => "blog/first.html"
/// url: /           => "index.html"
/// ```
pub fn output_path(doc: &FrontMatterDocument) -> String {
    match doc.field(URL_KEY).and_then(url_string) {
        Some(url) => resolve_url(&url, &doc.filename),
        None => doc.filename.clone(),
    }
}

/// Apply the url rules to a raw `url` value.
pub fn resolve_url(url: &str, filename: &str) -> String {
    let trimmed = url.trim();
    if trimmed == "/" {
        return INDEX_FILE.to_string();
    }

    let stripped = strip_slashes(trimmed);
    if stripped.is_empty() {
        return filename.to_string();
    }
    if stripped == "/" {
        return INDEX_FILE.to_string();
    }

    if has_extension(stripped) {
        stripped.to_string()
    } else {
        format!("{stripped}.{HTML_EXTENSION}")
    }
}

/// Join a page's output path under `output_dir`.
///
/// Root and `.` components are dropped so the result always sits inside
/// `output_dir`. Returns `None` when the path climbs out with `..`.
pub fn join_output(output_dir: &Path, relative: &str) -> Option<PathBuf> {
    let mut target = output_dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }
    Some(target)
}

/// Remove a single leading and a single trailing `/`.
fn strip_slashes(url: &str) -> &str {
    let url = url.strip_prefix('/').unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url)
}

/// Whether the last path segment carries an extension.
fn has_extension(url: &str) -> bool {
    let segment = url.rsplit('/').next().unwrap_or(url);
    Path::new(segment)
        .extension()
        .is_some_and(|ext| !ext.is_empty())
}

/// Scalar `url` values are used as text; anything else counts as absent.
fn url_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The site name: the last segment of the site root.
///
/// Roots without a final segment of their own (".", "site/..") are
/// canonicalized first.
pub fn site_name(root: &Path) -> String {
    let named = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    named(root)
        .or_else(|| root.canonicalize().ok().as_deref().and_then(named))
        .unwrap_or_else(|| "site".to_string())
}

/// Default output directory: `dist-<siteName>` next to the site root.
pub fn default_output_dir(root: &Path, site_name: &str) -> PathBuf {
    let parent = root
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(""));
    parent.join(format!("dist-{site_name}"))
}
