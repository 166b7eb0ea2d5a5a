use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::minify::minify_html;
use super::registry::{PartialHelper, TemplateRegistry};
use super::render::{Body, RenderError, SiteContext, merge_context};

/// Front matter key naming an outer template, looked up by inner path.
pub const TEMPLATE_KEY: &str = "template";

/// Key under which a page's rendered body is handed to its outer template.
pub const CONTENT_KEY: &str = "content";

/// Front matter key overriding the output path.
pub const URL_KEY: &str = "url";

/// A run of two or more dashes, then the shortest possible interior, then
/// another run of dashes. Matches the first such block anywhere in the text.
static FRONT_MATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--+([\s\S]+?)--+").unwrap());

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to turn a file into a [`FrontMatterDocument`].
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },

    #[error("failed to compile {path}: {source}")]
    Compile { path: PathBuf, source: tera::Error },

    #[error("failed to enumerate {path}: {source}")]
    Discover {
        path: PathBuf,
        source: walkdir::Error,
    },
}

// =============================================================================
// Front matter parsing
// =============================================================================

/// Result of splitting front matter off a file's text.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed block, or `None` when the text has no delimited block or
    /// the block does not hold a mapping
    pub front_matter: Option<Mapping>,
    /// The text with the delimited block removed
    pub body: String,
}

/// Split front matter from the rest of a file.
///
/// The first block of the form
///
/// ```text
/// ---
/// url: about
/// template: layout.html
/// ---
/// ```
///
/// anywhere in the text is parsed as YAML and cut out; the remaining text is
/// the body. An empty block yields an empty mapping. A block holding some
/// other YAML value (an HTML comment such as `<!-- main layout -->` scans
/// as the scalar `main layout`) is still cut out but carries no data.
pub fn parse_front_matter(content: &str) -> Result<ParsedContent, FrontMatterError> {
    let Some((block, interior)) = FRONT_MATTER_RE
        .captures(content)
        .and_then(|c| Some((c.get(0)?, c.get(1)?)))
    else {
        return Ok(ParsedContent {
            front_matter: None,
            body: content.to_string(),
        });
    };

    let front_matter = match serde_yaml::from_str::<Value>(interior.as_str())? {
        Value::Null => Some(Mapping::new()),
        Value::Mapping(mapping) => Some(mapping),
        other => {
            tracing::debug!("ignoring non-mapping front matter {:?}", other);
            None
        }
    };

    let mut body = String::with_capacity(content.len() - block.as_str().len());
    body.push_str(&content[..block.start()]);
    body.push_str(&content[block.end()..]);

    Ok(ParsedContent { front_matter, body })
}

// =============================================================================
// Documents
// =============================================================================

/// A template, partial or page file: front matter plus a compiled body.
///
/// Front matter is never modified after loading, and the body is compiled
/// exactly once, here, so a document can be rendered any number of times.
#[derive(Debug)]
pub struct FrontMatterDocument {
    /// Path the document was read from
    pub source_path: PathBuf,
    /// Path relative to its site subdirectory, `/`-separated (e.g. "blog/post.html")
    pub inner_path: String,
    /// Base name of the source path (e.g. "post.html")
    pub filename: String,
    /// Parsed front matter, `None` when the file has no delimited block
    pub front_matter: Option<Mapping>,
    body: Body,
}

impl FrontMatterDocument {
    /// Read, split and compile the file at `path`.
    ///
    /// `base_dir` is the site subdirectory the file was found in and
    /// determines the inner path. When a partial helper is given it is made
    /// callable from the body as `partial(name="...")`.
    pub fn load(
        path: &Path,
        base_dir: &Path,
        helper: Option<&PartialHelper>,
    ) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path, base_dir, &content, helper)
    }

    /// Build a document from already-read text.
    pub fn from_source(
        path: &Path,
        base_dir: &Path,
        content: &str,
        helper: Option<&PartialHelper>,
    ) -> Result<Self, DocumentError> {
        let parsed = parse_front_matter(content).map_err(|source| DocumentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;

        let body = Body::compile(&parsed.body, helper).map_err(|source| DocumentError::Compile {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            source_path: path.to_path_buf(),
            inner_path: inner_path(path, base_dir),
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            front_matter: parsed.front_matter,
            body,
        })
    }

    /// Look up a front matter field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.front_matter.as_ref()?.get(key)
    }

    /// The outer template this document asks to be wrapped in.
    pub fn template_name(&self) -> Option<&str> {
        self.field(TEMPLATE_KEY)?.as_str()
    }

    /// Render the body alone against `data`.
    pub(crate) fn render_body(
        &self,
        data: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, RenderError> {
        self.body.render(data).map_err(|source| RenderError::Template {
            path: self.source_path.clone(),
            source,
        })
    }

    /// Render this document to its final output.
    ///
    /// 1. Site data is overlaid with this document's front matter, which wins
    ///    on key collisions.
    /// 2. The body is rendered against the merged data.
    /// 3. If the front matter names a `template` matching the inner path of
    ///    one of the registry's templates, that template is rendered against
    ///    the merged data with the rendered body under `content`. Only one
    ///    level is resolved; an unknown template leaves the body as the output.
    /// 4. The output is minified when the site asks for it.
    pub fn render(
        &self,
        site: &SiteContext,
        templates: &TemplateRegistry,
    ) -> Result<String, RenderError> {
        let mut data = merge_context(&site.data, self.front_matter.as_ref())?;
        let mut output = self.render_body(&data)?;

        if let Some(name) = self.template_name()
            && !templates.templates().is_empty()
        {
            match templates.template(name) {
                Some(outer) => {
                    tracing::debug!("{} -> template {}", self.inner_path, outer.inner_path);
                    data.insert(CONTENT_KEY.to_string(), serde_json::Value::String(output));
                    output = outer.render_body(&data)?;
                }
                None => {
                    tracing::warn!(
                        "template '{}' requested by {} not found, using page body as is",
                        name,
                        self.source_path.display()
                    );
                }
            }
        }

        if site.minify {
            output = minify_html(&output);
        }

        Ok(output)
    }
}

/// Compute the `/`-separated path of `path` relative to `base_dir`.
/// Falls back to the file name when `path` is not under `base_dir`.
fn inner_path(path: &Path, base_dir: &Path) -> String {
    let relative = path
        .strip_prefix(base_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .or_else(|| path.file_name().map(Path::new))
        .unwrap_or(path);

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
