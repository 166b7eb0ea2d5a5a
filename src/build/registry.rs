//! Templates, partials and the `partial` template function.
//!
//! Partials are made available to bodies through a Tera function that owns
//! the partial list and the site data of the build it belongs to. Nothing is
//! registered process-wide, so each build carries its own helper and two
//! builds never observe each other's partials.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::discover::content_files;
use super::document::{DocumentError, FrontMatterDocument};
use super::render::{SiteContext, merge_context};

/// Name under which the partial helper is callable from templates.
pub const PARTIAL_FN: &str = "partial";

// =============================================================================
// Partial helper
// =============================================================================

/// Renders a partial by file name: `{{ partial(name="header.html") }}`.
///
/// The first partial whose file name matches is rendered against the site
/// data overlaid with the partial's own front matter. Page fields never
/// reach it, and it is not wrapped in a template. An unknown name renders
/// as an empty string.
#[derive(Debug, Clone)]
pub struct PartialHelper {
    partials: Arc<Vec<FrontMatterDocument>>,
    site: Arc<SiteContext>,
}

impl PartialHelper {
    pub fn new(partials: Vec<FrontMatterDocument>, site: Arc<SiteContext>) -> Self {
        Self {
            partials: Arc::new(partials),
            site,
        }
    }

    /// Load every partial under `dir`.
    ///
    /// Partials are compiled without the helper themselves, so a partial
    /// cannot call `partial` in turn.
    pub fn load(dir: &Path, site: Arc<SiteContext>) -> Result<Self, DocumentError> {
        let partials = content_files(dir)?
            .iter()
            .map(|path| {
                tracing::debug!("loading partial {}", path.display());
                FrontMatterDocument::load(path, dir, None)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(partials, site))
    }

    pub fn partials(&self) -> &[FrontMatterDocument] {
        &self.partials
    }

    /// First partial with the given file name.
    pub fn find(&self, name: &str) -> Option<&FrontMatterDocument> {
        self.partials.iter().find(|p| p.filename == name)
    }

    /// Render the named partial, or an empty string if there is none.
    pub fn render(&self, name: &str) -> tera::Result<String> {
        let Some(partial) = self.find(name) else {
            tracing::debug!("partial '{}' not found, rendering nothing", name);
            return Ok(String::new());
        };

        merge_context(&self.site.data, partial.front_matter.as_ref())
            .and_then(|data| partial.render_body(&data))
            .map_err(|e| tera::Error::chain(format!("failed to render partial '{name}'"), e))
    }
}

impl tera::Function for PartialHelper {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let name = args
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tera::Error::msg("partial function requires a 'name' parameter"))?;

        self.render(name).map(tera::Value::String)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

// =============================================================================
// Template registry
// =============================================================================

/// All documents a page may be rendered with: outer templates, looked up by
/// inner path, and the partial helper.
#[derive(Debug)]
pub struct TemplateRegistry {
    helper: PartialHelper,
    templates: Vec<FrontMatterDocument>,
}

impl TemplateRegistry {
    /// Start a registry from loaded partials. Templates are added with
    /// [`TemplateRegistry::load_templates`].
    pub fn new(helper: PartialHelper) -> Self {
        Self {
            helper,
            templates: Vec::new(),
        }
    }

    /// Load every template under `dir`, compiled with the partial helper.
    pub fn load_templates(&mut self, dir: &Path) -> Result<usize, DocumentError> {
        for path in content_files(dir)? {
            tracing::debug!("loading template {}", path.display());
            let template = FrontMatterDocument::load(&path, dir, Some(&self.helper))?;
            self.add_template(template);
        }
        Ok(self.templates.len())
    }

    pub fn add_template(&mut self, template: FrontMatterDocument) {
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[FrontMatterDocument] {
        &self.templates
    }

    /// First template with the given inner path.
    pub fn template(&self, inner_path: &str) -> Option<&FrontMatterDocument> {
        self.templates.iter().find(|t| t.inner_path == inner_path)
    }

    /// Parse a page with the partial helper available to its body.
    pub fn load_page(
        &self,
        path: &Path,
        pages_dir: &Path,
    ) -> Result<FrontMatterDocument, DocumentError> {
        FrontMatterDocument::load(path, pages_dir, Some(&self.helper))
    }
}
