use std::path::PathBuf;

use serde_json::{Map, Value as JsonValue};
use serde_yaml::{Mapping, Value as YamlValue};
use tera::{Context, Tera};

use crate::config::ConfigStore;

use super::registry::{PARTIAL_FN, PartialHelper};

/// Name of the single template held by each compiled body.
const BODY_TEMPLATE: &str = "__body__";

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to render {path}: {source}")]
    Template { path: PathBuf, source: tera::Error },

    #[error("failed to convert template data: {0}")]
    Data(#[from] serde_json::Error),
}

// =============================================================================
// Compiled bodies
// =============================================================================

/// A document body compiled once into its own Tera instance.
///
/// Autoescaping is off: bodies are trusted HTML and `{{ content }}` must
/// come out verbatim when a template wraps a page.
#[derive(Debug)]
pub struct Body {
    tera: Tera,
}

impl Body {
    pub fn compile(source: &str, helper: Option<&PartialHelper>) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        if let Some(helper) = helper {
            tera.register_function(PARTIAL_FN, helper.clone());
        }
        tera.add_raw_template(BODY_TEMPLATE, source)?;

        Ok(Self { tera })
    }

    pub fn render(&self, data: &Map<String, JsonValue>) -> Result<String, tera::Error> {
        let context = Context::from_serialize(data)?;
        self.tera.render(BODY_TEMPLATE, &context)
    }
}

// =============================================================================
// Render data
// =============================================================================

/// Site-wide render inputs derived from the config once per build.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    /// Every config entry, as template data
    pub data: Map<String, JsonValue>,
    /// Whether rendered output is minified
    pub minify: bool,
}

impl SiteContext {
    pub fn from_config(config: &ConfigStore) -> Result<Self, RenderError> {
        let data = config
            .entries()
            .iter()
            .map(|(key, value)| -> Result<_, RenderError> {
                Ok((key.clone(), serde_json::to_value(value)?))
            })
            .collect::<Result<Map<_, _>, _>>()?;

        Ok(Self {
            data,
            minify: config.minify(),
        })
    }
}

/// Build the data a document renders against.
///
/// Starts from the site `config` and overlays `front_matter` on top, so a
/// page's own fields always win over site-wide values of the same name.
pub fn merge_context(
    config: &Map<String, JsonValue>,
    front_matter: Option<&Mapping>,
) -> Result<Map<String, JsonValue>, RenderError> {
    let mut data = config.clone();

    for (key, value) in front_matter.into_iter().flatten() {
        let Some(key) = key_string(key) else {
            tracing::debug!("skipping non-scalar front matter key {:?}", key);
            continue;
        };
        data.insert(key, serde_json::to_value(value)?);
    }

    Ok(data)
}

fn key_string(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
