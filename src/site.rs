//! A site on disk: its root, name, config and build parameters.

use std::path::{Path, PathBuf};

use crate::build::{
    BuildError, BuildParameters, BuildResult, Builder, CONFIG_FILE, PAGES_DIR, PARTIALS_DIR,
    TEMPLATES_DIR, site_name,
};
use crate::config::{COPY_ASSETS_KEY, ConfigError, ConfigStore, MINIFY_KEY, TITLE_KEY};

const ASSETS_DIR: &str = "assets";

const LAYOUT_TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{ title }}</title>
  <meta name="description" content="{{ description | default(value="") }}">
  <link rel="stylesheet" href="/assets/style.css">
</head>
<body>
  {{ partial(name="header.html") }}
  <main>{{ content }}</main>
</body>
</html>
"#;

const HEADER_PARTIAL: &str = r#"<header><a href="/">{{ title }}</a></header>
"#;

const INDEX_PAGE: &str = r#"---
url: /
template: layout.html
---
<h1>Welcome to {{ title }}</h1>
<p>Edit pages/index.html to get started.</p>
"#;

const STYLESHEET: &str = "body {\n  font-family: sans-serif;\n  margin: 0 auto;\n  max-width: 40rem;\n}\n";

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("a site already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write default config: {0}")]
    Config(#[from] ConfigError),
}

pub struct Site {
    root: PathBuf,
    name: String,
    config: ConfigStore,
    params: BuildParameters,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, params: BuildParameters) -> Self {
        let root = root.into();
        let name = site_name(&root);
        Self {
            root,
            name,
            config: ConfigStore::new(),
            params,
        }
    }

    /// The last segment of the site root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scaffold a new site: the content directories, a default config and a
    /// starter layout, header partial, index page and stylesheet.
    ///
    /// Fails without touching anything if the root already holds a config.
    pub async fn create(mut self) -> Result<PathBuf, CreateError> {
        let config_path = self.root.join(CONFIG_FILE);
        if tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
            return Err(CreateError::AlreadyExists(self.root));
        }

        for dir in [TEMPLATES_DIR, PARTIALS_DIR, PAGES_DIR, ASSETS_DIR] {
            create_dir(&self.root.join(dir)).await?;
        }

        self.config.set(TITLE_KEY, self.name.as_str());
        self.config.add_to_array(COPY_ASSETS_KEY, ASSETS_DIR);
        self.config.set(MINIFY_KEY, false);
        self.config.save(&config_path)?;
        tracing::info!("created {}", config_path.display());

        let files = [
            (Path::new(TEMPLATES_DIR).join("layout.html"), LAYOUT_TEMPLATE),
            (Path::new(PARTIALS_DIR).join("header.html"), HEADER_PARTIAL),
            (Path::new(PAGES_DIR).join("index.html"), INDEX_PAGE),
            (Path::new(ASSETS_DIR).join("style.css"), STYLESHEET),
        ];
        for (relative, content) in files {
            let path = self.root.join(relative);
            tokio::fs::write(&path, content)
                .await
                .map_err(|source| CreateError::Io {
                    path: path.clone(),
                    source,
                })?;
            tracing::info!("created {}", path.display());
        }

        Ok(self.root)
    }

    /// Build the site into its output directory.
    pub fn build(self) -> Result<BuildResult, BuildError> {
        tracing::info!("building site '{}' from {}", self.name, self.root.display());
        Builder::new(self.root, self.name, self.config, self.params).build()
    }
}

async fn create_dir(path: &Path) -> Result<(), CreateError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| CreateError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_site_name_from_root() {
        let site = Site::new("/srv/sites/blog", BuildParameters::default());
        assert_eq!(site.name(), "blog");
        assert_eq!(Site::new("blog/", BuildParameters::default()).name(), "blog");
    }

    #[tokio::test]
    async fn test_create_scaffolds_site() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("blog");

        Site::new(&root, BuildParameters::default())
            .create()
            .await
            .unwrap();

        for sub in [TEMPLATES_DIR, PARTIALS_DIR, PAGES_DIR, ASSETS_DIR] {
            assert!(root.join(sub).is_dir(), "{sub} missing");
        }

        let config = ConfigStore::from_file(&root.join(CONFIG_FILE)).unwrap();
        assert_eq!(config.title(), Some("blog"));
        assert!(!config.minify());
        assert_eq!(
            config.get(COPY_ASSETS_KEY),
            &serde_yaml::Value::Sequence(vec!["assets".into()])
        );
    }

    #[tokio::test]
    async fn test_create_refuses_existing_config() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("blog");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join(CONFIG_FILE), "title: Mine\n").unwrap();

        let err = Site::new(&root, BuildParameters::default())
            .create()
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::AlreadyExists(_)));
        assert_eq!(
            std::fs::read_to_string(root.join(CONFIG_FILE)).unwrap(),
            "title: Mine\n"
        );
        assert!(!root.join(PAGES_DIR).exists());
    }

    #[tokio::test]
    async fn test_created_site_builds() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("blog");
        Site::new(&root, BuildParameters::default())
            .create()
            .await
            .unwrap();

        let result = Site::new(&root, BuildParameters::default()).build().unwrap();
        assert_eq!(result.output_dir, dir.path().join("dist-blog"));
        assert_eq!((result.pages, result.templates, result.partials), (1, 1, 1));
        assert_eq!(result.assets, 1);

        let index = std::fs::read_to_string(result.output_dir.join("index.html")).unwrap();
        assert!(index.contains("<title>blog</title>"));
        // Pages without a description fall back to the default filter.
        assert!(index.contains(r#"<meta name="description" content="">"#));
        assert!(index.contains(r#"<header><a href="/">blog</a></header>"#));
        assert!(index.contains("<h1>Welcome to blog</h1>"));
        assert!(result.output_dir.join("assets/style.css").is_file());
    }
}
