use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigError, ConfigStore};

use super::assets::{AssetError, asset_specs, copy_dir};
use super::discover::content_files;
use super::document::DocumentError;
use super::paths::{default_output_dir, join_output, output_path};
use super::registry::{PartialHelper, TemplateRegistry};
use super::render::{RenderError, SiteContext};

/// Site config file, relative to the site root.
pub const CONFIG_FILE: &str = "config.yaml";
pub const TEMPLATES_DIR: &str = "templates";
pub const PARTIALS_DIR: &str = "partials";
pub const PAGES_DIR: &str = "pages";

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("output path '{url}' of {page} points outside the output directory")]
    OutsideOutput { page: PathBuf, url: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Build-time overrides.
#[derive(Debug, Clone, Default)]
pub struct BuildParameters {
    /// Config file merged over `config.yaml`, relative to the site root
    pub extra_config: Option<PathBuf>,
    /// Output directory instead of `dist-<siteName>` next to the site
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    pub pages: usize,
    pub templates: usize,
    pub partials: usize,
    pub assets: usize,
}

pub struct Builder {
    root: PathBuf,
    name: String,
    config: ConfigStore,
    params: BuildParameters,
}

impl Builder {
    pub fn new(root: PathBuf, name: String, config: ConfigStore, params: BuildParameters) -> Self {
        Self {
            root,
            name,
            config,
            params,
        }
    }

    /// Directory pages and assets are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.params
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.root, &self.name))
    }

    /// Run a full build. Any failure aborts the build; files already written
    /// are left in place.
    pub fn build(mut self) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Load config, merging the extra config over it
        // 2. Load partials into the partial helper
        // 3. Load templates
        // 4. Render and write each page
        // 5. Copy asset directories

        // Step 1: Config
        self.load_config()?;
        let site = Arc::new(SiteContext::from_config(&self.config)?);

        // Step 2: Partials
        let helper = PartialHelper::load(&self.root.join(PARTIALS_DIR), Arc::clone(&site))?;
        let partials = helper.partials().len();
        tracing::info!("registered {} partial(s)", partials);

        // Step 3: Templates
        let mut registry = TemplateRegistry::new(helper);
        let templates = registry.load_templates(&self.root.join(TEMPLATES_DIR))?;
        tracing::info!("loaded {} template(s)", templates);

        // Step 4: Pages
        let output_dir = self.output_dir();
        create_dir(&output_dir)?;

        let pages_dir = self.root.join(PAGES_DIR);
        let page_files = content_files(&pages_dir)?;
        for path in &page_files {
            tracing::info!("processing page {}", path.display());
            let page = registry.load_page(path, &pages_dir)?;

            let relative = output_path(&page);
            let target = join_output(&output_dir, &relative).ok_or_else(|| {
                BuildError::OutsideOutput {
                    page: path.clone(),
                    url: relative.clone(),
                }
            })?;
            tracing::info!("output path {}", target.display());

            let html = page.render(&site, &registry)?;
            write_file(&target, &html)?;
        }

        // Step 5: Assets
        let mut assets = 0;
        for spec in asset_specs(&self.config)? {
            let source = self.root.join(&spec.source);
            let dest = output_dir.join(&spec.dest);
            tracing::info!("copy {} -> {}", source.display(), dest.display());
            assets += copy_dir(&source, &dest)?;
        }

        tracing::info!("end");

        Ok(BuildResult {
            output_dir,
            pages: page_files.len(),
            templates,
            partials,
            assets,
        })
    }

    fn load_config(&mut self) -> Result<(), ConfigError> {
        let config_path = self.root.join(CONFIG_FILE);
        self.config.load(&config_path)?;

        if let Some(extra) = &self.params.extra_config {
            let extra_path = self.root.join(extra);
            tracing::info!("merging extra config {}", extra_path.display());
            self.config.merge_from(ConfigStore::from_file(&extra_path)?);
        }

        tracing::info!(
            "config loaded from {} (title: {})",
            config_path.display(),
            self.config.title().unwrap_or("untitled")
        );
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    std::fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A site at `<tmp>/site` building into `<tmp>/dist-site`.
    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(config: &str) -> Self {
            let fixture = Self {
                dir: TempDir::new().unwrap(),
            };
            std::fs::create_dir_all(fixture.root()).unwrap();
            fixture.write(CONFIG_FILE, config);
            fixture
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("site")
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.root().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn build(&self) -> Result<BuildResult, BuildError> {
            self.build_with(BuildParameters::default())
        }

        fn build_with(&self, params: BuildParameters) -> Result<BuildResult, BuildError> {
            Builder::new(self.root(), "site".into(), ConfigStore::new(), params).build()
        }

        fn output_path(&self, relative: &str) -> PathBuf {
            self.dir.path().join("dist-site").join(relative)
        }

        fn output(&self, relative: &str) -> String {
            std::fs::read_to_string(self.output_path(relative)).unwrap()
        }
    }

    #[test]
    fn test_page_front_matter_wins_over_config() {
        let site = Fixture::new("title: A\nauthor: Someone\n");
        site.write(
            "pages/index.html",
            "---\ntitle: B\n---\n<h1>{{ title }}</h1><p>{{ author }}</p>",
        );

        site.build().unwrap();
        assert_eq!(site.output("index.html"), "\n<h1>B</h1><p>Someone</p>");
    }

    #[test]
    fn test_page_rendered_inside_template() {
        let site = Fixture::new("title: Site\n");
        site.write(
            "templates/layout.html",
            "<title>{{ title }}</title><main>{{ content }}</main>",
        );
        site.write(
            "pages/about.html",
            "---\ntitle: About\ntemplate: layout.html\n---\n<p>{{ title }}</p>",
        );

        site.build().unwrap();
        assert_eq!(
            site.output("about.html"),
            "<title>About</title><main>\n<p>About</p></main>"
        );
    }

    #[test]
    fn test_missing_template_keeps_page_body() {
        let site = Fixture::new("title: Site\n");
        site.write("templates/layout.html", "<main>{{ content }}</main>");
        site.write("pages/p.html", "---\ntemplate: nope.html\n---\nbody");

        site.build().unwrap();
        assert_eq!(site.output("p.html"), "\nbody");
    }

    #[test]
    fn test_partials_render_against_config() {
        let site = Fixture::new("title: Site\n");
        site.write("partials/header.html", "<h1>{{ title }}</h1>");
        site.write(
            "templates/layout.html",
            "{{ partial(name=\"header.html\") }}{{ content }}",
        );
        site.write(
            "pages/index.html",
            "---\ntitle: Page\ntemplate: layout.html\n---\n{{ title }}{{ partial(name=\"none.html\") }}",
        );

        let result = site.build().unwrap();
        assert_eq!(result.partials, 1);
        assert_eq!(site.output("index.html"), "<h1>Site</h1>\nPage");
    }

    #[test]
    fn test_nested_pages_and_urls() {
        let site = Fixture::new("{}\n");
        site.write("pages/home.html", "---\nurl: /\n---\nhome");
        site.write("pages/blog/2024/first.html", "---\nurl: blog/first\n---\nfirst");
        site.write("pages/blog/loose.html", "loose");
        site.write("pages/feed.html", "---\nurl: /feed.xml\n---\n<rss/>");

        let result = site.build().unwrap();
        assert_eq!(result.pages, 4);
        assert_eq!(site.output("index.html"), "\nhome");
        assert_eq!(site.output("blog/first.html"), "\nfirst");
        // Without a url a nested page lands at the output root under its filename.
        assert_eq!(site.output("loose.html"), "loose");
        assert_eq!(site.output("feed.xml"), "\n<rss/>");
    }

    #[test]
    fn test_url_with_extra_leading_slash_stays_under_output() {
        let site = Fixture::new("{}\n");
        site.write("pages/p.html", "---\nurl: //about\n---\nx");

        site.build().unwrap();
        assert_eq!(site.output("about.html"), "\nx");
    }

    #[test]
    fn test_url_climbing_out_of_output_is_fatal() {
        let site = Fixture::new("{}\n");
        site.write("pages/p.html", "---\nurl: ../escaped\n---\nx");

        let err = site.build().unwrap_err();
        assert!(matches!(err, BuildError::OutsideOutput { .. }));
        assert!(err.to_string().contains("../escaped.html"));
        assert!(!site.dir.path().join("escaped.html").exists());
    }

    #[test]
    fn test_html_comment_in_template_without_front_matter() {
        let site = Fixture::new("{}\n");
        site.write(
            "templates/layout.html",
            "<!-- main layout -->\n<main>{{ content }}</main>",
        );
        site.write("pages/p.html", "---\ntemplate: layout.html\n---\n<p>x</p>");

        site.build().unwrap();
        assert!(site.output("p.html").ends_with("<main>\n<p>x</p></main>"));
    }

    #[test]
    fn test_partial_with_own_front_matter() {
        let site = Fixture::new("title: Site\n");
        site.write("partials/nav.html", "---\nlabel: Home\n---\n<a>{{ label }}</a>");
        site.write("pages/p.html", "{{ partial(name=\"nav.html\") }}");

        site.build().unwrap();
        assert_eq!(site.output("p.html"), "\n<a>Home</a>");
    }

    #[test]
    fn test_optional_field_with_default_filter() {
        let site = Fixture::new("title: Site\n");
        site.write(
            "templates/layout.html",
            "<meta content=\"{{ description | default(value=\"\") }}\">{{ content }}",
        );
        site.write("pages/a.html", "---\ntemplate: layout.html\ndescription: About\n---\na");
        site.write("pages/b.html", "---\ntemplate: layout.html\n---\nb");

        site.build().unwrap();
        assert_eq!(site.output("a.html"), "<meta content=\"About\">\na");
        assert_eq!(site.output("b.html"), "<meta content=\"\">\nb");
    }

    #[test]
    fn test_copy_assets_plain_and_renamed() {
        let site = Fixture::new("copyAssets:\n  - assets\n  - [src, dst]\n");
        site.write("assets/css/site.css", "body{}");
        site.write("src/js/app.js", "run()");

        let result = site.build().unwrap();
        assert_eq!(result.assets, 2);
        assert_eq!(site.output("assets/css/site.css"), "body{}");
        assert_eq!(site.output("dst/js/app.js"), "run()");
        assert!(!site.output_path("src").exists());
    }

    #[test]
    fn test_missing_asset_source_is_fatal() {
        let site = Fixture::new("copyAssets: [missing]\n");

        let err = site.build().unwrap_err();
        assert!(matches!(err, BuildError::Asset(AssetError::MissingSource(_))));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_minify_flag() {
        let page = "<html>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";

        let plain = Fixture::new("minify: false\n");
        plain.write("pages/p.html", page);
        plain.build().unwrap();

        let minified = Fixture::new("minify: true\n");
        minified.write("pages/p.html", page);
        minified.build().unwrap();

        assert_eq!(plain.output("p.html"), page);
        let out = minified.output("p.html");
        assert!(out.len() < page.len());
        assert!(out.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_extra_config_overrides_base() {
        let site = Fixture::new("title: Base\nauthor: Someone\n");
        site.write("prod.yaml", "title: Prod\n");
        site.write("pages/p.html", "{{ title }} by {{ author }}");

        site.build_with(BuildParameters {
            extra_config: Some("prod.yaml".into()),
            output_dir: None,
        })
        .unwrap();
        assert_eq!(site.output("p.html"), "Prod by Someone");
    }

    #[test]
    fn test_missing_extra_config_is_fatal() {
        let site = Fixture::new("title: Base\n");

        let err = site
            .build_with(BuildParameters {
                extra_config: Some("nope.yaml".into()),
                output_dir: None,
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::Read { .. })));
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let site = Fixture::new("");
        std::fs::remove_file(site.root().join(CONFIG_FILE)).unwrap();

        let err = site.build().unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::Read { .. })));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_malformed_page_is_fatal() {
        let site = Fixture::new("{}\n");
        site.write("pages/good.html", "fine");
        site.write("pages/zz-bad.html", "---\ntitle: [oops\n---\nbody");

        let err = site.build().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Document(DocumentError::FrontMatter { .. })
        ));
        assert!(err.to_string().contains("zz-bad.html"));
    }

    #[test]
    fn test_undefined_variable_is_fatal() {
        let site = Fixture::new("{}\n");
        site.write("pages/p.html", "{{ nowhere }}");

        let err = site.build().unwrap_err();
        assert!(matches!(err, BuildError::Render(RenderError::Template { .. })));
    }

    #[test]
    fn test_output_dir_override() {
        let site = Fixture::new("{}\n");
        site.write("pages/p.html", "x");
        let out = site.dir.path().join("public");

        let result = site
            .build_with(BuildParameters {
                extra_config: None,
                output_dir: Some(out.clone()),
            })
            .unwrap();
        assert_eq!(result.output_dir, out);
        assert_eq!(std::fs::read_to_string(out.join("p.html")).unwrap(), "x");
        assert!(!site.output_path("p.html").exists());
    }

    #[test]
    fn test_empty_site_builds() {
        let site = Fixture::new("");

        let result = site.build().unwrap();
        assert_eq!(result.pages, 0);
        assert_eq!(result.templates, 0);
        assert_eq!(result.partials, 0);
        assert_eq!(result.assets, 0);
        assert!(result.output_dir.is_dir());
    }
}
