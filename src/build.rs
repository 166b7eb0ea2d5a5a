mod assets;
mod builder;
mod discover;
mod document;
mod minify;
mod paths;
mod registry;
mod render;

pub use builder::{
    BuildError, BuildParameters, BuildResult, Builder, CONFIG_FILE, PAGES_DIR, PARTIALS_DIR,
    TEMPLATES_DIR,
};
pub use paths::site_name;
