//! HTML minification for rendered pages.

/// Minify rendered HTML: collapse whitespace, drop comments, minify inline
/// CSS and JS. Closing tags and the `<html>`/`<head>` openers are kept so
/// the output stays readable by strict parsers.
pub fn minify_html(html: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;

    let minified = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8_lossy(&minified).into_owned()
}
