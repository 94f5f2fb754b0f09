//! Markup-to-HTML renderer capability.
//!
//! The virtual-scroll core only needs one operation from its collaborator:
//! "convert a markup string to an HTML string, may fail". Keeping it a
//! single-method trait lets unit tests drive the core with deterministic
//! fakes instead of a real markup engine.

use std::time::Instant;

use anyhow::Result;
use log::info;
use pulldown_cmark::{Options, Parser, html};

/// External renderer capability wrapped by the virtual-scroll core.
pub trait MarkupRenderer {
    /// Convert markup source to an HTML fragment.
    fn render_html(&self, source: &str) -> Result<String>;
}

/// Markdown renderer backed by pulldown-cmark.
///
/// Tables and strikethrough are enabled; everything else is CommonMark.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupRenderer for MarkdownRenderer {
    fn render_html(&self, source: &str) -> Result<String> {
        let start = Instant::now();
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(source, options);

        let mut output = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut output, parser);

        info!(
            "renderer: markdown → html in {:.1}ms ({} bytes in, {} bytes out)",
            start.elapsed().as_secs_f64() * 1000.0,
            source.len(),
            output.len()
        );
        Ok(output)
    }
}
