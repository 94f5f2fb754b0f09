use std::fs;

use anyhow::anyhow;
use mdpane::renderer::{MarkdownRenderer, MarkupRenderer};
use mdpane::viewport::Viewport;
use mdpane::vscroll::{RenderMode, VirtualScrollConfig, VirtualScrollRenderer};

fn load_fixture() -> String {
    fs::read_to_string("tests/fixtures/notes.md").expect("fixture should exist")
}

/// A Markdown document with `lines` one-sentence paragraphs, one per line.
fn large_document(lines: usize) -> String {
    let _ = env_logger::try_init();
    (0..lines)
        .map(|i| format!("Paragraph number {i}.\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scenario viewport: scroll_y=5000, 800x600, 20px lines.
fn viewport(scroll_y: f64, total_lines: usize) -> Viewport {
    Viewport {
        scroll_x: 0.0,
        scroll_y,
        width: 800.0,
        height: 600.0,
        document_width: 800.0,
        document_height: total_lines as f64 * 20.0,
        line_height: 20.0,
    }
}

#[test]
fn test_small_fixture_renders_fully() {
    let markdown = load_fixture();
    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let config = VirtualScrollConfig::default();

    let view = vs.render_viewport(&markdown, &viewport(0.0, 20), &config);

    assert_eq!(view.mode, RenderMode::Full);
    assert_eq!(view.offset_px, 0.0);
    assert!(
        view.html.contains("<h1>Release notes</h1>"),
        "full render should contain the document heading"
    );
    assert!(view.html.contains("<li>"), "list items should render");
    assert_eq!(vs.statistics(&config).render_ratio, 100.0);
}

#[test]
fn test_large_document_renders_partially() {
    // 2000 source lines (each paragraph is a line plus a blank separator)
    let markdown = large_document(1000);
    let total_lines = markdown.split('\n').count();
    assert!(total_lines >= 500, "test document must cross the threshold");

    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let config = VirtualScrollConfig::default();
    assert!(vs.should_use_virtual_scrolling(&markdown, &config));

    let view = vs.render_viewport(&markdown, &viewport(5000.0, total_lines), &config);

    let RenderMode::Partial {
        start_line,
        end_line,
    } = view.mode
    else {
        panic!("expected a partial render, got {:?}", view.mode);
    };
    assert_eq!((start_line, end_line), (240, 291));
    assert_eq!(view.offset_px, 240.0 * 20.0);

    // Source line 240 is paragraph 120 (paragraphs alternate with blanks)
    assert!(
        view.html.contains("Paragraph number 120."),
        "window content should be rendered"
    );
    assert!(
        !view.html.contains("Paragraph number 400."),
        "content far outside the window should not be rendered"
    );

    let stats = vs.statistics(&config);
    assert_eq!(stats.rendered_lines, end_line - start_line);
    assert!(stats.rendered_lines <= stats.total_lines);
    assert!(stats.render_ratio > 0.0 && stats.render_ratio <= 100.0);
}

#[test]
fn test_scrolling_moves_the_window() {
    let markdown = large_document(1000);
    let total_lines = markdown.split('\n').count();
    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let config = VirtualScrollConfig::default();

    let top = vs.render_viewport(&markdown, &viewport(0.0, total_lines), &config);
    let further = vs.render_viewport(&markdown, &viewport(20_000.0, total_lines), &config);

    assert!(top.html.contains("Paragraph number 0."));
    assert!(!further.html.contains("Paragraph number 0."));
    assert!(further.offset_px > top.offset_px);
}

#[test]
fn test_disabling_virtual_scrolling_renders_everything() {
    let markdown = large_document(1000);
    let total_lines = markdown.split('\n').count();
    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let config = VirtualScrollConfig::default();

    vs.enable(false);
    let view = vs.render_viewport(&markdown, &viewport(5000.0, total_lines), &config);
    assert_eq!(view.mode, RenderMode::Full);
    assert!(view.html.contains("Paragraph number 0."));
    assert!(view.html.contains("Paragraph number 999."));
}

// ---------------------------------------------------------------------------
// Fallback path, end to end
// ---------------------------------------------------------------------------

/// Stand-in for a markup engine that fails on every document.
struct BrokenEngine;

impl MarkupRenderer for BrokenEngine {
    fn render_html(&self, _source: &str) -> anyhow::Result<String> {
        Err(anyhow!("markup engine unavailable"))
    }
}

#[test]
fn test_broken_engine_degrades_to_escaped_text() {
    let markdown = "# Title with <angle> & ampersand\n";
    let mut vs = VirtualScrollRenderer::new(BrokenEngine);
    let config = VirtualScrollConfig::default();

    let view = vs.render_viewport(markdown, &viewport(0.0, 1), &config);

    assert_eq!(view.mode, RenderMode::Full);
    assert!(view.html.starts_with("<pre>"));
    assert!(view.html.contains("# Title with &lt;angle&gt; &amp; ampersand"));
}

#[test]
fn test_broken_engine_partial_fallback_keeps_position() {
    let markdown = large_document(1000);
    let total_lines = markdown.split('\n').count();
    let mut vs = VirtualScrollRenderer::new(BrokenEngine);
    let config = VirtualScrollConfig::default();

    let view = vs.render_viewport(&markdown, &viewport(5000.0, total_lines), &config);

    assert!(view.html.starts_with("<pre data-start-line=\"240\" data-end-line=\"291\">"));
    assert_eq!(view.offset_px, 240.0 * 20.0);
    assert_eq!(vs.statistics(&config).rendered_lines, 51);
}
