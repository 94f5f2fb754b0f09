#![no_main]

use anyhow::anyhow;
use libfuzzer_sys::fuzz_target;
use mdpane::renderer::{MarkdownRenderer, MarkupRenderer};
use mdpane::viewport::Viewport;
use mdpane::vscroll::{VirtualScrollConfig, VirtualScrollRenderer};

struct BrokenEngine;

impl MarkupRenderer for BrokenEngine {
    fn render_html(&self, _source: &str) -> anyhow::Result<String> {
        Err(anyhow!("fuzzed failure"))
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Geometry derived from the input so the full/partial decision and the
    // clamp both get exercised
    let scroll_y = (data.len() as f64) * 7.0;
    let viewport = Viewport {
        scroll_x: 0.0,
        scroll_y,
        width: 640.0,
        height: 480.0,
        document_width: 640.0,
        document_height: scroll_y + 480.0,
        line_height: 16.0,
    };
    let config = VirtualScrollConfig {
        min_lines_for_virtual: 8,
        buffer_lines: 2,
        ..VirtualScrollConfig::default()
    };

    let mut vs = VirtualScrollRenderer::new(MarkdownRenderer::new());
    let view = vs.render_viewport(source, &viewport, &config);
    let stats = vs.statistics(&config);
    assert!(stats.rendered_lines <= stats.total_lines);
    assert!((0.0..=100.0).contains(&stats.render_ratio));
    assert!(view.offset_px >= 0.0);

    // The fallback path must also return, never propagate
    let mut broken = VirtualScrollRenderer::new(BrokenEngine);
    let fallback = broken.render_viewport(source, &viewport, &config);
    assert!(fallback.html.starts_with("<pre"));
});
