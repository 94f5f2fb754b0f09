//! Virtual-scroll render orchestration.
//!
//! Per render call: decide full vs. windowed rendering from the document's
//! line count, slice the visible range (plus buffer) for windowed renders,
//! invoke the markup renderer on only that slice, and report the pixel
//! offset at which the fragment belongs. A failing markup renderer is
//! always converted into an escaped `<pre>` fallback — the caller sees
//! HTML either way, never an error.
//!
//! The renderer is synchronous and single-threaded: each call runs to
//! completion and mutates only the statistics fields. Debouncing of rapid
//! render requests and discarding of stale results are caller
//! responsibilities.

use std::time::Instant;

use log::{debug, info, warn};

use crate::renderer::MarkupRenderer;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for virtual scrolling. Plain data, owned by the embedding
/// caller and read by the renderer on every call, so live edits (e.g. from
/// a settings dialog) take effect immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualScrollConfig {
    /// Extra lines rendered above and below the visible window to mask
    /// scroll latency.
    pub buffer_lines: usize,
    /// Documents shorter than this are always rendered in full.
    pub min_lines_for_virtual: usize,
    /// Line height in pixels used for offset math until a real
    /// measurement arrives via `update_line_height`.
    pub estimated_line_height: f64,
    /// Advisory cap on the windowed range. Not enforced; exceeding it is
    /// logged so oversized windows show up in diagnostics.
    pub max_render_lines: usize,
}

impl Default for VirtualScrollConfig {
    fn default() -> Self {
        Self {
            buffer_lines: 10,
            min_lines_for_virtual: 500,
            estimated_line_height: 20.0,
            max_render_lines: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Render results
// ---------------------------------------------------------------------------

/// How a render call was executed, decided once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// The whole document was rendered; the fragment sits at offset 0.
    Full,
    /// Only `[start_line, end_line)` was rendered (range already clamped
    /// to the document's line count).
    Partial { start_line: usize, end_line: usize },
}

/// Output of a render call: the HTML fragment and the vertical pixel
/// offset at which the caller should position it inside the scrollable
/// container.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub html: String,
    pub offset_px: f64,
    pub mode: RenderMode,
}

/// Snapshot of the most recent render call's line counts plus the
/// renderer's current settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStatistics {
    pub total_lines: usize,
    pub rendered_lines: usize,
    /// Percentage of the document rendered, rounded to 2 decimals.
    pub render_ratio: f64,
    pub enabled: bool,
    pub estimated_line_height: f64,
    /// Caller-reported measurement; `None` until `update_line_height`.
    pub actual_line_height: Option<f64>,
}

// ---------------------------------------------------------------------------
// VirtualScrollRenderer
// ---------------------------------------------------------------------------

/// Windowed HTML renderer over a markup-to-HTML capability.
///
/// Constructed once per preview session. Holds no resources needing
/// teardown; stays usable after any render failure.
pub struct VirtualScrollRenderer<R: MarkupRenderer> {
    renderer: R,
    enabled: bool,
    total_lines: usize,
    rendered_lines: usize,
    actual_line_height: Option<f64>,
}

impl<R: MarkupRenderer> VirtualScrollRenderer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            enabled: true,
            total_lines: 0,
            rendered_lines: 0,
            actual_line_height: None,
        }
    }

    /// Toggle virtual scrolling. Idempotent; takes effect on the next
    /// render call (there is no in-flight render to interrupt).
    pub fn enable(&mut self, flag: bool) {
        if self.enabled != flag {
            debug!("vscroll: enabled {} → {}", self.enabled, flag);
        }
        self.enabled = flag;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Report the line height actually measured after a real paint.
    /// Used preferentially over the configured estimate for offset math
    /// on subsequent renders; completed renders are not revisited.
    /// Non-finite or non-positive measurements are ignored.
    pub fn update_line_height(&mut self, measured_px: f64) {
        if !measured_px.is_finite() || measured_px <= 0.0 {
            debug!("vscroll: ignoring degenerate line height measurement {measured_px}");
            return;
        }
        debug!(
            "vscroll: line height measured {measured_px:.2}px (was {:?})",
            self.actual_line_height
        );
        self.actual_line_height = Some(measured_px);
    }

    /// Whether a render of `source` would use the windowed path:
    /// enabled AND the document reaches `min_lines_for_virtual`.
    pub fn should_use_virtual_scrolling(
        &self,
        source: &str,
        config: &VirtualScrollConfig,
    ) -> bool {
        self.enabled && count_lines(source) >= config.min_lines_for_virtual
    }

    /// Render the part of `source` relevant to `viewport`.
    ///
    /// Small or disabled → full render at offset 0. Otherwise the visible
    /// line range (plus buffer) is clamped to the document, sliced, and
    /// rendered alone, with the fragment offset at
    /// `start_line * effective line height`.
    ///
    /// The markup renderer failing is never surfaced: the (possibly
    /// sliced) source comes back HTML-escaped in a `<pre>` block at the
    /// same offset the successful render would have used.
    pub fn render_viewport(
        &mut self,
        source: &str,
        viewport: &Viewport,
        config: &VirtualScrollConfig,
    ) -> RenderedView {
        let start = Instant::now();
        let total_lines = count_lines(source);
        self.total_lines = total_lines;

        if !self.enabled || total_lines < config.min_lines_for_virtual {
            self.rendered_lines = total_lines;
            let html = match self.renderer.render_html(source) {
                Ok(html) => html,
                Err(e) => {
                    warn!("vscroll: full render failed, falling back to escaped text: {e:#}");
                    fallback_html(source, None)
                }
            };
            info!(
                "vscroll: full render, {} lines in {:.1}ms",
                total_lines,
                start.elapsed().as_secs_f64() * 1000.0
            );
            return RenderedView {
                html,
                offset_px: 0.0,
                mode: RenderMode::Full,
            };
        }

        // Windowed path. The viewport's range is unclamped at the top end;
        // this is the system-of-record clamp for slicing and statistics.
        let (raw_start, raw_end) = viewport.visible_line_range(config.buffer_lines);
        let start_line = raw_start.min(total_lines);
        let end_line = raw_end.min(total_lines).max(start_line);
        self.rendered_lines = end_line - start_line;

        if self.rendered_lines > config.max_render_lines {
            debug!(
                "vscroll: window of {} lines exceeds max_render_lines={}",
                self.rendered_lines, config.max_render_lines
            );
        }

        let slice: String = source
            .split('\n')
            .skip(start_line)
            .take(end_line - start_line)
            .collect::<Vec<_>>()
            .join("\n");
        let offset_px = start_line as f64 * self.effective_line_height(config);

        let html = match self.renderer.render_html(&slice) {
            Ok(html) => html,
            Err(e) => {
                warn!(
                    "vscroll: partial render of lines {start_line}..{end_line} failed, \
                     falling back to escaped text: {e:#}"
                );
                fallback_html(&slice, Some((start_line, end_line)))
            }
        };

        info!(
            "vscroll: partial render, lines {start_line}..{end_line} of {} ({:.2}%) in {:.1}ms",
            total_lines,
            ratio_percent(self.rendered_lines, total_lines),
            start.elapsed().as_secs_f64() * 1000.0
        );

        RenderedView {
            html,
            offset_px,
            mode: RenderMode::Partial {
                start_line,
                end_line,
            },
        }
    }

    /// Statistics for the most recently attempted render (fallbacks
    /// included), plus current enabled flag and line heights.
    pub fn statistics(&self, config: &VirtualScrollConfig) -> RenderStatistics {
        RenderStatistics {
            total_lines: self.total_lines,
            rendered_lines: self.rendered_lines,
            render_ratio: ratio_percent(self.rendered_lines, self.total_lines),
            enabled: self.enabled,
            estimated_line_height: config.estimated_line_height,
            actual_line_height: self.actual_line_height,
        }
    }

    /// Measured line height if reported, else the configured estimate.
    fn effective_line_height(&self, config: &VirtualScrollConfig) -> f64 {
        self.actual_line_height
            .unwrap_or(config.estimated_line_height)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Newline-delimited segment count: N newlines → N+1 lines.
fn count_lines(source: &str) -> usize {
    source.split('\n').count()
}

/// `100 * rendered / total`, rounded to 2 decimals; 0.0 for an empty
/// document.
fn ratio_percent(rendered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (rendered as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Escaped-text fallback shown when the markup renderer fails. Partial
/// renders carry the clamped line range as data attributes so callers can
/// still position the block.
fn fallback_html(source: &str, range: Option<(usize, usize)>) -> String {
    let escaped = escape_html(source);
    match range {
        Some((start_line, end_line)) => format!(
            "<pre data-start-line=\"{start_line}\" data-end-line=\"{end_line}\">{escaped}</pre>"
        ),
        None => format!("<pre>{escaped}</pre>"),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
