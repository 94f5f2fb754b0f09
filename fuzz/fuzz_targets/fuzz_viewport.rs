#![no_main]

use libfuzzer_sys::fuzz_target;
use mdpane::viewport::Viewport;

fn f64_at(data: &[u8], i: usize) -> f64 {
    let mut bytes = [0u8; 8];
    for (j, out) in bytes.iter_mut().enumerate() {
        *out = *data.get(i * 8 + j).unwrap_or(&0);
    }
    f64::from_le_bytes(bytes)
}

fuzz_target!(|data: &[u8]| {
    let viewport = Viewport {
        scroll_x: f64_at(data, 0),
        scroll_y: f64_at(data, 1),
        width: f64_at(data, 2),
        height: f64_at(data, 3),
        document_width: f64_at(data, 4),
        document_height: f64_at(data, 5),
        line_height: f64_at(data, 6),
    };
    let buffer_lines = *data.get(56).unwrap_or(&0) as usize;

    let (start, end) = viewport.visible_line_range(buffer_lines);
    assert!(start <= end, "range must be ordered: {start}..{end}");

    if viewport.line_height <= 0.0 || !viewport.line_height.is_finite() {
        assert_eq!((start, end), (0, 0), "degenerate geometry must be empty");
        assert!(!viewport.is_line_visible(0, buffer_lines));
    }

    // Pure function: recomputation agrees
    assert_eq!((start, end), viewport.visible_line_range(buffer_lines));
});
