//! CSS assembly for the extracted backdrop colors.

use crate::backdrop::palette::Rgb;

/// CSS color literal. Alphas in `[0, 1)` render as `rgba()`, anything else
/// as opaque `rgb()`.
pub fn color_to_str(color: Rgb, alpha: f64) -> String {
    if (0.0..1.0).contains(&alpha) {
        format!("rgba({},{},{},{})", color.r, color.g, color.b, alpha)
    } else {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    }
}

fn gradient(angle: u32, color: Rgb) -> String {
    format!(
        "linear-gradient({angle}deg,{},{} 70%)",
        color_to_str(color, 0.8),
        color_to_str(color, 0.0),
    )
}

/// Layers the three colors into the backdrop background: each one fades out
/// at 70% along its own angle.
pub fn backdrop_css(colors: [Rgb; 3]) -> String {
    format!(
        "{},{},{}",
        gradient(15, colors[0]),
        gradient(255, colors[1]),
        gradient(135, colors[2]),
    )
}
