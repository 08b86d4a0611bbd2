use fontdue::Font;

use vitrine_engine::coords::ColorRgba;

/// Rasterization scale: glyphs are rendered at twice the requested pixel size
/// and the billboard samples the result back down through its mip chain.
const SUPERSAMPLE: f32 = 2.0;

/// Blank border around the rasterized text, in (supersampled) pixels.
const PADDING_PX: usize = 8;

/// Billboard height as a fraction of the parent plane height.
const HEIGHT_FRACTION: f32 = 0.15;

/// World-unit gap between the card's bottom edge and the billboard.
const GAP: f32 = 0.05;

/// CPU-side caption texture: straight-alpha RGBA with text color baked in.
///
/// An empty bitmap (zero dimensions) is the degraded form used when no usable
/// font is available; it renders as nothing and never blocks the card.
#[derive(Debug, Clone, Default)]
pub struct CaptionBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl CaptionBitmap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rasterizes `text` into a caption bitmap.
///
/// Single-line layout: glyphs advance horizontally on a common baseline, with
/// the canvas sized from the font's line metrics plus fixed padding. Any
/// failure (no font, no line metrics, degenerate text) degrades to an empty
/// bitmap.
pub fn rasterize(font: Option<&Font>, text: &str, px: f32, color: ColorRgba) -> CaptionBitmap {
    let Some(font) = font else {
        return CaptionBitmap::default();
    };
    if text.is_empty() || px <= 0.0 {
        return CaptionBitmap::default();
    }

    let size = px * SUPERSAMPLE;
    let Some(line) = font.horizontal_line_metrics(size) else {
        return CaptionBitmap::default();
    };

    let ascent = line.ascent.ceil() as i32;
    let descent = (-line.descent).ceil() as i32;

    let text_width: f32 = text
        .chars()
        .map(|ch| font.metrics(ch, size).advance_width)
        .sum();

    let width = text_width.ceil() as usize + 2 * PADDING_PX;
    let height = (ascent + descent).max(0) as usize + 2 * PADDING_PX;
    if text_width <= 0.0 || height == 0 {
        return CaptionBitmap::default();
    }

    let [r, g, b, a] = color.to_u8();
    let mut rgba = vec![0u8; width * height * 4];

    let mut pen = PADDING_PX as f32;
    for ch in text.chars() {
        let (metrics, coverage) = font.rasterize(ch, size);

        let x0 = (pen + metrics.xmin as f32).round() as i32;
        let y0 = PADDING_PX as i32 + ascent - metrics.ymin - metrics.height as i32;

        for (row, chunk) in coverage.chunks_exact(metrics.width.max(1)).enumerate() {
            let y = y0 + row as i32;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for (col, &cov) in chunk.iter().enumerate() {
                let x = x0 + col as i32;
                if cov == 0 || x < 0 || x >= width as i32 {
                    continue;
                }
                let i = (y as usize * width + x as usize) * 4;
                let alpha = (cov as u16 * a as u16 / 255) as u8;
                rgba[i] = r;
                rgba[i + 1] = g;
                rgba[i + 2] = b;
                // Overlapping glyph edges keep the stronger coverage.
                rgba[i + 3] = rgba[i + 3].max(alpha);
            }
        }

        pen += metrics.advance_width;
    }

    CaptionBitmap {
        width: width as u32,
        height: height as u32,
        rgba,
    }
}

/// Builds the full mip chain for an RGBA bitmap, level 0 included.
///
/// Each level box-filters the previous one at half resolution (floor, min 1)
/// down to 1×1. Used so the caption texture can be uploaded mipmapped and
/// sampled without shimmer at small on-screen sizes.
pub fn mip_chain(width: u32, height: u32, rgba: &[u8]) -> Vec<(u32, u32, Vec<u8>)> {
    let mut levels = vec![(width, height, rgba.to_vec())];

    while let Some((w, h, data)) = levels.last() {
        if *w <= 1 && *h <= 1 {
            break;
        }
        let next = half_level(*w, *h, data);
        levels.push(next);
    }

    levels
}

fn half_level(w: u32, h: u32, data: &[u8]) -> (u32, u32, Vec<u8>) {
    let nw = (w / 2).max(1);
    let nh = (h / 2).max(1);
    let mut out = vec![0u8; (nw * nh * 4) as usize];

    for y in 0..nh {
        for x in 0..nw {
            for c in 0..4usize {
                let mut sum = 0u32;
                for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                    // Clamp so odd source dimensions reuse the edge texel.
                    let sx = (2 * x + dx).min(w - 1);
                    let sy = (2 * y + dy).min(h - 1);
                    sum += data[((sy * w + sx) * 4) as usize + c] as u32;
                }
                out[((y * nw + x) * 4) as usize + c] = (sum / 4) as u8;
            }
        }
    }

    (nw, nh, out)
}

/// World-space size and vertical offset of a caption billboard relative to
/// its parent card.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CaptionPlacement {
    pub width: f32,
    pub height: f32,
    /// Offset from the card center to the billboard center (negative = below).
    pub offset_y: f32,
}

/// Sizes the billboard to a fixed fraction of the parent plane height,
/// preserving the bitmap's aspect ratio, just below the card's bottom edge.
///
/// An empty bitmap yields a zero-size placement.
pub fn place(plane_height: f32, bitmap: &CaptionBitmap) -> CaptionPlacement {
    if bitmap.is_empty() || plane_height <= 0.0 {
        return CaptionPlacement::default();
    }

    let height = plane_height * HEIGHT_FRACTION;
    let aspect = bitmap.width as f32 / bitmap.height as f32;

    CaptionPlacement {
        width: height * aspect,
        height,
        offset_y: -plane_height / 2.0 - height / 2.0 - GAP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(w: u32, h: u32) -> CaptionBitmap {
        CaptionBitmap {
            width: w,
            height: h,
            rgba: vec![0; (w * h * 4) as usize],
        }
    }

    // ── rasterize degradation ─────────────────────────────────────────────

    #[test]
    fn no_font_degrades_to_empty() {
        let out = rasterize(None, "Lumiere", 30.0, ColorRgba::white());
        assert!(out.is_empty());
        assert!(out.rgba.is_empty());
    }

    // ── mip chain ─────────────────────────────────────────────────────────

    #[test]
    fn mip_levels_halve_down_to_one() {
        let levels = mip_chain(8, 4, &vec![255; 8 * 4 * 4]);
        let dims: Vec<(u32, u32)> = levels.iter().map(|(w, h, _)| (*w, *h)).collect();
        assert_eq!(dims, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_level_zero_is_the_source() {
        let src = vec![7u8; 2 * 2 * 4];
        let levels = mip_chain(2, 2, &src);
        assert_eq!(levels[0].2, src);
    }

    #[test]
    fn mip_box_filter_averages() {
        // 2×2 with one opaque white texel → 1×1 quarter-bright average.
        let mut src = vec![0u8; 2 * 2 * 4];
        src[0..4].copy_from_slice(&[255, 255, 255, 255]);
        let levels = mip_chain(2, 2, &src);
        let (w, h, data) = &levels[1];
        assert_eq!((*w, *h), (1, 1));
        assert_eq!(&data[..], &[63, 63, 63, 63]);
    }

    #[test]
    fn mip_of_single_texel_terminates() {
        let levels = mip_chain(1, 1, &[1, 2, 3, 4]);
        assert_eq!(levels.len(), 1);
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn placement_is_a_fraction_of_plane_height() {
        let p = place(10.0, &bitmap(200, 50));
        assert!((p.height - 1.5).abs() < 1e-6);
        assert!((p.width - 6.0).abs() < 1e-6);
        // Just below the bottom edge: half plane + half billboard + gap.
        assert!((p.offset_y + 5.0 + 0.75 + 0.05).abs() < 1e-6);
    }

    #[test]
    fn empty_bitmap_places_nothing() {
        assert_eq!(place(10.0, &bitmap(0, 0)), CaptionPlacement::default());
    }
}
