use std::path::PathBuf;

use vitrine_engine::coords::ColorRgba;

/// One gallery entry: artwork source plus its caption text.
///
/// Immutable input, caller-owned; the gallery copies what it needs at mount.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image: PathBuf,
    pub text: String,
}

/// How card artwork is mapped onto the card plane.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ImageFit {
    /// Fill the plane, cropping overflow on the longer axis.
    #[default]
    Cover,
    /// Letterbox the full image; bars are painted the fill color.
    Contain,
}

/// Clip mask applied to each card.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ClipShape {
    /// Rounded rectangle with a configurable corner radius.
    #[default]
    Rounded,
    /// Circular mask centered on the plane.
    Circular,
}

/// Minimum card pool population.
///
/// Shorter item lists are repeated cyclically up to this count so the
/// wraparound never shows a gap. Tunable; 12 keeps a comfortable margin of
/// off-screen cards at common aspect ratios.
pub const MIN_POOL: usize = 12;

/// Construction-time gallery configuration.
///
/// Everything is optional in spirit: `Default` yields a working gallery with
/// no items and no font (cards render as flat fills, captions are skipped).
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub items: Vec<GalleryItem>,

    /// Arc curvature. 0 lays cards on a flat line; the sign picks whether the
    /// row bows up or down.
    pub bend: f32,

    /// Caption text color.
    pub text_color: ColorRgba,

    /// Corner radius for `ClipShape::Rounded`, in normalized plane units.
    pub corner_radius: f32,

    /// Raw TTF/OTF bytes for caption rasterization. `None` disables captions.
    pub font: Option<Vec<u8>>,

    /// Caption size in pixels (before supersampling).
    pub font_size: f32,

    /// Horizontal scroll speed multiplier (wheel steps and drag distance).
    pub scroll_speed: f32,

    /// Per-frame interpolation factor toward the scroll target, in (0, 1].
    pub scroll_ease: f32,

    pub image_fit: ImageFit,
    pub clip_shape: ClipShape,

    /// Relative card size. Card height in pixels is `item_size` scaled by
    /// `screen_height / 1500`, so the layout is resolution-proportional.
    pub item_size: f32,

    /// Fill color behind artwork: placeholder state and contain-mode bars.
    pub fill_color: ColorRgba,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            bend: 3.0,
            text_color: ColorRgba::white(),
            corner_radius: 0.05,
            font: None,
            font_size: 30.0,
            scroll_speed: 2.0,
            scroll_ease: 0.05,
            image_fit: ImageFit::Cover,
            clip_shape: ClipShape::Rounded,
            item_size: 900.0,
            fill_color: ColorRgba::white(),
        }
    }
}

/// Repeats `items` cyclically until the pool reaches [`MIN_POOL`].
///
/// Lists already at or past the threshold are returned as-is; an empty list
/// stays empty (there is nothing to repeat).
pub fn pad_items(items: &[GalleryItem]) -> Vec<GalleryItem> {
    if items.is_empty() || items.len() >= MIN_POOL {
        return items.to_vec();
    }

    let mut padded = Vec::with_capacity(MIN_POOL);
    for i in 0..MIN_POOL.next_multiple_of(items.len()) {
        padded.push(items[i % items.len()].clone());
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> GalleryItem {
        GalleryItem {
            image: PathBuf::from(format!("{n}.png")),
            text: format!("item {n}"),
        }
    }

    #[test]
    fn pad_repeats_short_lists_cyclically() {
        let items: Vec<_> = (0..3).map(item).collect();
        let padded = pad_items(&items);
        assert_eq!(padded.len(), 12);
        for (i, it) in padded.iter().enumerate() {
            assert_eq!(*it, items[i % 3]);
        }
    }

    #[test]
    fn pad_rounds_up_to_whole_copies() {
        // 5 items: 12 is not a multiple, so the pool grows to 15 to keep the
        // repetition cycle unbroken at the seam.
        let items: Vec<_> = (0..5).map(item).collect();
        let padded = pad_items(&items);
        assert_eq!(padded.len(), 15);
        assert_eq!(padded[12], items[2]);
    }

    #[test]
    fn pad_leaves_long_lists_untouched() {
        let items: Vec<_> = (0..20).map(item).collect();
        assert_eq!(pad_items(&items), items);
    }

    #[test]
    fn pad_of_empty_is_empty() {
        assert!(pad_items(&[]).is_empty());
    }
}
