//! Gallery demo binary.
//!
//! Usage: `vitrine-demo [image.png ...]`
//!
//! With no arguments a set of generated color swatches is shown, so the demo
//! runs without any assets on disk. Captions use the first system font found;
//! without one the gallery runs caption-less.

use std::path::PathBuf;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use vitrine_engine::coords::ColorRgba;
use vitrine_engine::device::GpuInit;
use vitrine_engine::logging::{LoggingConfig, init_logging};
use vitrine_engine::window::{Runtime, RuntimeConfig};
use vitrine_gallery::{GalleryApp, GalleryConfig, GalleryItem};

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn find_font() -> Option<Vec<u8>> {
    for path in FONT_CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            log::info!("captions use {path}");
            return Some(bytes);
        }
    }
    log::warn!("no system font found; captions disabled");
    None
}

/// Writes a handful of gradient swatches into the temp dir and returns them
/// as gallery items.
fn swatch_items() -> Result<Vec<GalleryItem>> {
    let dir = std::env::temp_dir().join("vitrine-demo");
    std::fs::create_dir_all(&dir).context("create swatch directory")?;

    let swatches: &[(&str, [u8; 3])] = &[
        ("Rosewood", [164, 36, 59]),
        ("Juniper", [64, 130, 109]),
        ("Saffron", [233, 164, 49]),
        ("Lapis", [38, 87, 155]),
        ("Orchid", [167, 94, 158]),
        ("Graphite", [68, 71, 76]),
    ];

    let mut items = Vec::with_capacity(swatches.len());
    for (name, [r, g, b]) in swatches {
        let path = dir.join(format!("{}.png", name.to_lowercase()));
        let img = image::RgbaImage::from_fn(560, 720, |_, y| {
            // Vertical fade toward white.
            let t = y as f32 / 719.0;
            let mix = |c: u8| (c as f32 + (255.0 - c as f32) * t * 0.6) as u8;
            image::Rgba([mix(*r), mix(*g), mix(*b), 255])
        });
        img.save(&path)
            .with_context(|| format!("write swatch {}", path.display()))?;
        items.push(GalleryItem {
            image: path,
            text: (*name).to_string(),
        });
    }
    Ok(items)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let items = if args.is_empty() {
        swatch_items()?
    } else {
        args.into_iter()
            .map(|path| {
                let text = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                GalleryItem { image: path, text }
            })
            .collect()
    };

    log::info!("starting gallery with {} items", items.len());

    let config = GalleryConfig {
        items,
        font: find_font(),
        ..GalleryConfig::default()
    };

    let app = GalleryApp::new(config, ColorRgba::from_srgb_u8(16, 16, 20, 255))?;

    Runtime::run(
        RuntimeConfig {
            title: "Vitrine".to_string(),
            initial_size: LogicalSize::new(1100.0, 640.0),
        },
        GpuInit::default(),
        app,
    )
}
