use anyhow::Result;
use glam::{Mat4, Vec3};

use vitrine_engine::coords::ScreenSize;
use vitrine_engine::input::InputEvent;
use vitrine_engine::render::{RenderCtx, RenderTarget};
use vitrine_engine::time::FrameTime;

use crate::camera::{Camera, WorldViewport};
use crate::caption::{self, CaptionBitmap, CaptionPlacement};
use crate::card::Card;
use crate::config::{self, GalleryConfig};
use crate::loader::ImageLoader;
use crate::render::{CaptionDraw, CaptionRenderer, CardRenderer, CardStyle};
use crate::scroll::ScrollController;

/// The gallery orchestrator.
///
/// Owns the card arena, the scroll controller, the camera, the image loader,
/// and both renderers. Construction pads the item pool, rasterizes captions,
/// and queues artwork decodes; per frame it advances scroll state, drains
/// decode completions, updates every card in list order, and issues the
/// draws. Dropping the gallery joins the decode thread and releases every
/// GPU resource with it.
///
/// All per-frame mutation happens synchronously inside `frame`; the decode
/// thread is the only external completion source and is bridged by a channel,
/// so no state here needs locking.
pub struct Gallery {
    // ── style (fixed at construction) ─────────────────────────────────────
    bend: f32,
    item_size: f32,
    style: CardStyle,

    // ── simulation state ──────────────────────────────────────────────────
    camera: Camera,
    scroll: ScrollController,
    cards: Vec<Card>,

    caption_bitmaps: Vec<CaptionBitmap>,
    placements: Vec<CaptionPlacement>,
    captions_installed: bool,

    loader: ImageLoader,

    // ── GPU side ──────────────────────────────────────────────────────────
    card_renderer: CardRenderer,
    caption_renderer: CaptionRenderer,

    screen: ScreenSize,
    viewport: WorldViewport,
}

impl Gallery {
    /// Builds a gallery from caller configuration.
    ///
    /// The item list is repeated up to the minimum pool size so the
    /// wraparound never shows a gap. Caption rasterization happens here, on
    /// the CPU, before any GPU resource exists; artwork decoding starts
    /// immediately on the loader thread.
    pub fn new(config: GalleryConfig) -> Result<Self> {
        let font = config.font.as_deref().and_then(|bytes| {
            match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
                Ok(font) => Some(font),
                Err(e) => {
                    log::warn!("caption font unusable ({e}); captions disabled");
                    None
                }
            }
        });

        let items = config::pad_items(&config.items);
        let cards: Vec<Card> = (0..items.len()).map(|i| Card::new(i, items.len())).collect();

        let caption_bitmaps: Vec<CaptionBitmap> = items
            .iter()
            .map(|item| {
                caption::rasterize(
                    font.as_ref(),
                    &item.text,
                    config.font_size,
                    config.text_color,
                )
            })
            .collect();
        let placements = vec![CaptionPlacement::default(); items.len()];

        let loader = ImageLoader::spawn()?;
        for (i, item) in items.iter().enumerate() {
            loader.request(i, item.image.clone());
        }

        Ok(Self {
            bend: config.bend,
            item_size: config.item_size,
            style: CardStyle {
                image_fit: config.image_fit,
                clip_shape: config.clip_shape,
                corner_radius: config.corner_radius,
                fill: config.fill_color,
            },
            camera: Camera::default(),
            scroll: ScrollController::new(config.scroll_speed, config.scroll_ease),
            cards,
            caption_bitmaps,
            placements,
            captions_installed: false,
            loader,
            card_renderer: CardRenderer::new(),
            caption_renderer: CaptionRenderer::new(),
            screen: ScreenSize::default(),
            viewport: WorldViewport::default(),
        })
    }

    /// Number of cards in the (padded) pool.
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Routes one input event into the scroll controller.
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Wheel { delta } => self.scroll.on_wheel(*delta),
            InputEvent::PointerPressed(p) => self.scroll.on_pointer_pressed(p.x),
            InputEvent::PointerMoved(p) => self.scroll.on_pointer_moved(p.x),
            InputEvent::PointerReleased(_) => self.scroll.on_pointer_released(),
            // Leaving the surface mid-drag ends the gesture; move events stop
            // arriving, so holding the drag open would freeze the target.
            InputEvent::PointerLeft => self.scroll.on_pointer_released(),
            InputEvent::Focused(_) => {}
        }
    }

    /// Propagates a new drawable size to the camera, every card, and the
    /// snap lane width.
    pub fn resize(&mut self, screen: ScreenSize) {
        self.screen = screen;
        self.viewport = self.camera.world_viewport(screen);

        for card in &mut self.cards {
            card.resize(screen, self.viewport, self.item_size);
        }

        let lane = self.cards.first().map_or(0.0, |c| c.width);
        self.scroll.set_lane_width(lane);

        let plane_height = self.cards.first().map_or(0.0, |c| c.plane_height);
        for (placement, bitmap) in self.placements.iter_mut().zip(&self.caption_bitmaps) {
            *placement = caption::place(plane_height, bitmap);
        }
    }

    /// Runs one tick: scroll easing, decode completions, card updates, and
    /// one draw per card plus one per installed caption.
    pub fn frame(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, time: FrameTime) {
        // The first frame (and any missed notification) syncs layout here.
        if ctx.screen != self.screen {
            self.resize(ctx.screen);
        }

        self.card_renderer.prepare(ctx, self.cards.len());
        self.caption_renderer.prepare(ctx, self.cards.len());

        if !self.captions_installed {
            self.captions_installed = true;
            for (i, bitmap) in self.caption_bitmaps.iter().enumerate() {
                self.caption_renderer.install_caption(ctx, i, bitmap);
            }
        }

        // Artwork that finished decoding pops in; nothing re-layouts.
        for image in self.loader.drain() {
            self.card_renderer.install_image(ctx, &image);
        }

        let direction = self.scroll.update(time.dt);
        for card in &mut self.cards {
            card.update(self.scroll.state(), direction, self.viewport, self.bend);
        }

        let view_proj = self.camera.view_proj(self.screen);

        self.card_renderer
            .render(ctx, target, &self.cards, view_proj, &self.style);

        let draws: Vec<CaptionDraw> = self
            .cards
            .iter()
            .zip(&self.placements)
            .filter(|(_, placement)| placement.height > 0.0)
            .map(|(card, placement)| CaptionDraw {
                index: card.index,
                model: card.model_matrix()
                    * Mat4::from_translation(Vec3::new(0.0, placement.offset_y, 0.0)),
                size: [placement.width, placement.height],
            })
            .collect();

        self.caption_renderer.render(ctx, target, view_proj, &draws);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryItem;
    use std::path::PathBuf;

    fn config(n: usize) -> GalleryConfig {
        GalleryConfig {
            items: (0..n)
                .map(|i| GalleryItem {
                    image: PathBuf::from(format!("{i}.png")),
                    text: format!("brand {i}"),
                })
                .collect(),
            ..GalleryConfig::default()
        }
    }

    #[test]
    fn short_lists_are_padded_to_the_minimum_pool() {
        let gallery = Gallery::new(config(3)).expect("gallery");
        assert_eq!(gallery.card_count(), 12);
    }

    #[test]
    fn resize_sets_lane_width_for_snapping() {
        let mut gallery = Gallery::new(config(3)).expect("gallery");
        gallery.resize(ScreenSize::new(1280.0, 720.0));
        assert!(gallery.cards[0].width > 0.0);

        // Degenerate resize collapses cleanly instead of crashing.
        gallery.resize(ScreenSize::new(0.0, 0.0));
        assert_eq!(gallery.cards[0].width, 0.0);
    }

    #[test]
    fn input_routes_to_the_scroll_target() {
        use vitrine_engine::input::{PointerEvent, WheelDelta};

        let mut gallery = Gallery::new(config(3)).expect("gallery");
        gallery.resize(ScreenSize::new(1280.0, 720.0));

        gallery.handle_input(&InputEvent::Wheel {
            delta: WheelDelta::Line { x: 0.0, y: -1.0 },
        });
        assert!(gallery.scroll.state().target > 0.0);

        let before = gallery.scroll.state().target;
        gallery.handle_input(&InputEvent::PointerPressed(PointerEvent { x: 100.0, y: 0.0 }));
        gallery.handle_input(&InputEvent::PointerMoved(PointerEvent { x: 0.0, y: 0.0 }));
        gallery.handle_input(&InputEvent::PointerReleased(PointerEvent { x: 0.0, y: 0.0 }));
        assert_ne!(gallery.scroll.state().target, before);
    }
}
