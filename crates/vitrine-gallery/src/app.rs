use anyhow::Result;

use vitrine_engine::app::{App, AppControl, FrameCtx};
use vitrine_engine::coords::{ColorRgba, ScreenSize};
use vitrine_engine::input::InputEvent;

use crate::config::GalleryConfig;
use crate::gallery::Gallery;

/// Engine `App` adapter: forwards runtime callbacks into a [`Gallery`].
///
/// This is what a hosting binary hands to `Runtime::run`.
pub struct GalleryApp {
    gallery: Gallery,
    clear: ColorRgba,
}

impl GalleryApp {
    pub fn new(config: GalleryConfig, clear: ColorRgba) -> Result<Self> {
        Ok(Self {
            gallery: Gallery::new(config)?,
            clear,
        })
    }
}

impl App for GalleryApp {
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        self.gallery.handle_input(event);
        AppControl::Continue
    }

    fn on_resize(&mut self, size: ScreenSize) {
        self.gallery.resize(size);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;
        let gallery = &mut self.gallery;
        ctx.render(self.clear, |rctx, target| {
            gallery.frame(rctx, target, time);
        })
    }
}
