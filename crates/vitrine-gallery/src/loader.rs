use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// A decoded artwork, ready for texture upload.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Card pool index the image belongs to.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Straight-alpha RGBA8, row-major, top row first.
    pub rgba: Vec<u8>,
}

struct Request {
    index: usize,
    path: PathBuf,
}

/// Background image decoder.
///
/// One worker thread drains decode requests and hands completions back over a
/// channel; the render loop polls `drain()` once per frame, so a slow decode
/// never stalls other cards. Decode failures are logged and produce no
/// completion — the affected card simply keeps its placeholder fill.
///
/// Dropping the loader closes the request channel and joins the worker, so a
/// decode finishing mid-teardown is discarded with the channel rather than
/// touching freed GPU state.
pub struct ImageLoader {
    requests: Option<Sender<Request>>,
    completed: Receiver<LoadedImage>,
    worker: Option<JoinHandle<()>>,
}

impl ImageLoader {
    pub fn spawn() -> Result<Self> {
        let (req_tx, req_rx) = unbounded::<Request>();
        let (done_tx, done_rx) = unbounded::<LoadedImage>();

        let worker = thread::Builder::new()
            .name("vitrine-image-loader".into())
            .spawn(move || {
                for req in req_rx.iter() {
                    match image::open(&req.path) {
                        Ok(img) => {
                            let rgba = img.into_rgba8();
                            let (width, height) = rgba.dimensions();
                            let done = done_tx.send(LoadedImage {
                                index: req.index,
                                width,
                                height,
                                rgba: rgba.into_raw(),
                            });
                            if done.is_err() {
                                // Receiver is gone; the gallery is tearing down.
                                break;
                            }
                        }
                        Err(e) => {
                            log::warn!("failed to decode {}: {e}", req.path.display());
                        }
                    }
                }
            })
            .context("failed to spawn image decode thread")?;

        Ok(Self {
            requests: Some(req_tx),
            completed: done_rx,
            worker: Some(worker),
        })
    }

    /// Queues a decode. Never blocks.
    pub fn request(&self, index: usize, path: PathBuf) {
        if let Some(tx) = &self.requests {
            let _ = tx.send(Request { index, path });
        }
    }

    /// Returns all completions that arrived since the last call, without
    /// blocking.
    pub fn drain(&self) -> Vec<LoadedImage> {
        self.completed.try_iter().collect()
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        // Closing the request channel lets the worker finish its current
        // decode and exit; join bounds teardown.
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn decodes_a_png_round_trip() {
        let path = std::env::temp_dir().join("vitrine-loader-test.png");
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("write test png");

        let loader = ImageLoader::spawn().expect("spawn loader");
        loader.request(7, path.clone());

        let loaded = loader
            .completed
            .recv_timeout(Duration::from_secs(10))
            .expect("decode completion");
        assert_eq!(loaded.index, 7);
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(&loaded.rgba[0..4], &[10, 20, 30, 255]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_produces_no_completion() {
        let loader = ImageLoader::spawn().expect("spawn loader");
        loader.request(0, PathBuf::from("/nonexistent/vitrine.png"));

        // Give the worker time to fail, then confirm nothing arrived and that
        // teardown joins cleanly.
        std::thread::sleep(Duration::from_millis(100));
        assert!(loader.drain().is_empty());
    }
}
