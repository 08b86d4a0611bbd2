use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::{App, AppControl, FrameCtx};
use crate::coords::ScreenSize;
use crate::device::{Gpu, GpuInit};
use crate::input::{InputEvent, InputFrame, InputState, PointerEvent, WheelDelta};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vitrine".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Hosts exactly one window for the lifetime of the call. The loop requests a
/// redraw unconditionally after every frame, so `App::on_frame` runs at the
/// display refresh cadence until the app exits or the window closes; after
/// either, no app callback is invoked again and all window/GPU resources are
/// dropped before `run` returns.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = HostState {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            init_error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Window/GPU bring-up failures abort the loop; surface them to the
        // caller instead of pretending a clean shutdown happened.
        match state.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct HostState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    init_error: Option<anyhow::Error>,
}

impl<A> HostState<A>
where
    A: App + 'static,
{
    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        self.entry = Some(entry);
        Ok(())
    }

    /// Drops the window entry, releasing the GPU context, the surface, and
    /// the window itself.
    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        self.entry = None;
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for HostState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.init_error = Some(e);
            self.teardown(event_loop);
            return;
        }

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the gallery animates every frame (easing, idle
        // wobble), so there is no invalidation tracking to consult.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);

        let Some(entry) = entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        let mut exit_from_app = false;

        let translated = entry.with_input_state(|s| translate_input_event(s, &event));
        if let Some(ev) = translated {
            entry.with_mut(|fields| {
                fields.input_state.apply_event(fields.input_frame, ev);
            });
            if app.on_input(&ev) == AppControl::Exit {
                exit_from_app = true;
            }
        }

        if exit_from_app {
            self.teardown(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.teardown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                app.on_resize(ScreenSize::new(
                    new_size.width as f32,
                    new_size.height as f32,
                ));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                app.on_resize(ScreenSize::new(
                    new_size.width as f32,
                    new_size.height as f32,
                ));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let mut app_control = AppControl::Continue;

                entry.with_mut(|fields| {
                    let ft = fields.clock.tick();

                    // Scope so `ctx` drops before the frame deltas are cleared.
                    {
                        let mut ctx = FrameCtx {
                            gpu: fields.gpu,
                            input: fields.input_state,
                            input_frame: fields.input_frame,
                            time: ft,
                        };

                        app_control = app.on_frame(&mut ctx);
                    }

                    fields.input_frame.clear();
                });

                if app_control == AppControl::Exit {
                    self.teardown(event_loop);
                }
            }

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

/// Translates window system events into engine input events.
///
/// Mouse and touch collapse onto the same pointer stream: only the primary
/// mouse button participates, and touch contacts map phase-wise onto
/// press/move/release. Coordinates stay in physical pixels.
fn translate_input_event(state: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved(PointerEvent {
            x: position.x as f32,
            y: position.y as f32,
        })),

        WindowEvent::MouseInput {
            state: st,
            button: MouseButton::Left,
            ..
        } => {
            let (x, y) = state.pointer_pos.unwrap_or((0.0, 0.0));
            let ev = PointerEvent { x, y };
            Some(match st {
                ElementState::Pressed => InputEvent::PointerPressed(ev),
                ElementState::Released => InputEvent::PointerReleased(ev),
            })
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                winit::event::MouseScrollDelta::LineDelta(x, y) => {
                    WheelDelta::Line { x: *x, y: *y }
                }
                winit::event::MouseScrollDelta::PixelDelta(p) => WheelDelta::Pixel {
                    x: p.x as f32,
                    y: p.y as f32,
                },
            };
            Some(InputEvent::Wheel { delta })
        }

        WindowEvent::Touch(touch) => {
            let ev = PointerEvent {
                x: touch.location.x as f32,
                y: touch.location.y as f32,
            };
            Some(match touch.phase {
                TouchPhase::Started => InputEvent::PointerPressed(ev),
                TouchPhase::Moved => InputEvent::PointerMoved(ev),
                TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::PointerReleased(ev),
            })
        }

        _ => None,
    }
}
