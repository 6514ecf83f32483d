use crate::dots::messages::{ExitReason, OverlayCommand};
use crate::dots::monitor::DesktopBounds;
use crate::dots::platform::PlatformWindowAttributes;
use crate::dots::render::paint_dots;
use crate::dots::sim::{ParticleField, TickClock};
use crate::dots::state::OverlayLifecycle;
use eframe::egui;
use raw_window_handle::HasWindowHandle;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub const WINDOW_TITLE: &str = "Moving Dots Overlay";

/// The subset of [`egui::Context`] the overlay needs to drive its viewport.
pub trait ViewportCtx {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand);
    fn request_repaint(&self);
}

impl ViewportCtx for egui::Context {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand) {
        egui::Context::send_viewport_cmd(self, cmd);
    }

    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

/// Transparent, undecorated, topmost window covering `bounds`, kept off the
/// taskbar.
pub fn native_options(bounds: &DesktopBounds) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_position(bounds.position())
            .with_inner_size(bounds.size())
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_taskbar(false)
            .with_always_on_top(),
        ..Default::default()
    }
}

pub struct DotsOverlay {
    field: ParticleField,
    clock: TickClock,
    tick_interval: Duration,
    commands: Receiver<OverlayCommand>,
    lifecycle: OverlayLifecycle,
    platform: Box<dyn PlatformWindowAttributes>,
    attributes_applied: bool,
    exit_reason: Option<ExitReason>,
}

impl DotsOverlay {
    pub fn new(
        field: ParticleField,
        tick_interval: Duration,
        commands: Receiver<OverlayCommand>,
        platform: Box<dyn PlatformWindowAttributes>,
    ) -> Self {
        Self {
            field,
            clock: TickClock::new(),
            tick_interval,
            commands,
            lifecycle: OverlayLifecycle::Constructing,
            platform,
            attributes_applied: false,
            exit_reason: None,
        }
    }

    pub fn lifecycle(&self) -> OverlayLifecycle {
        self.lifecycle
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit_reason
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn start(&mut self) {
        if self.lifecycle == OverlayLifecycle::Constructing
            && self.lifecycle.advance_to(OverlayLifecycle::Running)
        {
            tracing::debug!(
                dots = self.field.len(),
                viewport = ?self.field.viewport(),
                "overlay running"
            );
        }
    }

    /// Drain queued commands. Returns `true` once shutdown has been requested.
    pub fn handle_commands<C: ViewportCtx>(&mut self, ctx: &C) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(OverlayCommand::RequestExit { reason }) => self.request_exit(ctx, reason),
                // a dead listener only means the hotkey is gone
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        self.exit_reason.is_some()
    }

    pub fn request_exit<C: ViewportCtx>(&mut self, ctx: &C, reason: ExitReason) {
        if self.exit_reason.is_some() {
            return;
        }
        if self.lifecycle.advance_to(OverlayLifecycle::Stopping) {
            tracing::info!(?reason, "stopping overlay");
            self.exit_reason = Some(reason);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            ctx.request_repaint();
        }
    }

    /// Advance every dot by the time measured since the previous tick.
    /// Returns `false` when the overlay is not running.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.lifecycle.is_ticking() {
            return false;
        }
        let dt = self.clock.tick(now);
        self.field.advance(dt);
        true
    }

    pub fn finish(&mut self) {
        if matches!(
            self.lifecycle,
            OverlayLifecycle::Constructing | OverlayLifecycle::Running
        ) {
            self.lifecycle.advance_to(OverlayLifecycle::Stopping);
        }
        if self.lifecycle.advance_to(OverlayLifecycle::Terminated) {
            tracing::debug!(reason = ?self.exit_reason, "overlay terminated");
        }
    }

    fn apply_window_attributes(&mut self, frame: &eframe::Frame) {
        self.attributes_applied = true;
        if !self.platform.supports_click_through() {
            tracing::debug!("click-through not supported here; overlay will capture input");
            return;
        }
        let handle = match frame.window_handle() {
            Ok(handle) => handle.as_raw(),
            Err(err) => {
                tracing::error!(?err, "no native window handle; click-through not applied");
                return;
            }
        };
        if let Err(err) = self.platform.apply_click_through(handle) {
            tracing::error!(?err, "failed to make overlay click-through");
        }
    }
}

impl eframe::App for DotsOverlay {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if !self.attributes_applied {
            self.apply_window_attributes(frame);
        }
        self.start();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.request_exit(ctx, ExitReason::WindowClosed);
        }
        self.handle_commands(ctx);

        if self.tick(Instant::now()) {
            ctx.request_repaint_after(self.tick_interval);
        }
        paint_dots(ctx, self.field.particles());
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.finish();
    }
}
