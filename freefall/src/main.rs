//! Free Fall Simulation
//!
//! Solves `h = ½·g·t²`, `v = g·t` from any two known values and animates the drop of
//! a block from the chosen height. One pixel is one metre.
//!
//! Controls:
//! - Panel: edit g, h, t, v; Set / Calculate / Reset / Drop
//! - W/S: Pan camera vertically (horizontal axis is locked)
//! - Enter: Reset camera

mod equations_ui;
mod follow;
mod physics;

use common::{
    colors, draw_equations_sidebar, AppConfig, Camera2D, CameraKeys, CameraLimits,
    GraphicsContext, HeldKeys, Overlay, PanInput, ShapeBatch, ShapeRenderer, StatusMessage,
};
use equations_ui::{
    draw_control_panel, FallPanel, PanelAction, Readout, FREEFALL_EQUATIONS, FREEFALL_VARIABLES,
};
use follow::follow_fall;
use glam::Vec2;
use physics::{solve, FallParameters, FallState, FallingBody, FreeFallError};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::PhysicalKey,
};

const MAX_VERTICES: usize = 20_000;
const RULER_SPACING: f32 = 50.0;
const RULER_HEIGHT: f32 = 10_000.0;
const STATUS_SECONDS: f32 = 2.0;

struct App {
    ctx: GraphicsContext,
    renderer: ShapeRenderer,
    overlay: Overlay,
    camera: Camera2D,
    camera_keys: CameraKeys,
    held_keys: HeldKeys,
    body: FallingBody,
    batch: ShapeBatch,
    panel: FallPanel,
    status: StatusMessage,
}

impl App {
    fn new(ctx: GraphicsContext, config: &AppConfig) -> Self {
        let renderer = ShapeRenderer::new(&ctx, MAX_VERTICES);
        let overlay = Overlay::new(&ctx);
        let camera = Camera2D::new(ctx.viewport())
            .with_limits(CameraLimits::locked_x())
            .with_pan_speed(config.camera.pan_speed);
        let body = FallingBody::new(ctx.viewport().y, config.freefall.step);

        let mut app = Self {
            ctx,
            renderer,
            overlay,
            camera,
            camera_keys: CameraKeys::default(),
            held_keys: HeldKeys::new(),
            body,
            batch: ShapeBatch::new(),
            panel: FallPanel::new(config.freefall.gravity, config.freefall.height),
            status: StatusMessage::default(),
        };
        app.calculate();
        app.set_object();
        app
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_viewport(self.ctx.viewport());
    }

    fn report(&mut self, error: FreeFallError) {
        log::warn!("{}", error);
        self.status.show(error.to_string(), STATUS_SECONDS);
    }

    fn body_x(&self) -> f32 {
        self.ctx.viewport().x * 0.5
    }

    /// Place the block at the height from the panel
    fn set_object(&mut self) {
        match FallParameters::parse("", &self.panel.height, "", "") {
            Ok(params) => {
                let height = params.height.unwrap_or(0.0) as f32;
                self.body.set_height(height, self.body_x());
            }
            Err(e) => self.report(e),
        }
    }

    fn calculate(&mut self) {
        let solution = FallParameters::parse(
            &self.panel.gravity,
            &self.panel.height,
            &self.panel.time,
            &self.panel.velocity,
        )
        .and_then(|params| solve(&params));

        match solution {
            Ok(s) => {
                log::debug!("Solved fall: {:?}", s);
                self.panel.gravity = format!("{:.2}", s.gravity);
                self.panel.height = format!("{:.2}", s.height);
                self.panel.time = format!("{:.2}", s.time);
                self.panel.velocity = format!("{:.2}", s.velocity);
            }
            Err(e) => self.report(e),
        }
    }

    fn reset(&mut self) {
        self.panel.clear();
        self.body.reset();
        self.camera.reset();
        self.status.clear();
    }

    fn begin_fall(&mut self) {
        self.set_object();
        let params = match FallParameters::parse(&self.panel.gravity, "", &self.panel.time, "") {
            Ok(params) => params,
            Err(e) => return self.report(e),
        };
        let gravity = params.gravity.unwrap_or(0.0) as f32;
        let time = params.time.unwrap_or(0.0) as f32;
        if let Err(e) = self.body.start_drop(gravity, time) {
            self.report(e);
        }
    }

    fn end_fall(&mut self) {
        self.body.abort();
        self.camera.reset();
        self.set_object();
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::Set => self.set_object(),
            PanelAction::Calculate => self.calculate(),
            PanelAction::Reset => self.reset(),
            PanelAction::Drop => self.begin_fall(),
            PanelAction::Abort => self.end_fall(),
        }
    }

    fn update(&mut self, dt: f32) {
        self.status.tick(dt);

        if !self.overlay.wants_keyboard() {
            let input = PanInput::from_keys(&self.held_keys, &self.camera_keys);
            self.camera.step(&input);
        }

        match self.body.update(dt) {
            Ok(landed) => follow_fall(&mut self.camera, &self.body, landed),
            Err(e) => {
                self.report(e);
                self.end_fall();
            }
        }
    }

    fn build_scene(&mut self) {
        let ground = self.body.ground_y();
        let width = self.ctx.viewport().x;
        let ruler_x = self.body_x() - 120.0;

        let batch = &mut self.batch;
        batch.clear();

        // Ground
        batch.rect(Vec2::new(0.0, ground), Vec2::new(width, 400.0), colors::LIGHT_GRAY);
        batch.line(Vec2::new(0.0, ground), Vec2::new(width, ground), 2.0, colors::BLACK);

        // Height ruler on the left of the drop line
        batch.line(
            Vec2::new(ruler_x, ground),
            Vec2::new(ruler_x, ground - RULER_HEIGHT),
            2.0,
            colors::BLACK,
        );
        let mut height = 0.0;
        while height <= RULER_HEIGHT {
            let y = ground - height;
            let length = if height % (RULER_SPACING * 2.0) == 0.0 { 20.0 } else { 10.0 };
            batch.rect(Vec2::new(ruler_x, y - 2.5), Vec2::new(length, 5.0), colors::BLACK);
            height += RULER_SPACING;
        }

        if self.body.state() != FallState::Hidden {
            let size = self.body.size;
            let bottom = self.body.kinematic.position;
            batch.rect(
                bottom - Vec2::new(size * 0.5, size),
                Vec2::splat(size),
                colors::BLACK,
            );
        }
    }

    /// Tick labels for the part of the ruler on screen
    fn draw_ruler_labels(&self, ctx: &egui::Context) {
        let painter = ctx.layer_painter(egui::LayerId::background());
        let ppp = ctx.pixels_per_point();
        let ground = self.body.ground_y();
        let ruler_x = self.body_x() - 120.0;

        let top = self.camera.screen_to_world(Vec2::ZERO).y;
        let bottom = self.camera.screen_to_world(self.ctx.viewport()).y;
        let first = ((ground - bottom) / (RULER_SPACING * 2.0)).floor().max(0.0) as i32;
        let last = ((ground - top) / (RULER_SPACING * 2.0)).ceil() as i32;

        for i in first..=last {
            let height = i as f32 * RULER_SPACING * 2.0;
            if height > RULER_HEIGHT {
                break;
            }
            let screen = self.camera.world_to_screen(Vec2::new(ruler_x - 8.0, ground - height)) / ppp;
            painter.text(
                egui::pos2(screen.x, screen.y),
                egui::Align2::RIGHT_CENTER,
                format!("{} m", height),
                egui::FontId::proportional(12.0),
                egui::Color32::BLACK,
            );
        }
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        draw_equations_sidebar(ctx, "Free Fall", FREEFALL_EQUATIONS, FREEFALL_VARIABLES);

        let readout = Readout {
            elapsed: self.body.elapsed(),
            height: self.body.height().max(0.0),
            speed: self.body.speed(),
        };
        let action = draw_control_panel(
            ctx,
            &mut self.panel,
            self.body.is_falling(),
            &readout,
            self.status.text(),
        );
        self.draw_ruler_labels(ctx);

        if let Some(action) = action {
            log::debug!("Panel action: {:?}", action);
            self.apply(action);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.build_scene();
        self.renderer.update_camera(&self.ctx.queue, &self.camera);
        let num_vertices = self.renderer.upload(&self.ctx.queue, &self.batch);

        let egui_ctx = self.overlay.context();
        let raw_input = self.overlay.take_input(&self.ctx.window);
        let full_output = egui_ctx.run(raw_input, |ctx| self.draw_ui(ctx));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer
            .render(&mut encoder, &view, num_vertices, colors::WHITE);
        let egui_commands = self
            .overlay
            .paint(&self.ctx, &mut encoder, &view, full_output);

        self.ctx
            .queue
            .submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.overlay.handle_window_event(&self.ctx.window, event)
    }
}

fn main() {
    let config = AppConfig::load_or_default();
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Free Fall Simulation",
        &config.window,
    ));

    log::info!("Starting free fall simulation");
    let mut app = App::new(ctx, &config);
    let mut last_time = std::time::Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::Focused(false) => app.held_keys.clear(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => {
                            // Releases always go through so keys never stick
                            if !consumed || *state == ElementState::Released {
                                app.held_keys.handle(*key, *state);
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let now = std::time::Instant::now();
                            let dt = (now - last_time).as_secs_f32().min(0.1);
                            last_time = now;

                            app.update(dt);
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
