//! Pendulum Simulation
//!
//! A damped simple pendulum hanging from the top centre of the window. Clicking anywhere
//! outside the panels releases the bob from the clicked point.
//!
//! Controls:
//! - Left click: Release the bob
//! - Panel: VELOCITY +/- changes the restoring acceleration, DAMPING +/- the damping,
//!   Reset zeroes both

mod equations_ui;
mod physics;

use common::{
    colors, draw_equations_sidebar, AppConfig, Camera2D, GraphicsContext, Overlay, ShapeBatch,
    ShapeRenderer, StatusMessage,
};
use equations_ui::{draw_control_panel, PanelAction, Readout, PENDULUM_EQUATIONS, PENDULUM_VARIABLES};
use glam::Vec2;
use physics::{pivot_for_width, PendulumError, PendulumSim};
use winit::{
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::ControlFlow,
};

const MAX_VERTICES: usize = 20_000;
const BOB_RADIUS: f32 = 15.0;
const STATUS_SECONDS: f32 = 2.0;

struct App {
    ctx: GraphicsContext,
    renderer: ShapeRenderer,
    overlay: Overlay,
    camera: Camera2D,
    sim: PendulumSim,
    batch: ShapeBatch,
    cursor: Vec2,
    status: StatusMessage,
}

impl App {
    fn new(ctx: GraphicsContext, config: &AppConfig) -> Self {
        let renderer = ShapeRenderer::new(&ctx, MAX_VERTICES);
        let overlay = Overlay::new(&ctx);
        let camera = Camera2D::new(ctx.viewport());
        let sim = PendulumSim::new(
            pivot_for_width(ctx.viewport().x),
            config.pendulum.base_accel,
            config.pendulum.tick_rate,
        );

        Self {
            ctx,
            renderer,
            overlay,
            camera,
            sim,
            batch: ShapeBatch::new(),
            cursor: Vec2::ZERO,
            status: StatusMessage::default(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_viewport(self.ctx.viewport());
        self.sim.set_pivot(pivot_for_width(self.ctx.viewport().x));
    }

    fn report(&mut self, error: PendulumError) {
        log::warn!("{}", error);
        self.status.show(error.to_string(), STATUS_SECONDS);
    }

    fn click(&mut self) {
        let position = self.camera.screen_to_world(self.cursor);
        if let Err(e) = self.sim.release(position) {
            self.report(e);
        }
    }

    fn apply(&mut self, action: PanelAction) {
        let controls = &mut self.sim.controls;
        match action {
            PanelAction::IncreaseVelocity => controls.increase_velocity(),
            PanelAction::DecreaseVelocity => controls.decrease_velocity(),
            PanelAction::IncreaseDamping => controls.increase_damping(),
            PanelAction::DecreaseDamping => controls.decrease_damping(),
            PanelAction::Reset => controls.reset(),
        }
        log::info!(
            "Velocity boost {:.4}, damping change {:.4}",
            controls.accel_boost(),
            controls.damping_change()
        );
    }

    fn update(&mut self, dt: f32) {
        self.status.tick(dt);
        if let Err(e) = self.sim.update(dt) {
            self.report(e);
        }
    }

    fn build_scene(&mut self) {
        let pivot = self.sim.pivot();
        let height = self.ctx.viewport().y;

        let batch = &mut self.batch;
        batch.clear();

        // Ceiling mount and balance line
        batch.rect(pivot - Vec2::new(60.0, 8.0), Vec2::new(120.0, 8.0), colors::GRAY);
        batch.line(pivot, Vec2::new(pivot.x, height), 1.0, colors::LIGHT_GRAY);

        batch.polyline(self.sim.trace().points(), 2.0, colors::RED);

        if let Some(pendulum) = self.sim.pendulum() {
            batch.line(pendulum.pivot(), pendulum.bob(), 2.0, colors::BLACK);
            batch.circle(pendulum.bob(), BOB_RADIUS, colors::BLACK);
            batch.circle(pendulum.bob(), BOB_RADIUS - 2.0, colors::DARK_RED);
        }
        batch.circle(pivot, 4.0, colors::BLACK);
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        draw_equations_sidebar(ctx, "Pendulum", PENDULUM_EQUATIONS, PENDULUM_VARIABLES);

        let pendulum = self.sim.pendulum();
        let trace = self.sim.trace();
        let readout = Readout {
            accel_boost: self.sim.controls.accel_boost(),
            damping_change: self.sim.controls.damping_change(),
            angle: pendulum.map(|p| p.angle()),
            angular_velocity: pendulum.map(|p| p.angular_velocity()),
            samples: trace.offsets().len(),
            last_offset: trace.offsets().last().copied(),
        };

        if let Some(action) = draw_control_panel(ctx, &readout, self.status.text()) {
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
        "Pendulum Simulation",
        &config.window,
    ));

    log::info!("Starting pendulum simulation");
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
                        WindowEvent::CursorMoved { position, .. } => {
                            app.cursor = Vec2::new(position.x as f32, position.y as f32);
                        }
                        WindowEvent::MouseInput {
                            state: ElementState::Pressed,
                            button: MouseButton::Left,
                            ..
                        } => {
                            // Clicks on the panels belong to egui
                            if !consumed && !app.overlay.wants_pointer() {
                                app.click();
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
