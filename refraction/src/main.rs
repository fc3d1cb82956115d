//! Light Refraction Simulation
//!
//! A light source in the upper medium shines at the centre of a flat interface. The
//! reflected ray and the ray refracted into the lower medium follow the law of
//! reflection and Snell's law.
//!
//! Controls:
//! - Left mouse (held): Place the light source in the upper left quadrant
//! - Panel: N1/N2 entries with Change Parameter, or pick a preset medium

mod equations_ui;
mod optics;

use common::{
    colors, draw_equations_sidebar, AppConfig, Camera2D, GraphicsContext, Overlay, ShapeBatch,
    ShapeRenderer, StatusMessage,
};
use equations_ui::{
    draw_control_panel, PanelAction, ParameterPanel, REFRACTION_EQUATIONS, REFRACTION_VARIABLES,
};
use glam::Vec2;
use optics::{critical_angle, Material, OpticsError, RayGeometry};
use winit::{
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::ControlFlow,
};

const MAX_VERTICES: usize = 10_000;
const RAY_WIDTH: f32 = 3.0;
const STATUS_SECONDS: f32 = 2.0;

struct App {
    ctx: GraphicsContext,
    renderer: ShapeRenderer,
    overlay: Overlay,
    camera: Camera2D,
    panel: ParameterPanel,
    rays: RayGeometry,
    batch: ShapeBatch,
    cursor: Vec2,
    shining: bool,
    status: StatusMessage,
}

impl App {
    fn new(ctx: GraphicsContext, config: &AppConfig) -> Self {
        let renderer = ShapeRenderer::new(&ctx, MAX_VERTICES);
        let overlay = Overlay::new(&ctx);
        let camera = Camera2D::new(ctx.viewport());
        let rays = RayGeometry::resting(ctx.viewport());

        let upper = Material::from_index(config.refraction.n1).unwrap_or(Material::AIR);
        let lower = Material::from_index(config.refraction.n2).unwrap_or(Material::GLASS);

        Self {
            ctx,
            renderer,
            overlay,
            camera,
            panel: ParameterPanel::new(upper, lower),
            rays,
            batch: ShapeBatch::new(),
            cursor: Vec2::ZERO,
            shining: false,
            status: StatusMessage::default(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_viewport(self.ctx.viewport());
        self.rays = RayGeometry::resting(self.ctx.viewport());
    }

    fn report(&mut self, error: OpticsError) {
        log::warn!("{}", error);
        self.status.show(error.to_string(), STATUS_SECONDS);
    }

    fn cast(&mut self) {
        let source = self.camera.screen_to_world(self.cursor);
        self.rays = RayGeometry::trace(
            source,
            self.ctx.viewport(),
            self.panel.upper.index,
            self.panel.lower.index,
        );
    }

    fn change_parameter(&mut self) {
        let parsed = Material::parse("N1", &self.panel.n1_text)
            .and_then(|upper| Ok((upper, Material::parse("N2", &self.panel.n2_text)?)));
        match parsed {
            Ok((upper, lower)) => self.set_media(upper, lower),
            Err(e) => self.report(e),
        }
    }

    fn set_media(&mut self, upper: Material, lower: Material) {
        log::info!(
            "Media: {} ({}) over {} ({})",
            upper.name,
            upper.index,
            lower.name,
            lower.index
        );
        self.panel.upper = upper;
        self.panel.lower = lower;
        self.panel.sync_text();
        if self.rays.incidence.is_some() {
            self.cast();
        }
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::ChangeParameter => self.change_parameter(),
            PanelAction::SelectUpper(m) => self.set_media(m, self.panel.lower),
            PanelAction::SelectLower(m) => self.set_media(self.panel.upper, m),
        }
    }

    fn update(&mut self, dt: f32) {
        self.status.tick(dt);
        if self.shining {
            self.cast();
        }
    }

    fn build_scene(&mut self) {
        let viewport = self.ctx.viewport();
        let centre = viewport * 0.5;

        let batch = &mut self.batch;
        batch.clear();

        // Lower medium, then the normal
        batch.rect(Vec2::new(0.0, centre.y), Vec2::new(viewport.x, centre.y), colors::WATER);
        batch.line(Vec2::new(centre.x, 0.0), Vec2::new(centre.x, viewport.y), 1.0, colors::BLACK);

        let rays = &self.rays;
        batch.line(centre, rays.incident, RAY_WIDTH, colors::RED);
        batch.line(centre, rays.reflected, RAY_WIDTH, colors::RED);
        if let Some(refracted) = rays.refracted {
            batch.line(centre, refracted, RAY_WIDTH, colors::RED);
        }
        if rays.incidence.is_some() {
            batch.circle(rays.incident, 8.0, colors::DARK_RED);
        }
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        draw_equations_sidebar(ctx, "Refraction", REFRACTION_EQUATIONS, REFRACTION_VARIABLES);

        let critical = critical_angle(self.panel.upper.index, self.panel.lower.index);
        let action = draw_control_panel(
            ctx,
            &mut self.panel,
            &self.rays,
            critical,
            self.status.text(),
        );
        if let Some(action) = action {
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
        "Light Refraction Simulation",
        &config.window,
    ));

    log::info!("Starting refraction simulation");
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
                            state,
                            button: MouseButton::Left,
                            ..
                        } => match state {
                            ElementState::Pressed => {
                                app.shining = !consumed && !app.overlay.wants_pointer();
                            }
                            ElementState::Released => app.shining = false,
                        },
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
