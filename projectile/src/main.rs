//! Projectile Motion Simulation
//!
//! Balls fall under gravity inside a walled box and bounce off the walls, each other
//! and obstacles placed from the menu. Drag a ball and release to launch it like a
//! slingshot.
//!
//! Controls:
//! - Left mouse: Select a ball, drag and release to launch it
//! - C: Spawn a ball at the cursor
//! - Backspace: Delete the selected ball
//! - W/A/S/D: Pan camera
//! - Q/E: Zoom in/out
//! - Space: Reset camera
//! - Escape: Quit

mod equations_ui;
mod obstacles;
mod physics;

use std::fmt::Display;

use common::{
    colors, draw_equations_sidebar, AppConfig, Camera2D, CameraKeys, GraphicsContext, HeldKeys,
    Overlay, PanInput, ShapeBatch, ShapeRenderer, StatusMessage,
};
use equations_ui::{
    draw_info, draw_menu, MenuAction, MenuState, PROJECTILE_EQUATIONS, PROJECTILE_VARIABLES,
};
use glam::Vec2;
use obstacles::{ObstacleForm, ShapeSelector};
use physics::{Bounds, Collider, Slingshot, World, WALL_RADIUS};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const MAX_VERTICES: usize = 60_000;
const WORLD_SIZE: Vec2 = Vec2::new(1200.0, 600.0);
const FIRST_BALL: (Vec2, f32) = (Vec2::new(100.0, 100.0), 25.0);
const STATUS_SECONDS: f32 = 3.0;

struct App {
    ctx: GraphicsContext,
    renderer: ShapeRenderer,
    overlay: Overlay,
    camera: Camera2D,
    camera_keys: CameraKeys,
    held_keys: HeldKeys,
    world: World,
    slingshot: Slingshot,
    selector: ShapeSelector,
    form: ObstacleForm,
    menu: MenuState,
    batch: ShapeBatch,
    cursor: Vec2,
    spawn_radius: f32,
    status: StatusMessage,
}

impl App {
    fn new(ctx: GraphicsContext, config: &AppConfig) -> Self {
        let renderer = ShapeRenderer::new(&ctx, MAX_VERTICES);
        let overlay = Overlay::new(&ctx);
        let camera = Camera2D::new(ctx.viewport())
            .with_pan_speed(config.projectile.pan_speed)
            .with_zoom(
                config.camera.zoom_speed,
                config.camera.min_zoom,
                config.camera.max_zoom,
            );
        let camera_keys = CameraKeys::default()
            .with_zoom_keys(Some(KeyCode::KeyQ), Some(KeyCode::KeyE))
            .with_reset(Some(KeyCode::Space));

        let gravity = Vec2::from(config.projectile.gravity);
        let mut world = World::new(
            gravity,
            Bounds::new(Vec2::ZERO, WORLD_SIZE),
            config.projectile.step,
        );
        let (position, radius) = FIRST_BALL;
        world.spawn(position, radius);

        Self {
            ctx,
            renderer,
            overlay,
            camera,
            camera_keys,
            held_keys: HeldKeys::new(),
            world,
            slingshot: Slingshot::new(config.projectile.impulse),
            selector: ShapeSelector::default(),
            form: ObstacleForm::default(),
            menu: MenuState::default(),
            batch: ShapeBatch::new(),
            cursor: Vec2::ZERO,
            spawn_radius: config.projectile.radius,
            status: StatusMessage::default(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_viewport(self.ctx.viewport());
    }

    fn report(&mut self, message: impl Display) {
        log::warn!("{}", message);
        self.status.show(message.to_string(), STATUS_SECONDS);
    }

    fn world_cursor(&self) -> Vec2 {
        self.camera.screen_to_world(self.cursor)
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::KeyC => {
                let position = self.world_cursor();
                self.world.spawn(position, self.spawn_radius);
            }
            KeyCode::Backspace => {
                self.slingshot.remove_active(&mut self.world);
            }
            KeyCode::Escape => return false,
            _ => {}
        }
        true
    }

    fn handle_press(&mut self) {
        let point = self.world_cursor();
        self.slingshot.press(&self.world, point);
    }

    fn handle_release(&mut self) {
        let point = self.world_cursor();
        self.slingshot.release(&mut self.world, point);
    }

    fn apply(&mut self, action: MenuAction) {
        match action {
            MenuAction::PreviousShape => {
                self.selector.previous();
            }
            MenuAction::NextShape => {
                self.selector.next();
            }
            MenuAction::Create(shape) => match self.form.request(shape) {
                Ok(request) => {
                    log::info!("Creating {} {:?}", shape.name(), request.name);
                    self.world.obstacles.add(request.build());
                    self.status.clear();
                }
                Err(e) => self.report(e),
            },
            MenuAction::Remove => {
                let removed = self
                    .form
                    .name_for_removal()
                    .map(str::to_string)
                    .and_then(|name| self.world.obstacles.remove_named(&name));
                match removed {
                    Ok(count) => {
                        log::info!("Removed {} obstacle(s)", count);
                        self.status.clear();
                    }
                    Err(e) => self.report(e),
                }
            }
            MenuAction::ToggleMenu => self.menu.toggle_menu(),
            MenuAction::ToggleDescriptions => self.menu.toggle_descriptions(),
        }
    }

    fn update(&mut self, dt: f32) {
        self.status.tick(dt);

        if !self.overlay.wants_keyboard() {
            let input = PanInput::from_keys(&self.held_keys, &self.camera_keys);
            self.camera.step(&input);
        }

        if let Err(e) = self.world.update(dt) {
            self.report(e);
        }
        self.slingshot.forget_missing(&self.world);
        self.menu.set_pulling(self.slingshot.is_pulling());
    }

    fn build_scene(&mut self) {
        let cursor = self.world_cursor();
        let bounds = self.world.bounds;

        let batch = &mut self.batch;
        batch.clear();

        batch.rect_outline(
            bounds.min - WALL_RADIUS,
            bounds.size() + 2.0 * WALL_RADIUS,
            2.0 * WALL_RADIUS,
            colors::GRAY,
        );

        for obstacle in self.world.obstacles.iter() {
            match &obstacle.collider {
                Collider::Circle { center, radius } => {
                    batch.circle(*center, *radius, colors::GRAY);
                    batch.ring(*center, *radius, 2.0, colors::BLACK);
                }
                Collider::Segment { a, b, radius } => {
                    batch.line(*a, *b, radius * 2.0, colors::GRAY);
                    batch.circle(*a, *radius, colors::GRAY);
                    batch.circle(*b, *radius, colors::GRAY);
                }
                Collider::Polygon(points) => {
                    batch.convex_polygon(points, colors::GRAY);
                    batch.closed_polyline(points, 2.0, colors::BLACK);
                }
            }
        }

        for projectile in self.world.projectiles() {
            let center = projectile.position();
            batch.circle(center, projectile.radius, projectile.color);
            batch.ring(center, projectile.radius, 1.5, colors::BLACK);
            let rim = center + Vec2::from_angle(projectile.angle) * projectile.radius;
            batch.line(center, rim, 1.5, colors::BLACK);
        }

        if let Some(active) = self.slingshot.active().and_then(|id| self.world.get(id)) {
            let center = active.position();
            batch.ring(center, active.radius, 3.0, colors::RED);
            if self.slingshot.is_pulling() {
                batch.line(center, cursor, 3.0, colors::RED);
                batch.ring(cursor, active.radius, 3.0, colors::RED);
            }
        }
    }

    /// Obstacle names above each outline
    fn draw_labels(&self, ctx: &egui::Context) {
        let painter = ctx.layer_painter(egui::LayerId::background());
        let ppp = ctx.pixels_per_point();

        for obstacle in self.world.obstacles.iter() {
            let (min, max) = obstacle.collider.bounding_box();
            let anchor = Vec2::new((min.x + max.x) * 0.5, min.y - 6.0);
            let screen = self.camera.world_to_screen(anchor) / ppp;
            painter.text(
                egui::pos2(screen.x, screen.y),
                egui::Align2::CENTER_BOTTOM,
                &obstacle.name,
                egui::FontId::proportional(13.0),
                egui::Color32::BLACK,
            );
        }
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        draw_equations_sidebar(ctx, "Projectile Motion", PROJECTILE_EQUATIONS, PROJECTILE_VARIABLES);
        draw_info(ctx, self.status.text());

        let names: Vec<String> = self.world.obstacles.iter().map(|o| o.name.clone()).collect();
        let action = draw_menu(ctx, &self.menu, self.selector.current(), &mut self.form, &names);
        self.draw_labels(ctx);

        if let Some(action) = action {
            log::debug!("Menu action: {:?}", action);
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
            .render(&mut encoder, &view, num_vertices, colors::LIGHT_GRAY);
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
        "Projectile Motion Simulation",
        &config.window,
    ));

    log::info!("Starting projectile simulation");
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
                                    repeat,
                                    ..
                                },
                            ..
                        } => {
                            let typing = consumed || app.overlay.wants_keyboard();
                            if !typing || *state == ElementState::Released {
                                app.held_keys.handle(*key, *state);
                            }
                            if !typing && *state == ElementState::Pressed && !repeat && !app.handle_key(*key) {
                                elwt.exit();
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.cursor = Vec2::new(position.x as f32, position.y as f32);
                        }
                        WindowEvent::MouseInput {
                            state,
                            button: MouseButton::Left,
                            ..
                        } => match state {
                            ElementState::Pressed => {
                                if !consumed && !app.overlay.wants_pointer() {
                                    app.handle_press();
                                }
                            }
                            ElementState::Released => app.handle_release(),
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
