//! egui overlay drawn on top of the simulation
//!
//! Control panels and the equations sidebar are egui windows painted in a second render
//! pass after the shapes.

use egui::{Color32, Context, RichText};
use winit::{event::WindowEvent, window::Window};

use crate::graphics::GraphicsContext;

pub struct Overlay {
    ctx: Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(gfx: &GraphicsContext) -> Self {
        let ctx = Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &gfx.window,
            Some(gfx.window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Self { ctx, state, renderer }
    }

    /// Feed a window event to egui; returns true when egui consumed it
    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// A handle to the egui context, cheap to clone
    pub fn context(&self) -> Context {
        self.ctx.clone()
    }

    /// True while a text field has keyboard focus
    pub fn wants_keyboard(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// True while the pointer is over a panel
    pub fn wants_pointer(&self) -> bool {
        self.ctx.is_pointer_over_area() || self.ctx.wants_pointer_input()
    }

    /// Input gathered since the last frame
    pub fn take_input(&mut self, window: &Window) -> egui::RawInput {
        self.state.take_egui_input(window)
    }

    /// Paint a finished egui frame onto `view`, loading what the shape pass drew
    ///
    /// Returns command buffers that must be submitted before `encoder`.
    pub fn paint(
        &mut self,
        gfx: &GraphicsContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        full_output: egui::FullOutput,
    ) -> Vec<wgpu::CommandBuffer> {
        self.state
            .handle_platform_output(&gfx.window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(&gfx.device, &gfx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gfx.size.width, gfx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let command_buffers = self.renderer.update_buffers(
            &gfx.device,
            &gfx.queue,
            encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        command_buffers
    }
}

/// An equation with its name and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

/// Draw the equations sidebar
pub fn draw_equations_sidebar(
    ctx: &Context,
    title: &str,
    equations: &[Equation],
    variables: &[(&str, &str)],
) {
    egui::SidePanel::left("equations_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading(RichText::new(title).color(Color32::LIGHT_BLUE));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.collapsing(RichText::new("Equations").strong(), |ui| {
                    for eq in equations {
                        ui.group(|ui| {
                            ui.label(RichText::new(eq.name).strong().color(Color32::YELLOW));
                            ui.label(RichText::new(eq.formula).monospace());
                            ui.label(RichText::new(eq.description).small().italics());
                        });
                        ui.add_space(4.0);
                    }
                });

                ui.add_space(8.0);

                ui.collapsing(RichText::new("Variables").strong(), |ui| {
                    egui::Grid::new("variables_grid")
                        .num_columns(2)
                        .spacing([10.0, 4.0])
                        .show(ui, |ui| {
                            for (symbol, meaning) in variables {
                                ui.label(
                                    RichText::new(*symbol)
                                        .monospace()
                                        .color(Color32::LIGHT_GREEN),
                                );
                                ui.label(*meaning);
                                ui.end_row();
                            }
                        });
                });
            });
        });
}

/// Text field that only accepts characters of a decimal number
///
/// Returns true when the text changed.
pub fn numeric_entry(ui: &mut egui::Ui, text: &mut String, enabled: bool) -> bool {
    let response = ui.add_enabled(
        enabled,
        egui::TextEdit::singleline(text).desired_width(90.0),
    );
    if response.changed() {
        text.retain(|c| c.is_ascii_digit() || c == '.' || c == '-');
        true
    } else {
        false
    }
}

/// Status line that disappears after a fixed time
#[derive(Debug, Clone, Default)]
pub struct StatusMessage {
    text: Option<String>,
    remaining: f32,
}

impl StatusMessage {
    pub fn show(&mut self, text: impl Into<String>, seconds: f32) {
        self.text = Some(text.into());
        self.remaining = seconds;
    }

    /// Advance by frame time, clearing the message once it expires
    pub fn tick(&mut self, dt: f32) {
        if self.text.is_some() {
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.text = None;
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }

    pub fn clear(&mut self) {
        self.text = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_expires() {
        let mut status = StatusMessage::default();
        status.show("Not enough values (min 2)", 2.0);
        status.tick(1.5);
        assert_eq!(status.text(), Some("Not enough values (min 2)"));
        status.tick(0.6);
        assert!(!status.is_visible());
    }

    #[test]
    fn test_status_message_replaced() {
        let mut status = StatusMessage::default();
        status.show("first", 0.5);
        status.show("second", 2.0);
        status.tick(1.0);
        assert_eq!(status.text(), Some("second"));
    }
}
