//! Rendering system for flat 2D shapes
//!
//! Simulations describe each frame as a [`ShapeBatch`] of coloured triangles in world
//! coordinates; [`ShapeRenderer`] uploads the batch and draws it in one call.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::camera::{Camera2D, CameraUniform};
use crate::graphics::{create_uniform_buffer, create_vertex_buffer, GraphicsContext, Vertex};

/// Segments used to approximate a full circle
const CIRCLE_SEGMENTS: usize = 40;

/// CPU-side triangle list rebuilt every frame
#[derive(Debug, Clone, Default)]
pub struct ShapeBatch {
    vertices: Vec<Vertex>,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        self.vertices.extend([
            Vertex::new(a, color),
            Vertex::new(b, color),
            Vertex::new(c, color),
        ]);
    }

    /// Axis-aligned filled rectangle from its top-left corner
    pub fn rect(&mut self, top_left: Vec2, size: Vec2, color: [f32; 4]) {
        let tr = top_left + Vec2::new(size.x, 0.0);
        let bl = top_left + Vec2::new(0.0, size.y);
        let br = top_left + size;
        self.triangle(top_left, tr, br, color);
        self.triangle(top_left, br, bl, color);
    }

    pub fn rect_outline(&mut self, top_left: Vec2, size: Vec2, width: f32, color: [f32; 4]) {
        let corners = [
            top_left,
            top_left + Vec2::new(size.x, 0.0),
            top_left + size,
            top_left + Vec2::new(0.0, size.y),
        ];
        self.closed_polyline(&corners, width, color);
    }

    /// Straight line as a quad of the given width; zero-length lines are skipped
    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        let dir = to - from;
        let Some(normal) = dir.perp().try_normalize() else {
            return;
        };
        let half = normal * (width * 0.5);
        self.triangle(from - half, to - half, to + half, color);
        self.triangle(from - half, to + half, from + half, color);
    }

    pub fn polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }

    pub fn closed_polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        self.polyline(points, width, color);
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 2 {
                self.line(last, first, width, color);
            }
        }
    }

    /// Filled convex polygon as a triangle fan
    pub fn convex_polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        if points.len() < 3 {
            return;
        }
        for i in 1..points.len() - 1 {
            self.triangle(points[0], points[i], points[i + 1], color);
        }
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let points = circle_points(center, radius);
        for i in 0..CIRCLE_SEGMENTS {
            self.triangle(center, points[i], points[(i + 1) % CIRCLE_SEGMENTS], color);
        }
    }

    /// Circle outline of the given stroke width
    pub fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: [f32; 4]) {
        let outer = circle_points(center, radius);
        let inner = circle_points(center, (radius - width).max(0.0));
        for i in 0..CIRCLE_SEGMENTS {
            let j = (i + 1) % CIRCLE_SEGMENTS;
            self.triangle(outer[i], outer[j], inner[j], color);
            self.triangle(outer[i], inner[j], inner[i], color);
        }
    }
}

fn circle_points(center: Vec2, radius: f32) -> Vec<Vec2> {
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

pub struct ShapeRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    max_vertices: usize,
}

impl ShapeRenderer {
    pub fn new(ctx: &GraphicsContext, max_vertices: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shape.wgsl").into()),
        });

        let camera_buffer = create_uniform_buffer(
            device,
            &CameraUniform::from_camera(&Camera2D::new(ctx.viewport())),
        );

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let vertex_buffer = create_vertex_buffer(device, max_vertices);

        Self {
            pipeline,
            vertex_buffer,
            camera_buffer,
            camera_bind_group,
            max_vertices,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload the batch and return the number of vertices to draw
    pub fn upload(&self, queue: &wgpu::Queue, batch: &ShapeBatch) -> u32 {
        let mut count = batch.len().min(self.max_vertices);
        if count < batch.len() {
            log::warn!(
                "Shape batch truncated: {} vertices, capacity {}",
                batch.len(),
                self.max_vertices
            );
            // Keep whole triangles
            count -= count % 3;
        }
        if count > 0 {
            queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&batch.vertices()[..count]),
            );
        }
        count as u32
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        num_vertices: u32,
        clear_color: [f32; 4],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shape Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear_color[0] as f64,
                        g: clear_color[1] as f64,
                        b: clear_color[2] as f64,
                        a: clear_color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if num_vertices == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..num_vertices, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_rect_is_two_triangles() {
        let mut batch = ShapeBatch::new();
        batch.rect(Vec2::ZERO, Vec2::new(10.0, 5.0), RED);
        assert_eq!(batch.len(), 6);
        assert!(batch
            .vertices()
            .iter()
            .any(|v| v.position == [10.0, 5.0]));
    }

    #[test]
    fn test_line_has_requested_width() {
        let mut batch = ShapeBatch::new();
        batch.line(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, RED);
        assert_eq!(batch.len(), 6);
        let ys: Vec<f32> = batch.vertices().iter().map(|v| v.position[1]).collect();
        let max = ys.iter().cloned().fold(f32::MIN, f32::max);
        let min = ys.iter().cloned().fold(f32::MAX, f32::min);
        assert!((max - min - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_line_skipped() {
        let mut batch = ShapeBatch::new();
        batch.line(Vec2::ONE, Vec2::ONE, 3.0, RED);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_polygon_fan() {
        let mut batch = ShapeBatch::new();
        let square = [
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        batch.convex_polygon(&square, RED);
        assert_eq!(batch.len(), 6);

        batch.clear();
        batch.convex_polygon(&square[..2], RED);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_circle_vertices_on_radius() {
        let mut batch = ShapeBatch::new();
        let center = Vec2::new(5.0, 5.0);
        batch.circle(center, 2.0, RED);
        assert_eq!(batch.len(), CIRCLE_SEGMENTS * 3);
        for v in batch.vertices() {
            let d = Vec2::from(v.position).distance(center);
            assert!(d < 1e-5 || (d - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_closed_polyline_adds_closing_edge() {
        let mut batch = ShapeBatch::new();
        let tri = [Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)];
        batch.closed_polyline(&tri, 1.0, RED);
        assert_eq!(batch.len(), 3 * 6);
    }
}
