//! GPU implementation of the core `Renderer` contract.
//!
//! `submit` only stores the latest draw list; `present` turns it into one
//! vertex/index stream (layers in order, items in order, layer offset baked
//! into positions) and issues a single indexed draw. With no textures there
//! is nothing to batch by, so one draw call covers the whole frame.

use std::sync::Arc;

use ember_core::draw::{DrawList, Renderer};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::ScreenCamera;
use crate::gpu_context::GpuContext;
use crate::palette::{to_linear, visual_rgba};
use crate::quad_pipeline::QuadPipeline;
use crate::vertex::QuadVertex;

pub struct QuadRenderer {
    gpu: GpuContext,
    pipeline: QuadPipeline,
    camera: ScreenCamera,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    // Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    pending: Option<DrawList>,
}

impl QuadRenderer {
    pub fn new(window: Arc<Window>, viewport: (u32, u32)) -> Result<Self, String> {
        let gpu = GpuContext::new(window)?;
        let pipeline = QuadPipeline::new(&gpu.device, gpu.surface_format);
        let camera = ScreenCamera::new(viewport.0, viewport.1);

        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let vertex_capacity = 4096;
        let index_capacity = vertex_capacity / 4 * 6;
        let vertex_buffer = create_vertex_buffer(&gpu.device, vertex_capacity);
        let index_buffer = create_index_buffer(&gpu.device, index_capacity);

        Ok(Self {
            gpu,
            pipeline,
            camera,
            camera_buffer,
            camera_bind_group,
            vertex_buffer,
            index_buffer,
            vertex_capacity,
            index_capacity,
            pending: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Draw the most recently submitted frame, if any.
    pub fn present(&mut self) {
        let Some(frame) = self.pending.as_ref() else {
            return;
        };
        let (vertices, indices) = build_mesh(frame);
        let clear = to_linear(frame.clear_color, 1.0);
        self.ensure_capacity(vertices.len(), indices.len());

        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }

        let Some((output, view)) = self.gpu.acquire() else {
            return;
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear[0]),
                            g: f64::from(clear[1]),
                            b: f64::from(clear[2]),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if !indices.is_empty() {
                pass.set_pipeline(&self.pipeline.render_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn ensure_capacity(&mut self, vertex_count: usize, index_count: usize) {
        if vertex_count > self.vertex_capacity {
            self.vertex_capacity = vertex_count.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.vertex_capacity);
            log::debug!("Vertex buffer grown to {} vertices", self.vertex_capacity);
        }
        if index_count > self.index_capacity {
            self.index_capacity = index_count.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.index_capacity);
        }
    }
}

impl Renderer for QuadRenderer {
    fn submit(&mut self, frame: DrawList) {
        self.pending = Some(frame);
    }
}

/// Flatten a draw list into quads. Fully transparent items are skipped.
pub fn build_mesh(frame: &DrawList) -> (Vec<QuadVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(frame.item_count() * 4);
    let mut indices = Vec::with_capacity(frame.item_count() * 6);

    for layer in &frame.layers {
        for item in &layer.items {
            if item.opacity <= 0.0 {
                continue;
            }
            let rect = item.rect.offset(layer.offset);
            let color = to_linear(visual_rgba(&item.visual), item.opacity);
            let base = vertices.len() as u32;

            vertices.push(QuadVertex {
                position: [rect.left(), rect.top()],
                color,
            });
            vertices.push(QuadVertex {
                position: [rect.right(), rect.top()],
                color,
            });
            vertices.push(QuadVertex {
                position: [rect.right(), rect.bottom()],
                color,
            });
            vertices.push(QuadVertex {
                position: [rect.left(), rect.bottom()],
                color,
            });
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    (vertices, indices)
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<QuadVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Quad Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Quad Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
