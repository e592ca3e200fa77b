//! A backend without a GPU. Resources are plain ids and every context call is
//! recorded, which lets the shader bridges run (and be inspected) anywhere.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::device::*;
use super::texture::TextureData;
use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub id: u32,
    pub kind: ResourceKind,
    /// Byte size for buffers, zero otherwise.
    pub size: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_id: AtomicU32,
    failing: Vec<ResourceKind>,
    created: Mutex<Vec<(Handle, String)>>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every creation of `kind` fail.
    pub fn failing(mut self, kind: ResourceKind) -> Self {
        self.failing.push(kind);
        self
    }

    /// Every resource created so far, with its label.
    pub fn created(&self) -> Vec<(Handle, String)> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }

    pub fn created_count(&self, kind: ResourceKind) -> usize {
        self.created()
            .iter()
            .filter(|(handle, _)| handle.kind == kind)
            .count()
    }

    fn create(&self, kind: ResourceKind, size: usize, label: &str) -> Result<Handle, DeviceError> {
        if self.failing.contains(&kind) {
            return Err(DeviceError::Create {
                kind,
                message: format!("{label} rejected by headless device"),
            });
        }

        let handle = Handle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            size,
        };
        log::debug!("Created {kind} #{} ({label})", handle.id);

        if let Ok(mut created) = self.created.lock() {
            created.push((handle, label.to_string()));
        }
        Ok(handle)
    }

    fn create_with_data(
        &self,
        kind: ResourceKind,
        data: &[u8],
        label: &str,
    ) -> Result<Handle, DeviceError> {
        if data.is_empty() {
            return Err(DeviceError::EmptyData(kind));
        }
        self.create(kind, data.len(), label)
    }
}

impl GraphicsDevice for HeadlessDevice {
    type Buffer = Handle;
    type VertexShader = Handle;
    type PixelShader = Handle;
    type InputLayout = Handle;
    type Texture = Handle;
    type Sampler = Handle;

    fn create_vertex_buffer(&self, data: &[u8], label: &str) -> Result<Handle, DeviceError> {
        self.create_with_data(ResourceKind::VertexBuffer, data, label)
    }

    fn create_index_buffer(&self, data: &[u8], label: &str) -> Result<Handle, DeviceError> {
        self.create_with_data(ResourceKind::IndexBuffer, data, label)
    }

    fn create_constant_buffer(&self, size: usize, label: &str) -> Result<Handle, DeviceError> {
        if size == 0 || size % 16 != 0 {
            return Err(DeviceError::Create {
                kind: ResourceKind::ConstantBuffer,
                message: format!("{label}: size {size} is not a positive multiple of 16"),
            });
        }
        self.create(ResourceKind::ConstantBuffer, size, label)
    }

    fn create_vertex_shader(&self, bytecode: &[u8]) -> Result<Handle, DeviceError> {
        self.create_with_data(ResourceKind::VertexShader, bytecode, "vertex shader")
    }

    fn create_pixel_shader(&self, bytecode: &[u8]) -> Result<Handle, DeviceError> {
        self.create_with_data(ResourceKind::PixelShader, bytecode, "pixel shader")
    }

    fn create_input_layout(
        &self,
        elements: &[InputElement],
        vs_bytecode: &[u8],
    ) -> Result<Handle, DeviceError> {
        if elements.is_empty() || vs_bytecode.is_empty() {
            return Err(DeviceError::EmptyData(ResourceKind::InputLayout));
        }
        self.create(ResourceKind::InputLayout, 0, "input layout")
    }

    fn create_texture(&self, data: &TextureData) -> Result<Handle, DeviceError> {
        self.create_with_data(
            ResourceKind::Texture,
            &data.pixels,
            &format!("{}x{} texture", data.width, data.height),
        )
    }

    fn create_sampler(&self) -> Result<Handle, DeviceError> {
        self.create(ResourceKind::Sampler, 0, "linear wrap sampler")
    }
}

/// A context call as seen by [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    UpdateBuffer {
        buffer: Handle,
        data: Vec<u8>,
    },
    SetPipeline {
        vertex_shader: Handle,
        pixel_shader: Handle,
        input_layout: Handle,
    },
    SetVsConstantBuffers {
        start_slot: u32,
        buffers: Vec<Handle>,
    },
    SetPsConstantBuffers {
        start_slot: u32,
        buffers: Vec<Handle>,
    },
    SetPsTexture {
        slot: u32,
        texture: Handle,
        sampler: Handle,
    },
    SetVertexBuffer {
        buffer: Handle,
        stride: u32,
    },
    SetIndexBuffer {
        buffer: Handle,
    },
    DrawIndexed {
        index_count: u32,
    },
    Clear {
        color: Color,
    },
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    commands: Vec<Command>,
    fail_buffer_updates: bool,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every `update_buffer` fails as if the map call did.
    pub fn fail_buffer_updates(&mut self, fail: bool) {
        self.fail_buffer_updates = fail;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Buffers written since the log was last taken, in order.
    pub fn buffer_writes(&self) -> Vec<Handle> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::UpdateBuffer { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::DrawIndexed { .. }))
            .count()
    }
}

impl GraphicsContext for HeadlessContext {
    type Device = HeadlessDevice;

    fn update_buffer(&mut self, buffer: &Handle, data: &[u8]) -> Result<(), DeviceError> {
        if self.fail_buffer_updates {
            return Err(DeviceError::Map(format!("buffer #{} is not mappable", buffer.id)));
        }
        if data.len() > buffer.size {
            return Err(DeviceError::Oversize {
                size: data.len(),
                capacity: buffer.size,
            });
        }

        self.commands.push(Command::UpdateBuffer {
            buffer: *buffer,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn set_pipeline(&mut self, vertex_shader: &Handle, pixel_shader: &Handle, input_layout: &Handle) {
        self.commands.push(Command::SetPipeline {
            vertex_shader: *vertex_shader,
            pixel_shader: *pixel_shader,
            input_layout: *input_layout,
        });
    }

    fn set_vs_constant_buffers(&mut self, start_slot: u32, buffers: &[&Handle]) {
        self.commands.push(Command::SetVsConstantBuffers {
            start_slot,
            buffers: buffers.iter().map(|&&b| b).collect(),
        });
    }

    fn set_ps_constant_buffers(&mut self, start_slot: u32, buffers: &[&Handle]) {
        self.commands.push(Command::SetPsConstantBuffers {
            start_slot,
            buffers: buffers.iter().map(|&&b| b).collect(),
        });
    }

    fn set_ps_texture(&mut self, slot: u32, texture: &Handle, sampler: &Handle) {
        self.commands.push(Command::SetPsTexture {
            slot,
            texture: *texture,
            sampler: *sampler,
        });
    }

    fn set_vertex_buffer(&mut self, buffer: &Handle, stride: u32) {
        self.commands.push(Command::SetVertexBuffer {
            buffer: *buffer,
            stride,
        });
    }

    fn set_index_buffer(&mut self, buffer: &Handle) {
        self.commands.push(Command::SetIndexBuffer { buffer: *buffer });
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(Command::DrawIndexed { index_count });
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear { color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_labelled() {
        let device = HeadlessDevice::new();
        let a = device.create_constant_buffer(64, "a").unwrap();
        let b = device.create_vertex_buffer(&[0; 32], "b").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.size, 32);
        assert_eq!(device.created_count(ResourceKind::ConstantBuffer), 1);
        assert_eq!(device.created()[1].1, "b");
    }

    #[test]
    fn injected_failures() {
        let device = HeadlessDevice::new().failing(ResourceKind::Sampler);
        assert!(matches!(
            device.create_sampler(),
            Err(DeviceError::Create {
                kind: ResourceKind::Sampler,
                ..
            })
        ));
        assert!(matches!(
            device.create_index_buffer(&[], "empty"),
            Err(DeviceError::EmptyData(ResourceKind::IndexBuffer))
        ));
        assert!(device.create_constant_buffer(12, "unaligned").is_err());
    }

    #[test]
    fn context_rejects_oversize_and_failed_maps() {
        let device = HeadlessDevice::new();
        let buffer = device.create_constant_buffer(16, "small").unwrap();
        let mut context = HeadlessContext::new();

        assert!(matches!(
            context.update_buffer(&buffer, &[0; 32]),
            Err(DeviceError::Oversize { size: 32, capacity: 16 })
        ));

        context.fail_buffer_updates(true);
        assert!(matches!(
            context.update_buffer(&buffer, &[0; 16]),
            Err(DeviceError::Map(_))
        ));
        assert!(context.commands().is_empty());

        context.fail_buffer_updates(false);
        context.update_buffer(&buffer, &[1; 16]).unwrap();
        assert_eq!(context.buffer_writes(), vec![buffer]);
    }
}
