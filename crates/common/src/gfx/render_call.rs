use std::marker::PhantomData;

use bytemuck::Pod;

use super::device::{DeviceError, GraphicsContext, GraphicsDevice, InputElement, ResourceKind};

/// Interleaved vertex format understood by one shader.
pub trait Vertex: Pod {
    const LAYOUT: &'static [InputElement];
}

/// Geometry uploaded once and drawn many times. Typed by its vertex so it can
/// only be handed to the shader that understands that layout.
pub struct RenderCall<D: GraphicsDevice, V> {
    vertex_buffer: D::Buffer,
    index_buffer: D::Buffer,
    vertex_count: u32,
    index_count: u32,
    _vertex: PhantomData<fn() -> V>,
}

impl<D: GraphicsDevice, V> Clone for RenderCall<D, V> {
    fn clone(&self) -> Self {
        Self {
            vertex_buffer: self.vertex_buffer.clone(),
            index_buffer: self.index_buffer.clone(),
            vertex_count: self.vertex_count,
            index_count: self.index_count,
            _vertex: PhantomData,
        }
    }
}

impl<D: GraphicsDevice, V: Vertex> RenderCall<D, V> {
    pub fn new(device: &D, vertices: &[V], indices: &[u32]) -> Result<Self, DeviceError> {
        if vertices.is_empty() {
            return Err(DeviceError::EmptyData(ResourceKind::VertexBuffer));
        }
        if indices.is_empty() {
            return Err(DeviceError::EmptyData(ResourceKind::IndexBuffer));
        }
        let vertex_count = element_count(ResourceKind::VertexBuffer, vertices.len())?;
        let index_count = element_count(ResourceKind::IndexBuffer, indices.len())?;

        let vertex_buffer =
            device.create_vertex_buffer(bytemuck::cast_slice(vertices), "render call vertices")?;
        let index_buffer =
            device.create_index_buffer(bytemuck::cast_slice(indices), "render call indices")?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count,
            index_count,
            _vertex: PhantomData,
        })
    }

    const STRIDE: u32 = {
        assert!(std::mem::size_of::<V>() <= u32::MAX as usize);
        std::mem::size_of::<V>() as u32
    };

    pub fn stride() -> u32 {
        Self::STRIDE
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the geometry and issues one indexed triangle-list draw.
    pub fn draw<C: GraphicsContext<Device = D>>(&self, context: &mut C) {
        context.set_vertex_buffer(&self.vertex_buffer, Self::stride());
        context.set_index_buffer(&self.index_buffer);
        context.draw_indexed(self.index_count);
    }
}

fn element_count(kind: ResourceKind, count: usize) -> Result<u32, DeviceError> {
    u32::try_from(count).map_err(|_| DeviceError::TooManyElements { kind, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::device::VertexFormat;
    use crate::gfx::headless::{Command, HeadlessContext, HeadlessDevice};
    use bytemuck::Zeroable;

    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    #[repr(C)]
    struct Point([f32; 4]);

    impl Vertex for Point {
        const LAYOUT: &'static [InputElement] = &[InputElement {
            semantic: c"POSITION",
            format: VertexFormat::Float32x4,
            offset: 0,
        }];
    }

    #[test]
    fn counts_are_preserved() {
        let device = HeadlessDevice::new();
        let vertices = [Point([0.0; 4]); 5];
        let indices = [0, 1, 2, 2, 3, 4, 4, 1, 0];
        let call = RenderCall::<_, Point>::new(&device, &vertices, &indices).unwrap();

        assert_eq!(call.vertex_count(), 5);
        assert_eq!(call.index_count(), 9);

        let sizes: Vec<usize> = device.created().iter().map(|(h, _)| h.size).collect();
        assert_eq!(sizes, vec![5 * 16, 9 * 4]);
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let device = HeadlessDevice::new();
        assert!(matches!(
            RenderCall::<_, Point>::new(&device, &[], &[0]),
            Err(DeviceError::EmptyData(ResourceKind::VertexBuffer))
        ));
        assert!(matches!(
            RenderCall::new(&device, &[Point([0.0; 4])], &[]),
            Err(DeviceError::EmptyData(ResourceKind::IndexBuffer))
        ));
        assert!(device.created().is_empty());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn counts_beyond_u32_are_rejected() {
        let count = u32::MAX as usize + 1;
        assert!(matches!(
            element_count(ResourceKind::IndexBuffer, count),
            Err(DeviceError::TooManyElements {
                kind: ResourceKind::IndexBuffer,
                count: c,
            }) if c == count
        ));
        assert_eq!(element_count(ResourceKind::VertexBuffer, 7).unwrap(), 7);
    }

    #[test]
    fn draw_binds_and_draws() {
        let device = HeadlessDevice::new();
        let call = RenderCall::new(&device, &[Point([0.0; 4]); 3], &[0, 1, 2]).unwrap();
        let mut context = HeadlessContext::new();
        call.draw(&mut context);

        assert!(matches!(
            context.commands(),
            [
                Command::SetVertexBuffer { stride: 16, .. },
                Command::SetIndexBuffer { .. },
                Command::DrawIndexed { index_count: 3 },
            ]
        ));
    }
}
