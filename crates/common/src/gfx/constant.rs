//! Constant-buffer contents grouped by how often they change, each with a
//! modified flag so unchanged groups are never re-uploaded.

use bytemuck::{Pod, Zeroable};

use super::device::{Buffer, DeviceError, GraphicsContext, GraphicsDevice};
use super::light::{DirectionalLight, Material};
use super::shader::ShaderError;
use crate::color::Color;
use crate::math::*;

/// CPU copy of one constant buffer plus its modified flag.
#[derive(Debug, Clone)]
pub struct ConstantBlock<T> {
    data: T,
    dirty: bool,
}

impl<T: Pod> ConstantBlock<T> {
    /// New blocks start modified so their first use uploads them.
    pub fn new(data: T) -> Self {
        Self { data, dirty: true }
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    pub fn set(&mut self, data: T) {
        self.data = data;
        self.dirty = true;
    }

    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.data);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Uploads the block if it was modified. Returns whether a write happened.
    /// On failure the block stays modified.
    pub fn sync<C: GraphicsContext>(
        &mut self,
        context: &mut C,
        buffer: &Buffer<C::Device>,
    ) -> Result<bool, DeviceError> {
        if !self.dirty {
            return Ok(false);
        }
        context.update_buffer(buffer, bytemuck::bytes_of(&self.data))?;
        self.dirty = false;
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct VsPerObject {
    pub model: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct VsPerFrame {
    pub view: Mat4,
    pub projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PsPerObject {
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PsPerFrame {
    pub camera_position: Vec3,
    pub extra: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PsPerScene {
    pub sun: DirectionalLight,
}

struct ConstantBuffers<D: GraphicsDevice> {
    vs_object: D::Buffer,
    vs_frame: D::Buffer,
    ps_object: D::Buffer,
    ps_frame: D::Buffer,
    ps_scene: D::Buffer,
}

/// The five parameter blocks of a lit shader and, once created, their buffers.
///
/// Binding: vertex shader `b0` object, `b1` frame; pixel shader `b0` object,
/// `b1` frame, `b2` scene. Matrices are uploaded as glam stores them (column
/// major), which matches the default HLSL packing used with `mul(M, v)`.
pub struct SceneConstants<D: GraphicsDevice> {
    vs_object: ConstantBlock<VsPerObject>,
    vs_frame: ConstantBlock<VsPerFrame>,
    ps_object: ConstantBlock<PsPerObject>,
    ps_frame: ConstantBlock<PsPerFrame>,
    ps_scene: ConstantBlock<PsPerScene>,

    buffers: Option<ConstantBuffers<D>>,
}

impl<D: GraphicsDevice> Default for SceneConstants<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GraphicsDevice> SceneConstants<D> {
    pub fn new() -> Self {
        Self {
            vs_object: ConstantBlock::new(VsPerObject {
                model: Mat4::IDENTITY,
            }),
            vs_frame: ConstantBlock::new(VsPerFrame {
                view: Mat4::IDENTITY,
                projection: Mat4::IDENTITY,
            }),
            ps_object: ConstantBlock::new(PsPerObject {
                material: Material::new(Color::BLACK, Color::BLACK, Color::BLACK),
            }),
            ps_frame: ConstantBlock::new(PsPerFrame {
                camera_position: Vec3::ZERO,
                extra: 0.0,
            }),
            ps_scene: ConstantBlock::new(PsPerScene {
                sun: DirectionalLight::new(Vec3::Y, Color::CREAM, Color::CREAM, Color::CREAM),
            }),
            buffers: None,
        }
    }

    /// Creates one dynamic buffer per block. New buffers hold nothing yet,
    /// so every block is uploaded again on the next sync.
    pub fn create_buffers(&mut self, device: &D) -> Result<(), DeviceError> {
        fn create<D: GraphicsDevice, T>(device: &D, label: &str) -> Result<D::Buffer, DeviceError> {
            device.create_constant_buffer(std::mem::size_of::<T>(), label)
        }

        self.buffers = Some(ConstantBuffers {
            vs_object: create::<D, VsPerObject>(device, "vs per-object constants")?,
            vs_frame: create::<D, VsPerFrame>(device, "vs per-frame constants")?,
            ps_object: create::<D, PsPerObject>(device, "ps per-object constants")?,
            ps_frame: create::<D, PsPerFrame>(device, "ps per-frame constants")?,
            ps_scene: create::<D, PsPerScene>(device, "ps per-scene constants")?,
        });
        self.mark_all_dirty();
        Ok(())
    }

    pub fn mark_all_dirty(&mut self) {
        self.vs_object.mark_dirty();
        self.vs_frame.mark_dirty();
        self.ps_object.mark_dirty();
        self.ps_frame.mark_dirty();
        self.ps_scene.mark_dirty();
    }

    pub fn has_buffers(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn set_model_transform(&mut self, model: Mat4) {
        self.vs_object.modify(|block| block.model = model);
    }

    pub fn set_view_transform(&mut self, view: Mat4) {
        self.vs_frame.modify(|block| block.view = view);
    }

    pub fn set_projection_transform(&mut self, projection: Mat4) {
        self.vs_frame.modify(|block| block.projection = projection);
    }

    pub fn set_object_material(&mut self, material: Material) {
        self.ps_object.modify(|block| block.material = material);
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.ps_frame.modify(|block| {
            block.camera_position = position;
            block.extra = 1.0;
        });
    }

    pub fn set_sun_light(&mut self, sun: DirectionalLight) {
        self.ps_scene.modify(|block| block.sun = sun);
    }

    pub fn vs_per_object(&self) -> &ConstantBlock<VsPerObject> {
        &self.vs_object
    }

    pub fn vs_per_frame(&self) -> &ConstantBlock<VsPerFrame> {
        &self.vs_frame
    }

    pub fn ps_per_object(&self) -> &ConstantBlock<PsPerObject> {
        &self.ps_object
    }

    pub fn ps_per_frame(&self) -> &ConstantBlock<PsPerFrame> {
        &self.ps_frame
    }

    pub fn ps_per_scene(&self) -> &ConstantBlock<PsPerScene> {
        &self.ps_scene
    }

    pub fn any_dirty(&self) -> bool {
        self.vs_object.is_dirty()
            || self.vs_frame.is_dirty()
            || self.ps_object.is_dirty()
            || self.ps_frame.is_dirty()
            || self.ps_scene.is_dirty()
    }

    /// Uploads every modified block and binds all five buffers.
    /// Returns how many blocks were written.
    pub fn sync_and_bind<C>(&mut self, context: &mut C) -> Result<usize, ShaderError>
    where
        C: GraphicsContext<Device = D>,
    {
        let buffers = self.buffers.as_ref().ok_or(ShaderError::NotInitialized)?;

        let written = [
            self.vs_object.sync(context, &buffers.vs_object)?,
            self.vs_frame.sync(context, &buffers.vs_frame)?,
            self.ps_object.sync(context, &buffers.ps_object)?,
            self.ps_frame.sync(context, &buffers.ps_frame)?,
            self.ps_scene.sync(context, &buffers.ps_scene)?,
        ]
        .into_iter()
        .filter(|&written| written)
        .count();

        context.set_vs_constant_buffers(0, &[&buffers.vs_object, &buffers.vs_frame]);
        context.set_ps_constant_buffers(
            0,
            &[&buffers.ps_object, &buffers.ps_frame, &buffers.ps_scene],
        );

        Ok(written)
    }
}

/// Parameter setters shared by every shader built on [`SceneConstants`].
pub trait LitShader<D: GraphicsDevice> {
    fn constants(&self) -> &SceneConstants<D>;
    fn constants_mut(&mut self) -> &mut SceneConstants<D>;

    fn set_model_transform(&mut self, model: Mat4) {
        self.constants_mut().set_model_transform(model);
    }

    fn set_view_transform(&mut self, view: Mat4) {
        self.constants_mut().set_view_transform(view);
    }

    fn set_projection_transform(&mut self, projection: Mat4) {
        self.constants_mut().set_projection_transform(projection);
    }

    fn set_object_material(&mut self, material: Material) {
        self.constants_mut().set_object_material(material);
    }

    fn set_camera_position(&mut self, position: Vec3) {
        self.constants_mut().set_camera_position(position);
    }

    fn set_sun_light(&mut self, sun: DirectionalLight) {
        self.constants_mut().set_sun_light(sun);
    }
}
