use std::path::Path;

use image::ImageFormat;

use super::device::{DeviceError, GraphicsDevice};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("could not read texture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode PNG: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Tightly packed RGBA8 pixels, first row at the bottom of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decodes a PNG and flips it vertically so that `v = 0` samples the
    /// bottom row, which is what the OBJ texture coordinates expect.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, TextureError> {
        let mut image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
        image::imageops::flip_vertical_in_place(&mut image);

        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    pub fn load_png(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let data = Self::decode_png(&bytes)?;
        log::info!("Loaded texture {}: {}x{}", path.display(), data.width, data.height);
        Ok(data)
    }

    pub fn row_pitch(&self) -> u32 {
        self.width * 4
    }
}

/// A sampled 2D texture living on the device.
pub struct Texture<D: GraphicsDevice> {
    handle: D::Texture,
    width: u32,
    height: u32,
}

impl<D: GraphicsDevice> Clone for Texture<D> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<D: GraphicsDevice> Texture<D> {
    pub fn new(device: &D, data: &TextureData) -> Result<Self, TextureError> {
        let handle = device.create_texture(data)?;
        Ok(Self {
            handle,
            width: data.width,
            height: data.height,
        })
    }

    pub fn handle(&self) -> &D::Texture {
        &self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
