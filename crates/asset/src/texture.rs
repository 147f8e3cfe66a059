//! Texture decoding and the GPU allocation boundary.

use std::path::Path;

use anyhow::Context;

/// Opaque texture handle handed out by a [`TextureAllocator`].
/// `0` is reserved as the "no texture" sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const INVALID: Self = Self(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channel count of the source image before RGBA8 expansion.
    pub source_channels: u8,
}

impl TextureData {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// RGBA8 byte count for `width` x `height`, computed in 64 bits.
    pub fn rgba8_len(width: u32, height: u32) -> u64 {
        u64::from(width) * u64::from(height) * u64::from(Self::BYTES_PER_PIXEL)
    }

    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len() as u64,
            Self::rgba8_len(width, height),
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            source_channels: 4,
        }
    }

    /// Decode any format the `image` crate was built with, expanded to RGBA8.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img =
            image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;
        let source_channels = img.color().channel_count();

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!(
            "Loaded texture {}x{} ({} channel source)",
            width,
            height,
            source_channels
        );

        Ok(Self {
            data,
            width,
            height,
            source_channels,
        })
    }

    /// 1x1 opaque white, bound when a mesh has no diffuse texture.
    pub fn white() -> Self {
        Self::new_rgba8(1, 1, vec![255; 4])
    }

    pub fn is_valid(&self) -> bool {
        self.data.len() as u64 == Self::rgba8_len(self.width, self.height)
            && self.width > 0
            && self.height > 0
    }
}

/// Turns decoded pixels into a GPU texture. Implemented by the renderer.
pub trait TextureAllocator {
    fn allocate(&mut self, label: &str, texture: &TextureData) -> anyhow::Result<TextureHandle>;
}

/// Decode `path` and hand it to `allocator`. Any failure is logged and
/// yields [`TextureHandle::INVALID`] so rendering can go on untextured.
pub fn load_texture(path: &Path, allocator: &mut dyn TextureAllocator) -> TextureHandle {
    let result = TextureData::load(path).and_then(|texture| {
        let label = path.display().to_string();
        allocator.allocate(&label, &texture)
    });
    match result {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("Texture {} unavailable: {:#}", path.display(), e);
            TextureHandle::INVALID
        }
    }
}
