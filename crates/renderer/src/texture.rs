//! GPU texture registry behind the asset crate's allocator boundary.

use anyhow::{Result, bail};
use asset::texture::{TextureAllocator, TextureData, TextureHandle};
use wgpu::{
    Device, Extent3d, Queue, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView, TextureViewDescriptor, util::DeviceExt,
};

const TEXTURE_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

/// Owns uploaded texture views. Handle `n` maps to slot `n - 1`;
/// handle 0 stays the "no texture" sentinel.
pub struct TextureRegistry {
    views: Vec<TextureView>,
    white: TextureView,
}

impl TextureRegistry {
    pub fn new(device: &Device, queue: &Queue) -> Self {
        let white = upload(device, queue, "White 1x1", &TextureData::white());
        Self {
            views: Vec::new(),
            white,
        }
    }

    /// View for `handle`, or the white fallback for invalid/unknown handles.
    pub fn view(&self, handle: TextureHandle) -> &TextureView {
        handle
            .0
            .checked_sub(1)
            .and_then(|slot| self.views.get(slot as usize))
            .unwrap_or(&self.white)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Short-lived allocator borrowing the device for one load call.
pub struct TextureUploader<'a> {
    pub(crate) device: &'a Device,
    pub(crate) queue: &'a Queue,
    pub(crate) registry: &'a mut TextureRegistry,
}

impl TextureAllocator for TextureUploader<'_> {
    fn allocate(&mut self, label: &str, texture: &TextureData) -> Result<TextureHandle> {
        if !texture.is_valid() {
            bail!("texture '{}' has inconsistent size/data", label);
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if texture.width > max || texture.height > max {
            bail!(
                "texture '{}' is {}x{}, device limit is {}",
                label,
                texture.width,
                texture.height,
                max
            );
        }

        let view = upload(self.device, self.queue, label, texture);
        self.registry.views.push(view);
        let handle = TextureHandle(self.registry.views.len() as u32);
        log::debug!("Uploaded texture '{}' as {:?}", label, handle);
        Ok(handle)
    }
}

fn upload(device: &Device, queue: &Queue, label: &str, texture: &TextureData) -> TextureView {
    let tex = device.create_texture_with_data(
        queue,
        &TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width: texture.width,
                height: texture.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &texture.data,
    );
    tex.create_view(&TextureViewDescriptor::default())
}
