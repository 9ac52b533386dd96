use std::sync::Arc;

use super::reflect::ShaderReflection;
use crate::gpu::RendererError;

/// A WGSL module plus what the backend learned about it at link time.
///
/// Not `Clone`: the manager owns it exclusively. The backend keeps a
/// shared reference to the bound program through [`WgpuProgram::share`].
#[derive(Debug)]
pub struct WgpuProgram {
    pub(crate) inner: Arc<ProgramInner>,
}

#[derive(Debug)]
pub(crate) struct ProgramInner {
    pub id: u64,
    pub label: String,
    pub module: wgpu::ShaderModule,
    pub link_error: Option<RendererError>,
    pub reflection: ShaderReflection,
}

impl WgpuProgram {
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn reflection(&self) -> &ShaderReflection {
        &self.inner.reflection
    }

    pub(crate) fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// An RGBA8 texture with its view and sampler.
#[derive(Debug)]
pub struct WgpuTexture {
    pub(crate) inner: Arc<TextureInner>,
}

#[derive(Debug)]
pub(crate) struct TextureInner {
    pub id: u64,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl WgpuTexture {
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.inner.texture.size();
        (size.width, size.height)
    }

    pub(crate) fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A vertex buffer of instance records.
#[derive(Debug)]
pub struct WgpuBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) size: u64,
}

impl WgpuBuffer {
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// A value built for one texture, rebuilt when a different texture is
/// asked for and dropped when its texture is released.
#[derive(Debug)]
pub(crate) struct TextureKeyed<T> {
    entry: Option<(u64, T)>,
}

impl<T> Default for TextureKeyed<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> TextureKeyed<T> {
    pub fn get_or_insert_with(&mut self, texture_id: u64, build: impl FnOnce() -> T) -> &T {
        if !matches!(&self.entry, Some((id, _)) if *id == texture_id) {
            self.entry = Some((texture_id, build()));
        }
        match &self.entry {
            Some((_, value)) => value,
            None => unreachable!(),
        }
    }

    pub fn invalidate(&mut self, texture_id: u64) {
        if matches!(&self.entry, Some((id, _)) if *id == texture_id) {
            self.entry = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_once_per_texture() {
        let mut cache = TextureKeyed::default();
        let mut builds = 0;
        for _ in 0..3 {
            let value = *cache.get_or_insert_with(7, || {
                builds += 1;
                "seven"
            });
            assert_eq!(value, "seven");
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn rebuilds_for_another_texture() {
        let mut cache = TextureKeyed::default();
        cache.get_or_insert_with(1, || 10);
        assert_eq!(*cache.get_or_insert_with(2, || 20), 20);
        assert_eq!(*cache.get_or_insert_with(2, || 99), 20);
    }

    #[test]
    fn invalidate_drops_only_the_released_texture() {
        let mut cache = TextureKeyed::default();
        cache.get_or_insert_with(1, || 10);

        cache.invalidate(2);
        assert_eq!(*cache.get_or_insert_with(1, || 99), 10);

        cache.invalidate(1);
        assert_eq!(*cache.get_or_insert_with(1, || 11), 11);
    }
}
