use std::num::NonZeroU32;

use gl_wrapper::renderer::GlRenderer;

/// Something whose backing pixel storage can be resized.
pub trait DrawSurface {
    fn resize_surface(&self, width: NonZeroU32, height: NonZeroU32);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width.get() as f32 / self.height.get() as f32
    }
}

/// Resizes `surface` and the GL viewport to exactly `width` x `height`.
///
/// A zero dimension (minimized window) leaves both untouched.
pub fn fit_viewport<S: DrawSurface + ?Sized>(
    surface: &S,
    renderer: &GlRenderer,
    width: u32,
    height: u32,
) -> Option<Viewport> {
    let viewport = Viewport::new(width, height)?;

    surface.resize_surface(viewport.width, viewport.height);
    renderer.resize(viewport.width.get(), viewport.height.get());

    Some(viewport)
}
