use std::time::Duration;

use thiserror::Error;

use gl_wrapper::geometry::GBError;
use gl_wrapper::program::PBError;
use gl_wrapper::renderer::GlRenderer;

use crate::viewport::Viewport;

pub mod app;
pub mod args;
pub mod config;
pub mod rotate_triangle;
pub mod shaders;
pub mod transform;
pub mod triangle;
pub mod viewport;

/// One tutorial program, driven by the window's redraw cycle.
pub trait Demo {
    /// Whether the host should schedule another frame after each one.
    fn animated(&self) -> bool;

    fn frame(&mut self, renderer: &mut GlRenderer, elapsed: Duration);

    /// Called after the surface and GL viewport took a new size.
    fn resize(&mut self, _renderer: &mut GlRenderer, _viewport: Viewport) {}
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("shader program: {0}")]
    Program(#[from] PBError),
    #[error("geometry: {0}")]
    Geometry(#[from] GBError),
}
