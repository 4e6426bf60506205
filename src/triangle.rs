use std::time::Duration;

use gl_wrapper::geometry::{Geometry, GeometryBuilder, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder};
use gl_wrapper::renderer::GlRenderer;

use crate::shaders::{ShaderDialect, ATTR_COLOR, ATTR_POSITION, COLOR_FRAGMENT, FLAT_VERTEX};
use crate::{Demo, DemoError};

#[rustfmt::skip]
pub const FLAT_TRIANGLE: [f32; 15] = [
//   X     Y      R    G    B
     0.0,  0.5,   1.0, 1.0, 0.0,
    -0.5, -0.5,   0.7, 0.0, 1.0,
     0.5, -0.5,   0.1, 1.0, 1.0,
];

/// Static 2D triangle in clip space.
pub struct FlatTriangle {
    // geometry is released before the program it was described against
    geometry: Geometry,
    program: Program,
}

impl FlatTriangle {
    pub fn new(renderer: &mut GlRenderer, dialect: ShaderDialect) -> Result<Self, DemoError> {
        Self::with_sources(
            renderer,
            &dialect.source(FLAT_VERTEX),
            &dialect.source(COLOR_FRAGMENT),
        )
    }

    pub fn with_sources(
        renderer: &mut GlRenderer,
        vert_src: &str,
        frag_src: &str,
    ) -> Result<Self, DemoError> {
        let gl = renderer.gl().clone();

        let program = ProgramBuilder::new(vert_src, frag_src).build(&gl)?;

        let geometry = GeometryBuilder::new(&FLAT_TRIANGLE)
            .with_attribute(ATTR_POSITION, VertexAttribute::Vec2)
            .with_attribute(ATTR_COLOR, VertexAttribute::Vec3)
            .build(&gl, &program)?;

        Ok(Self { geometry, program })
    }

    pub fn draw(&self, renderer: &mut GlRenderer) {
        renderer.draw(&self.geometry, &self.program);
    }
}

impl Demo for FlatTriangle {
    fn animated(&self) -> bool {
        false
    }

    fn frame(&mut self, renderer: &mut GlRenderer, _elapsed: Duration) {
        self.draw(renderer);
    }
}
