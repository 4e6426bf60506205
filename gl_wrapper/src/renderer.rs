use gl::types::GLuint;

use crate::api::Gl;
use crate::geometry::Geometry;
use crate::program::Program;

pub struct GlRenderer {
    gl: Gl,
    current_program: GLuint,
}

impl GlRenderer {
    pub fn new(gl: Gl) -> Self {
        Self {
            gl,
            current_program: 0,
        }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    /// Issues one triangle-list draw covering every vertex of `geometry`.
    pub fn draw(&mut self, geometry: &Geometry, program: &Program) {
        self.bind(program);
        self.gl.draw_triangles(0, geometry.vertices() as i32);
    }

    /// Makes `program` current unless it already is.
    pub fn bind(&mut self, program: &Program) {
        let p_id = program.get_id();
        if self.current_program != p_id {
            self.gl.use_program(p_id);
            self.current_program = p_id;
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{GeometryBuilder, VertexAttribute};
    use crate::program::ProgramBuilder;
    use crate::recording::{GlCall, RecordingGl};

    #[test]
    fn binds_program_once() {
        let rec = Rc::new(RecordingGl::new().with_attributes(&["p"]));
        let gl: Gl = rec.clone();
        let program = ProgramBuilder::new("v", "f").build(&gl).unwrap();
        let geometry = GeometryBuilder::new(&[0.0; 6])
            .with_attribute("p", VertexAttribute::Vec2)
            .build(&gl, &program)
            .unwrap();
        let mut renderer = GlRenderer::new(gl);

        renderer.draw(&geometry, &program);
        renderer.draw(&geometry, &program);

        assert_eq!(rec.count(|c| matches!(c, GlCall::UseProgram(_))), 1);
        assert_eq!(rec.count(|c| *c == GlCall::DrawTriangles(0, 3)), 2);
    }

    #[test]
    fn resize_sets_full_viewport() {
        let rec = Rc::new(RecordingGl::new());
        let renderer = GlRenderer::new(rec.clone());

        renderer.resize(1920, 1080);

        assert_eq!(rec.calls(), vec![GlCall::Viewport(0, 0, 1920, 1080)]);
    }
}
