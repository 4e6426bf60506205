use std::time::Duration;

use gl::types::GLint;

use gl_wrapper::geometry::{Geometry, GeometryBuilder, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder};
use gl_wrapper::renderer::GlRenderer;

use crate::config::DemoConfig;
use crate::shaders::{
    ShaderDialect, ATTR_COLOR, ATTR_POSITION, COLOR_FRAGMENT, PERSPECTIVE_VERTEX, UNIFORM_PROJ,
    UNIFORM_VIEW, UNIFORM_WORLD,
};
use crate::transform::{column_major, Transforms};
use crate::viewport::Viewport;
use crate::{Demo, DemoError};

#[rustfmt::skip]
pub const TRIANGLE: [f32; 18] = [
//   X     Y     Z       R    G    B
     0.0,  0.5,  0.0,    1.0, 1.0, 0.0,
    -0.5, -0.5,  0.0,    0.7, 0.0, 1.0,
     0.5, -0.5,  0.0,    0.1, 1.0, 1.0,
];

/// Triangle spinning about (1,1,0) in front of a perspective camera.
pub struct RotatingTriangle {
    geometry: Geometry,
    program: Program,
    world_location: GLint,
    proj_location: GLint,
    transforms: Transforms,
}

impl RotatingTriangle {
    pub fn new(
        renderer: &mut GlRenderer,
        dialect: ShaderDialect,
        config: &DemoConfig,
        aspect: f32,
    ) -> Result<Self, DemoError> {
        Self::with_sources(
            renderer,
            &dialect.source(PERSPECTIVE_VERTEX),
            &dialect.source(COLOR_FRAGMENT),
            config,
            aspect,
        )
    }

    pub fn with_sources(
        renderer: &mut GlRenderer,
        vert_src: &str,
        frag_src: &str,
        config: &DemoConfig,
        aspect: f32,
    ) -> Result<Self, DemoError> {
        let gl = renderer.gl().clone();

        let program = ProgramBuilder::new(vert_src, frag_src).build(&gl)?;

        let geometry = GeometryBuilder::new(&TRIANGLE)
            .with_attribute(ATTR_POSITION, VertexAttribute::Vec3)
            .with_attribute(ATTR_COLOR, VertexAttribute::Vec3)
            .build(&gl, &program)?;

        let world_location = program.uniform_location(UNIFORM_WORLD)?;
        let view_location = program.uniform_location(UNIFORM_VIEW)?;
        let proj_location = program.uniform_location(UNIFORM_PROJ)?;

        let transforms = Transforms::new(config, aspect);

        renderer.bind(&program);
        program.set_matrix4(world_location, &column_major(&transforms.world));
        program.set_matrix4(view_location, &column_major(&transforms.view));
        program.set_matrix4(proj_location, &column_major(&transforms.projection));

        Ok(Self {
            geometry,
            program,
            world_location,
            proj_location,
            transforms,
        })
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Rotates to the pose for `elapsed`, pushes it to `matWorld` and draws.
    pub fn advance_frame(&mut self, renderer: &mut GlRenderer, elapsed: Duration) {
        let world = column_major(self.transforms.advance(elapsed));

        renderer.bind(&self.program);
        self.program.set_matrix4(self.world_location, &world);
        renderer.draw(&self.geometry, &self.program);
    }

    /// Re-uploads `matProj` for the new aspect ratio.
    pub fn set_aspect(&mut self, renderer: &mut GlRenderer, aspect: f32) {
        let projection = column_major(self.transforms.set_aspect(aspect));

        renderer.bind(&self.program);
        self.program.set_matrix4(self.proj_location, &projection);
    }
}

impl Demo for RotatingTriangle {
    fn animated(&self) -> bool {
        true
    }

    fn frame(&mut self, renderer: &mut GlRenderer, elapsed: Duration) {
        self.advance_frame(renderer, elapsed);
    }

    fn resize(&mut self, renderer: &mut GlRenderer, viewport: Viewport) {
        self.set_aspect(renderer, viewport.aspect());
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cgmath::{Matrix4, SquareMatrix};
    use gl_wrapper::recording::{GlCall, RecordingGl, MALFORMED_MARKER};

    use super::*;

    fn recording() -> Rc<RecordingGl> {
        Rc::new(
            RecordingGl::new()
                .with_attributes(&[ATTR_POSITION, ATTR_COLOR])
                .with_uniforms(&[UNIFORM_WORLD, UNIFORM_VIEW, UNIFORM_PROJ]),
        )
    }

    fn uploads(rec: &RecordingGl, location: GLint) -> Vec<[f32; 16]> {
        rec.calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::UniformMatrix4(l, m) if l == location => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn setup_uploads_all_three_matrices() {
        let rec = recording();
        let mut renderer = GlRenderer::new(rec.clone());
        let config = DemoConfig::default();

        let demo =
            RotatingTriangle::new(&mut renderer, ShaderDialect::Desktop, &config, 1.5).unwrap();

        assert_eq!(uploads(&rec, 0), vec![column_major(&Matrix4::identity())]);
        assert_eq!(uploads(&rec, 1), vec![column_major(&demo.transforms().view)]);
        assert_eq!(
            uploads(&rec, 2),
            vec![column_major(&demo.transforms().projection)]
        );
        assert!(rec.calls().contains(&GlCall::VertexAttribPointer {
            location: 1,
            components: 3,
            stride: 24,
            offset: 12
        }));
    }

    #[test]
    fn each_frame_refreshes_world_then_draws() {
        let rec = recording();
        let mut renderer = GlRenderer::new(rec.clone());
        let mut demo =
            RotatingTriangle::new(&mut renderer, ShaderDialect::Es, &DemoConfig::default(), 1.0)
                .unwrap();
        rec.clear_calls();

        for frame in 0..3 {
            demo.advance_frame(&mut renderer, Duration::from_millis(frame * 16));
        }

        let calls = rec.calls();
        let draws: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == GlCall::DrawTriangles(0, 3))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(draws.len(), 3);
        for draw in draws {
            assert!(matches!(calls[draw - 1], GlCall::UniformMatrix4(0, _)));
        }
        assert_eq!(uploads(&rec, 1).len(), 0);
    }

    #[test]
    fn world_at_time_zero_is_identity() {
        let rec = recording();
        let mut renderer = GlRenderer::new(rec.clone());
        let mut demo =
            RotatingTriangle::new(&mut renderer, ShaderDialect::Es, &DemoConfig::default(), 1.0)
                .unwrap();
        rec.clear_calls();

        demo.advance_frame(&mut renderer, Duration::ZERO);

        assert_eq!(uploads(&rec, 0), vec![column_major(&Matrix4::identity())]);
    }

    #[test]
    fn resize_replaces_projection_without_drawing() {
        let rec = recording();
        let mut renderer = GlRenderer::new(rec.clone());
        let mut demo =
            RotatingTriangle::new(&mut renderer, ShaderDialect::Es, &DemoConfig::default(), 1.0)
                .unwrap();
        let square = demo.transforms().projection;
        rec.clear_calls();

        demo.resize(&mut renderer, Viewport::new(1920, 1080).unwrap());

        let projection = demo.transforms().projection;
        assert_ne!(projection, square);
        assert_eq!(uploads(&rec, 2), vec![column_major(&projection)]);
        assert!(uploads(&rec, 0).is_empty());
        assert_eq!(rec.count(|c| matches!(c, GlCall::DrawTriangles(..))), 0);
    }

    #[test]
    fn missing_uniform_aborts_setup() {
        let rec = Rc::new(RecordingGl::new().with_attributes(&[ATTR_POSITION, ATTR_COLOR]));
        let mut renderer = GlRenderer::new(rec.clone());

        let res = RotatingTriangle::new(
            &mut renderer,
            ShaderDialect::Desktop,
            &DemoConfig::default(),
            1.0,
        );

        assert!(matches!(res, Err(DemoError::Program(_))));
        assert_eq!(rec.count(|c| matches!(c, GlCall::DrawTriangles(..))), 0);
    }

    #[test]
    fn malformed_fragment_shader_never_links_or_draws() {
        let rec = recording();
        let mut renderer = GlRenderer::new(rec.clone());
        let broken = format!("{MALFORMED_MARKER}\n{COLOR_FRAGMENT}");

        let res = RotatingTriangle::with_sources(
            &mut renderer,
            PERSPECTIVE_VERTEX,
            &broken,
            &DemoConfig::default(),
            1.0,
        );

        assert!(matches!(res, Err(DemoError::Program(_))));
        assert_eq!(rec.count(|c| matches!(c, GlCall::LinkProgram(_))), 0);
        assert_eq!(rec.count(|c| matches!(c, GlCall::CreateBuffer(_))), 0);
    }
}
