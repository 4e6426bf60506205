use gl::types::{GLint, GLuint};
use thiserror::Error;

use crate::api::{Gl, ShaderStage};

pub struct ProgramBuilder<'a> {
    vert: &'a str,
    frag: &'a str,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(vert_src: &'a str, frag_src: &'a str) -> Self {
        Self {
            vert: vert_src,
            frag: frag_src,
        }
    }

    /// Compiles both stages, links them and validates the result.
    ///
    /// Stops at the first failure: a vertex compile error means the fragment
    /// shader is never compiled and no program object is created.
    pub fn build(self, gl: &Gl) -> Result<Program, PBError> {
        let vert = compile(gl, ShaderStage::Vertex, self.vert)?;

        let frag = match compile(gl, ShaderStage::Fragment, self.frag) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let result = link(gl, vert, frag);

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        result
    }
}

fn compile(gl: &Gl, stage: ShaderStage, src: &str) -> Result<GLuint, PBError> {
    let shader = gl
        .create_shader(stage)
        .ok_or(PBError::ObjectCreation("shader"))?;

    gl.shader_source(shader, src);
    gl.compile_shader(shader);

    if !gl.compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);

        log::error!("Error compiling {stage} shader: {log}");
        return Err(PBError::Compilation { stage, log });
    }

    Ok(shader)
}

fn link(gl: &Gl, vert: GLuint, frag: GLuint) -> Result<Program, PBError> {
    let id = gl
        .create_program()
        .ok_or(PBError::ObjectCreation("program"))?;

    // Dropping deletes the program on every early return below.
    let program = Program {
        id,
        gl: Gl::clone(gl),
    };

    gl.attach_shader(id, vert);
    gl.attach_shader(id, frag);
    gl.link_program(id);

    if !gl.link_status(id) {
        let log = gl.program_info_log(id);
        log::error!("Error linking program: {log}");
        return Err(PBError::Linking(log));
    }

    gl.validate_program(id);

    if !gl.validate_status(id) {
        let log = gl.program_info_log(id);
        log::error!("Error validating program: {log}");
        return Err(PBError::Validation(log));
    }

    Ok(program)
}

#[derive(Debug, Error)]
pub enum PBError {
    #[error("could not create {0} object")]
    ObjectCreation(&'static str),
    #[error("{stage} shader: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("link: {0}")]
    Linking(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("no active uniform named `{0}`")]
    MissingUniform(String),
}

pub struct Program {
    id: GLuint,
    gl: Gl,
}

impl Program {
    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn attrib_location(&self, name: &str) -> Option<GLuint> {
        self.gl.attrib_location(self.id, name)
    }

    pub fn uniform_location(&self, name: &str) -> Result<GLint, PBError> {
        self.gl
            .uniform_location(self.id, name)
            .ok_or_else(|| PBError::MissingUniform(name.to_string()))
    }

    /// Uploads a column-major matrix. The program must be current.
    pub fn set_matrix4(&self, location: GLint, matrix: &[f32; 16]) {
        self.gl.uniform_matrix4(location, matrix);
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.gl.delete_program(self.id)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::recording::{GlCall, RecordingGl, MALFORMED_MARKER};

    const VERT: &str = "void main() { gl_Position = vec4(0.0); }";
    const FRAG: &str = "void main() { gl_FragColor = vec4(1.0); }";

    fn setup(gl: RecordingGl) -> (Rc<RecordingGl>, Gl) {
        let rec = Rc::new(gl);
        let gl: Gl = rec.clone();
        (rec, gl)
    }

    #[test]
    fn builds_and_validates() {
        let (rec, gl) = setup(RecordingGl::new());

        let program = ProgramBuilder::new(VERT, FRAG).build(&gl).unwrap();
        let id = program.get_id();

        let link = rec.position(|c| *c == GlCall::LinkProgram(id)).unwrap();
        let validate = rec.position(|c| *c == GlCall::ValidateProgram(id)).unwrap();
        assert!(link < validate);
        assert_eq!(rec.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);

        drop(program);
        assert_eq!(rec.count(|c| *c == GlCall::DeleteProgram(id)), 1);
    }

    #[test]
    fn malformed_vertex_shader_stops_before_link() {
        let (rec, gl) = setup(RecordingGl::new());
        let broken = format!("{MALFORMED_MARKER}\n{VERT}");

        let err = ProgramBuilder::new(&broken, FRAG).build(&gl).err().unwrap();

        assert!(matches!(
            err,
            PBError::Compilation {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        assert_eq!(rec.count(|c| matches!(c, GlCall::CompileShader(_))), 1);
        assert_eq!(rec.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
        assert_eq!(rec.count(|c| matches!(c, GlCall::LinkProgram(_))), 0);
    }

    #[test]
    fn malformed_fragment_shader_releases_vertex_shader() {
        let (rec, gl) = setup(RecordingGl::new());
        let broken = format!("{MALFORMED_MARKER}\n{FRAG}");

        let err = ProgramBuilder::new(VERT, &broken).build(&gl).err().unwrap();

        assert!(matches!(
            err,
            PBError::Compilation {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(rec.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
        assert_eq!(rec.count(|c| matches!(c, GlCall::LinkProgram(_))), 0);
    }

    #[test]
    fn link_failure_skips_validation_and_frees_program() {
        let (rec, gl) = setup(RecordingGl::new().failing_link());

        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        assert!(matches!(err, PBError::Linking(_)));
        assert_eq!(rec.count(|c| matches!(c, GlCall::ValidateProgram(_))), 0);
        assert_eq!(rec.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
    }

    #[test]
    fn validation_failure_is_reported() {
        let (_rec, gl) = setup(RecordingGl::new().failing_validation());

        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        assert!(matches!(err, PBError::Validation(_)));
    }

    #[test]
    fn missing_uniform_is_an_error() {
        let (_rec, gl) = setup(RecordingGl::new().with_uniforms(&["matWorld"]));
        let program = ProgramBuilder::new(VERT, FRAG).build(&gl).unwrap();

        assert_eq!(program.uniform_location("matWorld").unwrap(), 0);
        assert!(matches!(
            program.uniform_location("matView"),
            Err(PBError::MissingUniform(_))
        ));
    }
}
