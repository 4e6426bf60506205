use std::ffi::{c_char, c_void, CString};
use std::rc::Rc;

use gl::types::{GLint, GLsizei, GLuint};

/// Shared handle to the GL entry points used by the wrapper types.
pub type Gl = Rc<dyn GlApi>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The subset of OpenGL (ES 2.0 compatible) the tutorials need.
///
/// Object creation returns `None` when the driver hands back a zero name.
/// Everything else mirrors the GL call of the same name.
pub trait GlApi {
    fn create_shader(&self, stage: ShaderStage) -> Option<GLuint>;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> Option<GLuint>;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn validate_program(&self, program: GLuint);
    fn validate_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    fn create_buffer(&self) -> Option<GLuint>;
    fn bind_array_buffer(&self, buffer: GLuint);
    /// Uploads `data` into the bound array buffer with `STATIC_DRAW` usage.
    fn array_buffer_data(&self, data: &[f32]);
    fn delete_buffer(&self, buffer: GLuint);

    fn attrib_location(&self, program: GLuint, name: &str) -> Option<GLuint>;
    /// Float, non-normalized attribute. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&self, location: GLuint);

    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint>;
    fn uniform_matrix4(&self, location: GLint, matrix: &[f32; 16]);

    fn draw_triangles(&self, first: GLint, count: GLsizei);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self);
}

/// `GlApi` backed by the globally loaded `gl` function pointers.
///
/// `gl::load_with` must have been called on a current context before any
/// method is used.
pub struct NativeGl {
    _private: (),
}

impl NativeGl {
    /// # Safety
    ///
    /// The GL function pointers must be loaded and a context must stay
    /// current on this thread for as long as the returned value is used.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    pub fn shared(self) -> Gl {
        Rc::new(self)
    }
}

const LOG_CAPACITY: usize = 1024;

fn read_log(buf: &[u8]) -> String {
    let data = buf.split(|a| *a == 0).next().unwrap_or(buf);

    String::from_utf8_lossy(data).trim_end().to_string()
}

impl GlApi for NativeGl {
    fn create_shader(&self, stage: ShaderStage) -> Option<GLuint> {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };

        let id = unsafe { gl::CreateShader(kind) };
        (id != 0).then_some(id)
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr() as *const c_char;
        let len = source.len() as GLint;

        unsafe { gl::ShaderSource(shader, 1, &ptr as *const *const c_char, &len as *const GLint) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success as *mut GLint) }
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut buf = [0_u8; LOG_CAPACITY];

        unsafe {
            gl::GetShaderInfoLog(
                shader,
                LOG_CAPACITY as GLsizei,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        read_log(&buf)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> Option<GLuint> {
        let id = unsafe { gl::CreateProgram() };
        (id != 0).then_some(id)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success as *mut GLint) }
        success == gl::TRUE as GLint
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) }
    }

    fn validate_status(&self, program: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut success as *mut GLint) }
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut buf = [0_u8; LOG_CAPACITY];

        unsafe {
            gl::GetProgramInfoLog(
                program,
                LOG_CAPACITY as GLsizei,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        read_log(&buf)
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn create_buffer(&self) -> Option<GLuint> {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, (&mut id) as *mut u32) }
        (id != 0).then_some(id)
    }

    fn bind_array_buffer(&self, buffer: GLuint) {
        unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_data(&self, data: &[f32]) {
        unsafe {
            gl::BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(data) as isize,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, (&buffer) as *const u32) }
    }

    fn attrib_location(&self, program: GLuint, name: &str) -> Option<GLuint> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetAttribLocation(program, name.as_ptr()) };

        u32::try_from(location).ok()
    }

    fn vertex_attrib_pointer(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, location: GLuint) {
        unsafe { gl::EnableVertexAttribArray(location) }
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program, name.as_ptr()) };

        (location >= 0).then_some(location)
    }

    fn uniform_matrix4(&self, location: GLint, matrix: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, matrix.as_ptr()) }
    }

    fn draw_triangles(&self, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }
}
