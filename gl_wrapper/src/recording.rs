//! Headless `GlApi` backend.
//!
//! `RecordingGl` accepts every call without touching a driver and keeps an
//! ordered log of what was issued, so setup and draw sequences can be checked
//! without a window. Compilation, linking and validation can be made to fail
//! on demand.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use gl::types::{GLint, GLsizei, GLuint};

use crate::api::{GlApi, ShaderStage};

/// Source text containing this marker fails to compile.
pub const MALFORMED_MARKER: &str = "#error";

#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, GLuint),
    ShaderSource(GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    CreateBuffer(GLuint),
    BindArrayBuffer(GLuint),
    ArrayBufferData(Vec<f32>),
    DeleteBuffer(GLuint),
    VertexAttribPointer {
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    },
    EnableVertexAttribArray(GLuint),
    UniformMatrix4(GLint, [f32; 16]),
    DrawTriangles(GLint, GLsizei),
    Viewport(GLint, GLint, GLsizei, GLsizei),
    ClearColor(f32, f32, f32, f32),
    Clear,
}

#[derive(Default)]
pub struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    next_id: Cell<GLuint>,
    sources: RefCell<HashMap<GLuint, String>>,
    attributes: RefCell<Vec<String>>,
    uniforms: RefCell<Vec<String>>,
    fail_link: Cell<bool>,
    fail_validate: Cell<bool>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute names the fake program exposes, in location order.
    pub fn with_attributes(self, names: &[&str]) -> Self {
        *self.attributes.borrow_mut() = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Uniform names the fake program exposes, in location order.
    pub fn with_uniforms(self, names: &[&str]) -> Self {
        *self.uniforms.borrow_mut() = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn failing_link(self) -> Self {
        self.fail_link.set(true);
        self
    }

    pub fn failing_validation(self) -> Self {
        self.fail_validate.set(true);
        self
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Index of the first recorded call matching `pred`.
    pub fn position(&self, pred: impl Fn(&GlCall) -> bool) -> Option<usize> {
        self.calls.borrow().iter().position(pred)
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> GLuint {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl GlApi for RecordingGl {
    fn create_shader(&self, stage: ShaderStage) -> Option<GLuint> {
        let id = self.allocate();
        self.record(GlCall::CreateShader(stage, id));
        Some(id)
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.sources.borrow_mut().insert(shader, source.to_string());
        self.record(GlCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(GlCall::CompileShader(shader));
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        self.sources
            .borrow()
            .get(&shader)
            .map(|src| !src.contains(MALFORMED_MARKER))
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        format!("0:1: shader {shader} is malformed")
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Option<GLuint> {
        let id = self.allocate();
        self.record(GlCall::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(GlCall::LinkProgram(program));
    }

    fn link_status(&self, _program: GLuint) -> bool {
        !self.fail_link.get()
    }

    fn validate_program(&self, program: GLuint) {
        self.record(GlCall::ValidateProgram(program));
    }

    fn validate_status(&self, _program: GLuint) -> bool {
        !self.fail_validate.get()
    }

    fn program_info_log(&self, program: GLuint) -> String {
        format!("program {program} rejected")
    }

    fn use_program(&self, program: GLuint) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn create_buffer(&self) -> Option<GLuint> {
        let id = self.allocate();
        self.record(GlCall::CreateBuffer(id));
        Some(id)
    }

    fn bind_array_buffer(&self, buffer: GLuint) {
        self.record(GlCall::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[f32]) {
        self.record(GlCall::ArrayBufferData(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn attrib_location(&self, _program: GLuint, name: &str) -> Option<GLuint> {
        self.attributes
            .borrow()
            .iter()
            .position(|n| n == name)
            .map(|i| i as GLuint)
    }

    fn vertex_attrib_pointer(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(GlCall::VertexAttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, location: GLuint) {
        self.record(GlCall::EnableVertexAttribArray(location));
    }

    fn uniform_location(&self, _program: GLuint, name: &str) -> Option<GLint> {
        self.uniforms
            .borrow()
            .iter()
            .position(|n| n == name)
            .map(|i| i as GLint)
    }

    fn uniform_matrix4(&self, location: GLint, matrix: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4(location, *matrix));
    }

    fn draw_triangles(&self, first: GLint, count: GLsizei) {
        self.record(GlCall::DrawTriangles(first, count));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor(r, g, b, a));
    }

    fn clear(&self) {
        self.record(GlCall::Clear);
    }
}
