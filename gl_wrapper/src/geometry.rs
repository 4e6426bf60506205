use gl::types::GLuint;
use thiserror::Error;

use crate::api::Gl;
use crate::program::Program;

const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

pub struct GeometryBuilder<'a> {
    attributes: Vec<(&'a str, VertexAttribute)>,
    data: &'a [f32],
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
        }
    }

    /// Appends a named attribute. Attributes are packed in call order.
    pub fn with_attribute(mut self, name: &'a str, attr: VertexAttribute) -> Self {
        self.attributes.push((name, attr));
        self
    }

    /// Uploads the data once and describes every attribute to `program`.
    pub fn build(self, gl: &Gl, program: &Program) -> Result<Geometry, GBError> {
        let kinds: Vec<VertexAttribute> = self.attributes.iter().map(|(_, a)| *a).collect();
        let layouts = AttributeLayout::compute(&kinds);
        let total_len = floats_per_vertex(&kinds);

        if total_len == 0 {
            return Err(GBError::NoAttributes);
        }

        if self.data.len() % total_len != 0 {
            return Err(GBError::InvalidDataLength);
        }

        let locations = self
            .attributes
            .iter()
            .map(|(name, _)| {
                program
                    .attrib_location(name)
                    .ok_or_else(|| GBError::MissingAttribute(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let vbo = gl.create_buffer().ok_or(GBError::ObjectCreation)?;

        gl.bind_array_buffer(vbo);
        gl.array_buffer_data(self.data);

        for (location, layout) in locations.iter().zip(&layouts) {
            gl.vertex_attrib_pointer(
                *location,
                layout.components as i32,
                layout.stride as i32,
                layout.offset,
            );
            gl.enable_vertex_attrib_array(*location);
        }

        let vertices = self.data.len() / total_len;

        Ok(Geometry {
            vbo,
            vertices,
            gl: Gl::clone(gl),
        })
    }
}

#[derive(Debug, Error)]
pub enum GBError {
    #[error("could not create buffer object")]
    ObjectCreation,
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("geometry needs at least one attribute")]
    NoAttributes,
    #[error("no active attribute named `{0}`")]
    MissingAttribute(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

pub fn floats_per_vertex(attributes: &[VertexAttribute]) -> usize {
    attributes.iter().map(|a| a.size()).sum()
}

/// Where one attribute lives inside an interleaved vertex, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeLayout {
    pub components: usize,
    pub stride: usize,
    pub offset: usize,
}

impl AttributeLayout {
    pub fn compute(attributes: &[VertexAttribute]) -> Vec<AttributeLayout> {
        let stride = floats_per_vertex(attributes) * FLOAT_SIZE;
        let mut leading = 0;

        attributes
            .iter()
            .map(|attr| {
                let layout = AttributeLayout {
                    components: attr.size(),
                    stride,
                    offset: leading * FLOAT_SIZE,
                };
                leading += attr.size();
                layout
            })
            .collect()
    }
}

pub struct Geometry {
    vbo: GLuint,
    vertices: usize,
    gl: Gl,
}

impl Geometry {
    pub fn vertices(&self) -> usize {
        self.vertices
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.vbo);
    }
}
