//! Fixed shader sources for both tutorials.
//!
//! The bodies are written once in the `attribute`/`varying` style understood
//! by both GLSL 1.20 and GLSL ES 1.00; only the version line depends on the
//! context that was acquired.

pub const ATTR_POSITION: &str = "vertPosition";
pub const ATTR_COLOR: &str = "vertColor";

pub const UNIFORM_WORLD: &str = "matWorld";
pub const UNIFORM_VIEW: &str = "matView";
pub const UNIFORM_PROJ: &str = "matProj";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderDialect {
    /// Desktop OpenGL, GLSL 1.20.
    Desktop,
    /// OpenGL ES 2.0, GLSL ES 1.00.
    Es,
}

impl ShaderDialect {
    fn header(&self) -> &'static str {
        match self {
            ShaderDialect::Desktop => "#version 120\n",
            ShaderDialect::Es => "#version 100\n",
        }
    }

    pub fn source(&self, body: &str) -> String {
        format!("{}{}", self.header(), body)
    }
}

pub const FLAT_VERTEX: &str = r#"
attribute vec2 vertPosition;
attribute vec3 vertColor;
varying vec3 fragColor;

void main() {
    fragColor = vertColor;
    gl_Position = vec4(vertPosition, 0.0, 1.0);
}
"#;

pub const PERSPECTIVE_VERTEX: &str = r#"
attribute vec3 vertPosition;
attribute vec3 vertColor;
varying vec3 fragColor;

uniform mat4 matWorld;
uniform mat4 matView;
uniform mat4 matProj;

void main() {
    fragColor = vertColor;
    gl_Position = matProj * matView * matWorld * vec4(vertPosition, 1.0);
}
"#;

pub const COLOR_FRAGMENT: &str = r#"
#ifdef GL_ES
precision highp float;
#endif

varying vec3 fragColor;

void main() {
    gl_FragColor = vec4(fragColor, 1.0);
}
"#;
