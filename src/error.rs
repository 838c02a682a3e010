
//! Typed failures for context setup, shader builds and geometry validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShaderStage;

/// All the ways this library can fail.
///
/// `Init`, and any error raised while building the initial scene, is fatal:
/// without a window and a working program there is nothing to render. The
/// same `Io`/`Compile`/`Link` values coming out of a hot-reload attempt are
/// recoverable; the previous program stays in place and the loop driver
/// decides whether to log or escalate.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader source file could not be read or statted.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A shader stage was rejected by the GLSL compiler.
    #[error("failed to compile {stage} shader {}: {log}", .path.display())]
    Compile {
        stage: ShaderStage,
        path: PathBuf,
        log: String,
    },

    /// Program linking was rejected.
    #[error("failed to link shader program: {log}")]
    Link { log: String },

    /// A mesh or shader violates the fixed vertex layout contract.
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// Window, context or GL loader setup failed.
    #[error("initialization failed: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
