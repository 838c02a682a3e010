
//! GLSL program objects with per-frame hot-reload.
//!
//! A [`ShaderProgram`] is built from a vertex and a fragment source file and
//! keeps watching both. Once per frame the render loop calls
//! [`ShaderProgram::poll_and_reload`]; when either file carries a newer
//! modification time, both stages are recompiled and a brand-new program
//! object replaces the old one in a single swap. A rebuild that fails leaves
//! the previous program and its location caches untouched, so a typo in a
//! shader file never takes down a running renderer.

mod uniform;

pub use self::uniform::UniformValue;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr;
use std::rc::Rc;
use std::time::SystemTime;

use gl::types::*;
use log::debug;

use crate::error::{RenderError, Result};
use crate::mesh::VERTEX_LAYOUT;

/// The two programmable stages this library uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Outcome of a reload poll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reload {
    /// Neither source file has changed; the program was left alone.
    UpToDate,
    /// Both stages were recompiled and the program handle was replaced.
    Swapped,
}

/// One watched shader source file.
struct SourceFile {
    stage: ShaderStage,
    path: PathBuf,
    mod_time: SystemTime,
}

impl SourceFile {
    fn open(stage: ShaderStage, path: &Path) -> Result<SourceFile> {
        let mod_time = stat_mod_time(path)?;
        Ok(SourceFile {
            stage,
            path: path.to_owned(),
            mod_time,
        })
    }

    /// Reads the whole source, NUL-terminated the way `glShaderSource`
    /// expects it.
    fn read(&self) -> Result<CString> {
        let bytes = fs::read(&self.path).map_err(|source| RenderError::Io {
            path: self.path.clone(),
            source,
        })?;

        CString::new(bytes).map_err(|_| RenderError::Io {
            path: self.path.clone(),
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                "shader source contains a NUL byte",
            ),
        })
    }

    /// Stats the file and reports a modification time strictly newer than
    /// the recorded one. Does not update the recorded time.
    fn poll(&self) -> Result<Option<SystemTime>> {
        let mod_time = stat_mod_time(&self.path)?;
        if mod_time > self.mod_time {
            Ok(Some(mod_time))
        } else {
            Ok(None)
        }
    }
}

fn stat_mod_time(path: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path).map_err(|source| RenderError::Io {
        path: path.to_owned(),
        source,
    })?;
    metadata.modified().map_err(|source| RenderError::Io {
        path: path.to_owned(),
        source,
    })
}

fn compile(source: &CString, stage: ShaderStage) -> std::result::Result<GLuint, String> {
    unsafe {
        let shader = gl::CreateShader(stage.gl_enum());
        gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = gl::FALSE as GLint;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != gl::TRUE as GLint {
            let mut log_len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut log_len);

            let mut buffer = vec![0u8; log_len.max(1) as usize];
            gl::GetShaderInfoLog(
                shader,
                log_len,
                ptr::null_mut(),
                buffer.as_mut_ptr() as *mut GLchar,
            );
            gl::DeleteShader(shader);

            Err(log_to_string(buffer))
        } else {
            Ok(shader)
        }
    }
}

fn log_to_string(buffer: Vec<u8>) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..end]).trim_end().to_string()
}

/// A successfully linked program together with its location caches.
///
/// Locations are scoped to one program object and are not stable across
/// links, so the caches live and die with the handle.
struct LinkedProgram {
    id: GLuint,
    uniforms: HashMap<String, GLint>,
    attributes: HashMap<String, GLint>,
}

impl LinkedProgram {
    /// Compiles both stages and links a brand-new program, then deletes the
    /// intermediate stage objects. Nothing outside this function ever sees
    /// a half-built program.
    fn build(vertex: &SourceFile, fragment: &SourceFile) -> Result<LinkedProgram> {
        let vertex_source = vertex.read()?;
        let fragment_source = fragment.read()?;

        let vertex_shader =
            compile(&vertex_source, vertex.stage).map_err(|log| RenderError::Compile {
                stage: vertex.stage,
                path: vertex.path.clone(),
                log,
            })?;

        let fragment_shader = match compile(&fragment_source, fragment.stage) {
            Ok(shader) => shader,
            Err(log) => {
                unsafe { gl::DeleteShader(vertex_shader) };
                return Err(RenderError::Compile {
                    stage: fragment.stage,
                    path: fragment.path.clone(),
                    log,
                });
            }
        };

        let id = unsafe {
            let id = gl::CreateProgram();
            gl::AttachShader(id, vertex_shader);
            gl::AttachShader(id, fragment_shader);
            gl::LinkProgram(id);

            // The linked program carries its own copy of the stages.
            gl::DeleteShader(vertex_shader);
            gl::DeleteShader(fragment_shader);

            let mut status = gl::FALSE as GLint;
            gl::GetProgramiv(id, gl::LINK_STATUS, &mut status);
            if status != gl::TRUE as GLint {
                let mut log_len = 0;
                gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut log_len);

                let mut buffer = vec![0u8; log_len.max(1) as usize];
                gl::GetProgramInfoLog(
                    id,
                    log_len,
                    ptr::null_mut(),
                    buffer.as_mut_ptr() as *mut GLchar,
                );
                gl::DeleteProgram(id);

                return Err(RenderError::Link {
                    log: log_to_string(buffer),
                });
            }

            id
        };

        let mut program = LinkedProgram {
            id,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
        };
        program.load_uniforms();
        program.load_attributes();

        Ok(program)
    }

    /// Queries the program's active uniform list and caches each location.
    fn load_uniforms(&mut self) {
        unsafe {
            let mut count = 0;
            gl::GetProgramiv(self.id, gl::ACTIVE_UNIFORMS, &mut count);
            let mut max_len = 0;
            gl::GetProgramiv(self.id, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);

            debug!("{} active uniforms", count);

            for index in 0..count as GLuint {
                let mut name = vec![0u8; max_len.max(1) as usize];
                let mut length = 0;
                let mut size = 0;
                let mut kind = 0;
                gl::GetActiveUniform(
                    self.id,
                    index,
                    max_len,
                    &mut length,
                    &mut size,
                    &mut kind,
                    name.as_mut_ptr() as *mut GLchar,
                );
                name.truncate(length.max(0) as usize);

                let c_name = match CString::new(name) {
                    Ok(c_name) => c_name,
                    Err(_) => continue,
                };
                let location = gl::GetUniformLocation(self.id, c_name.as_ptr());

                // Uniforms inside blocks report no location.
                if location >= 0 {
                    let name = c_name.to_string_lossy().into_owned();
                    debug!("  {:>3}: {}", location, name);
                    self.uniforms.insert(name, location);
                }
            }
        }
    }

    /// Queries the program's active attribute list and caches each location.
    fn load_attributes(&mut self) {
        unsafe {
            let mut count = 0;
            gl::GetProgramiv(self.id, gl::ACTIVE_ATTRIBUTES, &mut count);
            let mut max_len = 0;
            gl::GetProgramiv(self.id, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH, &mut max_len);

            debug!("{} active attributes", count);

            for index in 0..count as GLuint {
                let mut name = vec![0u8; max_len.max(1) as usize];
                let mut length = 0;
                let mut size = 0;
                let mut kind = 0;
                gl::GetActiveAttrib(
                    self.id,
                    index,
                    max_len,
                    &mut length,
                    &mut size,
                    &mut kind,
                    name.as_mut_ptr() as *mut GLchar,
                );
                name.truncate(length.max(0) as usize);

                let c_name = match CString::new(name) {
                    Ok(c_name) => c_name,
                    Err(_) => continue,
                };
                let location = gl::GetAttribLocation(self.id, c_name.as_ptr());

                // Built-in inputs report no location.
                if location >= 0 {
                    let name = c_name.to_string_lossy().into_owned();
                    debug!("  {:>3}: {}", location, name);
                    self.attributes.insert(name, location);
                }
            }
        }
    }
}

impl Drop for LinkedProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

/// A GPU program built from a vertex and a fragment source file.
///
/// Many elements may share one program; wrap it with [`ShaderProgram::shared`]
/// and hand out clones of the `Rc`.
pub struct ShaderProgram {
    vertex: SourceFile,
    fragment: SourceFile,
    linked: LinkedProgram,
}

impl ShaderProgram {
    /// Reads, compiles and links both stages and builds the location caches
    /// from the linked program's active resource lists. Errors out of here
    /// are startup errors and should abort scene construction.
    pub fn new<P: AsRef<Path>>(vertex_path: P, fragment_path: P) -> Result<ShaderProgram> {
        let vertex = SourceFile::open(ShaderStage::Vertex, vertex_path.as_ref())?;
        let fragment = SourceFile::open(ShaderStage::Fragment, fragment_path.as_ref())?;
        let linked = LinkedProgram::build(&vertex, &fragment)?;

        Ok(ShaderProgram {
            vertex,
            fragment,
            linked,
        })
    }

    /// Wraps this program for sharing between elements.
    pub fn shared(self) -> Rc<RefCell<ShaderProgram>> {
        Rc::new(RefCell::new(self))
    }

    /// Binds this program, replacing the previously bound program.
    /// Subsequent draw calls and uniform uploads use this program.
    pub fn bind(&self) {
        unsafe {
            gl::UseProgram(self.linked.id);
        }
    }

    /// Uploads a uniform through the location cache. A name the current
    /// program does not expose is a silent no-op; writing an unknown
    /// uniform must never take down a frame.
    pub fn set_uniform<T: UniformValue>(&self, name: &str, value: T) {
        if let Some(&location) = self.linked.uniforms.get(name) {
            unsafe { T::set_uniform(&value, location) };
        }
    }

    /// The cached location of an active uniform, or `None` when the current
    /// program does not expose the name.
    pub fn uniform_location(&self, name: &str) -> Option<GLint> {
        self.linked.uniforms.get(name).copied()
    }

    /// The cached location of an active vertex attribute, or `None` when
    /// the current program does not expose the name.
    pub fn attribute_location(&self, name: &str) -> Option<GLint> {
        self.linked.attributes.get(name).copied()
    }

    /// Checks the program's active attributes against the fixed vertex
    /// layout: an attribute named after a schema semantic must sit at that
    /// semantic's slot.
    pub fn validate_layout(&self) -> Result<()> {
        for (slot, attrib) in VERTEX_LAYOUT.iter().enumerate() {
            if let Some(location) = self.attribute_location(attrib.semantic.glsl_name()) {
                if location != slot as GLint {
                    return Err(RenderError::Geometry(format!(
                        "attribute {} is bound to location {}, the vertex layout expects {}",
                        attrib.semantic.glsl_name(),
                        location,
                        slot,
                    )));
                }
            }
        }
        Ok(())
    }

    /// The vertex and fragment source paths this program was built from.
    pub fn source_paths(&self) -> (&Path, &Path) {
        (&self.vertex.path, &self.fragment.path)
    }

    /// Polls both source files and, when either has a strictly newer
    /// modification time, re-reads and recompiles both stages and swaps in
    /// a freshly linked program with freshly built location caches. Always
    /// both stages: locations are program-scoped, and a new program object
    /// needs new caches anyway.
    ///
    /// On any failure (stat, read, compile, link) the previous program and
    /// caches stay in place and the error is returned for the caller to
    /// report. The recorded modification times still advance, so a broken
    /// source fails once per save instead of once per frame; saving the
    /// file again retries.
    pub fn poll_and_reload(&mut self) -> Result<Reload> {
        let new_vertex_time = self.vertex.poll()?;
        let new_fragment_time = self.fragment.poll()?;

        if new_vertex_time.is_none() && new_fragment_time.is_none() {
            return Ok(Reload::UpToDate);
        }

        if let Some(time) = new_vertex_time {
            self.vertex.mod_time = time;
        }
        if let Some(time) = new_fragment_time {
            self.fragment.mod_time = time;
        }

        self.linked = LinkedProgram::build(&self.vertex, &self.fragment)?;
        Ok(Reload::Swapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::Duration;

    // These tests cover the watch half of the reload machinery; the GL half
    // needs a live context and is exercised by the demo binary instead.

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("easel-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn unchanged_file_is_not_reported() {
        let path = scratch_file("steady.vert", "#version 410 core\nvoid main() {}\n");
        let source = SourceFile::open(ShaderStage::Vertex, &path).unwrap();

        assert!(source.poll().unwrap().is_none());
        assert!(source.poll().unwrap().is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn newer_mod_time_is_reported_exactly_once() {
        let path = scratch_file("touched.frag", "void main() {}\n");
        let mut source = SourceFile::open(ShaderStage::Fragment, &path).unwrap();

        let later = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let reported = source.poll().unwrap().expect("modification not detected");
        source.mod_time = reported;
        assert!(source.poll().unwrap().is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn older_mod_time_is_not_reported() {
        let path = scratch_file("rewound.vert", "void main() {}\n");
        let mut source = SourceFile::open(ShaderStage::Vertex, &path).unwrap();
        source.mod_time = SystemTime::now() + Duration::from_secs(60);

        assert!(source.poll().unwrap().is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error_with_the_path() {
        let path = std::env::temp_dir().join("easel-does-not-exist.vert");

        match SourceFile::open(ShaderStage::Vertex, &path) {
            Err(RenderError::Io { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("expected an io error, got {}", other),
            Ok(_) => panic!("expected an io error"),
        }
    }

    #[test]
    fn nul_byte_in_source_is_rejected() {
        let path = scratch_file("nul.vert", "void main() {\0}");
        let source = SourceFile::open(ShaderStage::Vertex, &path).unwrap();

        assert!(matches!(source.read(), Err(RenderError::Io { .. })));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn read_appends_the_terminator() {
        let path = scratch_file("plain.vert", "void main() {}");
        let source = SourceFile::open(ShaderStage::Vertex, &path).unwrap();

        let c_source = source.read().unwrap();
        assert_eq!(c_source.as_bytes_with_nul(), b"void main() {}\0");

        fs::remove_file(&path).unwrap();
    }
}
