//! Destinations for intermediate meshes.
//!
//! The pipeline never writes files on its own; when `debug` is set it hands
//! each intermediate mesh to an [`ArtifactSink`] the caller provides.

use crate::errors::GridError;
use crate::io::IoError;
use crate::mesh::Mesh;
use std::path::{Path, PathBuf};

/// Receives named intermediate meshes.
pub trait ArtifactSink {
    fn emit(&mut self, name: &str, mesh: &Mesh) -> Result<(), GridError>;
}

impl<F> ArtifactSink for F
where
    F: FnMut(&str, &Mesh) -> Result<(), GridError>,
{
    fn emit(&mut self, name: &str, mesh: &Mesh) -> Result<(), GridError> {
        self(name, mesh)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ArtifactSink for NullSink {
    fn emit(&mut self, _name: &str, _mesh: &Mesh) -> Result<(), GridError> {
        Ok(())
    }
}

/// Writes each artifact as `<dir>/<name>.stl`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(feature = "stl-io")]
impl ArtifactSink for DirectorySink {
    fn emit(&mut self, name: &str, mesh: &Mesh) -> Result<(), GridError> {
        std::fs::create_dir_all(&self.dir).map_err(IoError::from)?;
        let path = self.dir.join(format!("{name}.stl"));
        let bytes = mesh.to_stl_binary(name)?;
        std::fs::write(&path, bytes).map_err(IoError::from)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
