use std::path::PathBuf;

use thiserror::Error;

use crate::generator::ArtifactKind;

pub type UvmGenResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Invalid file extension: {}. Only .v and .sv are supported.",
        _0.to_string_lossy()
    )]
    InvalidExtension(PathBuf),
    #[error("File not found: {}", _0.to_string_lossy())]
    FileNotFound(PathBuf),
    #[error("No module definitions found")]
    NoModuleDefinition,
    #[error("Not implemented: {}", _0)]
    NotImplemented(String),
    #[error("Unsupported declaration: {}", _0)]
    UnsupportedConstruct(String),
    #[error(
        "Failed to generate {artifact}: cannot read template {}: {source}",
        .path.to_string_lossy()
    )]
    TemplateLoad {
        artifact: ArtifactKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to generate {artifact}: {source}")]
    TemplateSyntax {
        artifact: ArtifactKind,
        source: Box<handlebars::TemplateError>,
    },
    #[error("Failed to generate {artifact}: {source}")]
    Render {
        artifact: ArtifactKind,
        source: Box<handlebars::RenderError>,
    },
    #[error("Failed to generate {artifact}: {}: {source}", .path.to_string_lossy())]
    Write {
        artifact: ArtifactKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {}", _0)]
    Io(std::io::Error),
}

impl Error {
    /// The artifact kind a generation failure belongs to.
    pub fn artifact(&self) -> Option<ArtifactKind> {
        match self {
            Error::TemplateLoad { artifact, .. }
            | Error::TemplateSyntax { artifact, .. }
            | Error::Render { artifact, .. }
            | Error::Write { artifact, .. } => Some(*artifact),
            _ => None,
        }
    }

    /// The underlying filesystem error of an output failure, if any.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Write { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}
