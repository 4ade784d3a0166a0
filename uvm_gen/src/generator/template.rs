use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use handlebars::{handlebars_helper, no_escape, Handlebars, RenderError, TemplateError};
use serde::Serialize;

use super::ArtifactKind;
use crate::{model::ModuleDescription, Error, UvmGenResult};

pub const TEMPLATE_SUFFIX: &str = ".sv.hbs";

const TEMPLATE_NAME: &str = "artifact";

/// Where the generator reads its templates from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// The templates compiled into this crate.
    #[default]
    Embedded,
    /// A directory holding one `<kind>.sv.hbs` file per artifact kind.
    Directory(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderFailure {
    #[error(transparent)]
    Syntax(Box<TemplateError>),
    #[error(transparent)]
    Render(Box<RenderError>),
}

/// Templates see the module description as `module`.
#[derive(Serialize)]
struct TemplateData<'a> {
    module: &'a ModuleDescription,
}

handlebars_helper!(sv_range: |width: u64| {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
});

handlebars_helper!(upper: |text: str| text.to_uppercase());

impl TemplateSource {
    pub fn directory(path: impl AsRef<Path>) -> Self {
        TemplateSource::Directory(path.as_ref().to_path_buf())
    }

    pub fn load(&self, kind: ArtifactKind) -> UvmGenResult<Cow<'static, str>> {
        match self {
            TemplateSource::Embedded => Ok(Cow::Borrowed(embedded(kind))),
            TemplateSource::Directory(dir) => {
                let path = dir.join(kind.template_file_name());
                std::fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|source| Error::TemplateLoad {
                        artifact: kind,
                        path,
                        source,
                    })
            }
        }
    }
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Embedded => write!(f, "built-in templates"),
            TemplateSource::Directory(dir) => write!(f, "{}", dir.to_string_lossy()),
        }
    }
}

impl RenderFailure {
    pub fn into_error(self, artifact: ArtifactKind) -> Error {
        match self {
            RenderFailure::Syntax(source) => Error::TemplateSyntax { artifact, source },
            RenderFailure::Render(source) => Error::Render { artifact, source },
        }
    }
}

/// Renders one template against `module`. Every call builds its own registry,
/// so nothing is shared between artifacts.
pub fn render(module: &ModuleDescription, template: &str) -> Result<String, RenderFailure> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(no_escape);
    registry.register_helper("sv_range", Box::new(sv_range));
    registry.register_helper("upper", Box::new(upper));
    registry
        .register_template_string(TEMPLATE_NAME, template)
        .map_err(|e| RenderFailure::Syntax(Box::new(e)))?;
    registry
        .render(TEMPLATE_NAME, &TemplateData { module })
        .map_err(|e| RenderFailure::Render(Box::new(e)))
}

fn embedded(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Agent => include_str!("../templates/agent.sv.hbs"),
        ArtifactKind::Driver => include_str!("../templates/driver.sv.hbs"),
        ArtifactKind::Sequencer => include_str!("../templates/sequencer.sv.hbs"),
        ArtifactKind::Scoreboard => include_str!("../templates/scoreboard.sv.hbs"),
        ArtifactKind::Env => include_str!("../templates/env.sv.hbs"),
        ArtifactKind::TbTop => include_str!("../templates/tb_top.sv.hbs"),
        ArtifactKind::Test => include_str!("../templates/test.sv.hbs"),
        ArtifactKind::Sequence => include_str!("../templates/sequence.sv.hbs"),
        ArtifactKind::Transaction => include_str!("../templates/transaction.sv.hbs"),
        ArtifactKind::Interface => include_str!("../templates/interface.sv.hbs"),
        ArtifactKind::Config => include_str!("../templates/config.sv.hbs"),
        ArtifactKind::Pkg => include_str!("../templates/pkg.sv.hbs"),
    }
}
