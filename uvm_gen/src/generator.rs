pub mod template;

use std::{
    fmt::Display,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{model::ModuleDescription, Error, UvmGenResult};

pub use template::{render, RenderFailure, TemplateSource, TEMPLATE_SUFFIX};

/// The testbench components generated for every module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Agent,
    Driver,
    Sequencer,
    Scoreboard,
    Env,
    TbTop,
    Test,
    Sequence,
    Transaction,
    Interface,
    Config,
    Pkg,
}

impl ArtifactKind {
    /// Generation order.
    pub const ALL: [ArtifactKind; 12] = [
        ArtifactKind::Agent,
        ArtifactKind::Driver,
        ArtifactKind::Sequencer,
        ArtifactKind::Scoreboard,
        ArtifactKind::Env,
        ArtifactKind::TbTop,
        ArtifactKind::Test,
        ArtifactKind::Sequence,
        ArtifactKind::Transaction,
        ArtifactKind::Interface,
        ArtifactKind::Config,
        ArtifactKind::Pkg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Agent => "agent",
            ArtifactKind::Driver => "driver",
            ArtifactKind::Sequencer => "sequencer",
            ArtifactKind::Scoreboard => "scoreboard",
            ArtifactKind::Env => "env",
            ArtifactKind::TbTop => "tb_top",
            ArtifactKind::Test => "test",
            ArtifactKind::Sequence => "sequence",
            ArtifactKind::Transaction => "transaction",
            ArtifactKind::Interface => "interface",
            ArtifactKind::Config => "config",
            ArtifactKind::Pkg => "pkg",
        }
    }

    pub fn template_file_name(&self) -> String {
        format!("{}{}", self.name(), TEMPLATE_SUFFIX)
    }

    pub fn output_file_name(&self, module_name: &str) -> String {
        format!("{}_{}.sv", module_name, self.name())
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Renders every artifact kind with the built-in templates.
pub fn generate(module: &ModuleDescription, out_dir: &Path) -> UvmGenResult<Vec<PathBuf>> {
    Generator::new(TemplateSource::Embedded).generate(module, out_dir)
}

pub struct Generator {
    templates: TemplateSource,
}

impl Generator {
    pub fn new(templates: TemplateSource) -> Self {
        Generator { templates }
    }

    pub fn templates(&self) -> &TemplateSource {
        &self.templates
    }

    /// Writes one file per artifact kind into `out_dir`, creating it if needed,
    /// and returns the absolute paths in [`ArtifactKind::ALL`] order. Stops at
    /// the first failing artifact; files already written stay on disk.
    pub fn generate(
        &self,
        module: &ModuleDescription,
        out_dir: &Path,
    ) -> UvmGenResult<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)?;
        let out_dir = std::path::absolute(out_dir)?;
        ArtifactKind::ALL
            .iter()
            .map(|kind| self.put_artifact(*kind, module, &out_dir))
            .collect()
    }

    fn put_artifact(
        &self,
        kind: ArtifactKind,
        module: &ModuleDescription,
        out_dir: &Path,
    ) -> UvmGenResult<PathBuf> {
        let template = self.templates.load(kind)?;
        let content = render(module, &template).map_err(|e| e.into_error(kind))?;
        let file_path = out_dir.join(kind.output_file_name(module.name()));
        self.put_file(&file_path, content.as_bytes())
            .map_err(|source| Error::Write {
                artifact: kind,
                path: file_path.clone(),
                source,
            })?;
        log::info!("generated {}", file_path.to_string_lossy());
        Ok(file_path)
    }

    fn put_file(&self, file_path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(file_path)?;
        file.write_all(content)?;
        Ok(())
    }
}
