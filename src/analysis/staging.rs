use super::error::AnalysisError;
use super::result::ModuleDescriptor;
use super::tool::AnalysisTool;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A directory ready for upload as one named artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    pub directory: PathBuf,
    pub container: String,
    pub artifact_name: String,
}

/// Groups raw report files under `<staging root>/<tool>/<module>/`.
///
/// Staging the same module twice reuses its directory and overwrites the
/// files in it. Distinct modules that share a name get numbered directories
/// (`core`, `core-2`, ...) so their files never mix.
pub struct ArtifactStager {
    staging_root: PathBuf,
    run_id: String,
    assigned: HashMap<(AnalysisTool, PathBuf), String>,
    name_uses: HashMap<(AnalysisTool, String), usize>,
}

impl ArtifactStager {
    pub fn new(staging_root: PathBuf, run_id: impl Into<String>) -> Self {
        Self {
            staging_root,
            run_id: run_id.into(),
            assigned: HashMap::new(),
            name_uses: HashMap::new(),
        }
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Removes anything left from an earlier run and recreates the root
    pub fn clean(&self) -> Result<(), AnalysisError> {
        if self.staging_root.exists() {
            fs::remove_dir_all(&self.staging_root).map_err(|source| AnalysisError::Staging {
                path: self.staging_root.clone(),
                source,
            })?;
        }
        fs::create_dir_all(&self.staging_root).map_err(|source| AnalysisError::Staging {
            path: self.staging_root.clone(),
            source,
        })
    }

    /// Copies `files` into the module's staging directory.
    ///
    /// Returns `None` without touching the filesystem when there is nothing
    /// to stage.
    pub fn stage(
        &mut self,
        tool: AnalysisTool,
        module: &ModuleDescriptor,
        files: &[PathBuf],
    ) -> Result<Option<StagedArtifact>, AnalysisError> {
        if files.is_empty() {
            info!(
                tool = %tool,
                module = %module.name,
                "No report files to stage, skipping upload"
            );
            return Ok(None);
        }

        let dir_name = self.directory_name(tool, module);
        let directory = self.staging_root.join(tool.key()).join(&dir_name);
        fs::create_dir_all(&directory).map_err(|source| AnalysisError::Staging {
            path: directory.clone(),
            source,
        })?;

        for file in files {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            let destination = directory.join(file_name);
            debug!(
                from = %file.display(),
                to = %destination.display(),
                "Staging report file"
            );
            fs::copy(file, &destination).map_err(|source| AnalysisError::Staging {
                path: file.clone(),
                source,
            })?;
        }

        Ok(Some(StagedArtifact {
            artifact_name: format!("{}_{}_{}", self.run_id, dir_name, tool.key()),
            container: dir_name,
            directory,
        }))
    }

    fn directory_name(&mut self, tool: AnalysisTool, module: &ModuleDescriptor) -> String {
        let key = (tool, module.root_dir.clone());
        if let Some(name) = self.assigned.get(&key) {
            return name.clone();
        }

        let uses = self
            .name_uses
            .entry((tool, module.name.clone()))
            .or_insert(0);
        *uses += 1;

        let name = if *uses == 1 {
            module.name.clone()
        } else {
            format!("{}-{}", module.name, uses)
        };

        self.assigned.insert(key, name.clone());
        name
    }
}
