use super::error::AnalysisError;
use super::result::ModuleDescriptor;
use crate::build_tool::BuildTool;
use ignore::WalkBuilder;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name given to the module at the walk root
pub const ROOT_MODULE_NAME: &str = "root";

const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Dependency and tool caches that can be large and never hold modules
const SKIPPED_DIRS: &[&str] = &["node_modules", ".gradle"];

/// Finds build modules by the co-presence of a project descriptor and a
/// build output directory.
///
/// The walk never stops at a module, so nested modules are reported too. A
/// directory that carries both markers but is not part of the active build is
/// still reported; callers get zero-valued results for it.
pub struct ModuleDiscovery {
    build_tool: BuildTool,
}

impl ModuleDiscovery {
    pub fn new(build_tool: BuildTool) -> Self {
        Self { build_tool }
    }

    /// Pre-order walk of `root_path`, siblings in lexicographic order
    pub fn discover(&self, root_path: &Path) -> Result<Vec<ModuleDescriptor>, AnalysisError> {
        let start = Instant::now();

        let root = root_path
            .canonicalize()
            .map_err(|_| AnalysisError::PathNotFound(root_path.to_path_buf()))?;

        // Symlinks are not followed, which keeps the walk acyclic.
        // VCS metadata and build output trees never hold module roots.
        let output_dir = self.build_tool.output_dir();
        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let skipped = entry
                    .file_name()
                    .to_str()
                    .map(|name| {
                        VCS_DIRS.contains(&name)
                            || (is_dir && (name == output_dir || SKIPPED_DIRS.contains(&name)))
                    })
                    .unwrap_or(false);
                !skipped
            })
            .build();

        let mut modules = Vec::new();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || !self.build_tool.is_module_root(entry.path()) {
                continue;
            }

            let dir = entry.path().to_path_buf();
            let name = if dir == root {
                ROOT_MODULE_NAME.to_string()
            } else {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.display().to_string())
            };

            debug!(module = %name, path = %dir.display(), "Discovered module");
            modules.push(ModuleDescriptor::new(name, dir));
        }

        info!(
            modules = modules.len(),
            build_tool = %self.build_tool,
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Module discovery complete"
        );

        Ok(modules)
    }
}
