//! Built-in tool implementations for ReAgent.
//!
//! Provides the default capability set (terminate, file read/write, web
//! search) and the registry-backed execution backend the engine submits
//! proposed batches to.

pub mod executor;
pub mod file_read;
pub mod file_write;
pub mod terminate;
pub mod web_search;

pub use executor::RegistryExecutor;
pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use terminate::TerminateTool;
pub use web_search::WebSearchTool;

use reagent_core::tool::ToolRegistry;
use std::path::{Component, Path, PathBuf};

/// Build a registry with the default tool set, file tools rooted at
/// `sandbox_dir`.
pub fn default_registry(sandbox_dir: impl Into<PathBuf>) -> ToolRegistry {
    let sandbox_dir = sandbox_dir.into();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(TerminateTool));
    registry.register(Box::new(FileReadTool::new(&sandbox_dir)));
    registry.register(Box::new(FileWriteTool::new(&sandbox_dir)));
    registry.register(Box::new(WebSearchTool));
    registry
}

/// Resolve a user-supplied file name under the sandbox root.
///
/// Rejects absolute paths and parent-directory components so tool calls
/// cannot escape the sandbox.
pub(crate) fn sandbox_path(root: &Path, name: &str) -> Result<PathBuf, String> {
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(format!("absolute paths are not allowed: {name}"));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(format!("path escapes the sandbox: {name}")),
        }
    }
    Ok(root.join(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_the_full_capability_set() {
        let registry = default_registry("/tmp/reagent");
        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["doTerminate", "file_read", "file_write", "web_search"]
        );
    }

    #[test]
    fn sandbox_path_allows_nested_names() {
        let path = sandbox_path(Path::new("/srv/files"), "plans/week1.md").unwrap();
        assert_eq!(path, PathBuf::from("/srv/files/plans/week1.md"));
    }

    #[test]
    fn sandbox_path_rejects_escape_attempts() {
        assert!(sandbox_path(Path::new("/srv/files"), "../secrets").is_err());
        assert!(sandbox_path(Path::new("/srv/files"), "/etc/passwd").is_err());
    }
}
