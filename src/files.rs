//! Python source discovery.
//!
//! Expands the paths given to [`crate::analyze_files`] into the Python files
//! to analyze and derives each file's module name.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tuglint_core::{TuglintError, TuglintResult};
use walkdir::WalkDir;

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &["__pycache__", "node_modules", "venv", "target"];

/// A Python file found under an input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Dotted module name relative to the input path.
    pub module_name: String,
}

/// Expand `root` into the Python files below it.
///
/// A file is returned as is, with its stem as module name. A directory is
/// walked in sorted order, skipping hidden entries and the usual build and
/// environment directories.
pub fn collect_python_files(root: &Path) -> TuglintResult<Vec<SourceFile>> {
    let metadata = fs::metadata(root).map_err(|err| TuglintError::from_io(root.display().to_string(), &err))?;
    if metadata.is_file() {
        let module_name = root
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![SourceFile {
            path: root.to_path_buf(),
            module_name,
        }]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(&entry.file_name().to_string_lossy()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "py") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        files.push(SourceFile {
            path: path.to_path_buf(),
            module_name: module_name(relative),
        });
    }
    debug!(root = %root.display(), files = files.len(), "collected python files");
    Ok(files)
}

fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

/// `pkg/sub/mod.py` is `pkg.sub.mod`; a package's `__init__.py` is the
/// package itself.
pub fn module_name(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(stem) = relative.file_stem() {
        if stem != "__init__" {
            parts.push(stem.to_string_lossy().into_owned());
        }
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let write = |relative: &str, content: &[u8]| {
            let path = dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            File::create(path).unwrap().write_all(content).unwrap();
        };
        write("main.py", b"import pkg\n");
        write("pkg/__init__.py", b"");
        write("pkg/shapes.py", b"class Square: pass\n");
        write("pkg/README.md", b"# not python");
        write("__pycache__/main.cpython-312.py", b"# cached");
        write(".hidden/secret.py", b"# hidden");
        write("venv/lib/site.py", b"# environment");
        dir
    }

    #[test]
    fn test_collect_skips_excluded_directories() {
        let dir = create_test_workspace();
        let files = collect_python_files(dir.path()).unwrap();
        let modules: Vec<&str> = files.iter().map(|f| f.module_name.as_str()).collect();
        assert_eq!(modules, vec!["main", "pkg", "pkg.shapes"]);
    }

    #[test]
    fn test_collect_single_file() {
        let dir = create_test_workspace();
        let files = collect_python_files(&dir.path().join("pkg/shapes.py")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].module_name, "shapes");
    }

    #[test]
    fn test_collect_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = collect_python_files(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, TuglintError::FileNotFound { .. }));
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name(Path::new("a/b/c.py")), "a.b.c");
        assert_eq!(module_name(Path::new("a/__init__.py")), "a");
        assert_eq!(module_name(Path::new("top.py")), "top");
    }
}
