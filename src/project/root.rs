//! Project Root Resolution
//!
//! Walks up from a document toward the workspace folder looking for marker
//! files. Never fails: the workspace folder is always a valid answer.

use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;

use crate::rules::CONFIG_FILE_NAME;

/// A file whose presence marks a directory as a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootMarker {
    pub file_name: String,
    /// Strong markers end the upward walk; weak ones are recorded and the
    /// walk continues toward the workspace folder.
    pub strong: bool,
}

impl RootMarker {
    pub fn strong(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            strong: true,
        }
    }

    pub fn weak(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            strong: false,
        }
    }
}

/// Markers used when none are configured
pub fn default_markers() -> Vec<RootMarker> {
    vec![
        RootMarker::strong("package.json"),
        RootMarker::strong(CONFIG_FILE_NAME),
    ]
}

/// Find the project root owning `file` inside `workspace_folder`.
///
/// The first strong marker walking upward wins; without one, the outermost
/// weak marker wins; without either, the workspace folder is returned.
pub fn find_root(workspace_folder: &Path, file: Option<&Path>, markers: &[RootMarker]) -> PathBuf {
    let Some(file) = file else {
        return workspace_folder.to_path_buf();
    };
    if is_unc(file) || in_node_modules(file) {
        return workspace_folder.to_path_buf();
    }

    let mut result = workspace_folder.to_path_buf();
    let mut directory = file.parent();

    'outer: while let Some(dir) = directory {
        if !dir.starts_with(workspace_folder) {
            break;
        }
        for marker in markers {
            if dir.join(&marker.file_name).exists() {
                result = dir.to_path_buf();
                if marker.strong {
                    break 'outer;
                }
                break;
            }
        }
        directory = dir.parent();
    }

    result
}

/// Whether the path has the form `\\server\share...`
pub fn is_unc(path: &Path) -> bool {
    let path = path.to_string_lossy();
    let Some(rest) = path.strip_prefix(r"\\") else {
        return false;
    };

    match rest.find('\\') {
        Some(0) | None => false,
        Some(end) => rest[end + 1..]
            .chars()
            .next()
            .is_some_and(|c| c != '\\'),
    }
}

/// Whether any directory above the file is a `node_modules` folder
pub fn in_node_modules(file: &Path) -> bool {
    file.parent().is_some_and(|dir| {
        dir.components()
            .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"))
    })
}

/// Filesystem path of a `file:` URI, with its casing normalized
pub fn file_path_from_uri(uri: &Url) -> Option<PathBuf> {
    if uri.scheme() != "file" {
        return None;
    }
    let path = uri.to_file_path().ok()?;
    Some(normalize_path_case(path))
}

/// Use the on-disk casing of `path` on case-insensitive filesystems
pub fn normalize_path_case(path: PathBuf) -> PathBuf {
    if !cfg!(any(windows, target_os = "macos")) {
        return path;
    }

    let path = uppercase_drive_letter(path);
    match std::fs::canonicalize(&path) {
        Ok(real) => reconcile_case(&path, &strip_verbatim_prefix(real)),
        Err(_) => path,
    }
}

/// Pick `real` only when it differs from `requested` by case alone
pub fn reconcile_case(requested: &Path, real: &Path) -> PathBuf {
    let requested_lower = requested.to_string_lossy().to_lowercase();
    let real_lower = real.to_string_lossy().to_lowercase();

    if requested_lower == real_lower {
        real.to_path_buf()
    } else {
        requested.to_path_buf()
    }
}

fn uppercase_drive_letter(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy().into_owned();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_lowercase() => {
            PathBuf::from(format!("{}{}", drive.to_ascii_uppercase(), &text[1..]))
        }
        _ => path,
    }
}

fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy().into_owned();
    match text.strip_prefix(r"\\?\") {
        Some(rest) if !rest.starts_with("UNC") => PathBuf::from(rest),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_no_file_returns_workspace() {
        let ws = Path::new("/ws");
        assert_eq!(find_root(ws, None, &default_markers()), ws);
    }

    #[test]
    fn test_unc_detection() {
        assert!(is_unc(Path::new(r"\\server\share\file.txt")));
        assert!(is_unc(Path::new(r"\\server\share")));
        assert!(!is_unc(Path::new(r"\\server")));
        assert!(!is_unc(Path::new(r"\\\share")));
        assert!(!is_unc(Path::new(r"\\server\\share")));
        assert!(!is_unc(Path::new("/home/user/file.txt")));
        assert!(!is_unc(Path::new(r"C:\Users\file.txt")));
    }

    #[test]
    fn test_node_modules_detection() {
        assert!(in_node_modules(Path::new("/ws/node_modules/pkg/index.js")));
        assert!(!in_node_modules(Path::new("/ws/src/node_modules")));
        assert!(!in_node_modules(Path::new("/ws/my_node_modules/x.js")));
    }

    #[test]
    fn test_strong_marker_nearest_file_wins() {
        let dir = tempdir().expect("create temp dir");
        let ws = dir.path();
        let pkg = ws.join("packages").join("app");
        let src = pkg.join("src");
        fs::create_dir_all(&src).expect("create dirs");
        fs::write(ws.join("package.json"), "{}").expect("write marker");
        fs::write(pkg.join("package.json"), "{}").expect("write marker");

        let root = find_root(ws, Some(&src.join("main.js")), &default_markers());
        assert_eq!(root, pkg);
    }

    #[test]
    fn test_outermost_weak_marker_wins() {
        let dir = tempdir().expect("create temp dir");
        let ws = dir.path();
        let outer = ws.join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).expect("create dirs");
        fs::write(outer.join(".weak"), "").expect("write marker");
        fs::write(inner.join(".weak"), "").expect("write marker");

        let markers = vec![RootMarker::weak(".weak")];
        let root = find_root(ws, Some(&inner.join("file.txt")), &markers);
        assert_eq!(root, outer);
    }

    #[test]
    fn test_strong_marker_stops_before_weak() {
        let dir = tempdir().expect("create temp dir");
        let ws = dir.path();
        let outer = ws.join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).expect("create dirs");
        fs::write(outer.join(".weak"), "").expect("write marker");
        fs::write(inner.join("package.json"), "{}").expect("write marker");

        let mut markers = default_markers();
        markers.push(RootMarker::weak(".weak"));
        let root = find_root(ws, Some(&inner.join("file.txt")), &markers);
        assert_eq!(root, inner);
    }

    #[test]
    fn test_markers_outside_workspace_are_ignored() {
        let dir = tempdir().expect("create temp dir");
        let ws = dir.path().join("ws");
        let src = ws.join("src");
        fs::create_dir_all(&src).expect("create dirs");
        fs::write(dir.path().join("package.json"), "{}").expect("write marker");

        let root = find_root(&ws, Some(&src.join("a.txt")), &default_markers());
        assert_eq!(root, ws);
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_outside_workspace() {
        let dir = tempdir().expect("create temp dir");
        let ws = dir.path().join("ws");
        let sibling = dir.path().join("ws-other");
        fs::create_dir_all(&ws).expect("create dirs");
        fs::create_dir_all(&sibling).expect("create dirs");
        fs::write(sibling.join("package.json"), "{}").expect("write marker");

        let root = find_root(&ws, Some(&sibling.join("a.txt")), &default_markers());
        assert_eq!(root, ws);
    }

    #[test]
    fn test_reconcile_case() {
        assert_eq!(
            reconcile_case(Path::new("/Users/ME/Project"), Path::new("/Users/me/project")),
            PathBuf::from("/Users/me/project")
        );
        assert_eq!(
            reconcile_case(Path::new("/Users/me/link"), Path::new("/Volumes/data/target")),
            PathBuf::from("/Users/me/link")
        );
    }

    #[test]
    fn test_file_path_from_uri() {
        let uri = Url::parse("untitled:Untitled-1").expect("parse uri");
        assert!(file_path_from_uri(&uri).is_none());

        #[cfg(unix)]
        {
            let uri = Url::parse("file:///tmp/project/a.txt").expect("parse uri");
            assert_eq!(
                file_path_from_uri(&uri),
                Some(PathBuf::from("/tmp/project/a.txt"))
            );
        }
    }

    #[test]
    fn test_uppercase_drive_letter() {
        assert_eq!(
            uppercase_drive_letter(PathBuf::from(r"c:\work")),
            PathBuf::from(r"C:\work")
        );
        assert_eq!(
            uppercase_drive_letter(PathBuf::from("/work")),
            PathBuf::from("/work")
        );
    }
}
