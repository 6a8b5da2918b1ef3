//! Filesystem abstraction for the device storage.
//! Backed by SPIFFS flash on the device and an in-memory tree on the host.

use std::sync::Arc;

use parking_lot::Mutex;

/// A file entry in the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Filesystem error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemError {
    NotFound,
    PermissionDenied,
    IoError(String),
    NotSupported,
}

impl core::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FileSystemError::NotFound => write!(f, "File not found"),
            FileSystemError::PermissionDenied => write!(f, "Permission denied"),
            FileSystemError::IoError(msg) => write!(f, "IO error: {}", msg),
            FileSystemError::NotSupported => write!(f, "Operation not supported"),
        }
    }
}

impl std::error::Error for FileSystemError {}

/// Trait for filesystem operations
///
/// Implementations:
/// - `FlashStorage` on the device (SPIFFS partition)
/// - `MockFileSystem` for host tests and the scenario harness
pub trait FileSystem {
    /// List files in a directory
    fn list_files(&mut self, path: &str) -> Result<Vec<FileInfo>, FileSystemError>;

    /// Read entire file as string
    ///
    /// # Arguments
    /// * `path` - Path to file (e.g., "/assets/about.txt")
    ///
    /// # Errors
    /// Returns FileSystemError if file not found or read fails
    fn read_file(&mut self, path: &str) -> Result<String, FileSystemError>;

    /// Check if file exists
    fn exists(&mut self, path: &str) -> bool;

    /// Get file info
    fn file_info(&mut self, path: &str) -> Result<FileInfo, FileSystemError>;
}

/// Filesystem handle shared between the host loop and apps.
pub type SharedFileSystem = Arc<Mutex<dyn FileSystem + Send>>;

/// Wrap a filesystem for sharing.
pub fn shared<F: FileSystem + Send + 'static>(fs: F) -> SharedFileSystem {
    Arc::new(Mutex::new(fs))
}

/// Get filename without path
pub fn basename(path: &str) -> &str {
    path.rfind('/').map(|i| &path[i + 1..]).unwrap_or(path)
}

/// Get parent directory
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

/// Join paths
pub fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Resolve a logical path against a mount prefix
pub fn resolve_mount_path(path: &str, mount_prefix: &str) -> String {
    let prefix = mount_prefix.trim_end_matches('/');
    if path.starts_with(prefix) {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Directory listing over a flat object store (SPIFFS keeps full paths as
/// object names and has no directories).
///
/// `objects` yields `(name, size)` with names relative to the mount root,
/// e.g. `storage/docs/readme.txt`. Subdirectories are the distinct first
/// segments below `dir`. Returns `None` when nothing lives under `dir`.
pub fn list_flat_directory<I>(objects: I, dir: &str) -> Option<Vec<FileInfo>>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let dir = dir.trim_matches('/');
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    };

    let mut found = false;
    let mut entries: Vec<FileInfo> = Vec::new();
    for (name, size) in objects {
        let name = name.trim_start_matches('/');
        let Some(rest) = name.strip_prefix(prefix.as_str()) else {
            continue;
        };
        found = true;
        match rest.split_once('/') {
            Some((child, _)) => {
                if !entries.iter().any(|e| e.is_directory && e.name == child) {
                    entries.push(FileInfo {
                        name: child.to_string(),
                        size: 0,
                        is_directory: true,
                    });
                }
            }
            None if !rest.is_empty() => entries.push(FileInfo {
                name: rest.to_string(),
                size,
                is_directory: false,
            }),
            None => {}
        }
    }

    (found || dir.is_empty()).then_some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/storage/notes.txt"), "notes.txt");
        assert_eq!(basename("notes.txt"), "notes.txt");
        assert_eq!(basename("/"), "");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/storage/docs/notes.txt"), "/storage/docs");
        assert_eq!(dirname("/storage"), "/");
        assert_eq!(dirname("notes.txt"), ".");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/storage", "notes.txt"), "/storage/notes.txt");
        assert_eq!(join_path("/storage/", "notes.txt"), "/storage/notes.txt");
    }

    #[test]
    fn test_resolve_mount_path() {
        assert_eq!(
            resolve_mount_path("/assets/about.txt", "/flash"),
            "/flash/assets/about.txt"
        );
        assert_eq!(
            resolve_mount_path("assets/about.txt", "/flash"),
            "/flash/assets/about.txt"
        );
        assert_eq!(
            resolve_mount_path("/flash/assets/about.txt", "/flash"),
            "/flash/assets/about.txt"
        );
        assert_eq!(
            resolve_mount_path("/assets/about.txt", "/flash/"),
            "/flash/assets/about.txt"
        );
    }

    #[test]
    fn flat_listing_synthesizes_directories() {
        let objects = vec![
            ("storage/notes.txt".to_string(), 12),
            ("storage/docs/readme.txt".to_string(), 40),
            ("storage/docs/todo.txt".to_string(), 3),
            ("assets/about.txt".to_string(), 99),
        ];

        let storage = list_flat_directory(objects.clone(), "/storage").unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(
            storage[0],
            FileInfo {
                name: "notes.txt".into(),
                size: 12,
                is_directory: false
            }
        );
        assert!(storage[1].is_directory && storage[1].name == "docs");

        let docs = list_flat_directory(objects.clone(), "/storage/docs/").unwrap();
        assert_eq!(docs.len(), 2);

        let root = list_flat_directory(objects.clone(), "/").unwrap();
        assert_eq!(root.iter().filter(|e| e.is_directory).count(), 2);

        assert!(list_flat_directory(objects.clone(), "/missing").is_none());
        // A file is not a directory.
        assert!(list_flat_directory(objects, "/storage/notes.txt").is_none());
        assert_eq!(list_flat_directory(Vec::new(), "/"), Some(Vec::new()));
    }
}
