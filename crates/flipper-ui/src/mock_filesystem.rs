//! In-memory filesystem for host tests and the scenario harness.

use std::collections::BTreeMap;

use crate::filesystem::{basename, dirname, join_path, FileInfo, FileSystem, FileSystemError};

/// In-memory file entry
#[derive(Clone)]
enum MockEntry {
    File { content: String },
    Directory { children: Vec<String> },
}

/// Mock filesystem. Parent directories are created on demand.
pub struct MockFileSystem {
    files: BTreeMap<String, MockEntry>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    /// Empty filesystem with only the root directory.
    pub fn new() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            "/".to_string(),
            MockEntry::Directory {
                children: Vec::new(),
            },
        );
        Self { files }
    }

    /// Filesystem populated with the kind of content shipped on a device:
    /// documentation under `/assets` and a few user files under `/storage`.
    pub fn sample() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            "/assets/about.txt",
            "Flipper UI\nVersion: 1.0.0\n\nJoystick: up/down to move,\npress to select.\n",
        );
        fs.add_file(
            "/assets/lua_docs.md",
            "# Scripting\n\nScripts live in /storage/scripts.\n",
        );
        fs.add_directory("/storage/docs");
        fs.add_directory("/storage/scripts");
        fs.add_file(
            "/storage/docs/readme.txt",
            "Files on the flash partition.\n\nPress to open, left to go back.",
        );
        fs.add_file("/storage/scripts/blink.lua", "-- toggles the status LED\n");
        fs.add_file("/storage/notes.txt", "Shopping:\n- solder\n- headers\n");
        fs
    }

    /// Add a file, creating missing parent directories.
    pub fn add_file(&mut self, path: &str, content: &str) {
        self.ensure_parent(path);
        self.files.insert(
            path.to_string(),
            MockEntry::File {
                content: content.to_string(),
            },
        );
    }

    /// Add a directory, creating missing parent directories.
    pub fn add_directory(&mut self, path: &str) {
        if self.files.contains_key(path) {
            return;
        }
        self.ensure_parent(path);
        self.files.insert(
            path.to_string(),
            MockEntry::Directory {
                children: Vec::new(),
            },
        );
    }

    fn ensure_parent(&mut self, path: &str) {
        if path == "/" {
            return;
        }
        let parent = dirname(path).to_string();
        self.add_directory(&parent);
        if let Some(MockEntry::Directory { children }) = self.files.get_mut(&parent) {
            let name = basename(path).to_string();
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    fn normalize_path(path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            join_path("/", trimmed)
        }
    }
}

impl FileSystem for MockFileSystem {
    fn list_files(&mut self, path: &str) -> Result<Vec<FileInfo>, FileSystemError> {
        let path = Self::normalize_path(path);

        match self.files.get(&path) {
            Some(MockEntry::Directory { children }) => Ok(children
                .iter()
                .filter_map(|child_name| {
                    let entry = self.files.get(&join_path(&path, child_name))?;
                    let (size, is_directory) = match entry {
                        MockEntry::File { content } => (content.len() as u64, false),
                        MockEntry::Directory { .. } => (0, true),
                    };
                    Some(FileInfo {
                        name: child_name.clone(),
                        size,
                        is_directory,
                    })
                })
                .collect()),
            Some(MockEntry::File { .. }) => {
                Err(FileSystemError::IoError("Not a directory".to_string()))
            }
            None => Err(FileSystemError::NotFound),
        }
    }

    fn read_file(&mut self, path: &str) -> Result<String, FileSystemError> {
        match self.files.get(&Self::normalize_path(path)) {
            Some(MockEntry::File { content }) => Ok(content.clone()),
            Some(MockEntry::Directory { .. }) => {
                Err(FileSystemError::IoError("Is a directory".to_string()))
            }
            None => Err(FileSystemError::NotFound),
        }
    }

    fn exists(&mut self, path: &str) -> bool {
        self.files.contains_key(&Self::normalize_path(path))
    }

    fn file_info(&mut self, path: &str) -> Result<FileInfo, FileSystemError> {
        let path = Self::normalize_path(path);
        let name = basename(&path).to_string();

        match self.files.get(&path) {
            Some(MockEntry::File { content }) => Ok(FileInfo {
                name,
                size: content.len() as u64,
                is_directory: false,
            }),
            Some(MockEntry::Directory { .. }) => Ok(FileInfo {
                name,
                size: 0,
                is_directory: true,
            }),
            None => Err(FileSystemError::NotFound),
        }
    }
}
