//! Menu model: a flat list of folders, files and apps addressed by path.
//!
//! The tree is usually loaded from an indented text description:
//!
//! ```text
//! d ICON:app Applications
//! d ICON:settings Settings
//!  d ICON:info Documentation
//!   f ICON:info About
//! a ICON:sd Storage
//! ```
//!
//! Leading spaces give the depth, the first letter the kind (`d` folder,
//! `f` file, `a` app), and an optional `ICON:<id>` precedes the name.

use crate::icons::{self, Icon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
    App,
}

impl EntryKind {
    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'd' => Some(EntryKind::Folder),
            'f' => Some(EntryKind::File),
            'a' => Some(EntryKind::App),
            _ => None,
        }
    }

    pub fn default_icon(&self) -> &'static Icon {
        match self {
            EntryKind::Folder => &icons::FOLDER,
            EntryKind::File => &icons::FILE,
            EntryKind::App => &icons::APP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Absolute path without a trailing slash, e.g. `/Settings/Documentation`.
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    pub icon: String,
}

impl Entry {
    /// The entry's icon, or its kind's default when the id is unknown.
    pub fn icon(&self) -> &'static Icon {
        icons::lookup(&self.icon).unwrap_or_else(|| self.kind.default_icon())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryTree {
    entries: Vec<Entry>,
}

impl EntryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from its text description. Lines that cannot be
    /// understood are skipped.
    pub fn parse(source: &str) -> Self {
        let mut tree = Self::new();
        // Folder path last seen at each depth.
        let mut path_at_depth: Vec<String> = vec![String::new()];

        for line in source.lines() {
            let depth = line.chars().take_while(|c| *c == ' ').count();
            let content = line[depth..].trim();
            let Some(letter) = content.chars().next() else {
                continue;
            };
            let Some(kind) = EntryKind::from_letter(letter) else {
                log::warn!("Skipping menu line with unknown type: {:?}", line);
                continue;
            };

            let mut rest = content[letter.len_utf8()..].trim();
            let mut icon = kind.default_icon().id;
            if let Some(spec) = rest.strip_prefix("ICON:") {
                if let Some((id, name)) = spec.split_once(' ') {
                    icon = id;
                    rest = name.trim();
                }
            }
            if rest.is_empty() {
                continue;
            }

            let parent = depth
                .checked_sub(1)
                .and_then(|d| path_at_depth.get(d))
                .map(String::as_str)
                .unwrap_or("");
            let path = format!("{}/{}", parent, rest);

            match kind {
                EntryKind::Folder => {
                    tree.add_folder(&path, Some(icon));
                    if path_at_depth.len() <= depth {
                        path_at_depth.resize(depth + 1, String::new());
                    }
                    path_at_depth[depth] = path;
                }
                EntryKind::File => tree.add_file(&path, Some(icon)),
                EntryKind::App => tree.add_app(&path, Some(icon)),
            }
        }

        log::info!("Loaded {} menu entries", tree.len());
        tree
    }

    /// Add a folder, or update the icon of an existing one.
    pub fn add_folder(&mut self, path: &str, icon: Option<&str>) {
        let path = normalize(path);
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.path == path && e.kind == EntryKind::Folder)
        {
            if let Some(icon) = icon {
                existing.icon = icon.to_string();
            }
            return;
        }
        self.ensure_parent(&path);
        self.push(path, EntryKind::Folder, icon);
    }

    pub fn add_file(&mut self, path: &str, icon: Option<&str>) {
        let path = normalize(path);
        self.ensure_parent(&path);
        self.push(path, EntryKind::File, icon);
    }

    pub fn add_app(&mut self, path: &str, icon: Option<&str>) {
        let path = normalize(path);
        self.ensure_parent(&path);
        self.push(path, EntryKind::App, icon);
    }

    /// Entries directly inside `dir`, in insertion order.
    pub fn entries_in(&self, dir: &str) -> Vec<&Entry> {
        let dir = dir_key(dir);
        self.entries
            .iter()
            .filter(|e| dir_key(containing_dir(&e.path)) == dir)
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        let path = normalize(path);
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_parent(&mut self, path: &str) {
        let parent = containing_dir(path).trim_end_matches('/');
        if !parent.is_empty() && self.get(parent).is_none() {
            self.add_folder(parent, None);
        }
    }

    fn push(&mut self, path: String, kind: EntryKind, icon: Option<&str>) {
        let name = name_of(&path).to_string();
        let icon = icon.unwrap_or(kind.default_icon().id).to_string();
        self.entries.push(Entry {
            path,
            name,
            kind,
            icon,
        });
    }
}

/// Parent directory of `path`, with a trailing slash.
///
/// `"/Settings/Documentation"` and `"/Settings/Documentation/"` both give
/// `"/Settings/"`; the root is its own parent.
pub fn parent_dir(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(i) if i > 0 => format!("{}/", &normalized[..i]),
        _ => "/".to_string(),
    }
}

/// Leading slash, no trailing slash (except the root itself).
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Directory part of a normalized path including its trailing slash.
fn containing_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) if i > 0 => &path[..=i],
        _ => "/",
    }
}

/// Directory key with leading and trailing slashes.
fn dir_key(dir: &str) -> String {
    let mut key = if dir.starts_with('/') {
        dir.to_string()
    } else {
        format!("/{}", dir)
    };
    if !key.ends_with('/') {
        key.push('/');
    }
    key
}

fn name_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) if i + 1 < path.len() => &path[i + 1..],
        _ => path,
    }
}
