// Entry registry
// Accumulates file entries and derives the implied directory tree from their paths

use super::constants::{FILE_VERSION_SUFFIX, MAX_IDENTIFIER_LEN, MAX_PATH_LEN};
use isoforge_core::{IsoError, Result};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// A registered file, owned by the registry until the writer is dropped
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// One element of the ordered entry list handed to the allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry<'a> {
    pub path: &'a str,
    #[serde(skip)]
    pub data: &'a [u8],
    pub is_dir: bool,
}

impl<'a> Entry<'a> {
    /// Last path component
    pub fn name(&self) -> &'a str {
        file_name(self.path)
    }

    /// Path of the containing directory, "" for the root
    pub fn parent(&self) -> &'a str {
        parent_path(self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryRegistry {
    files: Vec<FileEntry>,
    file_paths: HashSet<String>,
    directories: BTreeSet<String>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and every directory its path implies.
    /// The registry is left untouched when an error is returned.
    pub fn add_file(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
        let path = normalize_path(path)?;

        if u32::try_from(data.len()).is_err() {
            return Err(IsoError::UnsupportedFileSize {
                path,
                size: data.len() as u64,
            });
        }

        if self.directories.contains(&path) || self.file_paths.contains(&path) {
            return Err(IsoError::DuplicatePath(path));
        }

        let implied = implied_directories(&path);
        if let Some(clash) = implied.iter().find(|dir| self.file_paths.contains(**dir)) {
            return Err(IsoError::DuplicatePath(clash.to_string()));
        }

        for dir in implied {
            if self.directories.insert(dir.to_string()) {
                debug!("Registered implied directory '{}'", dir);
            }
        }

        debug!("Registered file '{}' ({} bytes)", path, data.len());
        self.file_paths.insert(path.clone());
        self.files.push(FileEntry { path, data });
        Ok(())
    }

    /// Directory paths in lexicographic order
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }

    /// Files in insertion order
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Allocation order: all directories sorted by path, then files as inserted
    pub fn entries(&self) -> Vec<Entry<'_>> {
        let dirs = self.directories.iter().map(|path| Entry {
            path,
            data: &[],
            is_dir: true,
        });
        let files = self.files.iter().map(|f| Entry {
            path: &f.path,
            data: &f.data,
            is_dir: false,
        });

        dirs.chain(files).collect()
    }
}

/// Normalize separators and validate every component
pub fn normalize_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    let components: Vec<&str> = unified.split('/').filter(|c| !c.is_empty()).collect();

    if components.is_empty() {
        return Err(IsoError::EmptyPath);
    }

    if let Some(bad) = components.iter().find(|c| **c == "." || **c == "..") {
        return Err(IsoError::InvalidPath(format!("'{}' contains '{}'", path, bad)));
    }

    let normalized = components.join("/");
    if normalized.len() > MAX_PATH_LEN {
        return Err(IsoError::NameTooLong {
            len: normalized.len(),
            name: normalized,
            max: MAX_PATH_LEN,
        });
    }

    let last = components.len() - 1;
    for (i, component) in components.iter().enumerate() {
        // Files carry the ";1" version suffix in their identifier, directories do not
        let len = if i == last {
            component.len() + FILE_VERSION_SUFFIX.len()
        } else {
            component.len()
        };
        if len > MAX_IDENTIFIER_LEN {
            return Err(IsoError::NameTooLong {
                name: component.to_string(),
                len,
                max: MAX_IDENTIFIER_LEN,
            });
        }
    }

    Ok(normalized)
}

/// Every strict prefix of a normalized path: "a/b/c.txt" -> ["a", "a/b"]
pub fn implied_directories(path: &str) -> Vec<&str> {
    path.match_indices('/').map(|(i, _)| &path[..i]).collect()
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn parent_path(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_registers_prefixes() {
        let mut registry = EntryRegistry::new();
        registry.add_file("a/b/c.txt", b"data".to_vec()).unwrap();

        let dirs: Vec<&str> = registry.directories().collect();
        assert_eq!(dirs, vec!["a", "a/b"]);
        assert_eq!(registry.files()[0].path, "a/b/c.txt");
    }

    #[test]
    fn test_root_level_file_has_no_directories() {
        let mut registry = EntryRegistry::new();
        registry.add_file("readme.txt", vec![0; 10]).unwrap();
        assert_eq!(registry.directories().count(), 0);
    }

    #[test]
    fn test_backslashes_normalized() {
        let mut registry = EntryRegistry::new();
        registry.add_file(r"docs\guide\intro.md", vec![]).unwrap();
        assert_eq!(registry.files()[0].path, "docs/guide/intro.md");
        assert_eq!(registry.directories().collect::<Vec<_>>(), vec!["docs", "docs/guide"]);
    }

    #[test]
    fn test_normalize_collapses_slashes() {
        assert_eq!(normalize_path("/a//b/").unwrap(), "a/b");
        assert!(matches!(normalize_path(""), Err(IsoError::EmptyPath)));
        assert!(matches!(normalize_path("//"), Err(IsoError::EmptyPath)));
        assert!(matches!(normalize_path(r"\"), Err(IsoError::EmptyPath)));
        assert!(matches!(normalize_path("a/../b"), Err(IsoError::InvalidPath(_))));
        assert!(matches!(normalize_path("./b"), Err(IsoError::InvalidPath(_))));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = EntryRegistry::new();
        registry.add_file("x.txt", vec![1]).unwrap();
        let err = registry.add_file("x.txt", vec![2]).unwrap_err();
        assert!(matches!(err, IsoError::DuplicatePath(ref p) if p == "x.txt"));

        // Same path after normalization
        assert!(matches!(
            registry.add_file(r"\x.txt", vec![3]),
            Err(IsoError::DuplicatePath(_))
        ));
        assert_eq!(registry.files().len(), 1);
        assert_eq!(registry.files()[0].data, vec![1]);
    }

    #[test]
    fn test_file_directory_collision() {
        let mut registry = EntryRegistry::new();
        registry.add_file("a/b.txt", vec![]).unwrap();
        assert!(matches!(registry.add_file("a", vec![]), Err(IsoError::DuplicatePath(_))));

        let mut registry = EntryRegistry::new();
        registry.add_file("a", vec![]).unwrap();
        let err = registry.add_file("a/b.txt", vec![]).unwrap_err();
        assert!(matches!(err, IsoError::DuplicatePath(ref p) if p == "a"));
        assert_eq!(registry.directories().count(), 0);
    }

    #[test]
    fn test_large_tree_keeps_lookup_set_in_step() {
        let mut registry = EntryRegistry::new();
        for top in 0..20 {
            for mid in 0..10 {
                for leaf in 0..10 {
                    registry
                        .add_file(&format!("t{}/m{}/f{}.bin", top, mid, leaf), vec![])
                        .unwrap();
                }
            }
        }

        assert_eq!(registry.files().len(), 2000);
        assert_eq!(registry.file_paths.len(), 2000);
        assert_eq!(registry.directories().count(), 20 + 20 * 10);

        // Failed registrations never touch the lookup set
        assert!(registry.add_file("t3/m4/f5.bin", vec![]).is_err());
        assert!(registry.add_file("t3/m4/f5.bin/x", vec![]).is_err());
        assert_eq!(registry.file_paths.len(), 2000);
        assert!(registry.directories().all(|d| !registry.file_paths.contains(d)));
    }

    #[test]
    fn test_name_length_limits() {
        let name = "n".repeat(MAX_IDENTIFIER_LEN - 2);
        assert!(normalize_path(&name).is_ok());

        let name = "n".repeat(MAX_IDENTIFIER_LEN - 1);
        assert!(matches!(normalize_path(&name), Err(IsoError::NameTooLong { .. })));

        // Directory components do not carry the version suffix
        let dir = format!("{}/f", "d".repeat(MAX_IDENTIFIER_LEN));
        assert!(normalize_path(&dir).is_ok());

        let deep = vec!["abcdefgh"; 40].join("/");
        assert!(matches!(normalize_path(&deep), Err(IsoError::NameTooLong { max: 255, .. })));
    }

    #[test]
    fn test_entry_order() {
        let mut registry = EntryRegistry::new();
        registry.add_file("zeta.txt", vec![]).unwrap();
        registry.add_file("b/one.txt", vec![]).unwrap();
        registry.add_file("a/two.txt", vec![]).unwrap();
        registry.add_file("alpha.txt", vec![]).unwrap();

        let order: Vec<(&str, bool)> = registry.entries().iter().map(|e| (e.path, e.is_dir)).collect();
        assert_eq!(
            order,
            vec![
                ("a", true),
                ("b", true),
                ("zeta.txt", false),
                ("b/one.txt", false),
                ("a/two.txt", false),
                ("alpha.txt", false),
            ]
        );
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(implied_directories("a/b/c.txt"), vec!["a", "a/b"]);
        assert!(implied_directories("c.txt").is_empty());
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
        assert_eq!(parent_path("a/b/c.txt"), "a/b");
        assert_eq!(parent_path("c.txt"), "");
    }
}
