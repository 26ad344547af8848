//! Hierarchical view over the flat central directory.
//!
//! Entry names are normalized to the path model used by the virtual
//! filesystem: forward slashes, no leading slash, `.` for the root.
//! Parent directories that have no explicit entry of their own are
//! synthesized so every path prefix can be listed.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::structures::{DosDateTime, ZipFileEntry};

/// One node of the archive tree.
#[derive(Debug, Clone)]
pub struct IndexNode {
    /// Index into the entry list, `None` for synthesized directories and the root.
    pub entry: Option<usize>,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DosDateTime>,
    children: BTreeSet<String>,
}

impl IndexNode {
    fn directory() -> Self {
        Self {
            entry: None,
            is_dir: true,
            size: 0,
            modified: None,
            children: BTreeSet::new(),
        }
    }

    /// Child names in lexical order.
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }
}

#[derive(Debug)]
pub struct ArchiveIndex {
    entries: Vec<ZipFileEntry>,
    nodes: HashMap<String, IndexNode>,
}

pub const ROOT: &str = ".";

impl ArchiveIndex {
    pub fn new(entries: Vec<ZipFileEntry>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT.to_string(), IndexNode::directory());

        // Files first claim their names; directories (explicit or implied) then win conflicts.
        let mut files = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            let Some(path) = normalize_entry_name(&entry.file_name) else {
                log::warn!("skipping archive entry with unusable name {:?}", entry.file_name);
                continue;
            };

            if entry.is_directory {
                let node = insert_dir(&mut nodes, &path);
                if node.entry.is_none() {
                    node.entry = Some(i);
                    node.modified = Some(entry.modified);
                }
            } else if files.contains_key(&path) {
                log::warn!("skipping duplicate archive entry {:?}", entry.file_name);
            } else {
                if let Some((parent, _)) = path.rsplit_once('/') {
                    insert_dir(&mut nodes, parent);
                }
                files.insert(path, i);
            }
        }

        for (path, i) in files {
            if nodes.contains_key(&path) {
                log::warn!("archive entry {:?} is shadowed by a directory", path);
                continue;
            }
            let entry = &entries[i];
            let (parent, name) = split_parent(&path);
            if let Some(parent) = nodes.get_mut(parent) {
                parent.children.insert(name.to_string());
            }
            nodes.insert(
                path,
                IndexNode {
                    entry: Some(i),
                    is_dir: false,
                    size: entry.uncompressed_size,
                    modified: Some(entry.modified),
                    children: BTreeSet::new(),
                },
            );
        }

        Self { entries, nodes }
    }

    /// Look up a normalized path (`.` for the root).
    pub fn get(&self, path: &str) -> Option<&IndexNode> {
        self.nodes.get(path)
    }

    pub fn entry(&self, node: &IndexNode) -> Option<&ZipFileEntry> {
        node.entry.map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }
}

/// Create `path` and all its ancestors as directories, returning the node for `path`.
fn insert_dir<'a>(nodes: &'a mut HashMap<String, IndexNode>, path: &str) -> &'a mut IndexNode {
    let mut current = String::new();
    for component in path.split('/') {
        let parent = if current.is_empty() {
            ROOT.to_string()
        } else {
            current.clone()
        };
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(component);

        if let Some(parent) = nodes.get_mut(&parent) {
            parent.children.insert(component.to_string());
        }
        nodes
            .entry(current.clone())
            .or_insert_with(IndexNode::directory);
    }
    nodes.entry(current).or_insert_with(IndexNode::directory)
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => (ROOT, path),
    }
}

/// Normalize a stored entry name, or `None` if it cannot be addressed safely.
pub fn normalize_entry_name(name: &str) -> Option<String> {
    let name = name.replace('\\', "/");
    let mut components = Vec::new();
    for component in name.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            c => components.push(c),
        }
    }
    if components.is_empty() {
        return None;
    }
    Some(components.join("/"))
}
