// Application registry: discovers the application tree on disk and loads
// applications through their registered entry points.

pub mod builtin;
pub mod catalog;
pub mod tree;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::state::window::WindowSurface;

pub use catalog::{Application, Catalog, LoadParams};
pub use tree::{ApplicationNode, ApplicationTree, NodeId, NodeKind};

/// File whose presence marks a directory as an application
pub const APP_MARKER: &str = "app.json";

/// Contents of an `app.json` marker. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppManifest {
    /// Catalog identifier; defaults to the dotted directory path
    entry: Option<String>,
    /// Menu label; defaults to the directory name
    title: Option<String>,
}

fn read_manifest(path: &Path) -> AppManifest {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => AppManifest::default(),
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unparsable manifest");
            AppManifest::default()
        }),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable manifest");
            AppManifest::default()
        }
    }
}

/// Subdirectories of `dir` sorted by name. Symlinks are not followed.
fn list_dirs(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with('.') {
                dirs.push((name.to_string(), entry.path()));
            }
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Walk `root` once and build the application tree.
///
/// A directory holding [`APP_MARKER`] is an application; any other directory
/// is a category. Applications whose identifier is not bound in `catalog` are
/// left out. An unreadable root yields an empty tree.
pub fn discover(root: &Path, catalog: &Catalog) -> ApplicationTree {
    let mut tree = ApplicationTree::new();

    if let Err(e) = fs::metadata(root).and_then(|m| {
        if m.is_dir() {
            Ok(())
        } else {
            Err(std::io::Error::other("not a directory"))
        }
    }) {
        warn!(root = %root.display(), error = %e, "application tree unavailable, menu will be empty");
        return tree;
    }

    // (directory, tree node, dotted path prefix)
    let mut pending = vec![(root.to_path_buf(), ApplicationTree::ROOT, String::new())];

    while let Some((dir, parent, prefix)) = pending.pop() {
        let subdirs = match list_dirs(&dir) {
            Ok(subdirs) => subdirs,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for (name, path) in subdirs {
            let dotted = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };

            let marker = path.join(APP_MARKER);
            if marker.is_file() {
                let manifest = read_manifest(&marker);
                let identifier = manifest.entry.unwrap_or_else(|| dotted.clone());
                if !catalog.contains(&identifier) {
                    warn!(%identifier, dir = %path.display(), "no entry point bound, skipping");
                    continue;
                }
                let label = manifest.title.unwrap_or_else(|| name.clone());
                debug!(%identifier, %label, "discovered application");
                tree.add_application(parent, name, label, identifier);
            } else {
                let category = tree.add_category(parent, name);
                pending.push((path, category, dotted));
            }
        }
    }

    tree.sort();
    info!(
        root = %root.display(),
        applications = tree.application_count(),
        "application discovery complete"
    );
    tree
}

/// Discovered tree plus the entry points it resolves to. Read-only after startup.
pub struct AppRegistry {
    tree: ApplicationTree,
    catalog: Catalog,
}

impl AppRegistry {
    pub fn new(tree: ApplicationTree, catalog: Catalog) -> Self {
        Self { tree, catalog }
    }

    /// Discover applications under `root`, binding them against `catalog`
    pub fn discover(root: &Path, catalog: Catalog) -> Self {
        let tree = discover(root, &catalog);
        debug!(
            bound = ?catalog.identifiers().collect::<Vec<_>>(),
            "catalog entry points"
        );
        Self::new(tree, catalog)
    }

    pub fn tree(&self) -> &ApplicationTree {
        &self.tree
    }

    /// Load the application at `path` in the tree
    pub fn resolve_and_load(
        &self,
        path: &[&str],
        params: Option<&LoadParams>,
    ) -> Result<WindowSurface, LoadError> {
        let node = self.tree.lookup(path).ok_or_else(|| LoadError::NotFound {
            path: path.join("/"),
        })?;
        self.load_node(node, params)
    }

    /// Load the application a tree node refers to
    pub fn load_node(
        &self,
        node: NodeId,
        params: Option<&LoadParams>,
    ) -> Result<WindowSurface, LoadError> {
        match &self.tree.node(node).kind {
            NodeKind::Application { identifier } => self.load_by_id(identifier, params),
            NodeKind::Category { .. } => Err(LoadError::NotFound {
                path: self.tree.path_of(node).join("/"),
            }),
        }
    }

    /// Load by catalog identifier, bypassing the tree
    pub fn load_by_id(
        &self,
        identifier: &str,
        params: Option<&LoadParams>,
    ) -> Result<WindowSurface, LoadError> {
        let app = self
            .catalog
            .get(identifier)
            .ok_or_else(|| LoadError::Unbound {
                identifier: identifier.to_string(),
            })?;

        let window = app.load(params).map_err(|source| LoadError::Failed {
            identifier: identifier.to_string(),
            source,
        })?;
        info!(%identifier, id = %window.id, "application loaded");
        Ok(window)
    }
}
