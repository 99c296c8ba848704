use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Change recorded for a workspace resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceChange {
    Added,
    Removed,
    Changed,
}

/// Tree of resource changes since the previous build.
///
/// Folders carry children; files are leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub path: PathBuf,
    pub change: ResourceChange,
    #[serde(default)]
    pub children: Vec<ResourceDelta>,
}

impl ResourceDelta {
    pub fn new(path: impl Into<PathBuf>, change: ResourceChange) -> Self {
        Self {
            path: path.into(),
            change,
            children: Vec::new(),
        }
    }

    /// A changed folder containing `children`.
    pub fn folder(path: impl Into<PathBuf>, children: Vec<ResourceDelta>) -> Self {
        Self {
            path: path.into(),
            change: ResourceChange::Changed,
            children,
        }
    }

    /// Flat delta listing changed files, as produced from a file list.
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::folder(
            PathBuf::new(),
            files
                .into_iter()
                .map(|f| Self::new(f, ResourceChange::Changed))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf deltas in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&ResourceDelta> {
        let mut out = Vec::new();
        flatten0(self, &mut out);
        out
    }

    /// Changed class artifacts still present in the workspace.
    #[must_use]
    pub fn class_files(&self) -> Vec<&Path> {
        self.leaves()
            .into_iter()
            .filter(|d| d.change != ResourceChange::Removed && is_class_file(&d.path))
            .map(|d| d.path.as_path())
            .collect()
    }
}

fn flatten0<'a>(delta: &'a ResourceDelta, out: &mut Vec<&'a ResourceDelta>) {
    if delta.is_leaf() {
        out.push(delta);
        return;
    }
    for child in &delta.children {
        flatten0(child, out);
    }
}

fn is_class_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("class"))
}
