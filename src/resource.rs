//! Resource kinds, table rows, and the row lists shared with the refresh actor.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// The resource kinds shown as pages, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Containers,
    Pods,
    Images,
    Networks,
    Volumes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Containers,
        ResourceKind::Pods,
        ResourceKind::Images,
        ResourceKind::Networks,
        ResourceKind::Volumes,
    ];

    pub fn index(self) -> usize {
        match self {
            ResourceKind::Containers => 0,
            ResourceKind::Pods => 1,
            ResourceKind::Images => 2,
            ResourceKind::Networks => 3,
            ResourceKind::Volumes => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Containers => "containers",
            ResourceKind::Pods => "pods",
            ResourceKind::Images => "images",
            ResourceKind::Networks => "networks",
            ResourceKind::Volumes => "volumes",
        }
    }

    /// Singular noun used in dialog titles and messages.
    pub fn noun(self) -> &'static str {
        match self {
            ResourceKind::Containers => "container",
            ResourceKind::Pods => "pod",
            ResourceKind::Images => "image",
            ResourceKind::Networks => "network",
            ResourceKind::Volumes => "volume",
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Containers => &[
                "container id",
                "image",
                "pod",
                "created",
                "status",
                "names",
                "ports",
            ],
            ResourceKind::Pods => &[
                "pod id",
                "name",
                "status",
                "created",
                "infra id",
                "# of containers",
            ],
            ResourceKind::Images => &["repository", "tag", "image id", "created", "size"],
            ResourceKind::Networks => &["network id", "name", "driver"],
            ResourceKind::Volumes => &["driver", "volume name", "created", "mountpoint"],
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// One table row as reported by a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub id: String,
    pub name: String,
    /// Display cells, one per header of the owning kind.
    pub cells: Vec<String>,
}

impl ResourceRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cells,
        }
    }

    pub fn selection(&self) -> ResourceSelection {
        ResourceSelection {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The highlighted row of a resource table. Read-only for dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSelection {
    pub id: String,
    pub name: String,
}

/// Row lists for every kind. Written by the refresh actor, read by the logic
/// thread when it reconciles selections and builds snapshots.
#[derive(Debug, Default)]
pub struct ResourceTables {
    lists: [Mutex<Vec<ResourceRow>>; 5],
}

impl ResourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self, kind: ResourceKind) -> MutexGuard<'_, Vec<ResourceRow>> {
        // A panic while holding the lock leaves a complete Vec behind.
        self.lists[kind.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn replace(&self, kind: ResourceKind, rows: Vec<ResourceRow>) {
        *self.guard(kind) = rows;
    }

    pub fn rows(&self, kind: ResourceKind) -> Vec<ResourceRow> {
        self.guard(kind).clone()
    }

    pub fn len(&self, kind: ResourceKind) -> usize {
        self.guard(kind).len()
    }

    pub fn is_empty(&self, kind: ResourceKind) -> bool {
        self.guard(kind).is_empty()
    }

    pub fn row(&self, kind: ResourceKind, index: usize) -> Option<ResourceRow> {
        self.guard(kind).get(index).cloned()
    }

    /// All ids of a kind, in table order.
    pub fn ids(&self, kind: ResourceKind) -> Vec<String> {
        self.guard(kind).iter().map(|r| r.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> ResourceRow {
        ResourceRow::new(id, format!("name-{id}"), vec![id.to_string()])
    }

    #[test]
    fn test_kind_order_matches_index() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_headers() {
        assert_eq!(ResourceKind::Containers.headers().len(), 7);
        assert_eq!(ResourceKind::Pods.headers()[0], "pod id");
        assert_eq!(ResourceKind::Volumes.noun(), "volume");
    }

    #[test]
    fn test_tables_are_independent_per_kind() {
        let tables = ResourceTables::new();
        tables.replace(ResourceKind::Pods, vec![row("p1"), row("p2")]);

        assert_eq!(tables.len(ResourceKind::Pods), 2);
        assert!(tables.is_empty(ResourceKind::Containers));
        assert_eq!(tables.ids(ResourceKind::Pods), vec!["p1", "p2"]);
        assert_eq!(tables.row(ResourceKind::Pods, 1).unwrap().name, "name-p2");
        assert!(tables.row(ResourceKind::Pods, 2).is_none());
    }

    #[test]
    fn test_selection_from_row() {
        let selection = row("abc123").selection();
        assert_eq!(selection.id, "abc123");
        assert_eq!(selection.name, "name-abc123");
    }
}
