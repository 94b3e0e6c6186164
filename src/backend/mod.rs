//! Boundary to the container-management service.
//!
//! The dashboard never talks to podman directly: every call goes through the
//! [`Backend`] trait as an [`Operation`] value, and comes back as an
//! [`Outcome`]. Calls are synchronous; the operation runner moves them onto
//! tokio's blocking pool.

pub mod fake;
pub mod podman;

use std::collections::BTreeMap;

use crate::resource::{ResourceKind, ResourceRow};
use crate::{plog_warn, Result};

pub use fake::FakeBackend;
pub use podman::PodmanCli;

/// Per-target verbs. Every one of them needs a selected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Inspect,
    Diff,
    Logs,
    Port,
    Top,
    History,
    Start,
    Stop,
    Pause,
    Unpause,
    Restart,
    Kill,
    Remove,
}

impl Verb {
    pub fn label(self) -> &'static str {
        match self {
            Verb::Inspect => "inspect",
            Verb::Diff => "diff",
            Verb::Logs => "logs",
            Verb::Port => "port",
            Verb::Top => "top",
            Verb::History => "history",
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Pause => "pause",
            Verb::Unpause => "unpause",
            Verb::Restart => "restart",
            Verb::Kill => "kill",
            Verb::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerCreateOptions {
    pub name: String,
    pub image: String,
    pub pod: String,
    pub labels: BTreeMap<String, String>,
    pub remove: bool,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub network: String,
    pub publish: Vec<String>,
    pub expose: Vec<String>,
    pub publish_all: bool,
    pub dns_servers: Vec<String>,
    pub dns_options: Vec<String>,
    pub dns_search: Vec<String>,
    pub volume: String,
    pub image_volume: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodCreateOptions {
    pub name: String,
    pub no_hosts: bool,
    pub labels: BTreeMap<String, String>,
    pub dns_servers: Vec<String>,
    pub dns_options: Vec<String>,
    pub dns_search: Vec<String>,
    pub infra: bool,
    pub infra_command: Vec<String>,
    pub infra_image: String,
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
    pub host_to_ip: Vec<String>,
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCreateOptions {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub driver: String,
    pub internal: bool,
    pub ipv6: bool,
    pub subnet: String,
    pub gateway: String,
    pub ip_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeCreateOptions {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub driver: String,
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateSpec {
    Container(ContainerCreateOptions),
    Pod(PodCreateOptions),
    Network(NetworkCreateOptions),
    Volume(VolumeCreateOptions),
}

impl CreateSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            CreateSpec::Container(_) => ResourceKind::Containers,
            CreateSpec::Pod(_) => ResourceKind::Pods,
            CreateSpec::Network(_) => ResourceKind::Networks,
            CreateSpec::Volume(_) => ResourceKind::Volumes,
        }
    }
}

/// A single backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Target {
        kind: ResourceKind,
        verb: Verb,
        id: String,
    },
    Prune {
        kind: ResourceKind,
    },
    Rename {
        id: String,
        name: String,
    },
    Tag {
        id: String,
        target: String,
    },
    Untag {
        id: String,
        image: String,
    },
    Exec {
        id: String,
        command: Vec<String>,
    },
    Search {
        term: String,
    },
    Pull {
        image: String,
    },
    Create(CreateSpec),
    Stats {
        kind: ResourceKind,
        ids: Vec<String>,
    },
}

impl Operation {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Operation::Target { kind, .. }
            | Operation::Prune { kind }
            | Operation::Stats { kind, .. } => *kind,
            Operation::Rename { .. } | Operation::Exec { .. } => ResourceKind::Containers,
            Operation::Tag { .. }
            | Operation::Untag { .. }
            | Operation::Search { .. }
            | Operation::Pull { .. } => ResourceKind::Images,
            Operation::Create(spec) => spec.kind(),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Target { verb, .. } => verb.label(),
            Operation::Prune { .. } => "prune",
            Operation::Rename { .. } => "rename",
            Operation::Tag { .. } => "tag",
            Operation::Untag { .. } => "untag",
            Operation::Exec { .. } => "exec",
            Operation::Search { .. } => "search",
            Operation::Pull { .. } => "pull",
            Operation::Create(_) => "create",
            Operation::Stats { .. } => "stats",
        }
    }

    /// The resource identifier an error title should name, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Operation::Target { id, .. }
            | Operation::Rename { id, .. }
            | Operation::Tag { id, .. }
            | Operation::Untag { id, .. }
            | Operation::Exec { id, .. } => Some(id),
            Operation::Search { term } => Some(term),
            Operation::Pull { image } => Some(image),
            Operation::Prune { .. } | Operation::Create(_) | Operation::Stats { .. } => None,
        }
    }

    pub fn label(&self) -> OperationLabel {
        OperationLabel {
            kind: self.kind(),
            verb: self.verb(),
            target: self.target().map(str::to_string),
        }
    }
}

/// Names an operation for dialog titles after the operation itself has been
/// handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLabel {
    pub kind: ResourceKind,
    pub verb: &'static str,
    pub target: Option<String>,
}

impl OperationLabel {
    pub fn progress_title(&self) -> String {
        format!("{} {} in progress", self.kind.noun(), self.verb)
    }

    pub fn error_title(&self) -> String {
        let noun = self.kind.noun().to_uppercase();
        let verb = self.verb.to_uppercase();
        match &self.target {
            Some(id) => format!("{noun} ({id}) {verb} ERROR"),
            None => format!("{noun} {verb} ERROR"),
        }
    }

    pub fn result_title(&self) -> String {
        format!("podman {} {}", self.kind.noun(), self.verb)
    }
}

/// A headed table of strings (top, history, search results, stats).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableReport {
    pub fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

/// Per-target failures of a multi-target call. An empty list means every
/// target succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Text(String),
    Lines(Vec<String>),
    Table(TableReport),
    Created(String),
    Batch(BatchReport),
}

pub trait Backend: Send + Sync {
    fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceRow>>;

    fn execute(&self, op: &Operation) -> Result<Outcome>;

    fn name(&self) -> &'static str;
}

/// Placeholder entry at the head of every dropdown ("nothing selected").
pub const NO_CHOICE: &str = "";

/// A selectable option: the backend id plus what the dropdown shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

/// Option lists offered by a create dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateChoices {
    pub images: Vec<Choice>,
    pub pods: Vec<Choice>,
    pub networks: Vec<Choice>,
    pub volumes: Vec<Choice>,
}

/// Fetch the option lists the create dialog of `kind` needs. A failing list
/// call leaves its list empty; the dialog must still open.
pub fn load_create_choices(backend: &dyn Backend, kind: ResourceKind) -> CreateChoices {
    let fetch = |source: ResourceKind| -> Vec<Choice> {
        match backend.list(source) {
            Ok(rows) => rows
                .into_iter()
                .map(|row| Choice {
                    label: if row.name.is_empty() {
                        row.id.clone()
                    } else {
                        row.name.clone()
                    },
                    id: row.id,
                })
                .collect(),
            Err(e) => {
                plog_warn!("create {}: {} list unavailable: {}", kind.noun(), source, e);
                Vec::new()
            }
        }
    };

    match kind {
        ResourceKind::Containers => CreateChoices {
            images: fetch(ResourceKind::Images),
            pods: fetch(ResourceKind::Pods),
            networks: fetch(ResourceKind::Networks),
            volumes: fetch(ResourceKind::Volumes),
        },
        ResourceKind::Pods => CreateChoices {
            networks: fetch(ResourceKind::Networks),
            ..Default::default()
        },
        ResourceKind::Images | ResourceKind::Networks | ResourceKind::Volumes => {
            CreateChoices::default()
        }
    }
}
