//! In-memory backend for `--demo` mode and the test-suite.
//!
//! Keeps per-kind row lists, records every call, and can be scripted to fail
//! list calls or individual verbs.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use super::{Backend, BatchReport, CreateSpec, Operation, Outcome, TableReport, Verb};
use crate::resource::{ResourceKind, ResourceRow};
use crate::{plog_trace, Error, Result};

#[derive(Debug, Default)]
struct FakeState {
    rows: HashMap<ResourceKind, Vec<ResourceRow>>,
    calls: Vec<Operation>,
    list_calls: Vec<ResourceKind>,
    failing_lists: HashSet<ResourceKind>,
    failures: HashMap<&'static str, String>,
    batch_errors: HashMap<&'static str, Vec<String>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-populated with a small but plausible host.
    pub fn demo() -> Self {
        Self::new()
            .with_rows(
                ResourceKind::Containers,
                vec![
                    container_row("3f1c2a9be0d1", "web", "docker.io/library/nginx:latest", "Up 2 hours"),
                    container_row("9ad04e7c55b2", "cache", "docker.io/library/redis:7", "Up 2 hours"),
                    container_row("c71b3e0f8a64", "migrate", "localhost/app:dev", "Exited (0) 1 hour ago"),
                ],
            )
            .with_rows(
                ResourceKind::Pods,
                vec![ResourceRow::new(
                    "5e2d7a1c9f30",
                    "backend",
                    cells(&["5e2d7a1c9f30", "backend", "Running", "3 hours ago", "b8e1f07c2d44", "3"]),
                )],
            )
            .with_rows(
                ResourceKind::Images,
                vec![
                    image_row("docker.io/library/nginx", "latest", "a6bd71f48f68"),
                    image_row("docker.io/library/redis", "7", "e40e2763392d"),
                    image_row("localhost/app", "dev", "77c1e8f0b1aa"),
                ],
            )
            .with_rows(
                ResourceKind::Networks,
                vec![
                    ResourceRow::new("podman", "podman", cells(&["2f259bab93aa", "podman", "bridge"])),
                    ResourceRow::new("backend", "backend", cells(&["c0ffee42d00d", "backend", "bridge"])),
                ],
            )
            .with_rows(
                ResourceKind::Volumes,
                vec![ResourceRow::new(
                    "pgdata",
                    "pgdata",
                    cells(&["local", "pgdata", "2 days ago", "/var/lib/containers/storage/volumes/pgdata/_data"]),
                )],
            )
    }

    pub fn with_rows(self, kind: ResourceKind, rows: Vec<ResourceRow>) -> Self {
        self.lock().rows.insert(kind, rows);
        self
    }

    pub fn fail_list(self, kind: ResourceKind) -> Self {
        self.lock().failing_lists.insert(kind);
        self
    }

    /// Make every operation whose verb is `verb` fail with `message`.
    pub fn fail(self, verb: &'static str, message: &str) -> Self {
        self.lock().failures.insert(verb, message.to_string());
        self
    }

    /// Per-target errors reported by multi-target calls of `verb`.
    pub fn batch_errors(self, verb: &'static str, errors: &[&str]) -> Self {
        self.lock()
            .batch_errors
            .insert(verb, errors.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    pub fn list_calls(&self) -> Vec<ResourceKind> {
        self.lock().list_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Backend for FakeBackend {
    fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceRow>> {
        let mut state = self.lock();
        state.list_calls.push(kind);
        if state.failing_lists.contains(&kind) {
            return Err(Error::Backend(format!("cannot list {kind}: connection refused")));
        }
        Ok(state.rows.get(&kind).cloned().unwrap_or_default())
    }

    fn execute(&self, op: &Operation) -> Result<Outcome> {
        plog_trace!("FakeBackend::execute {:?}", op);
        let delay = {
            let mut state = self.lock();
            state.calls.push(op.clone());
            if let Some(message) = state.failures.get(op.verb()) {
                return Err(Error::Backend(message.clone()));
            }
            state.delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut state = self.lock();
        let batch = state.batch_errors.get(op.verb()).cloned().unwrap_or_default();

        match op {
            Operation::Target { kind, verb, id } => {
                let rows = state.rows.entry(*kind).or_default();
                let Some(pos) = rows.iter().position(|r| &r.id == id) else {
                    return Err(Error::Backend(format!("no such {}: {}", kind.noun(), id)));
                };
                match verb {
                    Verb::Inspect => {
                        let row = &rows[pos];
                        let doc = json!({ "Id": row.id, "Name": row.name, "Fields": row.cells });
                        Ok(Outcome::Text(serde_json::to_string_pretty(&doc)?))
                    }
                    Verb::Diff => Ok(Outcome::Lines(vec![
                        "C /etc".to_string(),
                        "A /etc/motd".to_string(),
                    ])),
                    Verb::Logs => Ok(Outcome::Lines(vec![format!("{} started", rows[pos].name)])),
                    Verb::Port => Ok(Outcome::Lines(vec!["80/tcp -> 0.0.0.0:8080".to_string()])),
                    Verb::Top => Ok(Outcome::Table(TableReport::new(
                        &["USER", "PID", "PPID", "%CPU", "ELAPSED", "COMMAND"],
                        vec![cells(&["root", "1", "0", "0.000", "2h0m", "/init"])],
                    ))),
                    Verb::History => Ok(Outcome::Table(TableReport::new(
                        &["ID", "CREATED", "CREATED BY", "SIZE", "COMMENT"],
                        vec![cells(&[id, "2 weeks ago", "/bin/sh -c #(nop) CMD", "0B", ""])],
                    ))),
                    Verb::Start | Verb::Stop | Verb::Pause | Verb::Unpause | Verb::Restart => {
                        if *kind == ResourceKind::Pods {
                            Ok(Outcome::Batch(BatchReport { errors: batch }))
                        } else {
                            Ok(Outcome::Done)
                        }
                    }
                    Verb::Kill => {
                        if *kind == ResourceKind::Pods {
                            Ok(Outcome::Batch(BatchReport { errors: batch }))
                        } else {
                            Ok(Outcome::Done)
                        }
                    }
                    Verb::Remove => {
                        let removed = rows.remove(pos);
                        match kind {
                            ResourceKind::Images => Ok(Outcome::Lines(vec![
                                format!("Untagged: {}", removed.name),
                                format!("Deleted: {}", removed.id),
                            ])),
                            ResourceKind::Pods => Ok(Outcome::Batch(BatchReport { errors: batch })),
                            _ => Ok(Outcome::Done),
                        }
                    }
                }
            }
            Operation::Prune { .. } => Ok(Outcome::Batch(BatchReport { errors: batch })),
            Operation::Rename { id, name } => {
                let rows = state.rows.entry(ResourceKind::Containers).or_default();
                match rows.iter_mut().find(|r| &r.id == id) {
                    Some(row) => {
                        row.name = name.clone();
                        Ok(Outcome::Done)
                    }
                    None => Err(Error::Backend(format!("no such container: {id}"))),
                }
            }
            Operation::Tag { .. } | Operation::Untag { .. } => Ok(Outcome::Done),
            Operation::Exec { command, .. } => Ok(Outcome::Lines(vec![
                format!("$ {}", command.join(" ")),
                "ok".to_string(),
            ])),
            Operation::Search { term } => Ok(Outcome::Table(TableReport::new(
                &["INDEX", "NAME", "DESCRIPTION", "STARS", "OFFICIAL"],
                vec![cells(&[
                    "docker.io",
                    &format!("docker.io/library/{term}"),
                    "Official build",
                    "1000",
                    "[OK]",
                ])],
            ))),
            Operation::Pull { image } => {
                let id = short_id();
                state
                    .rows
                    .entry(ResourceKind::Images)
                    .or_default()
                    .push(image_row(image, "latest", &id));
                Ok(Outcome::Done)
            }
            Operation::Create(spec) => {
                let id = short_id();
                let name = match spec {
                    CreateSpec::Container(o) => o.name.clone(),
                    CreateSpec::Pod(o) => o.name.clone(),
                    CreateSpec::Network(o) => o.name.clone(),
                    CreateSpec::Volume(o) => o.name.clone(),
                };
                let width = spec.kind().headers().len();
                let mut row_cells = vec![String::new(); width];
                row_cells[0] = id.clone();
                state
                    .rows
                    .entry(spec.kind())
                    .or_default()
                    .push(ResourceRow::new(id.clone(), name, row_cells));
                Ok(Outcome::Created(id))
            }
            Operation::Stats { ids, .. } => Ok(Outcome::Table(TableReport::new(
                &["ID", "CPU %", "MEM USAGE / LIMIT", "NET IO", "PIDS"],
                ids.iter()
                    .map(|id| cells(&[id, "0.42%", "12.1MB / 2GB", "1.2kB / 800B", "3"]))
                    .collect(),
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn container_row(id: &str, name: &str, image: &str, status: &str) -> ResourceRow {
    ResourceRow::new(
        id,
        name,
        cells(&[id, image, "", "2 hours ago", status, name, ""]),
    )
}

fn image_row(repository: &str, tag: &str, id: &str) -> ResourceRow {
    ResourceRow::new(
        id,
        format!("{repository}:{tag}"),
        cells(&[repository, tag, id, "2 weeks ago", "142MB"]),
    )
}
