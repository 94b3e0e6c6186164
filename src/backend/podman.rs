use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::{DateTime, Local};
use serde_json::Value;

use super::{
    Backend, BatchReport, ContainerCreateOptions, CreateSpec, NetworkCreateOptions, Operation,
    Outcome, PodCreateOptions, TableReport, Verb, VolumeCreateOptions,
};
use crate::config::Config;
use crate::resource::{ResourceKind, ResourceRow};
use crate::{plog_debug, plog_trace, plog_warn, Error, Result};

/// Talks to podman by running its command line and parsing `--format json`.
pub struct PodmanCli {
    program: PathBuf,
    connection: Option<String>,
}

impl PodmanCli {
    /// Locate the podman binary named in the config.
    pub fn detect(config: &Config) -> Result<Self> {
        let program = which::which(config.podman_command()).map_err(|e| {
            Error::BackendUnavailable(format!("{}: {}", config.podman_command(), e))
        })?;
        plog_debug!(
            "PodmanCli::detect program={} connection={:?}",
            program.display(),
            config.connection
        );
        Ok(Self {
            program,
            connection: config.connection.clone(),
        })
    }

    pub fn version(&self) -> Result<String> {
        let output = self.output(&["--version".to_string()])?;
        Ok(stdout(&output).trim().to_string())
    }

    fn output(&self, args: &[String]) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        if let Some(connection) = &self.connection {
            cmd.args(["--connection", connection]);
        }
        plog_trace!("podman {}", args.join(" "));
        Ok(cmd.args(args).output()?)
    }

    /// Run and require a zero exit status; stderr becomes the error message.
    fn run(&self, args: &[String]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            let err = stderr_message(&output);
            plog_warn!("podman {} failed: {}", args.join(" "), err);
            return Err(Error::Backend(err));
        }
        Ok(stdout(&output))
    }

    /// Run a call that may fail for some of its targets and still make
    /// progress on the rest.
    fn run_batch(&self, args: &[String]) -> Result<Outcome> {
        let output = self.output(args)?;
        if output.status.success() {
            return Ok(Outcome::Batch(BatchReport::default()));
        }
        let errors: Vec<String> = String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(|l| l.trim().trim_start_matches("Error: ").to_string())
            .filter(|l| !l.is_empty())
            .collect();
        plog_warn!("podman {}: {} errors", args.join(" "), errors.len());
        if errors.is_empty() {
            return Err(Error::Backend(format!("podman exited with {}", output.status)));
        }
        Ok(Outcome::Batch(BatchReport { errors }))
    }

    fn list_json(&self, args: &[&str]) -> Result<Vec<Value>> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let out = self.run(&args)?;
        if out.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&out)? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }
}

impl Backend for PodmanCli {
    fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceRow>> {
        let items = match kind {
            ResourceKind::Containers => self.list_json(&["ps", "-a", "--format", "json"])?,
            ResourceKind::Pods => self.list_json(&["pod", "ps", "--format", "json"])?,
            ResourceKind::Images => self.list_json(&["images", "--format", "json"])?,
            ResourceKind::Networks => self.list_json(&["network", "ls", "--format", "json"])?,
            ResourceKind::Volumes => self.list_json(&["volume", "ls", "--format", "json"])?,
        };
        let rows: Vec<ResourceRow> = items.iter().map(|v| parse_row(kind, v)).collect();
        plog_trace!("PodmanCli::list {}: {} rows", kind, rows.len());
        Ok(rows)
    }

    fn execute(&self, op: &Operation) -> Result<Outcome> {
        plog_debug!("PodmanCli::execute {} {}", op.kind().noun(), op.verb());
        match op {
            Operation::Target { kind, verb, id } => self.execute_target(*kind, *verb, id),
            Operation::Prune { kind } => {
                self.run_batch(&strings(&[group(*kind), "prune", "-f"]))
            }
            Operation::Rename { id, name } => {
                self.run(&strings(&["container", "rename", id, name]))?;
                Ok(Outcome::Done)
            }
            Operation::Tag { id, target } => {
                self.run(&strings(&["image", "tag", id, target]))?;
                Ok(Outcome::Done)
            }
            Operation::Untag { id, image } => {
                self.run(&strings(&["image", "untag", id, image]))?;
                Ok(Outcome::Done)
            }
            Operation::Exec { id, command } => {
                let mut args = strings(&["container", "exec", id]);
                args.extend(command.iter().cloned());
                Ok(Outcome::Lines(lines(&self.run(&args)?)))
            }
            Operation::Search { term } => {
                let out = self.run(&strings(&[
                    "search",
                    "--format",
                    "{{.Index}}\t{{.Name}}\t{{.Description}}\t{{.Stars}}\t{{.Official}}",
                    term,
                ]))?;
                Ok(Outcome::Table(tab_table(
                    &["INDEX", "NAME", "DESCRIPTION", "STARS", "OFFICIAL"],
                    &out,
                )))
            }
            Operation::Pull { image } => {
                self.run(&strings(&["image", "pull", image]))?;
                Ok(Outcome::Done)
            }
            Operation::Create(spec) => {
                let out = self.run(&create_args(spec))?;
                let id = out.lines().last().unwrap_or_default().trim().to_string();
                Ok(Outcome::Created(id))
            }
            Operation::Stats { kind, ids } => self.stats(*kind, ids),
        }
    }

    fn name(&self) -> &'static str {
        "podman"
    }
}

impl PodmanCli {
    fn execute_target(&self, kind: ResourceKind, verb: Verb, id: &str) -> Result<Outcome> {
        let noun = group(kind);
        match verb {
            Verb::Inspect => Ok(Outcome::Text(self.run(&strings(&[noun, "inspect", id]))?)),
            Verb::Diff | Verb::Logs | Verb::Port => {
                let out = self.run(&strings(&[noun, verb.label(), id]))?;
                Ok(Outcome::Lines(lines(&out)))
            }
            Verb::Top => {
                let out = self.run(&strings(&[noun, "top", id]))?;
                Ok(Outcome::Table(whitespace_table(&out)))
            }
            Verb::History => {
                let out = self.run(&strings(&[
                    "image",
                    "history",
                    "--format",
                    "{{.ID}}\t{{.Created}}\t{{.CreatedBy}}\t{{.Size}}\t{{.Comment}}",
                    id,
                ]))?;
                Ok(Outcome::Table(tab_table(
                    &["ID", "CREATED", "CREATED BY", "SIZE", "COMMENT"],
                    &out,
                )))
            }
            Verb::Start
            | Verb::Stop
            | Verb::Pause
            | Verb::Unpause
            | Verb::Restart
            | Verb::Kill
            | Verb::Remove => {
                let sub = if verb == Verb::Remove { "rm" } else { verb.label() };
                if kind == ResourceKind::Pods {
                    return self.run_batch(&strings(&["pod", sub, id]));
                }
                let out = self.run(&strings(&[noun, sub, id]))?;
                if kind == ResourceKind::Images {
                    Ok(Outcome::Lines(lines(&out)))
                } else {
                    Ok(Outcome::Done)
                }
            }
        }
    }

    fn stats(&self, kind: ResourceKind, ids: &[String]) -> Result<Outcome> {
        let (args, headers): (Vec<String>, &[&str]) = match kind {
            ResourceKind::Pods => (
                strings(&[
                    "pod",
                    "stats",
                    "--no-stream",
                    "--format",
                    "{{.Pod}}\t{{.CID}}\t{{.Name}}\t{{.CPU}}\t{{.MemUsage}}",
                ]),
                &["POD", "CID", "NAME", "CPU %", "MEM USAGE / LIMIT"],
            ),
            _ => (
                strings(&[
                    "container",
                    "stats",
                    "--no-stream",
                    "--format",
                    "{{.ID}}\t{{.CPUPerc}}\t{{.MemUsage}}\t{{.NetIO}}\t{{.PIDs}}",
                ]),
                &["ID", "CPU %", "MEM USAGE / LIMIT", "NET IO", "PIDS"],
            ),
        };
        let mut args = args;
        args.extend(ids.iter().cloned());
        let out = self.run(&args)?;
        Ok(Outcome::Table(tab_table(headers, &out)))
    }
}

/// The podman sub-command group of a kind.
fn group(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Containers => "container",
        ResourceKind::Pods => "pod",
        ResourceKind::Images => "image",
        ResourceKind::Networks => "network",
        ResourceKind::Volumes => "volume",
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_message(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    let text = text.trim().trim_start_matches("Error: ");
    if text.is_empty() {
        format!("podman exited with {}", output.status)
    } else {
        text.to_string()
    }
}

fn lines(out: &str) -> Vec<String> {
    out.lines().map(str::to_string).collect()
}

fn tab_table(headers: &[&str], out: &str) -> TableReport {
    let rows = out
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split('\t').map(|c| c.trim().to_string()).collect())
        .collect();
    TableReport::new(headers, rows)
}

/// Parse `podman top` style output: a header line followed by rows whose last
/// column may contain spaces.
fn whitespace_table(out: &str) -> TableReport {
    let mut it = out.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = it.next() else {
        return TableReport::default();
    };
    let headers: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    let width = headers.len().max(1);
    let rows = it
        .map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() <= width {
                return parts.iter().map(|p| p.to_string()).collect();
            }
            let mut row: Vec<String> = parts[..width - 1].iter().map(|p| p.to_string()).collect();
            row.push(parts[width - 1..].join(" "));
            row
        })
        .collect();
    TableReport { headers, rows }
}

fn field(v: &Value, keys: &[&str]) -> String {
    for key in keys {
        match v.get(*key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            Some(Value::Bool(b)) => return b.to_string(),
            _ => {}
        }
    }
    String::new()
}

fn short(id: &str) -> String {
    id.chars().take(12).collect()
}

/// Creation times arrive as unix seconds or as preformatted strings.
fn created(v: &Value, keys: &[&str]) -> String {
    for key in keys {
        match v.get(*key) {
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_i64().and_then(|s| DateTime::from_timestamp(s, 0)) {
                    return ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
                }
            }
            Some(Value::String(s)) => {
                return match DateTime::parse_from_rfc3339(s) {
                    Ok(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                    Err(_) => s.clone(),
                }
            }
            _ => {}
        }
    }
    String::new()
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.3}{}", size, UNITS[unit])
            .replace(".000", "")
    }
}

fn string_list(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn container_ports(v: &Value) -> String {
    let Some(ports) = v.get("Ports").and_then(Value::as_array) else {
        return String::new();
    };
    ports
        .iter()
        .map(|p| {
            let host_ip = field(p, &["host_ip"]);
            let host_ip = if host_ip.is_empty() { "0.0.0.0".to_string() } else { host_ip };
            format!(
                "{}:{}->{}/{}",
                host_ip,
                field(p, &["host_port"]),
                field(p, &["container_port"]),
                field(p, &["protocol"])
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_row(kind: ResourceKind, v: &Value) -> ResourceRow {
    match kind {
        ResourceKind::Containers => {
            let id = field(v, &["Id", "ID"]);
            let names = string_list(v, "Names").join(",");
            let cells = vec![
                short(&id),
                field(v, &["Image"]),
                field(v, &["PodName"]),
                created(v, &["Created", "CreatedAt"]),
                field(v, &["Status", "State"]),
                names.clone(),
                container_ports(v),
            ];
            ResourceRow::new(id, names, cells)
        }
        ResourceKind::Pods => {
            let id = field(v, &["Id", "ID"]);
            let name = field(v, &["Name"]);
            let count = v
                .get("Containers")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            let cells = vec![
                short(&id),
                name.clone(),
                field(v, &["Status"]),
                created(v, &["Created"]),
                short(&field(v, &["InfraId"])),
                count.to_string(),
            ];
            ResourceRow::new(id, name, cells)
        }
        ResourceKind::Images => {
            let id = field(v, &["Id", "ID"]);
            let reference = string_list(v, "Names")
                .into_iter()
                .next()
                .unwrap_or_else(|| "<none>:<none>".to_string());
            let (repository, tag) = match reference.rsplit_once(':') {
                Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), tag.to_string()),
                _ => (reference.clone(), "<none>".to_string()),
            };
            let size = v.get("Size").and_then(Value::as_u64).map(human_size).unwrap_or_default();
            let cells = vec![
                repository,
                tag,
                short(&id),
                created(v, &["Created", "CreatedAt"]),
                size,
            ];
            ResourceRow::new(id, reference, cells)
        }
        ResourceKind::Networks => {
            let name = field(v, &["name", "Name"]);
            let id = field(v, &["id", "ID", "Id"]);
            let cells = vec![short(&id), name.clone(), field(v, &["driver", "Driver"])];
            // Network commands accept names; ids of CNI networks are not stable.
            ResourceRow::new(name.clone(), name, cells)
        }
        ResourceKind::Volumes => {
            let name = field(v, &["Name"]);
            let cells = vec![
                field(v, &["Driver"]),
                name.clone(),
                created(v, &["CreatedAt"]),
                field(v, &["Mountpoint"]),
            ];
            ResourceRow::new(name.clone(), name, cells)
        }
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn push_each(args: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values {
        push_flag(args, flag, value);
    }
}

fn push_pairs<'a>(
    args: &mut Vec<String>,
    flag: &str,
    pairs: impl IntoIterator<Item = (&'a String, &'a String)>,
) {
    for (key, value) in pairs {
        push_flag(args, flag, &format!("{key}={value}"));
    }
}

fn container_args(o: &ContainerCreateOptions) -> Vec<String> {
    let mut args = strings(&["container", "create"]);
    push_flag(&mut args, "--name", &o.name);
    push_flag(&mut args, "--pod", &o.pod);
    push_pairs(&mut args, "--label", &o.labels);
    if o.remove {
        args.push("--rm".to_string());
    }
    push_flag(&mut args, "--hostname", &o.hostname);
    push_flag(&mut args, "--ip", &o.ip_address);
    push_flag(&mut args, "--mac-address", &o.mac_address);
    push_flag(&mut args, "--network", &o.network);
    push_each(&mut args, "--publish", &o.publish);
    push_each(&mut args, "--expose", &o.expose);
    if o.publish_all {
        args.push("--publish-all".to_string());
    }
    push_each(&mut args, "--dns", &o.dns_servers);
    push_each(&mut args, "--dns-option", &o.dns_options);
    push_each(&mut args, "--dns-search", &o.dns_search);
    push_flag(&mut args, "--volume", &o.volume);
    push_flag(&mut args, "--image-volume", &o.image_volume);
    args.push(o.image.clone());
    args
}

fn pod_args(o: &PodCreateOptions) -> Vec<String> {
    let mut args = strings(&["pod", "create"]);
    push_flag(&mut args, "--name", &o.name);
    if o.no_hosts {
        args.push("--no-hosts".to_string());
    }
    push_pairs(&mut args, "--label", &o.labels);
    push_each(&mut args, "--dns", &o.dns_servers);
    push_each(&mut args, "--dns-option", &o.dns_options);
    push_each(&mut args, "--dns-search", &o.dns_search);
    if o.infra {
        push_flag(&mut args, "--infra-command", &o.infra_command.join(" "));
        push_flag(&mut args, "--infra-image", &o.infra_image);
    } else {
        args.push("--infra=false".to_string());
    }
    push_flag(&mut args, "--hostname", &o.hostname);
    push_flag(&mut args, "--ip", &o.ip_address);
    push_flag(&mut args, "--mac-address", &o.mac_address);
    push_each(&mut args, "--add-host", &o.host_to_ip);
    push_flag(&mut args, "--network", &o.network);
    args
}

fn network_args(o: &NetworkCreateOptions) -> Vec<String> {
    let mut args = strings(&["network", "create"]);
    push_pairs(&mut args, "--label", &o.labels);
    push_flag(&mut args, "--driver", &o.driver);
    if o.internal {
        args.push("--internal".to_string());
    }
    if o.ipv6 {
        args.push("--ipv6".to_string());
    }
    push_flag(&mut args, "--subnet", &o.subnet);
    push_flag(&mut args, "--gateway", &o.gateway);
    push_flag(&mut args, "--ip-range", &o.ip_range);
    if !o.name.is_empty() {
        args.push(o.name.clone());
    }
    args
}

fn volume_args(o: &VolumeCreateOptions) -> Vec<String> {
    let mut args = strings(&["volume", "create"]);
    push_flag(&mut args, "--driver", &o.driver);
    push_pairs(&mut args, "--label", &o.labels);
    push_pairs(&mut args, "--opt", &o.options);
    if !o.name.is_empty() {
        args.push(o.name.clone());
    }
    args
}

/// Command line for a create operation, without the program name.
pub fn create_args(spec: &CreateSpec) -> Vec<String> {
    match spec {
        CreateSpec::Container(o) => container_args(o),
        CreateSpec::Pod(o) => pod_args(o),
        CreateSpec::Network(o) => network_args(o),
        CreateSpec::Volume(o) => volume_args(o),
    }
}
