//! Fixed, ordered command catalogs, one per resource kind.

use crate::backend::Verb;
use crate::dialog::{ConfirmTag, InputPurpose};
use crate::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Destructive: populate the confirmation context and ask first.
    Confirm(ConfirmTag),
    Run(Verb),
    Prompt(InputPurpose),
    Create,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub requires_selection: bool,
    /// Completes "there is no <noun> to ..." when nothing is selected.
    pub phrase: &'static str,
    pub action: CommandAction,
}

impl CommandSpec {
    const fn new(
        name: &'static str,
        description: &'static str,
        requires_selection: bool,
        phrase: &'static str,
        action: CommandAction,
    ) -> Self {
        Self {
            name,
            description,
            requires_selection,
            phrase,
            action,
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self.action, CommandAction::Confirm(_))
    }

    pub fn missing_selection(&self, kind: ResourceKind) -> String {
        format!("there is no {} to {}", kind.noun(), self.phrase)
    }
}

use CommandAction::{Confirm, Create, Prompt, Run, Stats};

const CONTAINERS: &[CommandSpec] = &[
    CommandSpec::new("create", "create a new container", false, "", Create),
    CommandSpec::new("diff", "inspect changes to the selected container's file systems", true, "display diff", Run(Verb::Diff)),
    CommandSpec::new("exec", "execute a command in the selected container", true, "exec", Prompt(InputPurpose::Exec)),
    CommandSpec::new("inspect", "display the configuration of a container", true, "display inspect", Run(Verb::Inspect)),
    CommandSpec::new("kill", "kill the selected running container with a SIGKILL signal", true, "kill", Confirm(ConfirmTag::Kill)),
    CommandSpec::new("logs", "fetch the logs of the selected container", true, "display logs", Run(Verb::Logs)),
    CommandSpec::new("pause", "pause all the processes in the selected container", true, "pause", Run(Verb::Pause)),
    CommandSpec::new("port", "list port mappings for the selected container", true, "display port", Run(Verb::Port)),
    CommandSpec::new("prune", "remove all non running containers", false, "", Confirm(ConfirmTag::Prune)),
    CommandSpec::new("rename", "rename the selected container", true, "rename", Prompt(InputPurpose::Rename)),
    CommandSpec::new("rm", "remove the selected container", true, "remove", Confirm(ConfirmTag::Remove)),
    CommandSpec::new("start", "start the selected container", true, "start", Run(Verb::Start)),
    CommandSpec::new("stats", "display live stream of the selected container's resource usage", true, "display stats", Stats),
    CommandSpec::new("stop", "stop the selected container", true, "stop", Run(Verb::Stop)),
    CommandSpec::new("top", "display the running processes of the selected container", true, "display top", Run(Verb::Top)),
    CommandSpec::new("unpause", "unpause the selected container that was paused before", true, "unpause", Run(Verb::Unpause)),
];

const PODS: &[CommandSpec] = &[
    CommandSpec::new("create", "create a new pod", false, "", Create),
    CommandSpec::new("inspect", "display information describing the selected pod", true, "display inspect", Run(Verb::Inspect)),
    CommandSpec::new("kill", "send SIGKILL signal to containers in the pod", true, "kill", Confirm(ConfirmTag::Kill)),
    CommandSpec::new("pause", "pause the selected pod", true, "pause", Run(Verb::Pause)),
    CommandSpec::new("prune", "remove all stopped pods and their containers", false, "", Confirm(ConfirmTag::Prune)),
    CommandSpec::new("restart", "restart the selected pod", true, "restart", Run(Verb::Restart)),
    CommandSpec::new("rm", "remove the selected pod", true, "remove", Confirm(ConfirmTag::Remove)),
    CommandSpec::new("start", "start the selected pod", true, "start", Run(Verb::Start)),
    CommandSpec::new("stats", "display live stream of the selected pod's resource usage", true, "display stats", Stats),
    CommandSpec::new("stop", "stop the selected pod", true, "stop", Run(Verb::Stop)),
    CommandSpec::new("top", "display the running processes of the pod's containers", true, "display top", Run(Verb::Top)),
    CommandSpec::new("unpause", "unpause the selected pod", true, "unpause", Run(Verb::Unpause)),
];

const IMAGES: &[CommandSpec] = &[
    CommandSpec::new("diff", "inspect changes to the image's file systems", true, "display diff", Run(Verb::Diff)),
    CommandSpec::new("history", "show history of the selected image", true, "display history", Run(Verb::History)),
    CommandSpec::new("inspect", "display the configuration of an image", true, "display inspect", Run(Verb::Inspect)),
    CommandSpec::new("prune", "remove all unused images", false, "", Confirm(ConfirmTag::Prune)),
    CommandSpec::new("rm", "removes the selected image from local storage", true, "remove", Confirm(ConfirmTag::Remove)),
    CommandSpec::new("search/pull", "search and pull image from registry", false, "", Prompt(InputPurpose::Search)),
    CommandSpec::new("tag", "add an additional name to the selected image", true, "tag", Prompt(InputPurpose::Tag)),
    CommandSpec::new("untag", "remove a name from the selected image", true, "untag", Prompt(InputPurpose::Untag)),
];

const NETWORKS: &[CommandSpec] = &[
    CommandSpec::new("create", "create a podman network", false, "", Create),
    CommandSpec::new("inspect", "display the network configuration", true, "display inspect", Run(Verb::Inspect)),
    CommandSpec::new("prune", "remove all unused networks", false, "", Confirm(ConfirmTag::Prune)),
    CommandSpec::new("rm", "remove the selected network", true, "remove", Confirm(ConfirmTag::Remove)),
];

const VOLUMES: &[CommandSpec] = &[
    CommandSpec::new("create", "create a new volume", false, "", Create),
    CommandSpec::new("inspect", "display detailed volume's information", true, "display inspect", Run(Verb::Inspect)),
    CommandSpec::new("prune", "remove all unused volumes", false, "", Confirm(ConfirmTag::Prune)),
    CommandSpec::new("rm", "remove the selected volume", true, "remove", Confirm(ConfirmTag::Remove)),
];

pub fn catalog(kind: ResourceKind) -> &'static [CommandSpec] {
    match kind {
        ResourceKind::Containers => CONTAINERS,
        ResourceKind::Pods => PODS,
        ResourceKind::Images => IMAGES,
        ResourceKind::Networks => NETWORKS,
        ResourceKind::Volumes => VOLUMES,
    }
}

pub fn find(kind: ResourceKind, name: &str) -> Option<&'static CommandSpec> {
    catalog(kind).iter().find(|c| c.name == name)
}
