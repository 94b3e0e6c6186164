//! Create dialogs: form layouts per kind and extraction into create options.

use std::collections::BTreeMap;

use super::form::{Field, Form, Page};
use crate::backend::{
    ContainerCreateOptions, CreateChoices, CreateSpec, NetworkCreateOptions, PodCreateOptions,
    VolumeCreateOptions,
};
use crate::resource::ResourceKind;
use crate::{Error, Result};

pub const IMAGE_VOLUME_CHOICES: [&str; 4] = ["", "ignore", "tmpfs", "anonymous"];

/// A create form bound to the kind it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDialog {
    pub kind: ResourceKind,
    pub form: Form,
}

impl CreateDialog {
    /// Build the form for `kind` from freshly loaded option lists.
    /// Returns `None` for kinds without a create dialog.
    pub fn new(kind: ResourceKind, choices: CreateChoices, infra_image: &str) -> Option<Self> {
        let form = match kind {
            ResourceKind::Containers => container_form(choices),
            ResourceKind::Pods => pod_form(choices, infra_image),
            ResourceKind::Networks => network_form(),
            ResourceKind::Volumes => volume_form(),
            ResourceKind::Images => return None,
        };
        Some(Self { kind, form })
    }

    pub fn spec(&self) -> Result<CreateSpec> {
        build_spec(self.kind, &self.form)
    }
}

fn container_form(choices: CreateChoices) -> Form {
    Form::new(
        "PODMAN CONTAINER CREATE",
        vec![
            Page::new(
                "Basic Information",
                vec![
                    Field::text("name", "name:"),
                    Field::choice("image", "image:", choices.images),
                    Field::choice("pod", "pod:", choices.pods),
                    Field::text("labels", "labels:"),
                    Field::check("remove", "remove:", false),
                ],
            ),
            Page::new(
                "Network Settings",
                vec![
                    Field::text("hostname", "hostname:"),
                    Field::text("ip_address", "ip address:"),
                    Field::text("mac_address", "mac address:"),
                    Field::choice("network", "network:", choices.networks),
                ],
            ),
            Page::new(
                "Ports Settings",
                vec![
                    Field::text("publish", "publish ports:"),
                    Field::text("expose", "expose ports:"),
                    Field::check("publish_all", "publish all:", false),
                ],
            ),
            Page::new(
                "DNS Settings",
                vec![
                    Field::text("dns_servers", "dns servers:"),
                    Field::text("dns_options", "dns options:"),
                    Field::text("dns_search", "search domains:"),
                ],
            ),
            Page::new(
                "Volumes Settings",
                vec![
                    Field::choice("volume", "volume:", choices.volumes),
                    Field::text("volume_dest", "mount point:"),
                    Field::choice_of("image_volume", "image volume:", &IMAGE_VOLUME_CHOICES),
                ],
            ),
        ],
    )
}

fn pod_form(choices: CreateChoices, infra_image: &str) -> Form {
    Form::new(
        "PODMAN POD CREATE",
        vec![
            Page::new(
                "Basic Information",
                vec![
                    Field::text("name", "name:"),
                    Field::check("no_hosts", "no hosts:", false),
                    Field::text("labels", "labels:"),
                ],
            ),
            Page::new(
                "DNS Setup",
                vec![
                    Field::text("dns_servers", "dns servers:"),
                    Field::text("dns_options", "dns options:"),
                    Field::text("dns_search", "search domains:"),
                ],
            ),
            Page::new(
                "Infra Setup",
                vec![
                    Field::check("infra", "infra:", true),
                    Field::text("infra_command", "infra command:"),
                    Field::text_with("infra_image", "infra image:", infra_image),
                ],
            ),
            Page::new(
                "Networking",
                vec![
                    Field::text("hostname", "hostname:"),
                    Field::text("ip_address", "ip address:"),
                    Field::text("mac_address", "mac address:"),
                    Field::text("host_to_ip", "add host:"),
                    Field::choice("network", "network:", choices.networks),
                ],
            ),
        ],
    )
}

fn network_form() -> Form {
    Form::new(
        "PODMAN NETWORK CREATE",
        vec![
            Page::new(
                "Basic Information",
                vec![
                    Field::text("name", "name:"),
                    Field::text("labels", "labels:"),
                    Field::check("internal", "internal:", false),
                    Field::text_with("driver", "driver:", "bridge"),
                    Field::check("ipv6", "ipv6:", false),
                ],
            ),
            Page::new(
                "IP Settings",
                vec![
                    Field::text("subnet", "subnet:"),
                    Field::text("gateway", "gateway:"),
                    Field::text("ip_range", "ip range:"),
                ],
            ),
        ],
    )
}

fn volume_form() -> Form {
    Form::new(
        "PODMAN VOLUME CREATE",
        vec![Page::new(
            "Basic Information",
            vec![
                Field::text("name", "name:"),
                Field::text("labels", "labels:"),
                Field::text_with("driver", "driver:", "local"),
                Field::text("options", "options:"),
            ],
        )],
    )
}

/// Parse space separated `key=value` pairs.
pub fn parse_pairs(field: &str, input: &str) -> Result<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    for item in input.split_whitespace() {
        match item.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                pairs.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(Error::Validation(format!(
                    "invalid {field} entry \"{item}\", expected key=value"
                )))
            }
        }
    }
    Ok(pairs)
}

fn words(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

pub fn build_spec(kind: ResourceKind, form: &Form) -> Result<CreateSpec> {
    match kind {
        ResourceKind::Containers => {
            let image = form.choice("image");
            if image.is_empty() {
                return Err(Error::Validation("container image is required".to_string()));
            }
            let volume = form.choice("volume");
            let dest = form.text("volume_dest");
            let volume = match (volume.is_empty(), dest.is_empty()) {
                (true, true) => String::new(),
                (false, false) => format!("{volume}:{dest}"),
                (false, true) => {
                    return Err(Error::Validation(format!(
                        "volume {volume} needs a mount point"
                    )))
                }
                (true, false) => {
                    return Err(Error::Validation(format!(
                        "mount point {dest} needs a volume"
                    )))
                }
            };
            Ok(CreateSpec::Container(ContainerCreateOptions {
                name: form.text("name"),
                image,
                pod: form.choice("pod"),
                labels: parse_pairs("label", &form.text("labels"))?,
                remove: form.checked("remove"),
                hostname: form.text("hostname"),
                ip_address: form.text("ip_address"),
                mac_address: form.text("mac_address"),
                network: form.choice("network"),
                publish: words(&form.text("publish")),
                expose: words(&form.text("expose")),
                publish_all: form.checked("publish_all"),
                dns_servers: words(&form.text("dns_servers")),
                dns_options: words(&form.text("dns_options")),
                dns_search: words(&form.text("dns_search")),
                volume,
                image_volume: form.choice("image_volume"),
            }))
        }
        ResourceKind::Pods => Ok(CreateSpec::Pod(PodCreateOptions {
            name: form.text("name"),
            no_hosts: form.checked("no_hosts"),
            labels: parse_pairs("label", &form.text("labels"))?,
            dns_servers: words(&form.text("dns_servers")),
            dns_options: words(&form.text("dns_options")),
            dns_search: words(&form.text("dns_search")),
            infra: form.checked("infra"),
            infra_command: words(&form.text("infra_command")),
            infra_image: form.text("infra_image"),
            hostname: form.text("hostname"),
            ip_address: form.text("ip_address"),
            mac_address: form.text("mac_address"),
            host_to_ip: words(&form.text("host_to_ip")),
            network: form.choice("network"),
        })),
        ResourceKind::Networks => Ok(CreateSpec::Network(NetworkCreateOptions {
            name: form.text("name"),
            labels: parse_pairs("label", &form.text("labels"))?,
            driver: form.text("driver"),
            internal: form.checked("internal"),
            ipv6: form.checked("ipv6"),
            subnet: form.text("subnet"),
            gateway: form.text("gateway"),
            ip_range: form.text("ip_range"),
        })),
        ResourceKind::Volumes => Ok(CreateSpec::Volume(VolumeCreateOptions {
            name: form.text("name"),
            labels: parse_pairs("label", &form.text("labels"))?,
            driver: form.text("driver"),
            options: parse_pairs("option", &form.text("options"))?,
        })),
        ResourceKind::Images => Err(Error::Validation("images cannot be created".to_string())),
    }
}
