use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_IMAGE_REPOSITORY, DEFAULT_STORAGE_CLASS};

/// Describes how a Rainbond cluster is installed.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "rainbond.io",
    version = "v1alpha1",
    kind = "RainbondCluster",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct RainbondClusterSpec {
    /// Name of the storage class used for the volumes of the Rainbond components.
    /// Falls back to the operator default if unset or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,

    /// The image hub Rainbond pulls component images from. Falls back to
    /// `goodrain.me` if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hub: Option<ImageHub>,

    /// Candidate nodes for `rbd-gateway`.
    #[serde(default)]
    pub nodes_for_gateway: Vec<K8sNode>,
}

/// An image registry together with the namespace (project) inside it.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHub {
    pub domain: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl ImageHub {
    /// Returns `domain/namespace` joined like a slash separated path: empty
    /// elements are skipped, and the result is normalized (surplus slashes,
    /// `.` and `..` are resolved, a leading `/` is kept).
    pub fn repository(&self) -> String {
        let joined = [self.domain.as_str(), self.namespace.as_str()]
            .into_iter()
            .filter(|element| !element.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        if joined.is_empty() {
            joined
        } else {
            clean_path(&joined)
        }
    }
}

/// Lexically normalizes a slash separated path.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` can not go above the root
                _ if rooted => {}
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }

    let cleaned = segments.join("/");
    match (rooted, cleaned.is_empty()) {
        (true, _) => format!("/{cleaned}"),
        (false, true) => ".".to_owned(),
        (false, false) => cleaned,
    }
}

/// A Kubernetes node as seen by the operator.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Hash, Serialize)]
pub struct K8sNode {
    pub name: String,

    #[serde(rename = "internalIP")]
    pub internal_ip: String,

    #[serde(rename = "externalIP", default)]
    pub external_ip: String,
}

impl K8sNode {
    pub fn new(name: impl Into<String>, internal_ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal_ip: internal_ip.into(),
            external_ip: String::new(),
        }
    }
}

impl RainbondCluster {
    /// Returns the storage class name configured for this cluster, or
    /// [`DEFAULT_STORAGE_CLASS`] if none is set.
    pub fn storage_class(&self) -> &str {
        self.spec
            .storage_class_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_STORAGE_CLASS)
    }

    /// Returns the image repository (`domain/namespace`) of the configured
    /// image hub, or [`DEFAULT_IMAGE_REPOSITORY`] if none is configured.
    pub fn image_repository(&self) -> String {
        match &self.spec.image_hub {
            Some(image_hub) => image_hub.repository(),
            None => DEFAULT_IMAGE_REPOSITORY.to_owned(),
        }
    }
}
