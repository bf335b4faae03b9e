//! The configuration model.
//!
//! A [`Config`] is decoded once by the [loader](crate::loader) and treated as read-only
//! afterwards. All sequences keep the order of the source document, which in turn decides the
//! order in which manifests are produced.
use serde::{Deserialize, Serialize};

use crate::{
    de,
    resource::{ManifestPaths, ResourceMeta, ResourceRef},
};

mod deployment;
mod ingress;
mod service;
mod stateful_set;

pub use deployment::*;
pub use ingress::*;
pub use service::*;
pub use stateful_set::*;

/// The root of a configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub deployments: Vec<Deployment>,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub ingresses: Vec<Ingress>,

    #[serde(
        rename = "statefulsets",
        deserialize_with = "de::sequence",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub stateful_sets: Vec<StatefulSet>,
}

impl Config {
    /// Iterates over all resources: deployments, services, ingresses and stateful sets, each
    /// group in source order.
    pub fn resources(&self) -> impl Iterator<Item = ResourceRef<'_>> {
        let deployments = self.deployments.iter().map(ResourceRef::Deployment);
        let services = self.services.iter().map(ResourceRef::Service);
        let ingresses = self.ingresses.iter().map(ResourceRef::Ingress);
        let stateful_sets = self.stateful_sets.iter().map(ResourceRef::StatefulSet);

        deployments
            .chain(services)
            .chain(ingresses)
            .chain(stateful_sets)
    }

    /// Collects the [`ResourceMeta`] of every resource, in [`Config::resources`] order.
    pub fn metadata(&self, paths: &ManifestPaths) -> Vec<ResourceMeta> {
        self.resources()
            .map(|resource| resource.metadata_with(paths))
            .collect()
    }

    /// Looks up a Service by name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
            && self.services.is_empty()
            && self.ingresses.is_empty()
            && self.stateful_sets.is_empty()
    }
}
