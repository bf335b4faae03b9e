use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
    de,
    resource::{Resource, ResourceKind},
};

/// Configuration options for a Service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    #[serde(deserialize_with = "de::integer")]
    pub port: i64,

    #[serde(deserialize_with = "de::integer")]
    pub target_port: i64,

    /// The Service type. Which types are accepted is decided during validation, an empty type
    /// leaves the choice to the cluster.
    #[serde(
        rename = "type",
        deserialize_with = "de::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub service_type: String,
}

impl Resource for Service {
    const KIND: ResourceKind = ResourceKind::Service;

    fn name(&self) -> &str {
        &self.name
    }
}

/// The Service types known to Kubernetes.
///
/// See <https://kubernetes.io/docs/concepts/services-networking/service/#publishing-services-service-types>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
}
