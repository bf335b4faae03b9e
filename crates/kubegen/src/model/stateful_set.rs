use serde::{Deserialize, Serialize};

use crate::{
    de,
    model::{Annotation, IngressPath},
    resource::{Resource, ResourceKind},
};

/// Configuration options for a StatefulSet.
///
/// The fields currently mirror [`Ingress`](crate::model::Ingress). It is a distinct type so
/// StatefulSet specific options can be added without touching Ingress documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatefulSet {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    #[serde(deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub class: String,

    #[serde(
        rename = "ingressPaths",
        deserialize_with = "de::sequence",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub paths: Vec<IngressPath>,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Resource for StatefulSet {
    const KIND: ResourceKind = ResourceKind::StatefulSet;

    fn name(&self) -> &str {
        &self.name
    }
}
