use serde::{Deserialize, Serialize};

use crate::{
    de,
    kvp::{Key, KeyError},
    port::{PortError, PortRef},
    resource::{Resource, ResourceKind},
};

/// Configuration options for an Ingress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingress {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    /// The name of the IngressClass handling this Ingress.
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

impl Resource for Ingress {
    const KIND: ResourceKind = ResourceKind::Ingress;

    fn name(&self) -> &str {
        &self.name
    }
}

/// A single HTTP path routed to a Service backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressPath {
    #[serde(deserialize_with = "de::text")]
    pub path: String,

    /// Name of the backend Service, expected to exist in the same configuration.
    #[serde(deserialize_with = "de::text")]
    pub service: String,

    /// Backend port, a number or the name of a Service port.
    #[serde(deserialize_with = "de::text")]
    pub port: String,
}

impl IngressPath {
    pub fn port_ref(&self) -> Result<PortRef, PortError> {
        self.port.parse()
    }
}

/// The name of an annotation. Annotation values are provided by the templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    #[serde(deserialize_with = "de::text")]
    pub name: String,
}

impl Annotation {
    pub fn key(&self) -> Result<Key, KeyError> {
        self.name.parse()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn decode_ingress() {
        let ingress: Ingress = serde_yaml::from_str(indoc! {"
            name: public
            class: nginx
            ingressPaths:
              - path: /api
                service: api
                port: 8080
              - path: /
                service: web
                port: http
            annotations:
              - name: nginx.ingress.kubernetes.io/rewrite-target
        "})
        .expect("test YAML is valid");

        assert_eq!(ingress.class, "nginx");
        assert_eq!(
            ingress
                .paths
                .iter()
                .map(IngressPath::port_ref)
                .collect::<Result<Vec<_>, _>>(),
            Ok(vec![PortRef::Number(8080), PortRef::Named("http".into())])
        );
        assert_eq!(
            ingress.annotations[0].key().map(|key| key.to_string()),
            Ok("nginx.ingress.kubernetes.io/rewrite-target".to_owned())
        );
    }
}
