use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    de,
    kvp::{Key, LabelError, LabelValue, parse_label},
    resource::{Resource, ResourceKind},
};

/// The largest replica count Kubernetes accepts, `spec.replicas` is an `int32`.
pub const MAX_REPLICAS: u32 = i32::MAX.unsigned_abs();

/// Configuration options for a Deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    /// The replica count as written in the source document. It is validated, not parsed, on
    /// load. Use [`Deployment::replica_count`] to interpret it.
    #[serde(deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub replicas: String,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Deployment {
    /// Returns the parsed replica count, `None` if unset or not an integer between 0 and
    /// [`MAX_REPLICAS`].
    pub fn replica_count(&self) -> Option<u32> {
        self.replicas
            .trim()
            .parse()
            .ok()
            .filter(|count| *count <= MAX_REPLICAS)
    }
}

impl Resource for Deployment {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn name(&self) -> &str {
        &self.name
    }

    /// Next to the common entries, templates get the parsed labels as a `labelMap` mapping.
    /// Labels which fail to parse are left out of it.
    fn template_context(&self) -> BTreeMap<String, Value> {
        let mut context = self.common_context();

        let label_map = self
            .labels
            .iter()
            .filter_map(|label| match label.parse() {
                Ok((key, value)) => Some((key.to_string(), Value::from(value.to_string()))),
                Err(error) => {
                    tracing::debug!(
                        deployment = %self.name,
                        error = &error as &dyn std::error::Error,
                        "leaving unparsable label out of template context"
                    );
                    None
                }
            })
            .collect::<serde_json::Map<_, _>>();
        context.insert("labelMap".to_owned(), Value::Object(label_map));

        context
    }
}

/// Configuration options for a container of a Deployment's Pod template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Container {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    /// The image reference, the only field a container cannot do without.
    #[serde(deserialize_with = "de::text")]
    pub image: String,

    /// Name of a Secret whose keys are exposed as environment variables.
    #[serde(
        deserialize_with = "de::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub env_secret: Option<String>,

    #[serde(deserialize_with = "de::sequence", skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvVar>,

    /// Carried through to templates verbatim, it has no meaning in this crate.
    #[serde(
        deserialize_with = "de::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub container: Option<String>,

    /// The container port as written in the source document.
    #[serde(deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub port: String,

    #[serde(
        deserialize_with = "de::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub command: Option<String>,

    #[serde(
        rename = "arg",
        deserialize_with = "de::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub args: Option<String>,

    /// Name of a ConfigMap mounted into or referenced by the container.
    #[serde(
        rename = "configmap",
        deserialize_with = "de::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub config_map: Option<String>,
}

/// An environment variable of a [`Container`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    #[serde(deserialize_with = "de::text")]
    pub name: String,

    #[serde(deserialize_with = "de::text")]
    pub value: String,
}

/// A label in its `key=value` source form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    #[serde(deserialize_with = "de::text")]
    pub label: String,
}

impl Label {
    /// Splits the label into a validated key and value.
    pub fn parse(&self) -> Result<(Key, LabelValue), LabelError> {
        parse_label(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("3", Some(3))]
    #[case(" 0 ", Some(0))]
    #[case("", None)]
    #[case("2147483647", Some(MAX_REPLICAS))]
    #[case("2147483648", None)]
    #[case("5000000000", None)]
    #[case("-1", None)]
    #[case("abc", None)]
    fn replica_count(#[case] replicas: &str, #[case] expected: Option<u32>) {
        let deployment = Deployment {
            replicas: replicas.to_owned(),
            ..Deployment::default()
        };
        assert_eq!(deployment.replica_count(), expected);
    }

    #[test]
    fn container_field_names() {
        let container: Container = serde_yaml::from_str(indoc! {"
            name: api
            image: registry.example.com/api:1.2.3
            envSecret: api-secrets
            envVars:
              - name: RUST_LOG
                value: info
            container: sidecar
            port: 8080
            command: /bin/api
            arg: --serve
            configmap: api-config
        "})
        .expect("test YAML is valid");

        assert_eq!(
            container,
            Container {
                name: "api".into(),
                image: "registry.example.com/api:1.2.3".into(),
                env_secret: Some("api-secrets".into()),
                env_vars: vec![EnvVar {
                    name: "RUST_LOG".into(),
                    value: "info".into(),
                }],
                container: Some("sidecar".into()),
                port: "8080".into(),
                command: Some("/bin/api".into()),
                args: Some("--serve".into()),
                config_map: Some("api-config".into()),
            }
        );
    }

    #[test]
    fn template_context_contains_label_map() {
        let deployment = Deployment {
            name: "api".into(),
            labels: vec![
                Label {
                    label: "app=api".into(),
                },
                Label {
                    label: "broken".into(),
                },
            ],
            ..Deployment::default()
        };

        let context = deployment.template_context();

        assert_eq!(context["kind"], "deployment");
        assert_eq!(context["name"], "api");
        assert_eq!(context["deployment"]["name"], "api");
        assert_eq!(context["labelMap"], serde_json::json!({ "app": "api" }));
    }
}
