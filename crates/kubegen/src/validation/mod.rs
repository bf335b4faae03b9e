//! Validation of a decoded [`Config`].
//!
//! Decoding is deliberately permissive: text fields keep whatever the document contained and
//! cross references are not resolved. [`validate`] checks everything a renderer relies on and
//! reports *all* problems at once, each with the location of the offending field. A [`Config`]
//! that fails validation should not be rendered at all, since a partial set of manifests can
//! leave a cluster in an inconsistent state.
use std::{collections::BTreeMap, fmt::Display};

use snafu::Snafu;
use strum::IntoEnumIterator;

use crate::{
    kvp::{KeyError, LabelError},
    model::{
        Annotation, Config, Container, Deployment, IngressPath, MAX_REPLICAS, Service, ServiceType,
    },
    port::{self, PortError},
    resource::ResourceKind,
};

mod names;

pub use names::*;

/// A collection of errors discovered during validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Errors<E = Error>(Vec<E>);

impl<E> Errors<E> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<E> {
        self.0
    }
}

impl<E: Display> Display for Errors<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{error}")?;
        }
        Ok(())
    }
}

impl<E: std::error::Error> std::error::Error for Errors<E> {}

/// A single problem found in a [`Config`].
///
/// Every variant carries the `location` of the field in the source document, for example
/// `deployments[0].containers[1].image`.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("{location}: field must not be empty"))]
    MissingField { location: String },

    #[snafu(display("{location}: invalid name {name:?}: {source}"))]
    InvalidName {
        source: Errors<NameError>,
        location: String,
        name: String,
    },

    #[snafu(display("{location}: {kind} name {name:?} is already used by {first}"))]
    DuplicateName {
        location: String,
        kind: ResourceKind,
        name: String,
        first: String,
    },

    #[snafu(display(
        "{location}: replica count {replicas:?} is not an integer between 0 and {}",
        MAX_REPLICAS
    ))]
    InvalidReplicas { location: String, replicas: String },

    #[snafu(display("{location}: {source}"))]
    InvalidPort {
        source: PortError,
        location: String,
    },

    #[snafu(display(
        "{location}: service type {service_type:?} is not supported, expected one of {supported:?}"
    ))]
    UnsupportedServiceType {
        location: String,
        service_type: String,
        supported: Vec<String>,
    },

    #[snafu(display("{location}: service {service:?} is not defined"))]
    UnknownService { location: String, service: String },

    #[snafu(display("{location}: {source}"))]
    InvalidLabel {
        source: LabelError,
        location: String,
    },

    #[snafu(display("{location}: invalid annotation name {name:?}: {source}"))]
    InvalidAnnotation {
        source: KeyError,
        location: String,
        name: String,
    },
}

/// Tunables of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Service types accepted in `services[].type`. Defaults to the types known to Kubernetes.
    pub service_types: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            service_types: ServiceType::iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Validates `config`, returning every problem found.
///
/// ```
/// use kubegen::{
///     model::{Config, Service},
///     validation::{self, ValidationOptions},
/// };
///
/// let config = Config {
///     services: vec![Service {
///         name: "web".into(),
///         port: 80,
///         target_port: 0,
///         service_type: "ClusterIP".into(),
///     }],
///     ..Config::default()
/// };
///
/// let errors = validation::validate(&config, &ValidationOptions::default()).unwrap_err();
/// assert_eq!(
///     errors.to_string(),
///     "services[0].targetPort: port 0 is out of range - expected a value between 1 and 65535"
/// );
/// ```
pub fn validate(config: &Config, options: &ValidationOptions) -> Result<(), Errors> {
    let mut errors = Vec::new();

    for (index, deployment) in config.deployments.iter().enumerate() {
        validate_deployment(&format!("deployments[{index}]"), deployment, &mut errors);
    }
    check_unique(
        ResourceKind::Deployment,
        "deployments",
        config.deployments.iter().map(|d| d.name.as_str()),
        &mut errors,
    );

    for (index, service) in config.services.iter().enumerate() {
        validate_service(
            &format!("services[{index}]"),
            service,
            options,
            &mut errors,
        );
    }
    check_unique(
        ResourceKind::Service,
        "services",
        config.services.iter().map(|s| s.name.as_str()),
        &mut errors,
    );

    for (index, ingress) in config.ingresses.iter().enumerate() {
        validate_routes(
            &format!("ingresses[{index}]"),
            &ingress.name,
            &ingress.paths,
            &ingress.annotations,
            config,
            &mut errors,
        );
    }
    check_unique(
        ResourceKind::Ingress,
        "ingresses",
        config.ingresses.iter().map(|i| i.name.as_str()),
        &mut errors,
    );

    for (index, stateful_set) in config.stateful_sets.iter().enumerate() {
        validate_routes(
            &format!("statefulsets[{index}]"),
            &stateful_set.name,
            &stateful_set.paths,
            &stateful_set.annotations,
            config,
            &mut errors,
        );
    }
    check_unique(
        ResourceKind::StatefulSet,
        "statefulsets",
        config.stateful_sets.iter().map(|s| s.name.as_str()),
        &mut errors,
    );

    if errors.is_empty() {
        tracing::debug!("configuration is valid");
        Ok(())
    } else {
        tracing::warn!(error.count = errors.len(), "configuration is invalid");
        Err(Errors(errors))
    }
}

fn validate_name(
    location: String,
    name: &str,
    rule: fn(&str) -> Result<(), Errors<NameError>>,
    errors: &mut Vec<Error>,
) {
    if name.is_empty() {
        errors.push(Error::MissingField { location });
    } else if let Err(source) = rule(name) {
        errors.push(Error::InvalidName {
            source,
            location,
            name: name.to_owned(),
        });
    }
}

fn validate_deployment(location: &str, deployment: &Deployment, errors: &mut Vec<Error>) {
    validate_name(
        format!("{location}.name"),
        &deployment.name,
        is_rfc_1123_subdomain,
        errors,
    );

    if !deployment.replicas.trim().is_empty() && deployment.replica_count().is_none() {
        errors.push(Error::InvalidReplicas {
            location: format!("{location}.replicas"),
            replicas: deployment.replicas.clone(),
        });
    }

    for (index, container) in deployment.containers.iter().enumerate() {
        validate_container(&format!("{location}.containers[{index}]"), container, errors);
    }

    for (index, label) in deployment.labels.iter().enumerate() {
        if let Err(source) = label.parse() {
            errors.push(Error::InvalidLabel {
                source,
                location: format!("{location}.labels[{index}].label"),
            });
        }
    }
}

fn validate_container(location: &str, container: &Container, errors: &mut Vec<Error>) {
    if !container.name.is_empty() {
        validate_name(
            format!("{location}.name"),
            &container.name,
            is_rfc_1123_label,
            errors,
        );
    }

    if container.image.trim().is_empty() {
        errors.push(Error::MissingField {
            location: format!("{location}.image"),
        });
    }

    if !container.port.trim().is_empty() {
        if let Err(source) = port::parse_port(&container.port) {
            errors.push(Error::InvalidPort {
                source,
                location: format!("{location}.port"),
            });
        }
    }

    for (index, env_var) in container.env_vars.iter().enumerate() {
        if env_var.name.trim().is_empty() {
            errors.push(Error::MissingField {
                location: format!("{location}.envVars[{index}].name"),
            });
        }
    }
}

fn validate_service(
    location: &str,
    service: &Service,
    options: &ValidationOptions,
    errors: &mut Vec<Error>,
) {
    validate_name(
        format!("{location}.name"),
        &service.name,
        is_rfc_1035_label,
        errors,
    );

    for (field, value) in [("port", service.port), ("targetPort", service.target_port)] {
        if let Err(source) = port::check_port(value) {
            errors.push(Error::InvalidPort {
                source,
                location: format!("{location}.{field}"),
            });
        }
    }

    if !service.service_type.is_empty()
        && !options
            .service_types
            .iter()
            .any(|supported| supported == &service.service_type)
    {
        errors.push(Error::UnsupportedServiceType {
            location: format!("{location}.type"),
            service_type: service.service_type.clone(),
            supported: options.service_types.clone(),
        });
    }
}

/// Shared by Ingresses and StatefulSets, which have the same shape.
fn validate_routes(
    location: &str,
    name: &str,
    paths: &[IngressPath],
    annotations: &[Annotation],
    config: &Config,
    errors: &mut Vec<Error>,
) {
    validate_name(
        format!("{location}.name"),
        name,
        is_rfc_1123_subdomain,
        errors,
    );

    for (index, path) in paths.iter().enumerate() {
        let location = format!("{location}.ingressPaths[{index}]");

        if path.path.trim().is_empty() {
            errors.push(Error::MissingField {
                location: format!("{location}.path"),
            });
        }

        if path.service.is_empty() {
            errors.push(Error::MissingField {
                location: format!("{location}.service"),
            });
        } else if config.service(&path.service).is_none() {
            errors.push(Error::UnknownService {
                location: format!("{location}.service"),
                service: path.service.clone(),
            });
        }

        if let Err(source) = path.port_ref() {
            errors.push(Error::InvalidPort {
                source,
                location: format!("{location}.port"),
            });
        }
    }

    for (index, annotation) in annotations.iter().enumerate() {
        if let Err(source) = annotation.key() {
            errors.push(Error::InvalidAnnotation {
                source,
                location: format!("{location}.annotations[{index}].name"),
                name: annotation.name.clone(),
            });
        }
    }
}

/// Reports every name that was already used by an earlier resource of the same kind. Empty
/// names are reported as missing elsewhere.
fn check_unique<'a>(
    kind: ResourceKind,
    section: &str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<Error>,
) {
    let mut seen = BTreeMap::new();

    for (index, name) in names.enumerate() {
        if name.is_empty() {
            continue;
        }

        if let Some(first) = seen.get(name) {
            errors.push(Error::DuplicateName {
                location: format!("{section}[{index}].name"),
                kind,
                name: name.to_owned(),
                first: format!("{section}[{first}]"),
            });
        } else {
            seen.insert(name, index);
        }
    }
}

impl Config {
    /// See [`validate`].
    pub fn validate(&self, options: &ValidationOptions) -> Result<(), Errors> {
        validate(self, options)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    fn decode(input: &str) -> Config {
        serde_yaml::from_str(input).expect("test YAML is valid")
    }

    fn locations(config: &Config) -> Vec<String> {
        match config.validate(&ValidationOptions::default()) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .into_inner()
                .into_iter()
                .map(|error| match error {
                    Error::MissingField { location }
                    | Error::InvalidName { location, .. }
                    | Error::DuplicateName { location, .. }
                    | Error::InvalidReplicas { location, .. }
                    | Error::InvalidPort { location, .. }
                    | Error::UnsupportedServiceType { location, .. }
                    | Error::UnknownService { location, .. }
                    | Error::InvalidLabel { location, .. }
                    | Error::InvalidAnnotation { location, .. } => location,
                })
                .collect(),
        }
    }

    #[test]
    fn valid_config() {
        let config = decode(indoc! {"
            deployments:
              - name: web
                replicas: 2
                containers:
                  - name: web
                    image: nginx:1.27
                    port: 80
                    envVars:
                      - name: MODE
                        value: production
                labels:
                  - label: app=web
            services:
              - name: web
                port: 80
                targetPort: 8080
                type: ClusterIP
              - name: internal
                port: 9090
                targetPort: 9090
            ingresses:
              - name: public
                class: nginx
                ingressPaths:
                  - path: /
                    service: web
                    port: http
                annotations:
                  - name: nginx.ingress.kubernetes.io/ssl-redirect
            statefulsets:
              - name: db
                ingressPaths:
                  - path: /db
                    service: internal
                    port: 9090
        "});

        assert_eq!(config.validate(&ValidationOptions::default()), Ok(()));
    }

    #[test]
    fn non_numeric_replicas() {
        let config = decode(indoc! {"
            deployments:
              - name: web
                replicas: abc
                containers:
                  - image: nginx
        "});

        let errors = config
            .validate(&ValidationOptions::default())
            .expect_err("config is invalid");

        assert_eq!(
            errors.into_inner(),
            [Error::InvalidReplicas {
                location: "deployments[0].replicas".into(),
                replicas: "abc".into(),
            }]
        );
    }

    #[test]
    fn replicas_above_kubernetes_limit() {
        let config = Config {
            deployments: vec![Deployment {
                name: "web".into(),
                replicas: "5000000000".into(),
                containers: vec![Container {
                    image: "nginx".into(),
                    ..Container::default()
                }],
                ..Deployment::default()
            }],
            ..Config::default()
        };

        let errors = config
            .validate(&ValidationOptions::default())
            .expect_err("config is invalid");

        assert_eq!(
            errors.to_string(),
            r#"deployments[0].replicas: replica count "5000000000" is not an integer between 0 and 2147483647"#
        );
    }

    #[test]
    fn unknown_service_reference() {
        let config = decode(indoc! {"
            ingresses:
              - name: public
                ingressPaths:
                  - path: /
                    service: web
                    port: 80
        "});

        let errors = config
            .validate(&ValidationOptions::default())
            .expect_err("config is invalid");

        assert_eq!(
            errors.into_inner(),
            [Error::UnknownService {
                location: "ingresses[0].ingressPaths[0].service".into(),
                service: "web".into(),
            }]
        );
    }

    #[test]
    fn all_errors_are_reported() {
        let config = decode(indoc! {"
            deployments:
              - name: Web
                replicas: -1
                containers:
                  - name: app
                    port: 0
                    envVars:
                      - value: orphan
                labels:
                  - label: no-separator
              - name: worker
              - name: worker
            services:
              - name: web
                port: 70000
                targetPort: 80
                type: Headless
            statefulsets:
              - name: ''
                ingressPaths:
                  - service: ''
                    port: ''
                annotations:
                  - name: a/b/c
        "});

        assert_eq!(
            locations(&config),
            [
                "deployments[0].name",
                "deployments[0].replicas",
                "deployments[0].containers[0].image",
                "deployments[0].containers[0].port",
                "deployments[0].containers[0].envVars[0].name",
                "deployments[0].labels[0].label",
                "deployments[2].name",
                "services[0].port",
                "services[0].type",
                "statefulsets[0].name",
                "statefulsets[0].ingressPaths[0].path",
                "statefulsets[0].ingressPaths[0].service",
                "statefulsets[0].ingressPaths[0].port",
                "statefulsets[0].annotations[0].name",
            ]
        );
    }

    #[test]
    fn duplicate_names_are_scoped_per_kind() {
        let config = decode(indoc! {"
            deployments:
              - name: web
                containers:
                  - image: nginx
            services:
              - name: web
                port: 80
                targetPort: 80
              - name: web
                port: 81
                targetPort: 81
        "});

        let errors = config
            .validate(&ValidationOptions::default())
            .expect_err("config is invalid");

        assert_eq!(
            errors.to_string(),
            r#"services[1].name: service name "web" is already used by services[0]"#
        );
    }

    #[rstest]
    #[case("ClusterIP", true)]
    #[case("", true)]
    #[case("Internal", false)]
    fn custom_service_types(#[case] service_type: &str, #[case] valid: bool) {
        let config = Config {
            services: vec![Service {
                name: "web".into(),
                port: 80,
                target_port: 80,
                service_type: service_type.into(),
            }],
            ..Config::default()
        };
        let options = ValidationOptions {
            service_types: vec!["ClusterIP".into()],
        };

        assert_eq!(config.validate(&options).is_ok(), valid);
    }
}
