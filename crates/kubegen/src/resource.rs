//! The contract between the configuration model and a template renderer.
//!
//! Every resource kind implements [`Resource`], which produces a [`ResourceMeta`]: the
//! resource name, the context handed to the template, the template to render and the path the
//! rendered manifest is written to. [`ResourceRef`] allows iterating over resources of
//! different kinds uniformly, see [`Config::resources`](crate::model::Config::resources).
use std::{collections::BTreeMap, path::PathBuf};

use serde::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::model::{Deployment, Ingress, Service, StatefulSet};

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_MANIFEST_DIR: &str = "manifests";
const FILE_EXTENSION: &str = "yaml";

/// The kinds of resources a configuration can describe.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Deployment,
    Service,
    Ingress,
    StatefulSet,
}

/// Metadata required to render the manifest of a single resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Always equal to the name of the resource.
    pub name: String,

    /// The context the template is rendered with.
    pub config: BTreeMap<String, Value>,

    pub template_path: PathBuf,
    pub manifest_path: PathBuf,
}

/// Directories templates are read from and manifests are written to.
///
/// This can be embedded into a clap based CLI:
///
/// ```
/// use clap::Parser;
/// use kubegen::resource::ManifestPaths;
///
/// #[derive(Parser)]
/// struct Opts {
///     #[command(flatten)]
///     paths: ManifestPaths,
/// }
///
/// let opts = Opts::parse_from(["kubegen", "--manifest-dir", "out"]);
/// assert_eq!(opts.paths.manifest_dir.to_str(), Some("out"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct ManifestPaths {
    /// Directory containing one template per resource kind, e.g. `deployment.yaml`.
    #[arg(long, env = "KUBEGEN_TEMPLATE_DIR", default_value = DEFAULT_TEMPLATE_DIR)]
    pub template_dir: PathBuf,

    /// Directory rendered manifests are written to.
    #[arg(long, env = "KUBEGEN_MANIFEST_DIR", default_value = DEFAULT_MANIFEST_DIR)]
    pub manifest_dir: PathBuf,
}

impl Default for ManifestPaths {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            manifest_dir: PathBuf::from(DEFAULT_MANIFEST_DIR),
        }
    }
}

impl ManifestPaths {
    /// Returns `<template_dir>/<kind>.yaml`.
    pub fn template_path(&self, kind: ResourceKind) -> PathBuf {
        self.template_dir.join(format!("{kind}.{FILE_EXTENSION}"))
    }

    /// Returns `<manifest_dir>/<name>-<kind>.yaml`.
    ///
    /// Path separators in `name` are replaced by `_`, so the manifest always lands directly in
    /// `manifest_dir`. Names of a [validated](crate::validation::validate) configuration never
    /// contain any.
    pub fn manifest_path(&self, kind: ResourceKind, name: &str) -> PathBuf {
        let file_name = name.replace(['/', '\\'], "_");
        self.manifest_dir
            .join(format!("{file_name}-{kind}.{FILE_EXTENSION}"))
    }
}

/// A common set of actions performed on resource types.
pub trait Resource: Serialize {
    const KIND: ResourceKind;

    fn name(&self) -> &str;

    /// The entries every template context contains: `kind`, `name` and the whole resource
    /// under the kind name (e.g. `service`).
    fn common_context(&self) -> BTreeMap<String, Value> {
        let resource = serde_json::to_value(self).unwrap_or_else(|error| {
            tracing::error!(
                kind = %Self::KIND,
                name = self.name(),
                error = &error as &dyn std::error::Error,
                "failed to serialize resource into template context"
            );
            Value::Null
        });

        BTreeMap::from([
            ("kind".to_owned(), Value::from(Self::KIND.to_string())),
            ("name".to_owned(), Value::from(self.name())),
            (Self::KIND.to_string(), resource),
        ])
    }

    fn template_context(&self) -> BTreeMap<String, Value> {
        self.common_context()
    }

    fn metadata_with(&self, paths: &ManifestPaths) -> ResourceMeta {
        ResourceMeta {
            name: self.name().to_owned(),
            config: self.template_context(),
            template_path: paths.template_path(Self::KIND),
            manifest_path: paths.manifest_path(Self::KIND, self.name()),
        }
    }

    /// Like [`Resource::metadata_with`], using the [default](ManifestPaths::default) paths.
    fn metadata(&self) -> ResourceMeta {
        self.metadata_with(&ManifestPaths::default())
    }
}

/// A borrowed resource of any kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceRef<'a> {
    Deployment(&'a Deployment),
    Service(&'a Service),
    Ingress(&'a Ingress),
    StatefulSet(&'a StatefulSet),
}

impl ResourceRef<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Deployment(_) => ResourceKind::Deployment,
            Self::Service(_) => ResourceKind::Service,
            Self::Ingress(_) => ResourceKind::Ingress,
            Self::StatefulSet(_) => ResourceKind::StatefulSet,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Deployment(deployment) => deployment.name(),
            Self::Service(service) => service.name(),
            Self::Ingress(ingress) => ingress.name(),
            Self::StatefulSet(stateful_set) => stateful_set.name(),
        }
    }

    pub fn metadata_with(&self, paths: &ManifestPaths) -> ResourceMeta {
        match self {
            Self::Deployment(deployment) => deployment.metadata_with(paths),
            Self::Service(service) => service.metadata_with(paths),
            Self::Ingress(ingress) => ingress.metadata_with(paths),
            Self::StatefulSet(stateful_set) => stateful_set.metadata_with(paths),
        }
    }

    pub fn metadata(&self) -> ResourceMeta {
        self.metadata_with(&ManifestPaths::default())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ResourceKind::Deployment, "deployment")]
    #[case(ResourceKind::Service, "service")]
    #[case(ResourceKind::Ingress, "ingress")]
    #[case(ResourceKind::StatefulSet, "statefulset")]
    fn kind_names(#[case] kind: ResourceKind, #[case] name: &str) {
        assert_eq!(kind.to_string(), name);
        assert_eq!(name.parse::<ResourceKind>(), Ok(kind));
    }

    #[test]
    fn service_metadata() {
        let service = Service {
            name: "web".into(),
            port: 80,
            target_port: 8080,
            service_type: "ClusterIP".into(),
        };

        let meta = service.metadata();

        assert_eq!(meta.name, "web");
        assert_eq!(meta.template_path, Path::new("templates/service.yaml"));
        assert_eq!(meta.manifest_path, Path::new("manifests/web-service.yaml"));
        assert_eq!(meta.config["kind"], "service");
        assert_eq!(
            meta.config["service"],
            serde_json::json!({
                "name": "web",
                "port": 80,
                "targetPort": 8080,
                "type": "ClusterIP",
            })
        );
    }

    #[test]
    fn metadata_with_custom_paths() {
        let paths = ManifestPaths {
            template_dir: "/etc/kubegen/templates".into(),
            manifest_dir: "out".into(),
        };
        let stateful_set = StatefulSet {
            name: "db".into(),
            ..StatefulSet::default()
        };

        let meta = ResourceRef::StatefulSet(&stateful_set).metadata_with(&paths);

        assert_eq!(meta.name, "db");
        assert_eq!(
            meta.template_path,
            Path::new("/etc/kubegen/templates/statefulset.yaml")
        );
        assert_eq!(meta.manifest_path, Path::new("out/db-statefulset.yaml"));
    }

    #[rstest]
    #[case("../x", ".._x-deployment.yaml")]
    #[case("/etc/passwd", "_etc_passwd-deployment.yaml")]
    #[case("a\\..\\b", "a_.._b-deployment.yaml")]
    #[case("web", "web-deployment.yaml")]
    fn manifest_path_stays_in_manifest_dir(#[case] name: &str, #[case] file_name: &str) {
        let paths = ManifestPaths::default();

        let path = paths.manifest_path(ResourceKind::Deployment, name);

        assert_eq!(path, Path::new(DEFAULT_MANIFEST_DIR).join(file_name));
        assert_eq!(path.parent(), Some(Path::new(DEFAULT_MANIFEST_DIR)));
    }

    #[derive(Parser)]
    struct Opts {
        #[command(flatten)]
        paths: ManifestPaths,
    }

    #[test]
    fn manifest_paths_from_arguments() {
        let opts = Opts::parse_from([
            "kubegen",
            "--template-dir",
            "tpl",
            "--manifest-dir",
            "out",
        ]);

        assert_eq!(
            opts.paths,
            ManifestPaths {
                template_dir: "tpl".into(),
                manifest_dir: "out".into(),
            }
        );
    }
}
