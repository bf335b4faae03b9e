//! A configuration model describing Kubernetes workloads (Deployments, Services, Ingresses and
//! StatefulSets) which are rendered into manifests by templates.
//!
//! The typical flow is:
//!
//! 1. [Load](loader) a [`Config`](model::Config) from one or more YAML/JSON documents.
//! 2. [Validate](validation::validate) it, which reports every problem at once.
//! 3. Hand the [`ResourceMeta`](resource::ResourceMeta) of every resource to a template
//!    renderer, see [`Config::metadata`](model::Config::metadata).
//!
//! ```
//! use kubegen::{
//!     loader::{self, Format},
//!     resource::ManifestPaths,
//!     validation::ValidationOptions,
//! };
//!
//! let config = loader::from_str(
//!     "services: [{name: web, port: 80, targetPort: 8080, type: ClusterIP}]",
//!     Format::Yaml,
//! )
//! .unwrap();
//! config.validate(&ValidationOptions::default()).unwrap();
//!
//! let metadata = config.metadata(&ManifestPaths::default());
//! assert_eq!(metadata[0].name, "web");
//! assert_eq!(metadata[0].manifest_path.to_str(), Some("manifests/web-service.yaml"));
//! ```

mod de;

pub mod kvp;
pub mod loader;
pub mod logging;
pub mod model;
pub mod port;
pub mod resource;
pub mod validation;

// External re-exports
pub use kubegen_shared as shared;
pub use serde_json;
