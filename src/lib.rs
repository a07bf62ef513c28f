//! Template-driven code generation from Swagger / OpenAPI 2.0 descriptions.
//!
//! A [`Generator`] renders two kinds of template jobs:
//!
//! * per-definition jobs, rendered once for every schema under `definitions`;
//! * per-path jobs, rendered once for every group of operations sharing the
//!   value of a configurable `group_by` field.
//!
//! ```
//! use swaggen::{
//!     CodegenConfig, Generator, JinjaEngine, JobOptions, MemoryTemplateLoader, SwaggerModel,
//! };
//!
//! let model = SwaggerModel::from_yaml_str(r#"
//! paths:
//!   /pets:
//!     x-group: pets
//!     get:
//!       operationId: listPets
//! "#).unwrap();
//! let loader = MemoryTemplateLoader::new()
//!     .with_template("routes.j2", "{% for op in members %}{{ op.operationId }}{% endfor %}");
//! let config = CodegenConfig::new()
//!     .per_path("routes.j2", JobOptions::new("out").group_by("x-group"));
//!
//! let files = Generator::new(JinjaEngine::new(), loader)
//!     .render_to_memory(&model, &config)
//!     .unwrap();
//! assert_eq!(files.get("out/pets.js"), Some("listPets"));
//! ```

pub mod config;
pub mod context;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod generator;
pub mod grouping;
pub mod helpers;
pub mod loader;
pub mod model;
pub mod output;

pub use config::{CodegenConfig, JobDefaults, JobOptions};
pub use definitions::{
    DefaultDefinitionMapper, DefinitionEntry, DefinitionMapper, DefinitionRegistry,
};
pub use engine::{JinjaEngine, RenderFn, TemplateEngine};
pub use error::{Error, Result};
pub use generator::{log_failure, GenerationReport, Generator};
pub use grouping::{group_operations, GroupOptions, OperationContext, OperationGroups};
pub use helpers::{Helper, HelperSet};
pub use loader::{FileTemplateLoader, MemoryTemplateLoader, TemplateLoader, TextEncoding};
pub use model::SwaggerModel;
pub use output::{FileSystemSink, MemorySink, OutputSink};
