//! apiconform-core: schema-to-generator mapping and operation templating
//!
//! Turns a parsed OpenAPI/Swagger document into lazy, restartable,
//! composable value generators: a [`ValueFactory`] resolves each schema
//! node to a [`values::ValueTemplate`], operation templates compose
//! parameter generators into whole parameter sets, and an [`ApiTemplate`]
//! indexes every operation for exhaustive sweeps or hand-picked stateful
//! sequences. The caller's testing engine supplies entropy per draw and
//! owns repetition and shrinking; document parsing and HTTP transport are
//! external collaborators.

pub mod api;
pub mod error;
pub mod factory;
pub mod generate;
pub mod limits;
pub mod operation;
mod pattern;
pub mod schema;
pub mod values;

pub use api::ApiTemplate;
pub use error::{DrawError, TemplateError};
pub use factory::{Resolution, TemplateBuilder, ValueFactory};
pub use generate::Generator;
pub use limits::{Limits, LimitsError};
pub use operation::{BODY_PARAMETER, OperationTemplate, ParameterSet, ParameterTemplate};
pub use schema::{
    AdditionalProperties, ApiDefinition, Method, OperationDefinition, ParameterDefinition,
    ParameterLocation, PathItem, SchemaDefinition,
};
pub use values::ValueTemplate;
