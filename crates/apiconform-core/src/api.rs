//! Whole-API template: every operation, indexed and iterable.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::TemplateError;
use crate::factory::ValueFactory;
use crate::limits::Limits;
use crate::operation::OperationTemplate;
use crate::schema::{ApiDefinition, Method};

/// All operation templates of one schema document, indexed by path and
/// method. Built once from a fully parsed document and immutable after —
/// re-parsing produces a new template, never in-place mutation.
#[derive(Debug)]
pub struct ApiTemplate {
    endpoints: BTreeMap<String, BTreeMap<Method, OperationTemplate>>,
}

impl ApiTemplate {
    /// Build templates for every operation in the document.
    ///
    /// # Errors
    ///
    /// Fails fast on the first malformed or unsupported schema fragment,
    /// so generation gaps surface before any draw happens.
    pub fn new(
        api: &ApiDefinition,
        factory: &ValueFactory,
        limits: &Limits,
    ) -> Result<Self, TemplateError> {
        let mut endpoints = BTreeMap::new();
        for (path, operations) in &api.paths {
            let mut by_method = BTreeMap::new();
            for (method, definition) in operations {
                debug!(path = %path, method = %method, "building operation template");
                let template = OperationTemplate::new(
                    *method,
                    path,
                    definition,
                    factory,
                    &api.definitions,
                    limits,
                )?;
                by_method.insert(*method, template);
            }
            endpoints.insert(path.clone(), by_method);
        }
        Ok(Self { endpoints })
    }

    /// Endpoint map: path → method → operation template.
    pub fn endpoints(&self) -> &BTreeMap<String, BTreeMap<Method, OperationTemplate>> {
        &self.endpoints
    }

    /// Exact lookup by path and method, for hand-picked stateful
    /// composition across operations.
    pub fn operation(&self, path: &str, method: Method) -> Option<&OperationTemplate> {
        self.endpoints.get(path)?.get(&method)
    }

    /// Lookup by `operationId`, when the document declares one.
    pub fn operation_by_id(&self, operation_id: &str) -> Option<&OperationTemplate> {
        self.operations()
            .find(|op| op.operation_id() == Some(operation_id))
    }

    /// Every operation exactly once, in lexicographic (path, method)
    /// order — deterministic across runs.
    pub fn operations(&self) -> impl Iterator<Item = &OperationTemplate> {
        self.endpoints.values().flat_map(|ops| ops.values())
    }
}
