//! Schema registry implementing SchemaProvider
//!
//! This module provides the default [`SchemaProvider`]: field maps compiled
//! from a FHIR schema document, held immutably behind `Arc`s.

use crate::provider::{FieldMap, ModelProviderError, SchemaProvider};
use crate::schema::{FhirSchema, compile_field_maps, parse_schemas};
use octofhir_fpe_types::{FpType, PrimitiveKind, SchemaPath};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Fields of `Quantity` used when the loaded schema does not define it
static QUANTITY_FIELDS: LazyLock<Arc<FieldMap>> = LazyLock::new(|| {
    let single = |kind: PrimitiveKind| FpType::single(FpType::Primitive(kind));
    Arc::new(FieldMap::from([
        ("value".to_string(), single(PrimitiveKind::Decimal)),
        ("comparator".to_string(), single(PrimitiveKind::Code)),
        ("unit".to_string(), single(PrimitiveKind::String)),
        ("system".to_string(), single(PrimitiveKind::Uri)),
        ("code".to_string(), single(PrimitiveKind::Code)),
    ]))
});

/// Schema registry that implements SchemaProvider
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    fields: HashMap<SchemaPath, Arc<FieldMap>>,
    loaded: bool,
}

impl SchemaRegistry {
    /// A registry with no schema data; every lookup reports `NotLoaded`
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Build a registry from parsed schemas
    pub fn new(schemas: &[FhirSchema]) -> Self {
        let fields = compile_field_maps(schemas);
        log::debug!(
            "compiled {} schemas into {} field maps",
            schemas.len(),
            fields.len()
        );
        Self {
            fields,
            loaded: true,
        }
    }

    /// Load schemas from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelProviderError> {
        let schemas =
            parse_schemas(json).map_err(|e| ModelProviderError::ParseError(e.to_string()))?;
        Ok(Self::new(&schemas))
    }

    /// Load schemas from a JSON file at runtime
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ModelProviderError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelProviderError::IoError(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Load schemas from a file, checking the extension
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ModelProviderError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            Some(ext) => Err(ModelProviderError::ParseError(format!(
                "Unsupported file extension: .{}. Expected .json",
                ext
            ))),
            None => Err(ModelProviderError::ParseError(
                "No file extension found. Expected .json".to_string(),
            )),
        }
    }

    /// Register a field map directly, marking the registry as loaded
    pub fn with_fields<I, S>(mut self, path: I, fields: FieldMap) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: SchemaPath = path.into_iter().map(Into::into).collect();
        self.fields.insert(path, Arc::new(fields));
        self.loaded = true;
        self
    }

    /// Number of compiled record paths
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if a record path is known
    pub fn contains(&self, path: &[String]) -> bool {
        self.fields.contains_key(path)
    }
}

impl SchemaProvider for SchemaRegistry {
    fn resolve_fields(&self, path: &[String]) -> Result<Arc<FieldMap>, ModelProviderError> {
        if !self.loaded {
            return Err(ModelProviderError::NotLoaded);
        }
        if let Some(fields) = self.fields.get(path) {
            return Ok(Arc::clone(fields));
        }
        match path {
            [name] if name == "Quantity" => Ok(Arc::clone(&QUANTITY_FIELDS)),
            _ => Err(ModelProviderError::TypeNotFound(path.iter().cloned().collect())),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}
