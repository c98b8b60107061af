//! FHIR schema documents and their compilation into field maps
//!
//! A schema document is a JSON array of schemas (or an object with a
//! `schemas` array). Each schema has an `id`, an optional `url`, an optional
//! `base` and a map of `elements`. Elements may be primitive, complex, choice
//! (`choices` naming sibling elements), backbone (nested `elements`) or
//! references to another element (`elementReference`).
//!
//! All field maps are computed once when the registry is built.

use crate::provider::FieldMap;
use indexmap::IndexMap;
use octofhir_fpe_types::{FpType, PrimitiveKind, SchemaPath, normalize_choice, wrap_single};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const SYSTEM_TYPE_PREFIX: &str = "http://hl7.org/fhirpath/System.";

/// One schema entry (resource, complex type, primitive type or logical model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirSchema {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub elements: IndexMap<String, ElementSchema>,
}

/// One element of a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSchema {
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub scalar: Option<bool>,
    #[serde(default)]
    pub choice_of: Option<String>,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub element_reference: Option<Vec<String>>,
    #[serde(default)]
    pub elements: IndexMap<String, ElementSchema>,
}

impl ElementSchema {
    /// Whether at most one value is present per parent
    pub fn is_scalar(&self) -> bool {
        self.scalar.unwrap_or(!self.array)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    List(Vec<FhirSchema>),
    Bundle { schemas: Vec<FhirSchema> },
}

/// Parse a schema document
pub fn parse_schemas(json: &str) -> Result<Vec<FhirSchema>, serde_json::Error> {
    Ok(match serde_json::from_str::<SchemaDocument>(json)? {
        SchemaDocument::List(schemas) | SchemaDocument::Bundle { schemas } => schemas,
    })
}

/// Map a schema type name to a primitive kind
pub fn primitive_for(type_name: &str) -> Option<PrimitiveKind> {
    match type_name.strip_prefix(SYSTEM_TYPE_PREFIX) {
        Some(system) => PrimitiveKind::from_name(system),
        None => PrimitiveKind::from_fhir_name(type_name),
    }
}

/// Schemas indexed by id and by url
struct SchemaIndex<'a> {
    by_key: HashMap<&'a str, &'a FhirSchema>,
}

impl<'a> SchemaIndex<'a> {
    fn new(schemas: &'a [FhirSchema]) -> Self {
        let mut by_key = HashMap::new();
        for schema in schemas {
            by_key.insert(schema.id.as_str(), schema);
            if let Some(url) = &schema.url {
                by_key.insert(url.as_str(), schema);
            }
        }
        Self { by_key }
    }

    fn get(&self, key: &str) -> Option<&'a FhirSchema> {
        self.by_key.get(key).copied()
    }

    /// Elements of a schema followed by those of its base chain
    fn schema_elements(&self, schema: &'a FhirSchema) -> IndexMap<&'a str, &'a ElementSchema> {
        let mut result = IndexMap::new();
        let mut visited = HashSet::new();
        let mut current = Some(schema);
        while let Some(node) = current {
            if !visited.insert(node.id.as_str()) {
                break;
            }
            for (name, element) in &node.elements {
                result.entry(name.as_str()).or_insert(element);
            }
            current = node.base.as_deref().and_then(|base| self.get(base));
        }
        result
    }

    /// Elements of a backbone element: its own, then those of its declared type
    fn nested_elements(&self, element: &'a ElementSchema) -> IndexMap<&'a str, &'a ElementSchema> {
        let mut result: IndexMap<&str, &ElementSchema> = element
            .elements
            .iter()
            .map(|(name, el)| (name.as_str(), el))
            .collect();
        if let Some(schema) = element.type_name.as_deref().and_then(|t| self.get(t)) {
            for (name, el) in self.schema_elements(schema) {
                result.entry(name).or_insert(el);
            }
        }
        result
    }

    /// Canonical schema path of an element reference
    ///
    /// `["http://.../Questionnaire", "elements", "item"]` becomes `["Questionnaire", "item"]`.
    fn reference_path(&self, reference: &[String]) -> Option<SchemaPath> {
        let (head, rest) = reference.split_first()?;
        let schema = self.get(head)?;
        let mut path = SchemaPath::new();
        path.push(schema.id.clone());
        path.extend(rest.iter().filter(|s| s.as_str() != "elements").cloned());
        Some(path)
    }

    fn type_id(&self, type_name: &str) -> String {
        self.get(type_name)
            .map(|schema| schema.id.clone())
            .unwrap_or_else(|| type_name.to_string())
    }
}

/// Compile every schema (and every nested backbone element) into field maps
pub fn compile_field_maps(schemas: &[FhirSchema]) -> HashMap<SchemaPath, Arc<FieldMap>> {
    let index = SchemaIndex::new(schemas);
    let mut out = HashMap::new();
    for schema in schemas {
        let mut path = SchemaPath::new();
        path.push(schema.id.clone());
        let elements = index.schema_elements(schema);
        compile_elements(&index, path, &elements, &mut out);
    }
    out
}

fn compile_elements<'a>(
    index: &SchemaIndex<'a>,
    prefix: SchemaPath,
    elements: &IndexMap<&'a str, &'a ElementSchema>,
    out: &mut HashMap<SchemaPath, Arc<FieldMap>>,
) {
    let mut fields = FieldMap::new();
    for (name, element) in elements {
        let ty = element_type(index, &prefix, name, element, elements);
        let ty = if element.is_scalar() { wrap_single(ty) } else { ty };
        fields.insert(name.to_string(), ty);

        if !element.elements.is_empty() && element.element_reference.is_none() {
            let mut child = prefix.clone();
            child.push(name.to_string());
            let nested = index.nested_elements(*element);
            compile_elements(index, child, &nested, out);
        }
    }
    out.insert(prefix, Arc::new(fields));
}

fn element_type(
    index: &SchemaIndex<'_>,
    prefix: &SchemaPath,
    name: &str,
    element: &ElementSchema,
    siblings: &IndexMap<&str, &ElementSchema>,
) -> FpType {
    if let Some(kind) = element.type_name.as_deref().and_then(primitive_for) {
        return FpType::Primitive(kind);
    }
    if !element.choices.is_empty() {
        return normalize_choice(
            element
                .choices
                .iter()
                .filter_map(|choice| {
                    let sibling = siblings.get(choice.as_str())?;
                    Some(element_type(index, prefix, choice, sibling, siblings))
                })
                .collect(),
        );
    }
    if let Some(reference) = &element.element_reference {
        return index
            .reference_path(reference)
            .map(FpType::Record)
            .unwrap_or(FpType::Any);
    }
    if !element.elements.is_empty() {
        let mut path = prefix.clone();
        path.push(name.to_string());
        return FpType::Record(path);
    }
    match element.type_name.as_deref() {
        Some("Quantity") => FpType::Quantity,
        Some(type_name) => FpType::record([index.type_id(type_name)]),
        None => FpType::Any,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_for() {
        assert_eq!(primitive_for("code"), Some(PrimitiveKind::Code));
        assert_eq!(
            primitive_for("http://hl7.org/fhirpath/System.String"),
            Some(PrimitiveKind::String)
        );
        assert_eq!(primitive_for("HumanName"), None);
    }

    #[test]
    fn test_document_shapes() {
        let list = r#"[{"id": "Patient", "elements": {}}]"#;
        assert_eq!(parse_schemas(list).unwrap().len(), 1);
        let bundle = r#"{"schemas": [{"id": "Patient"}, {"id": "HumanName"}]}"#;
        assert_eq!(parse_schemas(bundle).unwrap().len(), 2);
    }

    #[test]
    fn test_scalar_defaults_from_array() {
        let element = ElementSchema {
            array: true,
            ..ElementSchema::default()
        };
        assert!(!element.is_scalar());
        assert!(ElementSchema::default().is_scalar());
    }
}
