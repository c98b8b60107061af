//! Questionnaire item registry
//!
//! Answer shortcuts address questionnaire items by `linkId`. The registry is
//! built once from a Questionnaire JSON document: every answerable item
//! (anything but `group` and `display`) is recorded with its text, the kind
//! of value it holds and the type an answer shortcut yields.

use crate::provider::ModelProviderError;
use indexmap::IndexMap;
use octofhir_fpe_types::{FpType, PrimitiveKind};
use serde::{Deserialize, Serialize};

/// Record type of the document answer shortcuts read from
pub const QUESTIONNAIRE_RESPONSE: &str = "QuestionnaireResponse";

const REFERENCE_RESOURCE_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/questionnaire-referenceResource";

/// How an answer's value is unwrapped when compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// Coded answers, compiled with `.ordinal()`
    ChoiceLike,
    /// Quantity answers, compiled with `.value`
    QuantityLike,
    Other,
}

/// One answerable questionnaire item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireItem {
    pub link_id: String,
    pub text: Option<String>,
    pub value_kind: ValueKind,
    /// Type of the compiled answer expression, already unwrapped per `value_kind`
    pub value_type: FpType,
    /// Whether the item (or an enclosing group) repeats
    pub repeats: bool,
}

/// Items indexed by linkId, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionnaireItems {
    items: IndexMap<String, QuestionnaireItem>,
}

#[derive(Deserialize)]
struct RawQuestionnaire {
    #[serde(default)]
    item: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    link_id: Option<String>,
    text: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    #[serde(default)]
    repeats: bool,
    #[serde(default)]
    extension: Vec<RawExtension>,
    #[serde(default)]
    item: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtension {
    url: String,
    value_code: Option<String>,
}

impl QuestionnaireItems {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from a Questionnaire JSON document
    pub fn from_json(json: &str) -> Result<Self, ModelProviderError> {
        let raw: RawQuestionnaire = serde_json::from_str(json)
            .map_err(|e| ModelProviderError::QuestionnaireError(e.to_string()))?;
        let mut items = Self::new();
        for item in &raw.item {
            items.walk(item, false);
        }
        log::debug!("indexed {} questionnaire items", items.len());
        Ok(items)
    }

    /// Load a Questionnaire JSON file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ModelProviderError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelProviderError::IoError(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Add an item directly; an existing linkId is kept
    pub fn insert(&mut self, item: QuestionnaireItem) {
        self.items.entry(item.link_id.clone()).or_insert(item);
    }

    pub fn get(&self, link_id: &str) -> Option<&QuestionnaireItem> {
        self.items.get(link_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionnaireItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn walk(&mut self, item: &RawItem, repeating_parent: bool) {
        let (Some(link_id), Some(item_type)) = (&item.link_id, &item.item_type) else {
            return;
        };
        let repeats = repeating_parent || item.repeats;

        if item_type != "group" && item_type != "display" {
            if let Some((value_kind, value_type)) = answer_type(item_type, item) {
                self.insert(QuestionnaireItem {
                    link_id: link_id.clone(),
                    text: item.text.clone(),
                    value_kind,
                    value_type,
                    repeats,
                });
            }
        }

        for child in &item.item {
            self.walk(child, repeats);
        }
    }
}

impl FromIterator<QuestionnaireItem> for QuestionnaireItems {
    fn from_iter<I: IntoIterator<Item = QuestionnaireItem>>(iter: I) -> Self {
        let mut items = Self::new();
        for item in iter {
            items.insert(item);
        }
        items
    }
}

fn answer_type(item_type: &str, item: &RawItem) -> Option<(ValueKind, FpType)> {
    let primitive = |kind| Some((ValueKind::Other, FpType::Primitive(kind)));
    match item_type {
        "boolean" => primitive(PrimitiveKind::Boolean),
        "decimal" => primitive(PrimitiveKind::Decimal),
        "integer" => primitive(PrimitiveKind::Integer),
        "date" => primitive(PrimitiveKind::Date),
        "dateTime" => primitive(PrimitiveKind::DateTime),
        "time" => primitive(PrimitiveKind::Time),
        "string" | "text" => primitive(PrimitiveKind::String),
        "url" => primitive(PrimitiveKind::Uri),
        "choice" | "open-choice" | "coding" => Some((ValueKind::ChoiceLike, FpType::decimal())),
        "quantity" => Some((ValueKind::QuantityLike, FpType::decimal())),
        "attachment" => Some((ValueKind::Other, FpType::record(["Attachment"]))),
        "reference" => {
            let resource = item
                .extension
                .iter()
                .find(|ext| ext.url == REFERENCE_RESOURCE_EXTENSION)
                .and_then(|ext| ext.value_code.clone())
                .unwrap_or_else(|| "Reference".to_string());
            Some((ValueKind::Other, FpType::record([resource])))
        }
        _ => None,
    }
}
