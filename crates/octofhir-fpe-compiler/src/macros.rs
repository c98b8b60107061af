//! Domain shortcut expansion

use crate::stringify::quote;
use octofhir_fpe_model::{QuestionnaireItems, ValueKind};

/// Expand an `answer` token into the path selecting its value
///
/// Choice answers end in `.ordinal()`, quantity answers in `.value`. An
/// unknown link id gets the plain path.
pub fn expand_answer(link_id: &str, items: &QuestionnaireItems) -> String {
    let path = format!("repeat(item).where(linkId = {}).answer.value", quote(link_id));
    let kind = match items.get(link_id) {
        Some(item) => item.value_kind,
        None => {
            log::debug!("no questionnaire item '{link_id}', expanding answer without suffix");
            ValueKind::Other
        }
    };
    match kind {
        ValueKind::ChoiceLike => format!("{path}.ordinal()"),
        ValueKind::QuantityLike => format!("{path}.value"),
        ValueKind::Other => path,
    }
}
