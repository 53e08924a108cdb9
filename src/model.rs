use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One unit of work in the fetched workflow.
///
/// The wire format carries arbitrary extra fields alongside the known ones;
/// they are kept verbatim in `extra` so the inspector and the clipboard
/// export can surface the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Prerequisite step ids. `None` when the field is absent from the
    /// record, which the inspector renders differently from an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn display_label(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => self.id.as_str(),
        }
    }

    pub fn dependency_ids(&self) -> &[String] {
        self.dependencies.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_fields_survive_round_trip() {
        let json = r#"{"id":"A","title":"Wing Spar","dependencies":[],"material":"Al-7075","mass_kg":12.5}"#;
        let step: Step = serde_json::from_str(json).expect("decode failed");
        assert_eq!(step.extra.get("material"), Some(&Value::from("Al-7075")));

        let out = serde_json::to_value(&step).expect("encode failed");
        assert_eq!(out.get("material"), Some(&Value::from("Al-7075")));
        assert_eq!(out.get("mass_kg"), Some(&Value::from(12.5)));
    }

    #[test]
    fn absent_dependencies_stay_absent() {
        let step: Step = serde_json::from_str(r#"{"id":"A","title":"Hull"}"#).expect("decode failed");
        assert!(step.dependencies.is_none());
        let out = serde_json::to_value(&step).expect("encode failed");
        assert!(out.get("dependencies").is_none());
    }

    #[test]
    fn display_label_falls_back_to_id() {
        let step: Step = serde_json::from_str(r#"{"id":"STEP-9"}"#).expect("decode failed");
        assert_eq!(step.display_label(), "STEP-9");
    }
}
