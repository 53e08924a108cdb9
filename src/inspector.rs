use serde_json::Value;

use crate::model::Step;

pub const PANEL_WIDTH: usize = 42;

/// View model for the node-detail side panel.
///
/// Built from an arbitrary metadata record: the fields surfaced up top
/// (`id`, `title`, `name`, `dependencies`) are pulled out, everything else
/// lands in the generic key/value listing. A record without a
/// `dependencies` field omits that section entirely; a present-but-empty
/// list renders an explicit "None".
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetails {
    pub title: String,
    pub id: String,
    pub dependencies: Option<Vec<String>>,
    pub attributes: Vec<(String, String)>,
    raw: Value,
}

impl NodeDetails {
    pub fn from_value(record: Value) -> Self {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let title = ["title", "name"]
            .iter()
            .find_map(|key| record.get(*key).and_then(Value::as_str))
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Node {id}"));
        let dependencies = match record.get("dependencies") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|item| match item.as_str() {
                        Some(text) => text.to_string(),
                        None => item.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        };
        let attributes = record
            .as_object()
            .map(|map| {
                map.iter()
                    .filter(|(key, _)| {
                        !matches!(key.as_str(), "id" | "title" | "name" | "dependencies")
                    })
                    .map(|(key, value)| (key.clone(), format_value(value)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title,
            id,
            dependencies,
            attributes,
            raw: record,
        }
    }

    pub fn from_step(step: &Step) -> Self {
        Self::from_value(serde_json::to_value(step).unwrap_or(Value::Null))
    }

    /// Stand-in for a node with no backing step record.
    pub fn placeholder(id: &str, label: &str) -> Self {
        Self::from_value(serde_json::json!({ "id": id, "label": label }))
    }

    /// The full record, pretty-printed; this is what the copy action puts
    /// on the clipboard.
    pub fn clipboard_text(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_default()
    }

    /// Writes the record to the system clipboard. Failure produces no
    /// visible state change and no confirmation; only a debug log.
    pub fn copy_to_clipboard(&self) {
        if let Err(err) = write_clipboard(&self.clipboard_text()) {
            tracing::debug!(error = %err, "clipboard write failed");
        }
    }

    /// Fixed-width text rendering of the panel.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"-".repeat(PANEL_WIDTH));
        out.push('\n');
        out.push_str(&format!("id: {}\n", self.id));

        if let Some(deps) = &self.dependencies {
            out.push('\n');
            if deps.is_empty() {
                out.push_str("Dependencies: None\n");
            } else {
                let chips: Vec<String> = deps.iter().map(|dep| format!("[{dep}]")).collect();
                out.push_str(&format!("Dependencies: {}\n", chips.join(" ")));
            }
        }

        if !self.attributes.is_empty() {
            out.push('\n');
            for (key, value) in &self.attributes {
                if value.contains('\n') {
                    out.push_str(&format!("{key}:\n"));
                    for line in value.lines() {
                        out.push_str(&format!("  {line}\n"));
                    }
                } else {
                    out.push_str(&format!("{key}: {value}\n"));
                }
            }
        }

        out
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

fn write_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_prefers_title_then_name_then_generated() {
        let titled = NodeDetails::from_value(json!({"id": "A", "title": "Wing Spar"}));
        assert_eq!(titled.title, "Wing Spar");

        let named = NodeDetails::from_value(json!({"id": "A", "name": "Spar"}));
        assert_eq!(named.title, "Spar");

        let bare = NodeDetails::from_value(json!({"id": "A"}));
        assert_eq!(bare.title, "Node A");
    }

    #[test]
    fn absent_dependencies_omit_the_section() {
        let details = NodeDetails::from_value(json!({"id": "A", "title": "Hull"}));
        assert!(details.dependencies.is_none());
        assert!(!details.render_text().contains("Dependencies"));
    }

    #[test]
    fn empty_dependencies_render_explicit_none() {
        let details =
            NodeDetails::from_value(json!({"id": "A", "title": "Hull", "dependencies": []}));
        assert_eq!(details.dependencies.as_deref(), Some(&[][..]));
        assert!(details.render_text().contains("Dependencies: None"));
    }

    #[test]
    fn dependency_chips_list_every_entry() {
        let details = NodeDetails::from_value(
            json!({"id": "C", "title": "Join", "dependencies": ["A", "B"]}),
        );
        assert!(details.render_text().contains("Dependencies: [A] [B]"));
    }

    #[test]
    fn attributes_exclude_surfaced_fields() {
        let details = NodeDetails::from_value(json!({
            "id": "A",
            "title": "Wing Spar",
            "name": "spar",
            "dependencies": [],
            "material": "Al-7075",
            "mass_kg": 12.5,
        }));
        let keys: Vec<&str> = details.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"material"));
        assert!(keys.contains(&"mass_kg"));
        assert!(!keys.contains(&"id"));
        assert!(!keys.contains(&"title"));
        assert!(!keys.contains(&"name"));
        assert!(!keys.contains(&"dependencies"));
    }

    #[test]
    fn object_values_render_as_pretty_json() {
        let details = NodeDetails::from_value(json!({
            "id": "A",
            "title": "Wing Spar",
            "tolerances": {"bore_mm": 0.05},
        }));
        let (_, value) = details
            .attributes
            .iter()
            .find(|(key, _)| key == "tolerances")
            .expect("attribute missing");
        assert!(value.contains("\"bore_mm\": 0.05"));
        assert!(value.contains('\n'));
    }

    #[test]
    fn clipboard_text_is_the_full_record() {
        let details = NodeDetails::from_value(json!({
            "id": "A",
            "title": "Wing Spar",
            "material": "Al-7075",
        }));
        let text = details.clipboard_text();
        assert!(text.contains("\"id\": \"A\""));
        assert!(text.contains("\"material\": \"Al-7075\""));
    }

    #[test]
    fn placeholder_details_carry_the_stand_in_record() {
        let details = NodeDetails::placeholder("GHOST", "GHOST");
        assert_eq!(details.id, "GHOST");
        assert_eq!(details.title, "Node GHOST");
        assert!(details.clipboard_text().contains("\"label\""));
    }
}
