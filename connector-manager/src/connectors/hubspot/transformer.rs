use crm_bridge::IntegrationItem;
use serde_json::{Map, Value};

use super::config::{object_path, HubSpotSettings};

/// Normalize a raw CRM object into an integration item.
///
/// `item_type` is the singular type name ("contact", "company", "deal").
/// Missing fields fall back to placeholders; this never fails.
pub fn object_to_item(object: &Value, item_type: &str, settings: &HubSpotSettings) -> IntegrationItem {
    let empty = Map::new();
    let properties = object
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let id = match object.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    IntegrationItem {
        name: item_name(properties, item_type),
        item_type: item_type.to_string(),
        creation_time: text_property(properties, "createdate").map(str::to_string),
        last_modified_time: text_property(properties, "lastmodifieddate").map(str::to_string),
        url: settings.record_url(&object_path(item_type), &id),
        id,
    }
}

fn item_name(properties: &Map<String, Value>, item_type: &str) -> String {
    match item_type {
        "contact" => {
            let first = text_property(properties, "firstname").unwrap_or("");
            let last = text_property(properties, "lastname").unwrap_or("");
            let full = format!("{} {}", first, last).trim().to_string();
            if full.is_empty() {
                "Unnamed Contact".to_string()
            } else {
                full
            }
        }
        "company" => text_property(properties, "name")
            .unwrap_or("Unnamed Company")
            .to_string(),
        "deal" => text_property(properties, "dealname")
            .unwrap_or("Unnamed Deal")
            .to_string(),
        other => format!("HubSpot {}", title_case(other)),
    }
}

/// Non-empty string property.
fn text_property<'a>(properties: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Uppercase the first letter of each word, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
