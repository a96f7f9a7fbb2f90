use anyhow::{Error, Result, anyhow};
use serde_json::Value;

use crate::models::sale::SaleEvent;

const MAX_VALUE_CHARS: usize = 100;

/// Fills `{{field}}` placeholders from the sale event.
///
/// Only scalar values substitute. Control characters are dropped and each
/// value is capped at 100 characters.
pub fn render_message(template: &str, event: &SaleEvent) -> Result<String, Error> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };

        result.push_str(&rest[..start]);

        let name = rest[start + 2..start + 2 + len].trim();
        let value = event
            .lookup(name)
            .ok_or_else(|| anyhow!("Missing variable in template: {}", name))?;

        let replacement = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(anyhow!("Unsupported variable type for key '{}'", name)),
        };

        result.push_str(&sanitize(&replacement));
        rest = &rest[start + 2 + len + 2..];
    }

    result.push_str(rest);
    Ok(result)
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_VALUE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(value: Value) -> SaleEvent {
        match value {
            Value::Object(fields) => SaleEvent::from(fields),
            _ => panic!("test event must be an object"),
        }
    }

    #[test]
    fn plain_template_passes_through() {
        let sale = event(json!({"id": 1}));
        assert_eq!(render_message("Sale Detected!", &sale).unwrap(), "Sale Detected!");
    }

    #[test]
    fn nested_and_scalar_fields_substitute() {
        let sale = event(json!({
            "total": 19.99,
            "customer": {"first_name": "Ada"},
            "gift": false
        }));

        let rendered =
            render_message("{{customer.first_name}} spent {{ total }} (gift: {{gift}})", &sale)
                .unwrap();

        assert_eq!(rendered, "Ada spent 19.99 (gift: false)");
    }

    #[test]
    fn missing_field_is_an_error() {
        let sale = event(json!({"id": 1}));
        assert!(render_message("Thanks {{customer.name}}", &sale).is_err());
    }

    #[test]
    fn object_values_are_rejected() {
        let sale = event(json!({"customer": {"name": "x"}}));
        assert!(render_message("{{customer}}", &sale).is_err());
    }

    #[test]
    fn values_are_stripped_and_capped() {
        let long = "a".repeat(300);
        let sale = event(json!({"name": format!("Eve\n\u{7}{}", long)}));

        let rendered = render_message("{{name}}", &sale).unwrap();

        assert!(rendered.starts_with("Eveaaa"));
        assert_eq!(rendered.chars().count(), MAX_VALUE_CHARS);
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        let sale = event(json!({"id": 1}));
        assert_eq!(render_message("Sale {{id", &sale).unwrap(), "Sale {{id");
    }
}
