use uuid::Uuid;

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Generates an identifier for a newly created card or perk.
///
/// Identifiers are opaque strings. Imported backups may carry any shape
/// (older exports use millisecond timestamps), so nothing parses them back.
pub fn new_entity_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Deserializes optional text, treating blank strings as absent.
///
/// Backups written by form-based front ends store cleared fields as `""`.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(normalize_text(raw))
}

pub(crate) fn normalize_text(raw: Option<String>) -> Option<String> {
    raw.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
