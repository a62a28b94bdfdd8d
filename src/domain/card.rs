//! Credit cards that perks are attached to.

use serde::{Deserialize, Serialize};

use crate::domain::common::*;

/// Display color assigned to cards created without one.
pub const DEFAULT_CARD_COLOR: &str = "#3b82f6";

/// A credit card tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub issuer: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Card {
    pub(crate) fn from_new(id: String, new: NewCard, fallback_color: &str) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            issuer: normalize_text(new.issuer),
            color: new
                .color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or_else(|| fallback_color.to_string()),
        }
    }
}

fn default_color() -> String {
    DEFAULT_CARD_COLOR.to_string()
}

/// Accepts `#rgb` and `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

impl Displayable for Card {
    fn display_label(&self) -> String {
        match &self.issuer {
            Some(issuer) => format!("{} ({})", self.name, issuer),
            None => self.name.clone(),
        }
    }
}

/// Fields supplied when creating a card. The registry assigns the identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCard {
    pub name: String,
    pub issuer: Option<String>,
    pub color: Option<String>,
}

impl NewCard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update for a card. `None` leaves the stored field untouched;
/// `issuer: Some(None)` clears the issuer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub name: Option<String>,
    pub issuer: Option<Option<String>>,
    pub color: Option<String>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.issuer.is_none() && self.color.is_none()
    }

    pub(crate) fn apply_to(self, card: &mut Card) {
        if let Some(name) = self.name {
            card.name = name.trim().to_string();
        }
        if let Some(issuer) = self.issuer {
            card.issuer = normalize_text(issuer);
        }
        if let Some(color) = self.color {
            card.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_issuer_deserializes_as_none() {
        let card: Card =
            serde_json::from_str(r##"{"id":"1","name":"Gold","issuer":"","color":"#000"}"##)
                .unwrap();
        assert_eq!(card.issuer, None);
        assert_eq!(card.display_label(), "Gold");
    }

    #[test]
    fn hex_colors_need_a_hash_and_three_or_six_digits() {
        assert!(is_hex_color("#abc"));
        assert!(is_hex_color("#A0B1C2"));
        assert!(!is_hex_color("abc123"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#ggg"));
    }

    #[test]
    fn missing_color_falls_back_to_default() {
        let card: Card = serde_json::from_str(r#"{"id":"1","name":"Gold"}"#).unwrap();
        assert_eq!(card.color, DEFAULT_CARD_COLOR);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut card = Card::from_new(
            "c1".into(),
            NewCard::new("Sapphire").with_issuer("Chase"),
            DEFAULT_CARD_COLOR,
        );
        CardPatch {
            color: Some("#111111".into()),
            ..CardPatch::default()
        }
        .apply_to(&mut card);
        assert_eq!(card.name, "Sapphire");
        assert_eq!(card.issuer.as_deref(), Some("Chase"));
        assert_eq!(card.color, "#111111");

        CardPatch {
            issuer: Some(None),
            ..CardPatch::default()
        }
        .apply_to(&mut card);
        assert_eq!(card.issuer, None);
    }
}
