//! Perks: capped, recurring benefits attached to a card.

use serde::{Deserialize, Serialize};

use crate::domain::common::*;
use crate::domain::period::{bucket_key, BucketKey, Cadence, CalendarMonth, Period};

/// A recurring benefit that may be redeemed `limit` times per reset period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Perk {
    pub id: String,
    pub card_id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub cadence: Cadence,
}

fn default_limit() -> u32 {
    1
}

impl Perk {
    pub(crate) fn from_new(id: String, new: NewPerk) -> Self {
        Self {
            id,
            card_id: new.card_id,
            name: new.name.trim().to_string(),
            description: normalize_text(new.description),
            limit: new.limit,
            cadence: new.cadence,
        }
    }

    /// Usage bucket this perk accounts against in `month`.
    pub fn bucket(&self, month: CalendarMonth) -> BucketKey {
        bucket_key(&self.id, &self.cadence, month)
    }

    pub fn period(&self, month: CalendarMonth) -> Period {
        self.cadence.period_of(month.month())
    }

    pub fn is_completed(&self, usage: u32) -> bool {
        usage >= self.limit
    }
}

impl Displayable for Perk {
    fn display_label(&self) -> String {
        format!("{} ({}x {})", self.name, self.limit, self.cadence)
    }
}

/// Fields supplied when creating a perk.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerk {
    pub card_id: String,
    pub name: String,
    pub description: Option<String>,
    pub limit: u32,
    pub cadence: Cadence,
}

impl NewPerk {
    /// A monthly perk redeemable once per period.
    pub fn new(card_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            name: name.into(),
            description: None,
            limit: default_limit(),
            cadence: Cadence::Monthly,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for a perk. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerkPatch {
    pub card_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub limit: Option<u32>,
    pub cadence: Option<Cadence>,
}

impl PerkPatch {
    pub fn is_empty(&self) -> bool {
        self.card_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.limit.is_none()
            && self.cadence.is_none()
    }

    pub(crate) fn apply_to(self, perk: &mut Perk) {
        if let Some(card_id) = self.card_id {
            perk.card_id = card_id;
        }
        if let Some(name) = self.name {
            perk.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            perk.description = normalize_text(description);
        }
        if let Some(limit) = self.limit {
            perk.limit = limit;
        }
        if let Some(cadence) = self.cadence {
            perk.cadence = cadence;
        }
    }
}
