//! Month checklist: which perks each card offers and how much of each period is used.

use std::collections::HashMap;

use crate::domain::{CalendarMonth, Card, Perk, Period};
use crate::ledger::{Registry, UsageLedger};

use super::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem<'a> {
    pub perk: &'a Perk,
    pub usage: u32,
    pub limit: u32,
    pub is_completed: bool,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistGroup<'a> {
    pub card: &'a Card,
    pub items: Vec<ChecklistItem<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checklist<'a> {
    pub month: CalendarMonth,
    pub groups: Vec<ChecklistGroup<'a>>,
}

impl Checklist<'_> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    pub fn completed_items(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .filter(|item| item.is_completed)
            .count()
    }
}

/// Result of a checkbox toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub usage: u32,
    pub limit: u32,
    pub changed: bool,
}

impl ToggleOutcome {
    pub fn is_completed(&self) -> bool {
        self.usage >= self.limit
    }
}

pub struct ChecklistService;

impl ChecklistService {
    /// Builds the checklist for `month`.
    ///
    /// Perks are grouped by card in order of first appearance and keep their
    /// insertion order inside a group. Groups whose card is gone are omitted.
    /// Every perk appears in every month; cadence only decides which bucket
    /// its usage is read from.
    pub fn build<'a>(
        registry: &'a Registry,
        ledger: &UsageLedger,
        month: CalendarMonth,
    ) -> Checklist<'a> {
        let mut order: Vec<&'a str> = Vec::new();
        let mut grouped: HashMap<&'a str, Vec<&'a Perk>> = HashMap::new();
        for perk in registry.perks() {
            grouped
                .entry(perk.card_id.as_str())
                .or_insert_with(|| {
                    order.push(perk.card_id.as_str());
                    Vec::new()
                })
                .push(perk);
        }

        let groups = order
            .into_iter()
            .filter_map(|card_id| {
                let card = registry.card(card_id)?;
                let perks = grouped.remove(card_id)?;
                let items = perks
                    .into_iter()
                    .map(|perk| {
                        let usage = ledger.get(&perk.bucket(month));
                        ChecklistItem {
                            perk,
                            usage,
                            limit: perk.limit,
                            is_completed: perk.is_completed(usage),
                            period: perk.period(month),
                        }
                    })
                    .collect();
                Some(ChecklistGroup { card, items })
            })
            .collect();

        Checklist { month, groups }
    }

    /// Moves a perk's usage one step towards `checked`.
    ///
    /// Checking below the limit increments, unchecking above zero decrements,
    /// and anything else leaves the ledger untouched.
    pub fn toggle(
        registry: &Registry,
        ledger: &mut UsageLedger,
        perk_id: &str,
        month: CalendarMonth,
        checked: bool,
    ) -> ServiceResult<ToggleOutcome> {
        let perk = registry
            .perk(perk_id)
            .ok_or_else(|| ServiceError::PerkNotFound(perk_id.to_string()))?;
        let bucket = perk.bucket(month);
        let current = ledger.get(&bucket);

        let usage = if checked && current < perk.limit {
            ledger.increment(&bucket)
        } else if !checked && current > 0 {
            ledger.decrement(&bucket)
        } else {
            current
        };

        Ok(ToggleOutcome {
            usage,
            limit: perk.limit,
            changed: usage != current,
        })
    }
}
