use super::perk::resolve_perk;
use super::{require, short_id, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, swatch};
use crate::core::services::ChecklistItem;
use crate::domain::{CalendarMonth, Displayable};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "month",
            "Show or change the month being tracked",
            "month [YYYY-MM|next|prev|today]",
            cmd_month,
        ),
        CommandDefinition::new(
            "checklist",
            "Show every perk with its usage for a month",
            "checklist [YYYY-MM]",
            cmd_checklist,
        ),
        CommandDefinition::new(
            "check",
            "Record one redemption of a perk",
            "check <perk-id> [YYYY-MM]",
            cmd_check,
        ),
        CommandDefinition::new(
            "uncheck",
            "Undo one redemption of a perk",
            "uncheck <perk-id> [YYYY-MM]",
            cmd_uncheck,
        ),
        CommandDefinition::new(
            "reset",
            "Clear a perk's usage for the period containing the month",
            "reset <perk-id> [YYYY-MM]",
            cmd_reset,
        ),
    ]
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(arg) = args.first() {
        context.current_month = match arg.to_lowercase().as_str() {
            "next" => context.current_month.next(),
            "prev" | "previous" => context.current_month.previous(),
            "today" | "now" => context.tracker.current_month(),
            _ => arg.parse::<CalendarMonth>()?,
        };
    }
    io::print_info(format!("Tracking {}.", context.current_month.long_label()));
    Ok(())
}

fn cmd_checklist(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = context.month_arg(args.first())?;
    let checklist = context.tracker.checklist(month);

    output_section(format!("Checklist for {}", month.long_label()));
    if context.tracker.perks().is_empty() {
        io::print_info("No perks yet. Add a card and a perk to get started.");
        return Ok(());
    }
    if checklist.is_empty() {
        io::print_info("No perks with a known card for this month.");
        return Ok(());
    }

    for group in &checklist.groups {
        io::print_info(format!(
            "{} {}",
            swatch(&group.card.color),
            group.card.display_label()
        ));
        for item in &group.items {
            io::print_info(format!("  {}", render_item(item, month)));
            if let Some(description) = item.perk.description.as_deref() {
                io::print_info(format!("      {description}"));
            }
        }
    }
    io::print_info(format!(
        "{} of {} perks completed.",
        checklist.completed_items(),
        checklist.total_items()
    ));
    Ok(())
}

/// Limits above this render as a count instead of one box per redemption.
const MAX_BOXES: u32 = 10;

pub(crate) fn render_item(item: &ChecklistItem<'_>, month: CalendarMonth) -> String {
    let boxes: String = if item.limit <= MAX_BOXES {
        let shown = item.usage.min(item.limit);
        (0..item.limit)
            .map(|slot| if slot < shown { "[x]" } else { "[ ]" })
            .collect()
    } else if item.is_completed {
        "[x]".to_string()
    } else {
        "[ ]".to_string()
    };
    let status = if item.is_completed { " done" } else { "" };
    format!(
        "{boxes} {} ({}/{} {}) {:<8}{status}",
        item.perk.name,
        item.usage,
        item.limit,
        item.period.label(month.year()),
        short_id(&item.perk.id),
    )
}

fn cmd_check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    toggle(context, args, true, "check <perk-id> [YYYY-MM]")
}

fn cmd_uncheck(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    toggle(context, args, false, "uncheck <perk-id> [YYYY-MM]")
}

fn toggle(context: &mut ShellContext, args: &[&str], checked: bool, usage: &str) -> CommandResult {
    let id = resolve_perk(context, require(args.first(), usage)?)?;
    let month = context.month_arg(args.get(1))?;
    let outcome = context.tracker.toggle(&id, month, checked)?;
    let name = context
        .tracker
        .registry()
        .perk(&id)
        .map(|perk| perk.name.clone())
        .unwrap_or_default();

    if !outcome.changed {
        let reason = if checked {
            "already at its limit"
        } else {
            "has no recorded usage"
        };
        io::print_warning(format!("{name} {reason} ({}/{}).", outcome.usage, outcome.limit));
        return Ok(());
    }
    let suffix = if outcome.is_completed() { ", completed" } else { "" };
    io::print_success(format!(
        "{name}: {}/{}{suffix}.",
        outcome.usage, outcome.limit
    ));
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_perk(context, require(args.first(), "reset <perk-id> [YYYY-MM]")?)?;
    let month = context.month_arg(args.get(1))?;
    if context.tracker.reset_usage(&id, month) {
        io::print_success("Usage cleared for this period.");
    } else {
        io::print_info("Nothing recorded for this period.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cadence, Perk, Period};

    #[test]
    fn renders_one_box_per_redemption() {
        let perk = Perk {
            id: "0123456789abcdef".into(),
            card_id: "c".into(),
            name: "Lounge".into(),
            description: None,
            limit: 3,
            cadence: Cadence::Quarterly,
        };
        let item = ChecklistItem {
            perk: &perk,
            usage: 1,
            limit: 3,
            is_completed: false,
            period: Period::Quarter(2),
        };
        let month = CalendarMonth::new(2025, 5).unwrap();
        let line = render_item(&item, month);
        assert!(line.starts_with("[x][ ][ ] Lounge (1/3 2025 Q2)"));
        assert!(line.contains("01234567"));
        assert!(!line.contains("done"));
    }

    #[test]
    fn large_limits_render_a_single_box() {
        let perk = Perk {
            id: "fedcba9876543210".into(),
            card_id: "c".into(),
            name: "Points".into(),
            description: None,
            limit: 4_000_000_000,
            cadence: Cadence::Monthly,
        };
        let item = ChecklistItem {
            perk: &perk,
            usage: 7,
            limit: perk.limit,
            is_completed: false,
            period: Period::Month(5),
        };
        let month = CalendarMonth::new(2025, 5).unwrap();
        let line = render_item(&item, month);
        assert!(line.starts_with("[ ] Points (7/4000000000 "));
        assert!(line.len() < 80);
    }

    #[test]
    fn rejects_bad_month_argument() {
        let err = "2025/05".parse::<CalendarMonth>().map_err(CommandError::from);
        assert!(matches!(err, Err(CommandError::InvalidArguments(_))));
    }
}
