use super::card::resolve_card;
use super::{parse_limit, require, resolve_id, short_id, CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, swatch};
use crate::domain::{Cadence, NewPerk, PerkPatch};

const USAGE: &str = "perk <add|edit|remove|list> ...";
const ADD_USAGE: &str = "perk add <card-id> <name> [--limit N] [--cadence monthly|quarterly|semi-annually|annually] [--description D]";
const EDIT_USAGE: &str = "perk edit <id> [--card ID] [--name N] [--limit N] [--cadence C] [--description D]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "perk",
        "Add, edit, remove, or list perks",
        USAGE,
        cmd_perk,
    )]
}

fn cmd_perk(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return list_perks(context);
    };
    match sub.to_lowercase().as_str() {
        "add" => add_perk(context, &args[1..]),
        "edit" => edit_perk(context, &args[1..]),
        "remove" | "rm" => remove_perk(context, &args[1..]),
        "list" | "ls" => list_perks(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown perk subcommand `{other}`"
        ))),
    }
}

pub(crate) fn resolve_perk(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    resolve_id(
        "perk",
        input,
        context.tracker.perks().iter().map(|perk| perk.id.as_str()),
    )
}

/// Accepts the four known cadences in any case, plus a few short aliases.
pub(crate) fn parse_cadence(raw: &str) -> Result<Cadence, CommandError> {
    let normalized = raw.trim().to_ascii_lowercase();
    let cadence = match normalized.as_str() {
        "monthly" | "month" | "m" => Cadence::Monthly,
        "quarterly" | "quarter" | "q" => Cadence::Quarterly,
        "semi-annually" | "semiannually" | "semi-annual" | "half" | "h" => Cadence::SemiAnnually,
        "annually" | "annual" | "yearly" | "y" => Cadence::Annually,
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown cadence `{raw}` (use monthly, quarterly, semi-annually or annually)"
            )))
        }
    };
    Ok(cadence)
}

fn add_perk(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["limit", "cadence", "description"], &[])?;
    let (card_ref, name) = match parsed.positional.split_first() {
        Some((card_ref, name)) if !name.is_empty() => (*card_ref, name.join(" ")),
        _ => return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}"))),
    };
    let card_id = resolve_card(context, card_ref)?;

    let mut perk = NewPerk::new(card_id, name);
    if let Some(limit) = parsed.option("limit") {
        perk = perk.with_limit(parse_limit(limit)?);
    }
    if let Some(cadence) = parsed.option("cadence") {
        perk = perk.with_cadence(parse_cadence(cadence)?);
    }
    if let Some(description) = parsed.option("description") {
        perk = perk.with_description(description);
    }

    let perk = context.tracker.add_perk(perk)?;
    io::print_success(format!(
        "Added perk {} [{}]: {}x {}.",
        perk.name,
        short_id(&perk.id),
        perk.limit,
        perk.cadence.label().to_lowercase()
    ));
    Ok(())
}

fn edit_perk(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["card", "name", "limit", "cadence", "description"],
        &[],
    )?;
    let id = resolve_perk(context, require(parsed.positional.first(), EDIT_USAGE)?)?;
    let card_id = parsed
        .option("card")
        .map(|card| resolve_card(context, card))
        .transpose()?;
    let patch = PerkPatch {
        card_id,
        name: parsed.option("name").map(str::to_string),
        description: parsed
            .option("description")
            .map(|description| Some(description.to_string())),
        limit: parsed.option("limit").map(parse_limit).transpose()?,
        cadence: parsed.option("cadence").map(parse_cadence).transpose()?,
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    }
    let perk = context.tracker.update_perk(&id, patch)?;
    io::print_success(format!("Updated perk {}.", perk.name));
    Ok(())
}

fn remove_perk(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = resolve_perk(context, require(args.first(), "perk remove <id>")?)?;
    let perk = context.tracker.remove_perk(&id)?;
    io::print_success(format!("Removed perk {}.", perk.name));
    Ok(())
}

fn list_perks(context: &mut ShellContext) -> CommandResult {
    let listing = context.tracker.perk_listing();
    if listing.is_empty() {
        io::print_info("No perks yet. Add one with `perk add <card-id> <name>`.");
        return Ok(());
    }
    output_section("Perks");
    for row in listing {
        io::print_info(format!(
            "  {:<8}  {}  {} {}  {}x {}",
            short_id(&row.perk.id),
            row.perk.name,
            swatch(&row.card_color),
            row.card_name,
            row.perk.limit,
            row.perk.cadence.label()
        ));
        if let Some(description) = row.perk.description.as_deref() {
            io::print_info(format!("            {description}"));
        }
    }
    Ok(())
}
