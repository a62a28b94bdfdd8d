use super::{require, resolve_id, short_id, CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, swatch};
use crate::domain::{CardPatch, Displayable, NewCard};

const USAGE: &str = "card <add|edit|remove|list> ...";
const ADD_USAGE: &str = "card add <name> [--issuer <issuer>] [--color <#rrggbb>]";
const EDIT_USAGE: &str = "card edit <id> [--name <name>] [--issuer <issuer>] [--color <#rrggbb>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "card",
        "Add, edit, remove, or list credit cards",
        USAGE,
        cmd_card,
    )]
}

fn cmd_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return list_cards(context);
    };
    match sub.to_lowercase().as_str() {
        "add" => add_card(context, &args[1..]),
        "edit" => edit_card(context, &args[1..]),
        "remove" | "rm" => remove_card(context, &args[1..]),
        "list" | "ls" => list_cards(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown card subcommand `{other}`"
        ))),
    }
}

pub(crate) fn resolve_card(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    resolve_id(
        "card",
        input,
        context.tracker.cards().iter().map(|card| card.id.as_str()),
    )
}

fn add_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["issuer", "color"], &[])?;
    if parsed.positional.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")));
    }
    let mut card = NewCard::new(parsed.positional.join(" "));
    if let Some(issuer) = parsed.option("issuer") {
        card = card.with_issuer(issuer);
    }
    if let Some(color) = parsed.option("color") {
        card = card.with_color(color);
    }
    let card = context.tracker.add_card(card)?;
    io::print_success(format!(
        "Added card {} [{}].",
        card.display_label(),
        short_id(&card.id)
    ));
    Ok(())
}

fn edit_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["name", "issuer", "color"], &[])?;
    let id = resolve_card(context, require(parsed.positional.first(), EDIT_USAGE)?)?;
    let patch = CardPatch {
        name: parsed.option("name").map(str::to_string),
        issuer: parsed
            .option("issuer")
            .map(|issuer| Some(issuer.to_string())),
        color: parsed.option("color").map(str::to_string),
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    }
    let card = context.tracker.update_card(&id, patch)?;
    io::print_success(format!("Updated card {}.", card.display_label()));
    Ok(())
}

fn remove_card(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let raw_id = require(parsed.positional.first(), "card remove <id> [--yes]")?;
    let id = resolve_card(context, raw_id)?;
    let perk_count = context.tracker.registry().perks_for_card(&id).count();
    let prompt = format!("Delete this card and its {perk_count} perk(s)?");
    if !context.confirm(&prompt, parsed.switch("yes") || perk_count == 0)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let (card, perks) = context.tracker.remove_card(&id)?;
    io::print_success(format!(
        "Removed card {} and {} perk(s).",
        card.display_label(),
        perks.len()
    ));
    Ok(())
}

fn list_cards(context: &mut ShellContext) -> CommandResult {
    let cards = context.tracker.cards();
    if cards.is_empty() {
        io::print_info("No cards yet. Add one with `card add <name>`.");
        return Ok(());
    }
    output_section("Cards");
    for card in cards {
        let perks = context.tracker.registry().perks_for_card(&card.id).count();
        io::print_info(format!(
            "  {} {:<8}  {}  ({} perk{})",
            swatch(&card.color),
            short_id(&card.id),
            card.display_label(),
            perks,
            if perks == 1 { "" } else { "s" }
        ));
    }
    Ok(())
}
