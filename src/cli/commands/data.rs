use std::path::PathBuf;

use super::{CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::core::utils::{ensure_dir, PathResolver};
use crate::core::DataStats;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "export",
            "Write a JSON backup of all cards, perks and usage",
            "export [path]",
            cmd_export,
        ),
        CommandDefinition::new(
            "import",
            "Replace all data with a JSON backup",
            "import <path> [--yes]",
            cmd_import,
        ),
        CommandDefinition::new("stats", "Show record counts", "stats", cmd_stats),
        CommandDefinition::new(
            "prune",
            "Drop usage recorded for perks that no longer exist",
            "prune",
            cmd_prune,
        ),
        CommandDefinition::new(
            "clear",
            "Delete all local cards, perks and usage",
            "clear --yes",
            cmd_clear,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = match args.first() {
        Some(path) => PathBuf::from(path),
        None => {
            let dir = PathResolver::exports_dir_in(&context.base_dir);
            ensure_dir(&dir)?;
            dir
        }
    };
    let path = context.tracker.export_to_path(&target)?;
    io::print_success(format!("Exported backup to {}.", path.display()));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let Some(path) = parsed.positional.first() else {
        return Err(CommandError::InvalidArguments("usage: import <path> [--yes]".into()));
    };
    let has_data = context.tracker.stats() != DataStats::default();
    let prompt = "Importing replaces all current data. Continue?";
    if !context.confirm(prompt, parsed.switch("yes") || !has_data)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let stats = context.tracker.import_from_path(&PathBuf::from(path))?;
    io::print_success(format!(
        "Imported {} card(s), {} perk(s) and {} usage record(s).",
        stats.cards, stats.perks, stats.usage_buckets
    ));
    let dangling = context.tracker.registry().dangling_perks();
    if !dangling.is_empty() {
        io::print_warning(format!(
            "{} perk(s) reference a card missing from the backup and are hidden \
             from the checklist.",
            dangling.len()
        ));
    }
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let stats = context.tracker.stats();
    output_section("Data");
    io::print_info(format!("  Cards        : {}", stats.cards));
    io::print_info(format!("  Perks        : {}", stats.perks));
    io::print_info(format!("  Usage records: {}", stats.usage_buckets));
    if let Some(location) = context.tracker.storage().location() {
        io::print_info(format!("  Stored in    : {}", location.display()));
    }
    Ok(())
}

fn cmd_prune(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.tracker.prune_orphaned_usage() {
        0 => io::print_info("No orphaned usage records."),
        removed => io::print_success(format!("Removed {removed} orphaned usage record(s).")),
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    if !context.confirm(
        "Delete all cards, perks and usage? This cannot be undone.",
        parsed.switch("yes"),
    )? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    context.tracker.clear_all()?;
    io::print_success("All local data cleared.");
    Ok(())
}
