use std::path::PathBuf;

use super::{require, CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::config::parse_flag;
use crate::core::errors::PerkError;
use crate::sync::SyncError;

const USAGE: &str = "sync <connect <dir>|push|pull [--yes]|auto <on|off>|status|disconnect>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "sync",
        "Back up to and restore from a remote folder",
        USAGE,
        cmd_sync,
    )]
}

fn cmd_sync(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return sync_status(context);
    };
    match sub.to_lowercase().as_str() {
        "connect" => sync_connect(context, &args[1..]),
        "push" => sync_push(context),
        "pull" => sync_pull(context, &args[1..]),
        "auto" => sync_auto(context, &args[1..]),
        "status" => sync_status(context),
        "disconnect" => sync_disconnect(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown sync subcommand `{other}`"
        ))),
    }
}

fn sync_connect(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let dir = PathBuf::from(require(args.first(), "sync connect <dir>")?);
    context.attach_remote(dir.clone())?;
    context.config.remote_dir = Some(dir.clone());
    context.persist_config()?;
    io::print_success(format!("Connected to {}.", dir.display()));
    Ok(())
}

fn sync_push(context: &mut ShellContext) -> CommandResult {
    let file_id = context.tracker.push_to_remote().map_err(sync_failure)?;
    io::print_success(format!("Backed up to remote file `{file_id}`."));
    Ok(())
}

fn sync_pull(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    if context.tracker.sync().is_none() {
        return Err(sync_failure(SyncError::NotConnected.into()));
    }
    if !context.confirm(
        "Restoring replaces all local data with the remote backup. Continue?",
        parsed.switch("yes"),
    )? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let stats = context.tracker.pull_from_remote().map_err(sync_failure)?;
    io::print_success(format!(
        "Restored {} card(s), {} perk(s) and {} usage record(s).",
        stats.cards, stats.perks, stats.usage_buckets
    ));
    Ok(())
}

fn sync_auto(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = require(args.first(), "sync auto <on|off>")?;
    let enabled = parse_flag(raw)
        .ok_or_else(|| CommandError::InvalidArguments("usage: sync auto <on|off>".into()))?;
    context.tracker.set_auto_sync(enabled).map_err(sync_failure)?;
    let label = if enabled { "on" } else { "off" };
    io::print_success(format!("Auto-sync {label}."));
    Ok(())
}

fn sync_status(context: &mut ShellContext) -> CommandResult {
    output_section("Sync");
    let Some(manager) = context.tracker.sync() else {
        io::print_info("  Not connected. Use `sync connect <dir>`.");
        return Ok(());
    };
    let state = manager.state();
    io::print_info(format!("  Remote       : {}", manager.describe_remote()));
    io::print_info(format!("  File name    : {}", manager.file_name()));
    io::print_info(format!(
        "  File id      : {}",
        state.file_id.as_deref().unwrap_or("(none yet)")
    ));
    io::print_info(format!(
        "  Auto-sync    : {}",
        if state.auto_sync { "on" } else { "off" }
    ));
    io::print_info(format!(
        "  Last sync    : {}",
        state
            .last_sync
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".into())
    ));
    Ok(())
}

fn sync_disconnect(context: &mut ShellContext) -> CommandResult {
    let Some(mut manager) = context.tracker.detach_sync() else {
        io::print_info("Not connected.");
        return Ok(());
    };
    manager.disconnect().map_err(PerkError::from)?;
    context.config.remote_dir = None;
    context.persist_config()?;
    io::print_success("Disconnected from remote.");
    Ok(())
}

/// Sync failures are reported as plain status messages.
fn sync_failure(err: PerkError) -> CommandError {
    match err {
        PerkError::Sync(SyncError::NotConnected) => CommandError::Message(
            "Not connected to a remote. Use `sync connect <dir>` first.".into(),
        ),
        PerkError::Sync(SyncError::NoRemoteBackup) => {
            CommandError::Message("No backup found on the remote.".into())
        }
        PerkError::Sync(inner) => CommandError::Message(format!("Sync failed: {inner}")),
        PerkError::Import(inner) => CommandError::Message(format!("Sync failed: {inner}")),
        other => CommandError::Core(other),
    }
}
