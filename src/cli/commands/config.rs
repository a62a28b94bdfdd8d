use super::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::config::Config;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1].to_lowercase();
            let value = args[2..].join(" ");
            set_config_value(context, &key, value.trim())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`"
        ))),
    }
}

fn show_config(context: &mut ShellContext) -> CommandResult {
    output_section("Configuration");
    for (key, value) in context.config.entries() {
        io::print_info(format!("  {key:<20}: {value}"));
    }
    io::print_info(format!(
        "  {:<20}: {}",
        "file",
        context.config_manager.path().display()
    ));
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let previous_dir = context.config.remote_dir.clone();
    context.config.set(key, value)?;
    context.persist_config()?;

    match key {
        "default_card_color" => context
            .tracker
            .set_default_color(context.config.default_card_color.clone()),
        "screen_reader_mode" => context.apply_output_preferences(),
        "remote_dir" | "remote_file_name" => {
            if key == "remote_dir" && context.config.remote_dir.is_none() {
                context.tracker.detach_sync();
            } else if let Some(dir) = context.config.remote_dir.clone() {
                if key == "remote_file_name" || previous_dir.as_ref() != Some(&dir) {
                    context.attach_remote(dir)?;
                }
            }
        }
        _ => {}
    }

    io::print_success(format!("Set {key} = {value}."));
    Ok(())
}
