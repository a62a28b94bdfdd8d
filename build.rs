use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    println!("cargo:rustc-env=PERK_CORE_BUILD_HASH={hash}");

    let status = match command_output("git", &["status", "--porcelain"]).as_str() {
        "unknown" => "unknown",
        "" => "clean",
        _ => "dirty",
    };
    println!("cargo:rustc-env=PERK_CORE_BUILD_STATUS={status}");

    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    println!("cargo:rustc-env=PERK_CORE_BUILD_TIMESTAMP={timestamp}");

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".to_string());
    println!("cargo:rustc-env=PERK_CORE_BUILD_TARGET={target}");

    let rustc = command_output("rustc", &["--version"]);
    println!("cargo:rustc-env=PERK_CORE_BUILD_RUSTC={rustc}");
}

/// Runs a tool and returns its trimmed stdout, or `unknown` when it is unavailable.
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
