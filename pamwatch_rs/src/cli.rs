//! Shared CLI entry point for the `pamwatch` binary.
//!
//! Dispatches between the live audit (config → session gate → scan →
//! print → snapshot) and report mode (diff the two most recent
//! snapshots, no live directory read).

use std::io;
use std::time::Instant;

use anyhow::Context;
use console::style;

use crate::args::{self, ParsedArgs};
use crate::azure::AzCli;
use crate::collector::collect_admin_membership;
use crate::config::PamConfig;
use crate::diff::MembershipDiff;
use crate::progress::{self, Spinner, format_count, format_duration};
use crate::report;
use crate::snapshot::{self, AuditSnapshot};

/// Options controlling binary-specific behavior
pub struct EntryOptions {
    /// Name shown in `--version` output
    pub binary_name: &'static str,
    /// If true, show the banner before dispatch
    pub show_banner: bool,
    /// Usage text for `--help`
    pub usage: &'static str,
}

/// Run the CLI with the given options. This is the shared main() body.
pub fn run(opts: &EntryOptions) -> io::Result<()> {
    let parsed = match args::parse_args() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if parsed.show_help {
        println!("{}", opts.usage);
        return Ok(());
    }
    if parsed.show_version {
        println!("{} {}", opts.binary_name, env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if opts.show_banner && !parsed.json {
        print_banner(opts.binary_name);
    }
    if parsed.debug {
        eprintln!("[pamwatch] args are {:?}", parsed);
    }

    let result = if parsed.report {
        run_report(&parsed)
    } else {
        run_audit(&parsed)
    };

    if let Err(err) = result {
        progress::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

fn print_banner(binary_name: &str) {
    println!(
        "{} {} - privileged access membership audit",
        style(binary_name).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

/// Live audit: config, session gate, directory scan, print, snapshot.
fn run_audit(parsed: &ParsedArgs) -> anyhow::Result<()> {
    let config = PamConfig::load(&parsed.config_path)?;
    if parsed.debug {
        eprintln!(
            "[pamwatch] admin groups under watch: {:?}",
            config.admingroups
        );
    }

    // With --json only the payload goes to stdout.
    let chatty = !parsed.json;

    let az = AzCli::new(parsed.debug);

    let spinner = chatty.then(|| Spinner::new("Checking for a live Azure session..."));
    match az.ensure_session() {
        Ok(()) => {
            if let Some(spinner) = &spinner {
                spinner.finish_success("Azure session found, continuing");
            }
        }
        Err(err) => {
            if let Some(spinner) = &spinner {
                spinner.finish_error("No live Azure session");
            }
            return Err(err.into());
        }
    }

    if chatty {
        println!("Checking group membership, this will take some time");
    }
    let start = Instant::now();
    let spinner = chatty.then(|| Spinner::new("Enumerating users..."));
    let collection =
        match collect_admin_membership(&az, &config, parsed.debug, spinner.as_ref()) {
            Ok(collection) => collection,
            Err(err) => {
                if let Some(spinner) = &spinner {
                    spinner.finish_error("Directory scan failed");
                }
                return Err(err.into());
            }
        };
    if let Some(spinner) = &spinner {
        spinner.finish_success(&format!(
            "{} in the directory, {} checked, {} platform accounts skipped in {}",
            format_count(collection.users_found, "user", "users"),
            collection.users_checked,
            collection.users_skipped,
            format_duration(start.elapsed())
        ));
    }

    let snapshot = AuditSnapshot::new(collection.admin_groups, collection.users_checked);

    if parsed.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?
        );
    } else {
        report::print_membership(&snapshot.admin_groups);
    }

    let path = snapshot
        .save(&parsed.output_dir, parsed.output_file.as_deref())
        .with_context(|| format!("saving snapshot under {}", parsed.output_dir.display()))?;

    if chatty {
        progress::success(&format!("Snapshot saved to {}", path.display()));
        let saved = snapshot::list_snapshots(&parsed.output_dir)
            .map(|s| s.len())
            .unwrap_or(0);
        if saved > 1 {
            progress::info("Run with --report to see changes since the previous snapshot");
        }
    }

    Ok(())
}

/// Report mode: diff the two most recent snapshots in the input
/// directory. No live check.
fn run_report(parsed: &ParsedArgs) -> anyhow::Result<()> {
    let snapshots = snapshot::list_snapshots(&parsed.input_dir)
        .with_context(|| format!("reading snapshots from {}", parsed.input_dir.display()))?;

    if snapshots.len() < 2 {
        match snapshots.last() {
            Some(only) => progress::info(&format!(
                "Only one snapshot in {} ({}); nothing to compare yet",
                parsed.input_dir.display(),
                only.file_name().unwrap_or_default().to_string_lossy()
            )),
            None => progress::warning(&format!(
                "No snapshots found in {}; run a live check first",
                parsed.input_dir.display()
            )),
        }
        return Ok(());
    }

    let previous_path = &snapshots[snapshots.len() - 2];
    let latest_path = &snapshots[snapshots.len() - 1];

    let previous = AuditSnapshot::load(previous_path)
        .with_context(|| format!("loading {}", previous_path.display()))?;
    let latest = AuditSnapshot::load(latest_path)
        .with_context(|| format!("loading {}", latest_path.display()))?;

    let diff = MembershipDiff::compare_snapshots(&previous, &latest);

    if parsed.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&diff).context("serializing diff")?
        );
    } else {
        println!("Membership changes:");
        println!("  From: {}", previous_path.display());
        println!("  To:   {}", latest_path.display());
        println!();
        report::print_diff(&diff);
    }

    Ok(())
}
