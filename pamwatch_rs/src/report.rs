//! Console rendering for audit results.

use console::style;

use crate::collector::AdminGroups;
use crate::diff::MembershipDiff;

/// Print the full mapping: one line per group, one indented line per
/// member.
pub fn print_membership(admin_groups: &AdminGroups) {
    if admin_groups.is_empty() {
        println!("No members of any configured admin group were found");
        return;
    }

    for (group, members) in admin_groups {
        println!("Admin group: {}", style(group).cyan().bold());
        for member in members {
            println!("\t{}", member);
        }
    }
}

/// Print a membership delta. Unchanged members are not shown.
pub fn print_diff(diff: &MembershipDiff) {
    println!("Summary: {}", diff.summary());
    println!();

    if diff.is_clean() {
        println!("{} No membership changes detected", style("✓").green().bold());
        return;
    }

    for (group, delta) in &diff.groups {
        println!("Admin group: {}", style(group).cyan().bold());
        for member in &delta.added {
            println!("  {} {}", style("+").green().bold(), member);
        }
        for member in &delta.removed {
            println!("  {} {}", style("-").red().bold(), member);
        }
    }

    if !diff.new_groups.is_empty() {
        println!();
        for group in &diff.new_groups {
            println!(
                "{} new admin group: {} (no previous snapshot entry, not flagged)",
                style("ℹ").blue().bold(),
                group
            );
        }
    }

    if !diff.removed_groups.is_empty() {
        println!();
        for group in &diff.removed_groups {
            println!(
                "{} admin group no longer present: {}",
                style("⚠").yellow().bold(),
                group
            );
        }
    }
}
