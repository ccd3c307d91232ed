//! # pamwatch
//!
//! Privileged-access membership auditor for Microsoft Entra.
//!
//! pamwatch shells out to the Azure CLI to enumerate user principals
//! and their group memberships, filters them against a configured set
//! of admin groups, prints the resulting mapping, and persists it as a
//! dated snapshot. A later run in `--report` mode diffs the two most
//! recent snapshots and prints only the membership changes.
//!
//! ## Quick start
//!
//! ```bash
//! pamwatch --config ./check_pam_config.json   # live audit + snapshot
//! pamwatch --report                           # diff the two latest snapshots
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use pamwatch::collector::collect_admin_membership;
//! use pamwatch::azure::AzCli;
//! use pamwatch::config::PamConfig;
//! use std::path::Path;
//!
//! let config = PamConfig::load(Path::new("./check_pam_config.json"))?;
//! let az = AzCli::new(false);
//! let collection = collect_admin_membership(&az, &config, false, None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod args;
pub mod azure;
pub mod cli;
pub mod collector;
pub mod config;
pub mod diff;
pub mod error;
pub mod progress;
pub mod report;
pub mod snapshot;

pub use collector::AdminGroups;
pub use error::AuditError;
