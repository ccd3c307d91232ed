//! Admin-membership aggregation.
//!
//! One sequential pass over the directory: users in reader order, each
//! user's memberships filtered against the configured admin set. No
//! deduplication and no sorting of members — the mapping records what
//! the directory returned.

use std::collections::{BTreeMap, HashSet};

use crate::azure::Directory;
use crate::config::PamConfig;
use crate::error::AuditError;
use crate::progress::Spinner;

/// Admin group display name -> member principals, in reader order
pub type AdminGroups = BTreeMap<String, Vec<String>>;

/// Hard cap on users examined in a single run. A safety bound against
/// runaway tenants, not an error.
pub const MAX_USERS_CHECKED: usize = 10_000;

/// Principals with this prefix are platform accounts and never checked
pub const PLATFORM_ACCOUNT_PREFIX: &str = "A";

/// Result of one collection pass
#[derive(Debug)]
pub struct Collection {
    /// Membership of the configured admin groups
    pub admin_groups: AdminGroups,
    /// Principals returned by the directory
    pub users_found: usize,
    /// Principals whose memberships were fetched and recorded
    pub users_checked: usize,
    /// Platform accounts excluded from the scan
    pub users_skipped: usize,
}

/// Walk the directory and record which configured admin groups each
/// principal belongs to.
///
/// Fatal errors propagate; a parse failure on the user list degrades to
/// an empty scan, and a failure on one user's group list skips only
/// that user.
pub fn collect_admin_membership(
    directory: &dyn Directory,
    config: &PamConfig,
    debug: bool,
    progress: Option<&Spinner>,
) -> Result<Collection, AuditError> {
    let users = match directory.list_users() {
        Ok(users) => users,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => {
            eprintln!("[pamwatch][warn] {}", err);
            Vec::new()
        }
    };

    if debug {
        for user in &users {
            eprintln!("[pamwatch] found user {}", user.user_principal_name);
        }
    }

    let admin_set: HashSet<&str> = config.admingroups.iter().map(String::as_str).collect();
    let mut admin_groups = AdminGroups::new();
    let mut users_checked = 0usize;
    let mut users_skipped = 0usize;

    for user in &users {
        if users_checked == MAX_USERS_CHECKED {
            break;
        }

        let name = &user.user_principal_name;
        if name.starts_with(PLATFORM_ACCOUNT_PREFIX) {
            users_skipped += 1;
            continue;
        }

        if let Some(spinner) = progress {
            spinner.set_message(&format!("{} checked · {}", users_checked, name));
        }
        if debug {
            eprintln!("[pamwatch] checking user {}", name);
        }

        let groups = match directory.member_groups(name) {
            Ok(groups) => groups,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                eprintln!("[pamwatch][warn] skipping {}: {}", name, err);
                continue;
            }
        };

        for group in &groups {
            if admin_set.contains(group.display_name.as_str()) {
                if debug {
                    eprintln!(
                        "[pamwatch] {} is in admin group {}",
                        name, group.display_name
                    );
                }
                admin_groups
                    .entry(group.display_name.clone())
                    .or_default()
                    .push(name.clone());
            }
        }

        users_checked += 1;
    }

    Ok(Collection {
        admin_groups,
        users_found: users.len(),
        users_checked,
        users_skipped,
    })
}
