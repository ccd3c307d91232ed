//! Snapshot comparison for membership change detection.
//!
//! Compares two admin-group mappings and keeps only the differences:
//! members added and removed, plus groups that appeared or vanished.
//! Unchanged members are never reported. A group with no previous
//! snapshot entry is informational, not a flagged change.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::collector::AdminGroups;
use crate::snapshot::AuditSnapshot;

/// Membership changes within a single admin group
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupDelta {
    /// Principals present now but not in the previous snapshot
    pub added: Vec<String>,
    /// Principals present previously but gone now
    pub removed: Vec<String>,
}

impl GroupDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Result of comparing two admin-group mappings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MembershipDiff {
    /// Per-group member changes; groups with no change are absent
    pub groups: BTreeMap<String, GroupDelta>,
    /// Groups with no previous snapshot entry (informational)
    pub new_groups: Vec<String>,
    /// Groups present previously but absent from the current mapping
    pub removed_groups: Vec<String>,
}

impl MembershipDiff {
    /// Compare a previous mapping against the current one.
    pub fn compare(previous: &AdminGroups, current: &AdminGroups) -> Self {
        let mut diff = MembershipDiff::default();

        for (group, members) in current {
            let Some(prev_members) = previous.get(group) else {
                diff.new_groups.push(group.clone());
                continue;
            };

            let prev: HashSet<&str> = prev_members.iter().map(String::as_str).collect();
            let cur: HashSet<&str> = members.iter().map(String::as_str).collect();

            let mut delta = GroupDelta::default();
            for member in members {
                if !prev.contains(member.as_str()) {
                    delta.added.push(member.clone());
                }
            }
            for member in prev_members {
                if !cur.contains(member.as_str()) {
                    delta.removed.push(member.clone());
                }
            }

            if !delta.is_empty() {
                diff.groups.insert(group.clone(), delta);
            }
        }

        // A vanished group reports its full prior membership as removals.
        for (group, members) in previous {
            if !current.contains_key(group) {
                diff.removed_groups.push(group.clone());
                diff.groups.insert(
                    group.clone(),
                    GroupDelta {
                        added: Vec::new(),
                        removed: members.clone(),
                    },
                );
            }
        }

        diff
    }

    pub fn compare_snapshots(previous: &AuditSnapshot, current: &AuditSnapshot) -> Self {
        Self::compare(&previous.admin_groups, &current.admin_groups)
    }

    /// True when nothing changed at all
    pub fn is_clean(&self) -> bool {
        self.groups.is_empty() && self.new_groups.is_empty() && self.removed_groups.is_empty()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let added: usize = self.groups.values().map(|d| d.added.len()).sum();
        let removed: usize = self.groups.values().map(|d| d.removed.len()).sum();

        let mut parts = Vec::new();
        if added > 0 {
            parts.push(format!("{} members added", added));
        }
        if removed > 0 {
            parts.push(format!("{} members removed", removed));
        }
        if !self.new_groups.is_empty() {
            parts.push(format!("{} new admin groups", self.new_groups.len()));
        }
        if !self.removed_groups.is_empty() {
            parts.push(format!("{} admin groups dropped", self.removed_groups.len()));
        }

        if parts.is_empty() {
            "no membership changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}
