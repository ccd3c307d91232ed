//! Azure CLI subprocess client.
//!
//! Every directory read goes through the `az` binary. Commands are
//! built as strings, sanitized, gated on the program name, then
//! whitespace-tokenized and executed as an argument vector with no
//! intermediate shell. Standard error is inspected for the login hint
//! before stdout is parsed.

use std::process::{Command, Output, Stdio};

use serde::Deserialize;

use crate::error::AuditError;

/// Program name every constructed command must start with
pub const AZ_PROGRAM: &str = "az";

/// Substring on stderr that means there is no live CLI session
const LOGIN_HINT: &str = "az login";

/// Shell metacharacters replaced with placeholder words before the
/// program-name gate. The replaced form is authoritative.
const REPLACE_MAP: &[(char, &str)] = &[
    (';', "wasSemicolon"),
    ('\'', "wasApostrophe"),
    ('"', "wasQuote"),
    ('$', "wasQuestion"),
    ('!', "wasPling"),
    ('&', "wasAmpersand"),
];

/// A user principal as returned by `az ad user list`
#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryUser {
    #[serde(rename = "userPrincipalName")]
    pub user_principal_name: String,
}

/// A single group membership as returned by `az ad user get-member-groups`
#[derive(Clone, Debug, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Replace each mapped metacharacter with its placeholder word.
pub fn sanitize(raw: &str) -> String {
    let mut sanitized = raw.to_string();
    for (ch, replacement) in REPLACE_MAP {
        sanitized = sanitized.replace(*ch, replacement);
    }
    sanitized
}

/// Read-only directory access. `AzCli` is the live implementation;
/// tests substitute a stub at this seam.
pub trait Directory {
    /// Enumerate all user principals in the tenant.
    fn list_users(&self) -> Result<Vec<DirectoryUser>, AuditError>;

    /// Fetch the group memberships of one principal.
    fn member_groups(&self, principal: &str) -> Result<Vec<GroupRecord>, AuditError>;
}

/// Directory client backed by the `az` subprocess
pub struct AzCli {
    debug: bool,
}

impl AzCli {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Sanitize, gate, tokenize, and run one command line. Blocks until
    /// the subprocess exits with both output streams fully drained.
    fn exec(&self, command_line: &str) -> Result<Output, AuditError> {
        let to_execute = sanitize(command_line);
        if !to_execute.starts_with(AZ_PROGRAM) {
            return Err(AuditError::InjectionSuspected(to_execute));
        }

        if self.debug {
            eprintln!("[pamwatch] executing command: {}", to_execute);
        }

        let mut parts = to_execute.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AuditError::CommandFailed("empty command".to_string()))?;
        let output = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| AuditError::CommandFailed(format!("{}: {}", to_execute, e)))?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains(LOGIN_HINT) {
                return Err(AuditError::NoSession(stderr.trim().to_string()));
            }
            // Non-login stderr noise: surfaced in debug mode, stdout
            // still parsed.
            if self.debug {
                eprintln!("[pamwatch] az wrote to stderr: {}", stderr.trim());
            }
        }

        Ok(output)
    }

    /// Confirm a live session with a read-only "who am I" query. Hard
    /// precondition: no data fetch may run until this succeeds.
    pub fn ensure_session(&self) -> Result<(), AuditError> {
        self.exec("az ad signed-in-user show")?;
        Ok(())
    }
}

impl Directory for AzCli {
    fn list_users(&self) -> Result<Vec<DirectoryUser>, AuditError> {
        let output = self.exec("az ad user list")?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| AuditError::ParseFailure(format!("user list: {}", e)))
    }

    fn member_groups(&self, principal: &str) -> Result<Vec<GroupRecord>, AuditError> {
        let output = self.exec(&format!("az ad user get-member-groups --id {}", principal))?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| AuditError::ParseFailure(format!("groups for {}: {}", principal, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_every_metacharacter() {
        let raw = r#"az ad user list; echo 'x' "y" $HOME ! &"#;
        let sanitized = sanitize(raw);
        assert!(!sanitized.contains(';'));
        assert!(!sanitized.contains('\''));
        assert!(!sanitized.contains('"'));
        assert!(!sanitized.contains('$'));
        assert!(!sanitized.contains('!'));
        assert!(!sanitized.contains('&'));
        assert!(sanitized.contains("wasSemicolon"));
        assert!(sanitized.contains("wasApostrophe"));
        assert!(sanitized.contains("wasQuote"));
        assert!(sanitized.contains("wasQuestion"));
        assert!(sanitized.contains("wasPling"));
        assert!(sanitized.contains("wasAmpersand"));
    }

    #[test]
    fn sanitize_replaces_repeated_occurrences() {
        assert_eq!(sanitize(";;"), "wasSemicolonwasSemicolon");
    }

    #[test]
    fn sanitize_leaves_clean_commands_alone() {
        let raw = "az ad user get-member-groups --id alice@example.com";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn gate_rejects_commands_not_starting_with_az() {
        let az = AzCli::new(false);
        let err = az.exec("rm -rf /").unwrap_err();
        assert!(matches!(err, AuditError::InjectionSuspected(_)));
    }

    #[test]
    fn gate_judges_the_replaced_form_not_the_original() {
        // "'az ..." contains the program name at offset 1, but after
        // replacement the string starts with wasApostrophe and must be
        // rejected.
        let az = AzCli::new(false);
        let err = az.exec("'az ad user list'").unwrap_err();
        match err {
            AuditError::InjectionSuspected(cmd) => {
                assert!(cmd.starts_with("wasApostrophe"));
            }
            other => panic!("expected InjectionSuspected, got {}", other),
        }
    }

    #[test]
    fn gate_rejects_prefixed_metacharacters() {
        let az = AzCli::new(false);
        for raw in [";az ad user list", "!az ad user list", "$az ad user list"] {
            let err = az.exec(raw).unwrap_err();
            assert!(matches!(err, AuditError::InjectionSuspected(_)), "{}", raw);
        }
    }

    #[test]
    fn spawn_failure_is_command_failed_not_injection() {
        // Passes the prefix gate (string starts with "az") but names a
        // program that does not exist.
        let az = AzCli::new(false);
        let err = az.exec("az-no-such-binary-on-any-path --x").unwrap_err();
        assert!(matches!(err, AuditError::CommandFailed(_)));
    }
}
