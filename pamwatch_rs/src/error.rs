//! Error types for the audit pipeline.
//!
//! Fatal kinds abort the run at the CLI boundary; the rest are logged
//! and the scan continues (a parse failure skips one user, a command
//! failure skips one fetch).

use std::io;

/// Error type for audit operations
#[derive(Debug)]
pub enum AuditError {
    /// Config file not found or unreadable
    ConfigMissing(String),
    /// Config file exists but is not valid JSON with an `admingroups` key
    ConfigMalformed(String),
    /// The Azure CLI reported that no login session is active
    NoSession(String),
    /// A constructed command did not start with the CLI program name
    /// after sanitization
    InjectionSuspected(String),
    /// Subprocess could not be spawned or waited on
    CommandFailed(String),
    /// CLI output was not the JSON shape we expect
    ParseFailure(String),
    /// IO error
    Io(io::Error),
}

impl AuditError {
    /// Fatal errors terminate the run; everything else is logged and
    /// the scan moves on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AuditError::ConfigMissing(_)
                | AuditError::ConfigMalformed(_)
                | AuditError::NoSession(_)
                | AuditError::InjectionSuspected(_)
        )
    }
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::ConfigMissing(path) => {
                write!(f, "no config file found: {}", path)
            }
            AuditError::ConfigMalformed(msg) => {
                write!(f, "config file is not usable: {}", msg)
            }
            AuditError::NoSession(stderr) => {
                write!(
                    f,
                    "you do not appear to have a current Azure login session ({})",
                    stderr
                )
            }
            AuditError::InjectionSuspected(cmd) => {
                write!(
                    f,
                    "command injection attempt? command must start with 'az', was '{}' (after sanitization)",
                    cmd
                )
            }
            AuditError::CommandFailed(msg) => {
                write!(f, "unable to execute command: {}", msg)
            }
            AuditError::ParseFailure(msg) => {
                write!(f, "could not parse az output as valid JSON: {}", msg)
            }
            AuditError::Io(e) => {
                write!(f, "IO error: {}", e)
            }
        }
    }
}

impl std::error::Error for AuditError {}

impl From<io::Error> for AuditError {
    fn from(e: io::Error) -> Self {
        AuditError::Io(e)
    }
}
