//! Command-line flag parsing.

use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Parsed command-line flags
#[derive(Debug)]
pub struct ParsedArgs {
    /// Directory for saving the current snapshot
    pub output_dir: PathBuf,
    /// Directory searched for previous snapshots in report mode
    pub input_dir: PathBuf,
    /// Config file path
    pub config_path: PathBuf,
    /// Explicit snapshot file name; default is DDMMYY_SS_pam.json
    pub output_file: Option<String>,
    /// Verbose tracing
    pub debug: bool,
    /// Don't do a live check; report on previous snapshots
    pub report: bool,
    /// Machine-readable output
    pub json: bool,
    pub show_help: bool,
    pub show_version: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            input_dir: PathBuf::from("."),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            output_file: None,
            debug: false,
            report: false,
            json: false,
            show_help: false,
            show_version: false,
        }
    }
}

pub fn parse_args() -> Result<ParsedArgs, String> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    parse_from(&raw)
}

/// Parse a raw argument list. Both `--flag value` and `--flag=value`
/// forms are accepted; unknown flags warn and are ignored.
pub fn parse_from(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                parsed.show_help = true;
                i += 1;
            }
            "--version" | "-V" => {
                parsed.show_version = true;
                i += 1;
            }
            "--debug" => {
                parsed.debug = true;
                i += 1;
            }
            "--report" => {
                parsed.report = true;
                i += 1;
            }
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            "--outputdir" => {
                let next = args
                    .get(i + 1)
                    .ok_or_else(|| "--outputdir requires a directory path".to_string())?;
                parsed.output_dir = PathBuf::from(next);
                i += 2;
            }
            _ if arg.starts_with("--outputdir=") => {
                parsed.output_dir = PathBuf::from(arg.trim_start_matches("--outputdir="));
                i += 1;
            }
            "--inputdir" => {
                let next = args
                    .get(i + 1)
                    .ok_or_else(|| "--inputdir requires a directory path".to_string())?;
                parsed.input_dir = PathBuf::from(next);
                i += 2;
            }
            _ if arg.starts_with("--inputdir=") => {
                parsed.input_dir = PathBuf::from(arg.trim_start_matches("--inputdir="));
                i += 1;
            }
            "--config" => {
                let next = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a file path".to_string())?;
                parsed.config_path = PathBuf::from(next);
                i += 2;
            }
            _ if arg.starts_with("--config=") => {
                parsed.config_path = PathBuf::from(arg.trim_start_matches("--config="));
                i += 1;
            }
            "--outputfile" => {
                let next = args
                    .get(i + 1)
                    .ok_or_else(|| "--outputfile requires a file name".to_string())?;
                parsed.output_file = Some(next.clone());
                i += 2;
            }
            _ if arg.starts_with("--outputfile=") => {
                parsed.output_file = Some(arg.trim_start_matches("--outputfile=").to_string());
                i += 1;
            }
            _ if arg.starts_with('-') => {
                eprintln!("Ignoring unknown flag {}", arg);
                i += 1;
            }
            _ => {
                return Err(format!(
                    "Unexpected argument '{}'. pamwatch takes flags only.",
                    arg
                ));
            }
        }
    }

    Ok(parsed)
}
