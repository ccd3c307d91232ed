use pamwatch::cli::{EntryOptions, run};

fn main() -> std::io::Result<()> {
    run(&EntryOptions {
        binary_name: "pamwatch",
        show_banner: true,
        usage: USAGE,
    })
}

const USAGE: &str = "pamwatch - Privileged access membership audit for Microsoft Entra\n\n\
Checks the membership of configured admin groups against Entra via the\n\
Azure CLI, saves a dated snapshot, and reports changes between runs.\n\n\
Usage:\n  \
  pamwatch [flags]               Live check + snapshot\n  \
  pamwatch --report [flags]      Diff the two most recent snapshots\n\n\
Flags:\n  \
  --outputdir <dir>    Directory for saving the current snapshot (default .)\n  \
  --inputdir <dir>     Directory searched for previous snapshots (default .)\n  \
  --config <file>      Config file path (default ./check_pam_config.json)\n  \
  --outputfile <name>  Snapshot file name (default DDMMYY_SS_pam.json)\n  \
  --report             Don't do a live check, report on previous snapshots\n  \
  --json               Machine-readable output\n  \
  --debug              Enable debug mode (very verbose)\n  \
  -h, --help           Show this help\n  \
  -V, --version        Show version\n\n\
Config file:\n  \
  {\"admingroups\": [\"Global Admins\", \"PIM Approvers\"]}\n\n\
A live run requires an authenticated Azure CLI session (az login).\n";
