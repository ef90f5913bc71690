use {
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file (TOML). Default: ./discheck.toml if present."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "IP list to check against, a URL or a local file. Default: ips.txt"
    )]
    pub ip_list: Option<String>,

    #[arg(long, global = true, help = "File where the check history is kept.")]
    pub history_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Do not read or write the check history.")]
    pub no_history: bool,

    #[arg(long, global = true, help = "Timeout in seconds for each request. Default: 5")]
    pub timeout: Option<u64>,

    #[arg(
        short,
        long,
        global = true,
        help = "Quiet mode, one `domain;ip;discounted` line per check and errors only."
    )]
    pub quiet_flag: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check links or domains. Reads one per line from stdin when none are given.
    Check {
        #[arg(help = "Links or domains to check.")]
        inputs: Vec<String>,
    },

    /// Show the history of past checks, newest first.
    History {
        #[arg(long, help = "Remove all history entries.")]
        clear: bool,
    },

    /// Show IP list statistics.
    Stats,

    /// Expand a file of CIDR subnets into an IP list.
    Expand {
        #[arg(help = "File with one subnet per line.")]
        subnets: PathBuf,

        #[arg(short, long, help = "Output file. Default: stdout")]
        output: Option<PathBuf>,
    },
}
