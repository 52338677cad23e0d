use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file with `type,parameters` call rows
    pub input: String,

    /// Seconds a call may wait for its response
    #[arg(short = 't', long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Logging level: off, error, warn, info, debug, trace
    #[arg(short = 'v', long, default_value = "info")]
    pub log_level: String,

    /// Logging file path; logs go to stderr when not given
    #[arg(short = 'f', long)]
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_to_stderr() {
        let cli = Cli::try_parse_from(["host-bridge", "calls.csv"]).unwrap();

        assert_eq!(cli.input, "calls.csv");
        assert_eq!(cli.timeout_secs, 10);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn log_file_is_accepted_short_and_long() {
        let short = Cli::try_parse_from(["host-bridge", "-f", "bridge.log", "calls.csv"]).unwrap();
        let long =
            Cli::try_parse_from(["host-bridge", "--log-file", "bridge.log", "calls.csv"]).unwrap();

        assert_eq!(short.log_file.as_deref(), Some("bridge.log"));
        assert_eq!(long.log_file.as_deref(), Some("bridge.log"));
    }
}
