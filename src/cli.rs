use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "conan-scan",
    about = "Analyze Conan 2 projects through `conan graph info`",
    version
)]
pub struct Cli {
    /// Definition file or directory containing conanfile*.txt / conanfile*.py
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.conan-scan/config.toml, fallback ~/.config/conan-scan/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lockfile to analyze against (sets the `lockfileName` option)
    #[arg(long, value_name = "NAME")]
    pub lockfile: Option<String>,

    /// Package manager option as key=value (repeatable)
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Conan executable to invoke
    #[arg(long, value_name = "CMD")]
    pub conan: Option<String>,

    /// Do not check the installed Conan version
    #[arg(long)]
    pub skip_version_check: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "conan-scan",
            "project",
            "--lockfile",
            "conan.lock",
            "--option",
            "foo=bar",
            "--report",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.path, PathBuf::from("project"));
        assert_eq!(cli.lockfile.as_deref(), Some("conan.lock"));
        assert_eq!(cli.options, vec!["foo=bar".to_string()]);
        assert!(matches!(cli.report, ReportFormat::Json));
        assert_eq!(cli.verbose, 2);
    }
}
