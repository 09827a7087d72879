// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use srtmerge::app_config::{Config, LogLevel};
use srtmerge::app_controller::{Controller, MergeRequest};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge two subtitle files (default command)
    Merge(MergeArgs),

    /// Generate shell completions for srtmerge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct MergeArgs {
    /// Subtitle shown first at equal timestamps
    #[arg(value_name = "UPPER_SUB")]
    upper_sub: PathBuf,

    /// Second subtitle
    #[arg(value_name = "LOWER_SUB")]
    lower_sub: PathBuf,

    #[command(flatten)]
    flags: MergeFlags,
}

#[derive(Args, Debug, Clone)]
struct MergeFlags {
    /// Make upper sub yellow
    #[arg(long)]
    upper_yellow: bool,

    /// Make lower sub yellow
    #[arg(long)]
    lower_yellow: bool,

    /// Place upper subs on top
    #[arg(long)]
    top: bool,

    /// Path of the output file or folder. Default: folder of UPPER_SUB / '{upper}_{lower}_merged.srt'
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Encoding of the merged file (e.g. 'utf-8', 'utf-16', 'windows-1256')
    #[arg(short, long)]
    encoding: Option<String>,

    /// Encoding of UPPER_SUB, detected when omitted
    #[arg(long)]
    upper_encoding: Option<String>,

    /// Encoding of LOWER_SUB, detected when omitted
    #[arg(long)]
    lower_encoding: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "srtmerge.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// srtmerge - merge SubRip subtitles
///
/// Merges two .srt files into one so that both are displayed at once,
/// whatever encoding each of them uses.
#[derive(Parser, Debug)]
#[command(name = "srtmerge")]
#[command(version)]
#[command(about = "Merge two SubRip subtitles into one (supports only .srt subs)")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "srtmerge merges two SubRip subtitle files into a single file that displays both.

EXAMPLES:
    srtmerge en.srt fa.srt                          # Writes en_fa_merged.srt next to en.srt
    srtmerge --lower-yellow --top en.srt fa.srt     # Tint fa.srt, place en.srt at the top
    srtmerge -o out/ en.srt fa.srt                  # Write into an existing directory
    srtmerge --lower-encoding cp1256 en.srt fa.srt  # Skip detection for fa.srt
    srtmerge -e utf-16 en.srt fa.srt                # UTF-16 output with BOM
    srtmerge completions bash > srtmerge.bash       # Generate bash completions

CONFIGURATION:
    Settings are read from srtmerge.json when it exists. Use --config-path to
    point at another file. Command line flags win over the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle shown first at equal timestamps
    #[arg(value_name = "UPPER_SUB")]
    upper_sub: Option<PathBuf>,

    /// Second subtitle
    #[arg(value_name = "LOWER_SUB")]
    lower_sub: Option<PathBuf>,

    #[command(flatten)]
    flags: MergeFlags,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Filtering is left to max_level so --log-level can raise it later
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "srtmerge", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Merge(args)) => run_merge(args),
        None => {
            // Default behavior - use top-level args
            let (Some(upper_sub), Some(lower_sub)) = (cli.upper_sub, cli.lower_sub) else {
                return Err(anyhow!("UPPER_SUB and LOWER_SUB are required when no subcommand is specified"));
            };
            run_merge(MergeArgs {
                upper_sub,
                lower_sub,
                flags: cli.flags,
            })
        }
    }
}

fn run_merge(args: MergeArgs) -> Result<()> {
    let flags = args.flags;

    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = &flags.log_level {
        let level: LogLevel = cli_level.clone().into();
        log::set_max_level(level.into());
    }

    let mut config = Config::load_or_default(&flags.config_path)?;

    // Override config with CLI options if provided
    if let Some(encoding) = &flags.encoding {
        config.output_encoding = encoding.clone();
    }
    if let Some(cli_level) = &flags.log_level {
        config.log_level = cli_level.clone().into();
    }
    log::set_max_level(config.log_level.clone().into());

    let controller = Controller::with_config(config)?;
    controller.run(&MergeRequest {
        upper_sub: args.upper_sub,
        lower_sub: args.lower_sub,
        upper_yellow: flags.upper_yellow,
        lower_yellow: flags.lower_yellow,
        top: flags.top,
        output: flags.output,
        upper_encoding: flags.upper_encoding,
        lower_encoding: flags.lower_encoding,
    })?;

    Ok(())
}
