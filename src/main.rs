use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use rusty_sheet_merge::config::MergeConfig;
use rusty_sheet_merge::config::SchemaPolicy;
use rusty_sheet_merge::merge::driver::write_error_log;
use rusty_sheet_merge::merge::merge_folder;
use rusty_sheet_merge::merge::MergeReport;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing::info;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SchemaArg {
    /// Canonical record columns
    Fixed,
    /// Every header label seen, in first-seen order
    Union,
}

impl From<SchemaArg> for SchemaPolicy {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Fixed => SchemaPolicy::Fixed,
            SchemaArg::Union => SchemaPolicy::Union,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rusty-sheet-merge", version)]
#[command(about = "Merge change-request log workbooks of a folder into one normalized table")]
struct Args {
    /// Folder holding the workbooks to merge
    #[arg(default_value = ".")]
    folder: PathBuf,

    /// Folder receiving the merged workbook and the error log (default: the input folder)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output file name prefix; inputs starting with it are ignored
    #[arg(short, long)]
    prefix: Option<String>,

    /// File name pattern of input workbooks
    #[arg(long, default_value = "*.xlsx")]
    pattern: String,

    /// Output column set
    #[arg(short, long, value_enum, default_value_t = SchemaArg::Fixed)]
    schema: SchemaArg,

    /// Leading glyph of the header anchor cell
    #[arg(long)]
    header_marker: Option<String>,

    /// Label prefix of the repeating date column
    #[arg(long)]
    date_marker: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<MergeConfig> {
        let mut config = MergeConfig::new(self.folder)
            .with_pattern(&self.pattern)
            .with_context(|| format!("Invalid file pattern '{}'", self.pattern))?;
        config.output_dir = self.output_dir;
        config.schema = self.schema.into();
        if let Some(prefix) = self.prefix {
            config.output_prefix = prefix;
        }
        if let Some(marker) = self.header_marker {
            config.header_marker = marker;
        }
        if let Some(marker) = self.date_marker {
            config.section_marker = marker;
        }
        Ok(config)
    }
}

fn run(config: &MergeConfig) -> Result<MergeReport> {
    merge_folder(config).with_context(|| format!("Failed to merge '{}'", config.folder.display()))
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(report) => {
            for (file, reason) in &report.skipped {
                info!(file = %file, reason = %reason, "Skipped");
            }
            println!(
                "Scanned {}: {} files found, {} merged, {} records written to {}",
                report.folder.display(),
                report.files_found,
                report.merged.len(),
                report.records,
                report.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            match write_error_log(&config, &*e) {
                Ok(path) => println!("Merge of {} failed, see {}", config.folder.display(), path.display()),
                Err(log_error) => println!("Merge of {} failed: {:#} ({:#})", config.folder.display(), e, log_error),
            }
            ExitCode::FAILURE
        }
    }
}
