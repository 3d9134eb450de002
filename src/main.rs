use clap::{Parser, ValueEnum};
use log::LevelFilter;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use templater::walker::{FilePlaceholders, collect_placeholders};
use templater::{
    DEFAULT_SEPARATOR, FilterSpec, InputTarget, KeyValueMap, OutputTarget, Result, TemplateKeyArg,
    WalkConfig, build_template_keys, keys_from_args, run,
};

const LONG_HELP: &str = r#"
Placeholders:
  ${key}               - Replaced with the value given for `key`
  Placeholders without a value are left untouched.

Key-file format:
  # comment
  image = registry/app:1.2
  replicas = 3

Examples:
  # Fill a single file to stdout
  templater deployment.yml --template-keys image=app:1.2 replicas=3
  # Fill a directory, concatenating yaml documents to stdout
  templater manifests/ --include '*.yml' --template-keys-file prod.keys
  # Write filled files to a directory
  templater manifests/ --output-dir out --template-keys env=prod
  # List the placeholders used by a directory
  templater manifests/ --list=detailed --template-keys-file prod.keys
"#;

/// Fill ${key} placeholders in a file or a directory of files.
#[derive(Parser, Debug)]
#[command(
    name = "templater",
    version,
    about = "Fill ${key} placeholders in a file or a directory of files.",
    after_long_help = LONG_HELP
)]
struct Cli {
    /// Templated file or directory of files to fill
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory to write resulting files to (defaults to stdout)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Template keys to replace, e.g. `--template-keys key=value` replaces ${key} with value
    #[arg(
        long,
        value_name = "KEY=VALUE",
        num_args = 1..,
        action = clap::ArgAction::Append,
        value_parser = parse_template_key
    )]
    template_keys: Vec<TemplateKeyArg>,

    /// Read template keys from a file in key=value format. Keys given on the
    /// command line take precedence over those in the file
    #[arg(long, value_name = "PATH", env = "TEMPLATER_KEYS_FILE")]
    template_keys_file: Option<PathBuf>,

    /// Pattern for files to exclude, accepts * and ? as wildcards
    #[arg(long, value_name = "GLOB")]
    exclude: Option<String>,

    /// Pattern for files to include, accepts * and ? as wildcards
    #[arg(long, value_name = "GLOB")]
    include: Option<String>,

    /// Line separating multiple files printed to stdout (empty to disable)
    #[arg(long, value_name = "STR", default_value = DEFAULT_SEPARATOR, allow_hyphen_values = true)]
    separator: String,

    /// List placeholders instead of filling (optionally with format: plain, detailed, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum ListFormat {
    /// Distinct placeholder keys, one per line
    Plain,
    /// Placeholders per file with position and whether a value is set
    Detailed,
    /// JSON output for scripting
    Json,
}

#[derive(Serialize)]
struct PlaceholderInfo {
    key: String,
    start: usize,
    end: usize,
    resolved: bool,
}

#[derive(Serialize)]
struct FileInfo {
    path: String,
    placeholders: Vec<PlaceholderInfo>,
}

#[allow(clippy::unnecessary_wraps)]
fn parse_template_key(token: &str) -> std::result::Result<TemplateKeyArg, String> {
    Ok(TemplateKeyArg::parse(token))
}

fn main() {
    let cli = Cli::parse();
    init_logger(&cli);

    if let Err(e) = run_cli(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn).parse_default_env();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Some(LevelFilter::Error),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::Info),
        (false, 2) => Some(LevelFilter::Debug),
        (false, _) => Some(LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }

    builder.format_timestamp(None).init();
}

fn run_cli(cli: &Cli) -> Result<()> {
    let cli_keys = keys_from_args(&cli.template_keys)?;
    let keys = build_template_keys(Some(cli_keys), cli.template_keys_file.as_deref())?;
    let input = InputTarget::resolve(&cli.input)?;
    let filter = FilterSpec::new(cli.include.as_deref(), cli.exclude.as_deref())?;

    let mut stdout = io::stdout().lock();

    if let Some(format) = cli.list {
        let files = collect_placeholders(&input, &filter)?;
        return list_placeholders(&files, &keys, format, &mut stdout);
    }

    let config = WalkConfig {
        keys,
        filter,
        output: OutputTarget::new(cli.output_dir.clone(), &cli.separator),
    };
    run(&input, &config, &mut stdout)
}

fn list_placeholders<W: Write>(
    files: &[FilePlaceholders],
    keys: &KeyValueMap,
    format: ListFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        ListFormat::Plain => {
            let distinct: BTreeSet<&str> = files
                .iter()
                .flat_map(|file| file.placeholders.iter().map(|p| p.key.as_str()))
                .collect();
            for key in distinct {
                writeln!(out, "{key}")?;
            }
        }
        ListFormat::Detailed => {
            for file in files {
                writeln!(out, "File: {}", file.path.display())?;
                for placeholder in &file.placeholders {
                    writeln!(out, "  ${{{}}}", placeholder.key)?;
                    writeln!(out, "    Position: {}..{}", placeholder.start, placeholder.end)?;
                    writeln!(
                        out,
                        "    Value: {}",
                        keys.get(&placeholder.key).map_or("(none)", String::as_str)
                    )?;
                }
                writeln!(out)?;
            }
        }
        ListFormat::Json => {
            let infos: Vec<FileInfo> = files
                .iter()
                .map(|file| FileInfo {
                    path: file.path.display().to_string(),
                    placeholders: file
                        .placeholders
                        .iter()
                        .map(|p| PlaceholderInfo {
                            key: p.key.clone(),
                            start: p.start,
                            end: p.end,
                            resolved: keys.contains_key(&p.key),
                        })
                        .collect(),
                })
                .collect();
            let json = serde_json::to_string_pretty(&infos)?;
            writeln!(out, "{json}")?;
        }
    }

    out.flush()?;
    Ok(())
}
