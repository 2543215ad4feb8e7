use anyhow::{Context, Result};
use clap::Parser;
use proto_conventions::descriptor::FileDescriptor;
use proto_conventions::loader;
use proto_conventions::rules::{CheckConfig, CheckEngine, CheckResult, registry};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proto-conventions")]
#[command(about = "Check protobuf APIs against naming, field, option and permission conventions")]
#[command(version)]
struct Args {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Run lint rules over the given files")]
    Lint {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        output: Output,
    },
    #[command(about = "Check the given files for breaking changes against a previous version")]
    Breaking {
        #[command(flatten)]
        input: Input,
        #[arg(long, help = "Include root of the previous version")]
        against_include: Option<PathBuf>,
        #[arg(long, help = "Binary FileDescriptorSet of the previous version")]
        against_descriptor_set: Option<PathBuf>,
        #[command(flatten)]
        output: Output,
    },
    #[command(about = "List available rules")]
    Rules,
}

#[derive(clap::Args)]
struct Input {
    #[arg(short = 'I', long, default_value = ".", help = "Include root the files are relative to")]
    include: PathBuf,
    #[arg(long, help = "Read a binary FileDescriptorSet instead of .proto sources")]
    descriptor_set: Option<PathBuf>,
    #[arg(help = "Files to check, relative to the include root")]
    files: Vec<String>,
}

#[derive(clap::Args)]
struct Output {
    #[arg(long, help = "buf-style YAML configuration file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Output format", value_enum, default_value = "text")]
    format: OutputFormat,
    #[arg(long = "rule", help = "Only run these rules (repeatable)")]
    rules: Vec<String>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Lint { input, output } => {
            let files = load(&input.include, input.descriptor_set.as_deref(), &input.files)?;
            let mut config = load_config(&output)?;
            if !output.rules.is_empty() {
                config.lint.use_rules = output.rules.clone();
            }

            let result = CheckEngine::new()?.lint(&files, &config);
            report(&result, &output.format)?;
            if !result.is_clean() {
                std::process::exit(1);
            }
        }
        Commands::Breaking {
            input,
            against_include,
            against_descriptor_set,
            output,
        } => {
            let files = load(&input.include, input.descriptor_set.as_deref(), &input.files)?;
            let against_include = against_include.as_deref().unwrap_or(&input.include);
            let against_files = load(against_include, against_descriptor_set.as_deref(), &input.files)
                .context("Failed to load the previous version")?;

            let mut config = load_config(&output)?;
            if !output.rules.is_empty() {
                config.breaking.use_rules = output.rules.clone();
            }

            let result = CheckEngine::new()?.breaking(&files, &against_files, &config);
            report(&result, &output.format)?;
            if !result.is_clean() {
                std::process::exit(1);
            }
        }
        Commands::Rules => {
            for spec in registry::rules() {
                let rule_type = format!("{:?}", spec.rule_type);
                println!("{:<40} {:<8} {}", spec.id, rule_type, spec.purpose);
            }
        }
    }

    Ok(())
}

fn load(include: &Path, descriptor_set: Option<&Path>, files: &[String]) -> Result<Vec<FileDescriptor>> {
    let inputs: Vec<&str> = files.iter().map(String::as_str).collect();
    let loaded = match descriptor_set {
        Some(path) => loader::load_descriptor_set(path, &inputs)
            .with_context(|| format!("Failed to read descriptor set '{}'", path.display()))?,
        None => {
            anyhow::ensure!(!inputs.is_empty(), "No .proto files given");
            loader::load_proto_files(include, &inputs)
                .with_context(|| format!("Failed to parse files under '{}'", include.display()))?
        }
    };
    info!(files = loaded.len(), "loaded descriptors");
    Ok(loaded)
}

fn load_config(output: &Output) -> Result<CheckConfig> {
    match &output.config {
        Some(path) => CheckConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(CheckConfig::default()),
    }
}

fn report(result: &CheckResult, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Text => {
            for annotation in &result.annotations {
                println!("{annotation}");
            }
            for failure in &result.failed_rules {
                eprintln!("rule {} failed: {}", failure.rule_id, failure.error);
            }
            if result.is_clean() {
                println!("No issues found ({} rules executed).", result.executed_rules.len());
            }
        }
    }
    Ok(())
}
