use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ena_filter::config::{ConfigLoader, PortalConfig};
use ena_filter::error::FilterError;
use ena_filter::output::{
    JsonOutput, OutputMode, QueryReport, TextOutput, TokenReport, ValidationReport,
};
use ena_filter::pipeline::FilterPipeline;
use ena_filter::stats::ReadRunStatistics;
use ena_filter::tokenizer::{FilterExpression, format_expression};
use ena_filter::validator::validate_expression;

#[derive(Parser)]
#[command(name = "ena-filter")]
#[command(about = "Validate ENA portal filters, resolve assembly accessions and run read-run queries")]
#[command(version, author)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run a read-run filter against ENA")]
    Query(QueryArgs),
    #[command(about = "Replace assembly accessions with their sample accessions")]
    Rewrite(FilterArgs),
    #[command(about = "Check a filter expression without calling ENA")]
    Validate(FilterArgs),
    #[command(about = "Show how a filter expression is tokenized")]
    Tokenize(FilterArgs),
    #[cfg(feature = "server")]
    #[command(about = "Serve POST /api/ena over HTTP")]
    Serve(ServeArgs),
}

#[derive(Args)]
struct FilterArgs {
    filter: String,
}

#[derive(Args)]
struct QueryArgs {
    filter: String,

    /// Summarize bases, biosamples, read runs and studies
    #[arg(long)]
    stats: bool,

    /// Reject filters the expression grammar does not accept
    #[arg(long)]
    strict: bool,
}

#[cfg(feature = "server")]
#[derive(Args)]
struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FilterError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FilterError) -> u8 {
    match error {
        FilterError::MalformedAccession { .. }
        | FilterError::InvalidAssemblyAccession(_)
        | FilterError::InvalidExpression(_)
        | FilterError::MissingConfig(_) => 2,
        FilterError::ResolverFailed { .. }
        | FilterError::EnaHttp(_)
        | FilterError::EnaPayload(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match cli.command {
        Commands::Query(args) => {
            let config = ConfigLoader::resolve(cli.config.as_deref())?;
            run_query(args, config, output_mode)
        }
        Commands::Rewrite(args) => {
            let config = ConfigLoader::resolve(cli.config.as_deref())?;
            run_rewrite(args, config, output_mode)
        }
        Commands::Validate(args) => run_validate(args, output_mode),
        Commands::Tokenize(args) => run_tokenize(args, output_mode),
        #[cfg(feature = "server")]
        Commands::Serve(args) => {
            let config = ConfigLoader::resolve(cli.config.as_deref())?;
            let pipeline = FilterPipeline::from_config(config)?;
            ena_filter::server::serve(pipeline, &args.bind)?;
            Ok(())
        }
    }
}

fn run_query(
    args: QueryArgs,
    config: PortalConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let pipeline = FilterPipeline::from_config(config)?.with_validation(args.strict);
    let response = pipeline.run(&args.filter)?;
    let statistics = args
        .stats
        .then(|| ReadRunStatistics::from_runs(&response.body.data));
    let report = QueryReport {
        status: response.status,
        response: response.body,
        statistics,
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_query(&report).into_diagnostic(),
        OutputMode::Text => TextOutput::print_query(&report).into_diagnostic(),
    }
}

fn run_rewrite(
    args: FilterArgs,
    config: PortalConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let pipeline = FilterPipeline::from_config(config)?;
    let translation = pipeline.translate(&args.filter)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_translation(&translation).into_diagnostic(),
        OutputMode::Text => TextOutput::print_translation(&translation).into_diagnostic(),
    }
}

fn run_validate(args: FilterArgs, output_mode: OutputMode) -> miette::Result<()> {
    let expression = format_expression(&args.filter);
    let errors = validate_expression(&expression);
    let report = ValidationReport {
        expression,
        valid: errors.is_empty(),
        errors,
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_validation(&report).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_validation(&report).into_diagnostic()?,
    }
    if !report.valid {
        return Err(FilterError::InvalidExpression(report.errors).into());
    }
    Ok(())
}

fn run_tokenize(args: FilterArgs, output_mode: OutputMode) -> miette::Result<()> {
    let expression = FilterExpression::parse(&args.filter);
    let report = TokenReport {
        expression: expression.raw().to_string(),
        tokens: expression.tokens().to_vec(),
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_tokens(&report).into_diagnostic(),
        OutputMode::Text => TextOutput::print_tokens(&report).into_diagnostic(),
    }
}
