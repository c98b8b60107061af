//! Structured FHIRPath editor command-line interface

use clap::{Parser, Subcommand};
use octofhir_fpe::cli::loader::Inputs;
use octofhir_fpe::cli::output::{self, ColorMode, OutputFormat};
use octofhir_fpe::cli::{check, compile, suggest, types};
use octofhir_fpe::diagnostics::ArgumentStep;
use std::path::PathBuf;

/// Structured FHIRPath editor tool
#[derive(Parser)]
#[command(name = "fpe")]
#[command(author, version, about = "Structured FHIRPath expression editor tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Schema bundle (JSON)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Questionnaire (JSON) for answer tokens
    #[arg(short, long, global = true)]
    questionnaire: Option<PathBuf>,

    /// Record type answer tokens navigate from
    #[arg(long, global = true)]
    document_type: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document's program to FHIRPath
    Compile {
        /// Editor document (JSON)
        document: PathBuf,

        /// Annotate binding definitions with their types
        #[arg(short, long)]
        debug: bool,

        /// Do not add grouping parentheses
        #[arg(long)]
        no_grouping: bool,
    },

    /// Check a document's program for type and binding errors
    Check {
        /// Editor document (JSON)
        document: PathBuf,

        /// Strict mode (warnings as errors)
        #[arg(long)]
        strict: bool,
    },

    /// List completion candidates at a location
    Suggest {
        /// Editor document (JSON)
        document: PathBuf,

        /// Binding to suggest in (default: the output expression)
        #[arg(short, long)]
        binding: Option<String>,

        /// Function argument to descend into, as <token>:<argument>
        #[arg(short, long = "arg", value_parser = suggest::parse_argument_step)]
        arguments: Vec<ArgumentStep>,

        /// Insertion point (default: end of the expression)
        #[arg(short, long)]
        cursor: Option<usize>,

        /// Filter labels by substring
        #[arg(long)]
        search: Option<String>,

        /// Also list incompatible operators and functions
        #[arg(long)]
        include_incompatible: bool,
    },

    /// Show inferred binding and output types
    Types {
        /// Editor document (JSON)
        document: PathBuf,

        /// Also show the type after each output token
        #[arg(short, long)]
        tokens: bool,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let inputs = |document: PathBuf| Inputs {
        document,
        schema: cli.schema.clone(),
        questionnaire: cli.questionnaire.clone(),
        document_type: cli.document_type.clone(),
    };

    let result = match cli.command {
        Commands::Compile {
            document,
            debug,
            no_grouping,
        } => compile::compile(compile::CompileConfig {
            inputs: inputs(document),
            debug,
            no_grouping,
            format: cli.format,
            output_file: cli.output.clone(),
        }),

        Commands::Check { document, strict } => check::check(check::CheckConfig {
            inputs: inputs(document),
            strict,
            format: cli.format,
            output_file: cli.output.clone(),
        }),

        Commands::Suggest {
            document,
            binding,
            arguments,
            cursor,
            search,
            include_incompatible,
        } => suggest::suggest(suggest::SuggestConfig {
            inputs: inputs(document),
            binding,
            arguments,
            cursor,
            search,
            include_incompatible,
            format: cli.format,
            output_file: cli.output.clone(),
        }),

        Commands::Types { document, tokens } => types::types(types::TypesConfig {
            inputs: inputs(document),
            tokens,
            format: cli.format,
            output_file: cli.output.clone(),
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
