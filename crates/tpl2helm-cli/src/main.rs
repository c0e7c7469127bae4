//! tpl2helm CLI - Convert OpenShift templates into Helm charts

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tpl2helm_convert::ConvertOptions;
use tpl2helm_convert::converter::{
    DEFAULT_CHART_VERSION, DEFAULT_COMMON_CHART, DEFAULT_COMMON_CHART_VERSION, DEFAULT_HELM_REPO,
    DEFAULT_IMAGE_REGISTRY,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "tpl2helm")]
#[command(author = "tpl2helm Contributors")]
#[command(version)]
#[command(about = "Convert OpenShift templates into Helm charts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenShift template into a Helm chart
    Convert {
        /// OpenShift template file (YAML or JSON)
        #[arg(short = 't', long)]
        template: PathBuf,

        /// Directory the chart is created in
        #[arg(short = 'c', long, default_value = ".")]
        chart: PathBuf,

        /// Shared chart the generated chart depends on
        #[arg(
            short = 'n',
            long = "commonchartname",
            env = "TPL2HELM_COMMON_CHART",
            default_value = DEFAULT_COMMON_CHART
        )]
        common_chart_name: String,

        /// Repository of the shared chart
        #[arg(
            short = 'r',
            long = "helmrepo",
            env = "TPL2HELM_HELM_REPO",
            default_value = DEFAULT_HELM_REPO
        )]
        helm_repo: String,

        /// Version constraint on the shared chart
        #[arg(
            short = 'd',
            long = "helmdepver",
            env = "TPL2HELM_HELM_DEP_VERSION",
            default_value = DEFAULT_COMMON_CHART_VERSION
        )]
        helm_dep_version: String,

        /// Registry written to image.repository
        #[arg(
            short = 'i',
            long = "image-registry",
            env = "TPL2HELM_IMAGE_REGISTRY",
            default_value = DEFAULT_IMAGE_REGISTRY
        )]
        image_registry: String,

        /// Version of the generated chart
        #[arg(long, default_value = DEFAULT_CHART_VERSION)]
        chart_version: String,

        /// Overwrite an existing chart directory
        #[arg(long)]
        force: bool,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Show every conversion note
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Convert {
            template,
            chart,
            common_chart_name,
            helm_repo,
            helm_dep_version,
            image_registry,
            chart_version,
            force,
            dry_run,
            verbose,
        } => {
            let options = ConvertOptions {
                image_registry,
                common_chart_name,
                common_chart_repository: helm_repo,
                common_chart_version: helm_dep_version,
                chart_version,
                force,
                dry_run,
                verbose,
            };
            commands::convert::run(&template, &chart, options)
        }
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
