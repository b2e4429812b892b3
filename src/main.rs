//! kubedig (kdig) - dig around a Kubernetes environment

use anyhow::Result;
use clap::Parser;
use kubedig::cli::{Cli, Command};
use kubedig::commands;
use kubedig::config::{load_config, AppConfig};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    setup_tracing(cli.verbose);

    let app_config = load_config().unwrap_or_else(|e| {
        warn!("ignoring config file: {}", e);
        AppConfig::default()
    });

    // CLI flags win over the config file
    let output = cli.output.unwrap_or(app_config.output);
    let width = cli.width.filter(|w| *w > 0).unwrap_or(app_config.output_width);
    let color = app_config.colors && !cli.no_color;
    if !color {
        owo_colors::set_override(false);
    }

    let result = match cli.command {
        Command::Dig(ref args) => commands::run_dig(args, output, width, color).await,
        Command::List(ref args) => commands::run_list(args, output, width),
        Command::Version => commands::run_version(output, width),
        Command::Completions(ref args) => {
            generate_completions(args.shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "kdig", &mut std::io::stdout());
}
