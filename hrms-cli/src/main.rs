mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
    error::{CliError, Result},
    output::OutputManager,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use hrms_client::logging::{LogOptions, LoggingHandle, init_logging};
use std::process;
use tracing::{debug, error};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let output_format = args.output;

    if let Err(e) = run(args).await {
        report_error(&e, output_format);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    let _logging = setup_logging(&args, &config)?;
    debug!(?config, "Configuration loaded");

    let output = OutputManager::new(args.output, cfg!(feature = "colored-output"));

    // Commands that never touch the backend.
    match &args.command {
        Commands::Config { show, reset } => {
            if *reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                output.print_success(&format!(
                    "Configuration reset to defaults ({})",
                    path.display()
                ))?;
            } else if *show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
            return Ok(());
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let client_config = config.client_config(args.api_url.as_deref())?;
    let session_path = config.session_path()?;
    let executor = CommandExecutor::new(client_config, &session_path, output).await?;

    match args.command {
        Commands::Login { email, password } => executor.login(&email, &password).await?,
        Commands::Logout => executor.logout().await?,
        Commands::Whoami => executor.whoami()?,
        Commands::Status => executor.status()?,
        Commands::Employees { action } => executor.employees(action).await?,
        Commands::Attendance { action } => executor.attendance(action).await?,
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn setup_logging(args: &Args, config: &AppConfig) -> Result<LoggingHandle> {
    let directive = if args.quiet {
        Some("error".to_string())
    } else if args.verbose {
        Some("hrms_client=debug,hrms_cli=debug".to_string())
    } else {
        config.log_filter.clone()
    };

    let handle = init_logging(LogOptions {
        directive,
        json: false,
        ansi: cfg!(feature = "colored-output"),
        log_dir: config.log_dir.clone(),
    })?;
    Ok(handle)
}

fn report_error(e: &CliError, format: OutputFormat) {
    let relogin = e.requires_relogin();

    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let error_json = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
                "reloginRequired": relogin,
            });
            println!("{error_json}");
        }
        OutputFormat::Pretty => {
            error!("Application error: {}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {}", e);
            }
            if relogin && !matches!(e, CliError::NotLoggedIn) {
                eprintln!("Your session has ended. Run `hrms login` to sign in again.");
            }
        }
    }
}
