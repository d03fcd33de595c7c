use awips_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Cancel all operations when Ctrl+C is received; in-flight
        // bulletins drain inside the command before it returns
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("AWIPS Processor - NWS Text Product Parser & VTEC Reconciler");
    println!("===========================================================");
    println!();
    println!("Decode NWS AWIPS text bulletins and reconcile the VTEC severe-weather");
    println!("events they carry into canonical, deduplicated timelines.");
    println!();
    println!("USAGE:");
    println!("    awips-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    serve       Consume bulletin messages and reconcile VTEC events");
    println!("    parse       Decode a single bulletin file and print it as JSON");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Decode one bulletin:");
    println!("    awips-processor parse tornado_warning.txt");
    println!();
    println!("    # Run the reconciling consumer against PostgreSQL:");
    println!("    DATABASE_URL=postgres://localhost/awips awips-processor serve");
    println!();
    println!("For detailed help on any command, use:");
    println!("    awips-processor <COMMAND> --help");
}
