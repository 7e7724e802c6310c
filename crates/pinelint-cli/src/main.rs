use clap::Parser;
use pinelint_cli::{init_logging, run_check, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("error: {}", e);
        std::process::exit(2);
    }

    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}
