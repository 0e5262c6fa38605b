use clap::Parser;
use confluence::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    confluence::logging::init_logging(cli.verbose);
    run(cli)
}
