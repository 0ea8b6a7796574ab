use clap::Parser;
use time::OffsetDateTime;

use toki_cli::{app, cmd_args};

fn main() {
    // Argument errors exit with code 2 (clap's default).
    let cli = cmd_args::Cli::parse();
    let now = OffsetDateTime::now_utc();
    let (result, exit_code) = app::run(cli.command, now);
    result.print();
    std::process::exit(exit_code);
}
