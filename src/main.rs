mod cli;
mod jq_exec;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let command_line_interface = cli::CommandLineInterface::load();

    // --debug forces debug output; otherwise RUST_LOG decides
    let filter = if command_line_interface.debug() {
        EnvFilter::new("json_adt=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    command_line_interface.run()
}
