mod cli;
mod command;
mod process;

#[macro_use]
extern crate log;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let job = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    process::run_job(&job)
}
