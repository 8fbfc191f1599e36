use super::errors::DecrxCliError;
use crate::Cli;
use clap::CommandFactory;

pub fn exit_with_error(error: DecrxCliError) -> ! {
    let mut cmd = Cli::command();
    cmd.error(error.clone().into(), error.to_string()).exit();
}
