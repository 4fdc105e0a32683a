//! The `bearsays` command.

use clap::Parser;
use std::io::{self, Write};

#[derive(Debug, Parser)]
#[command(name = "bearsays", version, about = "Cool bear says stuff")]
struct Cli {
    /// What the bear says
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    message: Vec<String>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let message = bearsays::message_from_args(&cli.message);

    let mut stdout = io::stdout().lock();
    stdout.write_all(bearsays::render(&message).as_bytes())?;
    stdout.flush()
}
