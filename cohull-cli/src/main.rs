// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use clap::{Parser, Subcommand};
use cohull_cli::{hull, label};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Hull(hull::HullArgs),
    Label(label::LabelArgs),
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Hull(hull_args)) => hull::hull(hull_args),
        Some(Commands::Label(label_args)) => label::label(label_args),
        None => {}
    }
}
