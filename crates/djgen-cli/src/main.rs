mod commands;
mod config;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "djgen",
    version,
    about = "Django scaffolding generator — merge models, views, routes and templates into an existing project"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate generic views, routes, a form and templates for a model
    View(commands::view::ViewArgs),

    /// Generate a model module from compact field specs
    Model(commands::model::ModelArgs),

    /// Create the directory skeleton for a new app
    Startapp(commands::startapp::StartappArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::View(args) => match commands::view::run(&args) {
            Ok((output, success)) => {
                println!("{output}");
                if !success {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Model(args) => match commands::model::run(&args) {
            Ok((output, success)) => {
                println!("{output}");
                if !success {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Startapp(args) => match commands::startapp::run(&args) {
            Ok(output) => {
                println!("{output}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    }
}
