// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk — batch scanner for paper notebooks.
//
// Entry point. Initialises logging, backend services, and dispatches the
// CLI commands.

mod callback;
mod commands;
mod services;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use services::AppServices;

#[derive(Debug, Parser)]
#[command(name = "blattwerk", version, about = "Scan paper notebooks into paginated PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a notebook of an existing type.
    Create {
        /// Title of the new notebook (unique).
        title: String,
        /// Notebook type to use.
        #[arg(long = "type")]
        type_title: String,
        /// Where the assembled PDF goes. Defaults to the data directory.
        #[arg(long)]
        path: Option<PathBuf>,
        /// Number the page numbering starts from.
        #[arg(long, default_value_t = 1)]
        first_page: i32,
    },
    /// List all notebooks.
    List,
    /// Manage notebook types.
    Types {
        #[command(subcommand)]
        command: TypesCommand,
    },
    /// Scan pages into a notebook.
    Scan {
        /// Title of the notebook to scan into.
        title: String,
        /// Number of new pages to append after the last existing page.
        #[arg(long, default_value_t = 0)]
        append: u32,
        /// Existing page numbers to re-scan, comma separated.
        #[arg(long, value_delimiter = ',')]
        replace: Vec<u32>,
        /// Forget the configured device and choose again.
        #[arg(long)]
        set_device: bool,
    },
    /// Remove a notebook from the catalog.
    Delete {
        /// Title of the notebook to remove.
        title: String,
    },
}

#[derive(Debug, Subcommand)]
enum TypesCommand {
    /// List all types.
    List,
    /// Create a type with the given page size.
    Create {
        /// Title of the new type (unique).
        title: String,
        /// Page width in millimetres.
        width_mm: i32,
        /// Page height in millimetres.
        height_mm: i32,
        /// Two logical pages share one physical scan.
        #[arg(long)]
        paired: bool,
    },
    /// Delete a type that no notebook uses.
    Delete {
        /// Title of the type to remove.
        title: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = AppServices::init().and_then(|mut services| match cli.command {
        Commands::Create {
            title,
            type_title,
            path,
            first_page,
        } => commands::create::run(&services, &title, &type_title, path, first_page),
        Commands::List => commands::list::run(&services),
        Commands::Types { command } => match command {
            TypesCommand::List => commands::types::list(&services),
            TypesCommand::Create {
                title,
                width_mm,
                height_mm,
                paired,
            } => commands::types::create(&services, &title, width_mm, height_mm, paired),
            TypesCommand::Delete { title } => commands::types::delete(&services, &title),
        },
        Commands::Scan {
            title,
            append,
            replace,
            set_device,
        } => commands::scan::run(&mut services, &title, append, &replace, set_device),
        Commands::Delete { title } => commands::delete::run(&services, &title),
    });

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
