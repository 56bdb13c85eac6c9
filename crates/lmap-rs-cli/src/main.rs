// crates/lmap-rs-cli/src/main.rs

mod commands;

use clap::{Parser, Subcommand};
use lmap_rs::{Field, RegisterPath, TargetType};
use std::path::PathBuf;
use std::process::exit;

#[derive(Debug, Parser)]
#[command(
    name = "lmap",
    about = "Inspect and edit logical name map (xlmap) files.",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an empty map file.
    New {
        #[arg(value_name = "file")]
        file: PathBuf,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// Parse a file and report problems.
    Check {
        #[arg(value_name = "file")]
        file: PathBuf,
    },

    /// Print a file in normalized form.
    Fmt {
        #[arg(value_name = "file")]
        file: PathBuf,

        /// Rewrite the file instead of printing it.
        #[arg(short, long)]
        in_place: bool,

        /// Indentation per level; 0 puts everything on one line.
        #[arg(long, value_name = "n", default_value_t = 2)]
        indent: usize,

        /// Indent with tabs instead of spaces.
        #[arg(long)]
        tabs: bool,

        /// Start with an XML declaration.
        #[arg(long)]
        declaration: bool,
    },

    /// Show the module tree.
    Tree {
        #[arg(value_name = "file")]
        file: PathBuf,
    },

    /// List every entry with its target.
    List {
        #[arg(value_name = "file")]
        file: PathBuf,
    },

    /// List the target devices the map refers to.
    Devices {
        #[arg(value_name = "file")]
        file: PathBuf,
    },

    /// Add a module.
    AddModule {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "parent")]
        parent: RegisterPath,

        #[arg(value_name = "name")]
        name: String,
    },

    /// Add an entry.
    AddEntry {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "parent")]
        parent: RegisterPath,

        #[arg(value_name = "name")]
        name: String,

        /// redirectedRegister, redirectedChannel, constant or variable.
        #[arg(short = 't', long = "type", value_name = "type", value_parser = parse_target_type)]
        target_type: TargetType,
    },

    /// Rename a module or entry.
    Rename {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "path")]
        path: RegisterPath,

        #[arg(value_name = "name")]
        name: String,
    },

    /// Change the target type of an entry. This resets all of its fields.
    Retype {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "path")]
        path: RegisterPath,

        #[arg(value_name = "type", value_parser = parse_target_type)]
        target_type: TargetType,
    },

    /// Set one field of an entry. `unset` clears an optional field.
    Set {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "path")]
        path: RegisterPath,

        #[arg(value_name = "field", value_parser = parse_field)]
        field: Field,

        #[arg(value_name = "value", allow_hyphen_values = true)]
        value: String,
    },

    /// Remove a module or entry.
    Rm {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "path")]
        path: RegisterPath,

        /// Required to remove a module that still has children.
        #[arg(short, long)]
        recursive: bool,
    },

    /// Move a module or entry to another module.
    Mv {
        #[arg(value_name = "file")]
        file: PathBuf,

        #[arg(value_name = "path")]
        path: RegisterPath,

        #[arg(value_name = "new_parent")]
        new_parent: RegisterPath,

        /// Index among the new siblings; appends when omitted.
        #[arg(short, long, value_name = "n")]
        position: Option<usize>,
    },
}

fn parse_target_type(s: &str) -> Result<TargetType, String> {
    s.parse().map_err(|e: lmap_rs::LmapError| e.to_string())
}

fn parse_field(s: &str) -> Result<Field, String> {
    s.parse().map_err(|e: lmap_rs::LmapError| e.to_string())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    if let Err(e) = commands::run(cli.command, &mut stdout.lock()) {
        eprintln!("lmap: {}", e);
        exit(1);
    }
}
