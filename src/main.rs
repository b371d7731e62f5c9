mod closure;
mod compile_db;
mod db_cmd;
mod dot;
mod graph;
mod include;
mod lexer;
mod normalize;
mod report;
mod resolve;
mod scan_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use report::OutputOptions;

#[derive(Parser)]
#[command(
    name = "incgraph",
    version,
    about = "Map the #include dependency graph of a C/C++ tree",
    long_about = "Discovers #include directives with minimal lexing (trigraphs, line \
splicing, tokenization - no macro expansion, no conditional evaluation), resolves them \
to files, and reports the dependency graph, its transitive closure, cycles and density."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a root source file, or every source file under a directory
    Scan {
        /// Root file, or a directory walked for .c/.cpp/.h/.hpp files
        path: PathBuf,

        /// Additional include search directory (repeatable, tried in order)
        #[arg(short = 'I', long = "include-dir")]
        include_dirs: Vec<PathBuf>,

        /// Path prefix to prune from the graph entirely (repeatable)
        #[arg(short = 'x', long = "exclude")]
        excludes: Vec<PathBuf>,

        /// Unresolved include name to keep as a placeholder node (repeatable)
        #[arg(short = 's', long = "sentinel")]
        sentinels: Vec<String>,

        /// Print adjacency and closure matrices
        #[arg(short, long)]
        matrix: bool,

        /// Write a Graphviz graph to this file ("-" for stdout)
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Analyze every record of a compilation database (compile_commands.json)
    Db {
        /// Build database file with {directory, file, command} records
        file: PathBuf,

        /// Path prefix to prune from the graph entirely (repeatable)
        #[arg(short = 'x', long = "exclude")]
        excludes: Vec<PathBuf>,

        /// Unresolved include name to keep as a placeholder node (repeatable)
        #[arg(short = 's', long = "sentinel")]
        sentinels: Vec<String>,

        /// Print adjacency and closure matrices
        #[arg(short, long)]
        matrix: bool,

        /// Write a Graphviz graph to this file ("-" for stdout)
        #[arg(long)]
        dot: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            include_dirs,
            excludes,
            sentinels,
            matrix,
            dot,
        } => {
            let out = OutputOptions { matrix, dot };
            scan_cmd::run(&path, &include_dirs, &excludes, &sentinels, &out, cli.verbose)?;
        }

        Commands::Db {
            file,
            excludes,
            sentinels,
            matrix,
            dot,
        } => {
            let out = OutputOptions { matrix, dot };
            db_cmd::run(&file, &excludes, &sentinels, &out, cli.verbose)?;
        }
    }

    Ok(())
}
