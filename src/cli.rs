use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Convert markdown posts between generic markdown and Obsidian vault notes
#[derive(Parser, Debug)]
#[command(name = "vaultify", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rename a post after its title and rewrite its image references
    Convert {
        /// Path to the input markdown file
        input: PathBuf,

        #[command(flatten)]
        opts: ConvertOpts,

        /// Delete the input file after the new file has been written
        #[arg(long, default_value_t = false)]
        delete_original: bool,
    },

    /// Rewrite image references and record the old filename as an alias.
    /// Reads standard input and writes standard output when no file is given.
    Fix {
        /// Path to the input markdown file
        input: Option<PathBuf>,

        #[command(flatten)]
        opts: ConvertOpts,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConvertOpts {
    /// Which convention to rewrite image references into
    #[arg(short, long, value_enum, default_value_t = Direction::ToObsidian)]
    pub direction: Direction,

    /// How to turn the title into a filename
    #[arg(short, long, value_enum, default_value_t = SanitizePolicy::Reserved)]
    pub sanitize: SanitizePolicy,

    /// Directory to write the renamed file into (created if missing).
    /// Defaults to the current directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `![alt](path)` becomes `![[path]]`
    ToObsidian,
    /// `![[path]]` becomes `![path](path)`
    ToGeneric,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizePolicy {
    /// Strip `/`, `\` and `:`, collapse whitespace
    Reserved,
    /// Strip everything except word characters and spaces
    WordOnly,
}
