mod cli;
mod converter;
mod document;
mod error;
mod frontmatter;
mod image;
mod logging;
mod sanitize;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap exits with 2 on usage errors; keep usage failures at 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.verbose, cli.quiet);
    converter::convert(&cli)
}
