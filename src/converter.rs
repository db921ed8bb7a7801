use crate::cli::{Cli, Command, ConvertOpts, Direction, SanitizePolicy};
use crate::document::Document;
use crate::error::ConvertError;
use crate::image;
use crate::sanitize::sanitize_filename;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings for converting a single file
struct Job<'a> {
    input: &'a Path,
    direction: Direction,
    policy: SanitizePolicy,
    out_dir: Option<&'a Path>,
    inject_alias: bool,
    delete_original: bool,
}

impl<'a> Job<'a> {
    fn new(input: &'a Path, opts: &'a ConvertOpts) -> Self {
        Self {
            input,
            direction: opts.direction,
            policy: opts.sanitize,
            out_dir: opts.out_dir.as_deref(),
            inject_alias: false,
            delete_original: false,
        }
    }
}

pub fn convert(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Convert {
            input,
            opts,
            delete_original,
        } => {
            let job = Job {
                delete_original: *delete_original,
                ..Job::new(input, opts)
            };
            match convert_file(&job) {
                Ok(output_path) => println!("File renamed to: {}", output_path.display()),
                // nothing was written or deleted, so this is only reported
                Err(e) if is_missing_title(&e) => println!("{e}"),
                Err(e) => return Err(e),
            }
        }
        Command::Fix {
            input: Some(input),
            opts,
        } => {
            let job = Job {
                inject_alias: opts.direction == Direction::ToObsidian,
                ..Job::new(input, opts)
            };
            let output_path = convert_file(&job)?;
            println!("File renamed to: {}", output_path.display());
        }
        Command::Fix { input: None, opts } => {
            convert_stream(io::stdin().lock(), io::stdout().lock(), opts.direction)?;
        }
    }

    Ok(())
}

fn is_missing_title(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::MissingTitle { .. })
    )
}

/// Rewrite image references from `reader` into `writer`. No title or front
/// matter handling happens here.
pub fn convert_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    direction: Direction,
) -> Result<()> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("Failed to read standard input")?;

    let rewrite = image::rewrite_images(&content, direction);
    debug!(rewritten = rewrite.rewritten, "rewrote image references");

    writer
        .write_all(rewrite.content.as_bytes())
        .context("Failed to write standard output")?;
    writer.flush()?;
    Ok(())
}

/// Run the whole pipeline for one file and return the path written.
///
/// Nothing touches the filesystem until the output has been built in memory,
/// and the input is only removed after the output was written.
fn convert_file(job: &Job) -> Result<PathBuf> {
    if !job.input.is_file() {
        return Err(ConvertError::NotFound {
            path: job.input.to_path_buf(),
        }
        .into());
    }

    let text = fs::read_to_string(job.input)
        .with_context(|| format!("Failed to read input file: {}", job.input.display()))?;

    let mut doc = Document::parse(&text, job.input)?;
    debug!(title = %doc.title, "extracted title");
    if let Some(ref fm) = doc.front_matter {
        debug!(keys = ?fm.keys(), "front matter");
    }

    let rewritten = doc.rewrite_images(job.direction);
    debug!(rewritten, direction = ?job.direction, "rewrote image references");

    if job.inject_alias {
        match doc.front_matter.as_mut() {
            Some(fm) => {
                fm.inject_alias(&original_stem(job.input)?)?;
            }
            None => debug!("no front matter, skipping alias"),
        }
    }

    let filename = sanitize_filename(&doc.title, job.policy);
    if filename.is_empty() {
        return Err(ConvertError::UnusableTitle { title: doc.title }.into());
    }

    let output_path = resolve_output_path(job.out_dir, &filename);
    write_output(&output_path, &doc.render())?;

    if job.delete_original {
        remove_original(job.input, &output_path)?;
    }

    Ok(output_path)
}

fn original_stem(input: &Path) -> Result<String> {
    let stem = input.file_stem().context("Input file has no name")?;
    Ok(stem.to_string_lossy().into_owned())
}

fn resolve_output_path(out_dir: Option<&Path>, filename: &str) -> PathBuf {
    let name = format!("{}.md", filename);
    match out_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn write_output(output_path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    if output_path.exists() {
        warn!(path = %output_path.display(), "overwriting existing file");
    }

    fs::write(output_path, content)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
    debug!(path = %output_path.display(), bytes = content.len(), "wrote output");

    Ok(())
}

fn remove_original(input: &Path, output_path: &Path) -> Result<()> {
    let same_file = match (fs::canonicalize(input), fs::canonicalize(output_path)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if same_file {
        warn!(path = %input.display(), "output replaced the input, not deleting it");
        return Ok(());
    }

    fs::remove_file(input)
        .with_context(|| format!("Failed to delete input file: {}", input.display()))?;
    info!(path = %input.display(), "deleted original");

    Ok(())
}
