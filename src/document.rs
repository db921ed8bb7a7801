use crate::cli::Direction;
use crate::error::ConvertError;
use crate::frontmatter::{self, FrontMatter};
use crate::image;
use std::path::Path;

const TITLE_MARKER: &str = "# ";

/// A post split into its parts: front matter, title and the remaining body
pub struct Document {
    pub front_matter: Option<FrontMatter>,
    pub title: String,
    /// Everything after the front matter except the title line
    pub body: String,
}

impl Document {
    /// Split `text` (read from `source`) into front matter, title and body.
    pub fn parse(text: &str, source: &Path) -> Result<Self, ConvertError> {
        let (front_matter, body) = frontmatter::split_front_matter(text)?;

        let (title, body) = extract_title(body).ok_or_else(|| ConvertError::MissingTitle {
            path: source.to_path_buf(),
        })?;

        Ok(Self {
            front_matter,
            title,
            body,
        })
    }

    /// Rewrite the image references in the body, returning how many changed
    pub fn rewrite_images(&mut self, direction: Direction) -> usize {
        let rewrite = image::rewrite_images(&self.body, direction);
        self.body = rewrite.content;
        rewrite.rewritten
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        if let Some(ref fm) = self.front_matter {
            out.push_str(&fm.to_string());
        }
        out.push_str(&self.body);
        out
    }
}

/// Take the first `# ` line out of `body`.
///
/// Returns the trimmed title text and the body without that line. Later
/// `# ` lines are ordinary content. All other lines keep their endings.
pub fn extract_title(body: &str) -> Option<(String, String)> {
    let mut title = None;
    let mut rest = String::with_capacity(body.len());

    for line in body.split_inclusive('\n') {
        if title.is_none() {
            if let Some(text) = line.strip_prefix(TITLE_MARKER) {
                title = Some(text.trim().to_string());
                continue;
            }
        }
        rest.push_str(line);
    }

    title.map(|t| (t, rest))
}
