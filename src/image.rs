use crate::cli::Direction;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::trace;

/// Every image reference shape we understand, as one alternation.
///
/// Alternatives are tried in order at each position, so a wrapped reference
/// (starting at its outer `[`) is consumed whole before the standalone rule
/// can see its inner `![...]`. Embeds come before standalone references so
/// the lazy alt text can't run from an embed into a later reference.
static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<wrapped_embed>\[!\[\[(?P<we_target>[^\]]+)\]\]\]?\((?P<we_href>[^)]+)\)\]?)",
        r"|(?P<linked>\[!\[(?P<l_alt>.*?)\]\((?P<l_target>.*?)\)\]\((?P<l_href>.*?)\)(?P<l_size>,width=\d+,height=\d+\])?)",
        r"|(?P<embed>!\[\[(?P<e_target>[^\]]+)\]\])",
        r"|(?P<standalone>!\[(?P<s_alt>.*?)\]\((?P<s_target>.*?)\)(?P<s_size>,width=\d+,height=\d+\])?)",
    ))
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `![alt](target)`
    Standalone,
    /// `[![alt](target)](href)`
    Linked,
    /// `![[target]]`
    Embed,
    /// `[![[target]]](href)`
    WrappedEmbed,
}

/// One image reference found in a post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'t> {
    pub shape: Shape,
    pub alt: &'t str,
    pub target: &'t str,
    pub href: Option<&'t str>,
    /// Trailing `,width=N,height=N]` left behind by some exporters
    pub annotation: Option<&'t str>,
}

impl<'t> ImageRef<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        let text = |name: &str| caps.name(name).map(|m| m.as_str());

        if caps.name("wrapped_embed").is_some() {
            let target = text("we_target")?;
            Some(Self {
                shape: Shape::WrappedEmbed,
                alt: target,
                target,
                href: text("we_href"),
                annotation: None,
            })
        } else if caps.name("linked").is_some() {
            Some(Self {
                shape: Shape::Linked,
                alt: text("l_alt")?,
                target: text("l_target")?,
                href: text("l_href"),
                annotation: text("l_size"),
            })
        } else if caps.name("embed").is_some() {
            let target = text("e_target")?;
            Some(Self {
                shape: Shape::Embed,
                alt: target,
                target,
                href: None,
                annotation: None,
            })
        } else {
            Some(Self {
                shape: Shape::Standalone,
                alt: text("s_alt")?,
                target: text("s_target")?,
                href: None,
                annotation: text("s_size"),
            })
        }
    }

    pub fn is_external(&self) -> bool {
        self.target.starts_with("http")
    }

    /// Render the reference in the convention `direction` points at.
    /// Returns `None` when it is already in that convention.
    fn render(&self, direction: Direction) -> Option<String> {
        match (direction, self.shape) {
            (Direction::ToObsidian, Shape::Standalone | Shape::Linked) => {
                if self.is_external() {
                    Some(format!("![{}]({})", self.alt, self.target))
                } else {
                    Some(format!("![[{}]]", self.target))
                }
            }
            (Direction::ToObsidian, Shape::WrappedEmbed) => Some(format!("![[{}]]", self.target)),
            (Direction::ToGeneric, Shape::Embed | Shape::WrappedEmbed) => {
                // `![[pic.png|300]]` carries a display size after the pipe
                let path = self.target.split('|').next().unwrap_or(self.target);
                Some(format!("![{path}]({path})"))
            }
            (Direction::ToObsidian, Shape::Embed)
            | (Direction::ToGeneric, Shape::Standalone | Shape::Linked) => None,
        }
    }
}

/// Result of rewriting a body
#[derive(Debug)]
pub struct Rewrite {
    pub content: String,
    /// Number of references whose text changed
    pub rewritten: usize,
}

/// Rewrite every image reference in `content` into the `direction` convention.
pub fn rewrite_images(content: &str, direction: Direction) -> Rewrite {
    let mut rewritten = 0;

    let content = IMAGE_REF
        .replace_all(content, |caps: &Captures| {
            let original = &caps[0];
            let rendered = ImageRef::from_captures(caps).and_then(|found| {
                trace!(
                    shape = ?found.shape,
                    target = found.target,
                    href = found.href,
                    annotation = found.annotation,
                    external = found.is_external(),
                    "image reference"
                );
                found.render(direction)
            });
            match rendered {
                Some(new) if new != original => {
                    rewritten += 1;
                    new
                }
                _ => original.to_string(),
            }
        })
        .into_owned();

    Rewrite { content, rewritten }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_obsidian(s: &str) -> String {
        rewrite_images(s, Direction::ToObsidian).content
    }

    fn to_generic(s: &str) -> String {
        rewrite_images(s, Direction::ToGeneric).content
    }

    fn find_images(content: &str) -> Vec<ImageRef<'_>> {
        IMAGE_REF
            .captures_iter(content)
            .filter_map(|caps| ImageRef::from_captures(&caps))
            .collect()
    }

    #[test]
    fn test_internal_image_becomes_embed() {
        assert_eq!(to_obsidian("![alt](images/pic.png)"), "![[images/pic.png]]");
    }

    #[test]
    fn test_external_image_is_unchanged() {
        let rewrite = rewrite_images("![alt](https://x.com/p.png)", Direction::ToObsidian);
        assert_eq!(rewrite.content, "![alt](https://x.com/p.png)");
        assert_eq!(rewrite.rewritten, 0);
    }

    #[test]
    fn test_linked_internal_image_is_unwrapped() {
        assert_eq!(
            to_obsidian("[![alt](images/pic.png)](images/pic.png)"),
            "![[images/pic.png]]"
        );
    }

    #[test]
    fn test_linked_external_image_loses_wrapper() {
        assert_eq!(
            to_obsidian("[![alt](http://x.com/p.png)](http://x.com/big.png)"),
            "![alt](http://x.com/p.png)"
        );
    }

    #[test]
    fn test_size_annotation_is_dropped() {
        assert_eq!(
            to_obsidian("see ![alt](images/pic.png),width=100,height=50] here"),
            "see ![[images/pic.png]] here"
        );
        assert_eq!(
            to_obsidian("![alt](https://x.com/p.png),width=100,height=50]"),
            "![alt](https://x.com/p.png)"
        );
    }

    #[test]
    fn test_linked_size_annotation_is_dropped() {
        assert_eq!(to_obsidian("[![a](x.png)](y),width=1,height=2]"), "![[x.png]]");
    }

    #[test]
    fn test_half_converted_wrapped_embed_is_repaired() {
        assert_eq!(to_obsidian("[![[images/a.png]](images/a.png)]"), "![[images/a.png]]");
        assert_eq!(to_obsidian("[![[images/a.png]]](images/a.png)"), "![[images/a.png]]");
    }

    #[test]
    fn test_several_references_on_one_line() {
        let input = "![a](one.png) and [![b](two.png)](two.png) and ![c](http://x/3.png)";
        let rewrite = rewrite_images(input, Direction::ToObsidian);
        assert_eq!(
            rewrite.content,
            "![[one.png]] and ![[two.png]] and ![c](http://x/3.png)"
        );
        assert_eq!(rewrite.rewritten, 2);
    }

    #[test]
    fn test_existing_embed_does_not_swallow_next_reference() {
        assert_eq!(
            to_obsidian("![[a.png]] then ![b](c.png)"),
            "![[a.png]] then ![[c.png]]"
        );
    }

    #[test]
    fn test_embed_becomes_generic_image() {
        assert_eq!(to_generic("![[images/pic.png]]"), "![images/pic.png](images/pic.png)");
    }

    #[test]
    fn test_embed_size_suffix_is_dropped_for_generic() {
        assert_eq!(to_generic("![[pic.png|300]]"), "![pic.png](pic.png)");
    }

    #[test]
    fn test_wrapped_embed_is_unwrapped_for_generic() {
        assert_eq!(
            to_generic("[![[https://x.com/p.png]]](https://x.com/p.png)"),
            "![https://x.com/p.png](https://x.com/p.png)"
        );
    }

    #[test]
    fn test_generic_is_idempotent() {
        let generic = "Intro\n![a](images/a.png)\n[![b](b.png)](b.png)\n![c](http://x/c.png)\n";
        assert_eq!(to_generic(generic), generic);

        let once = to_generic("![[images/a.png]] and ![[b.png]]");
        assert_eq!(to_generic(&once), once);
    }

    #[test]
    fn test_round_trip_keeps_targets() {
        let original = "![first](images/one.png)\n\n![second](images/two.jpg)\n";
        let obsidian = to_obsidian(original);
        let generic = to_generic(&obsidian);

        let targets = |s: &str| {
            find_images(s)
                .into_iter()
                .map(|r| r.target.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(targets(&generic), targets(original));
        assert!(find_images(&generic)
            .iter()
            .all(|r| r.shape == Shape::Standalone));
    }

    #[test]
    fn test_find_images_classifies_shapes() {
        let refs = find_images("![a](x.png) [![b](y.png)](z) ![[w.png]] ![c](https://h/i.png)");
        let shapes: Vec<_> = refs.iter().map(|r| r.shape).collect();
        assert_eq!(
            shapes,
            vec![Shape::Standalone, Shape::Linked, Shape::Embed, Shape::Standalone]
        );
        assert_eq!(refs[1].href, Some("z"));
        assert!(!refs[0].is_external());
        assert!(refs[3].is_external());
    }

    #[test]
    fn test_plain_links_are_untouched() {
        let text = "a [link](page.md) and [x]";
        assert_eq!(to_obsidian(text), text);
        assert_eq!(to_generic(text), text);
    }
}
