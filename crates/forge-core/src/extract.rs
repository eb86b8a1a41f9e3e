//! Real-time extraction of the first fenced code block in a response
//!
//! The whole accumulated text is rescanned on every fragment. A block that
//! has opened but not yet closed is still returned, so the code pane fills in
//! while the model is typing.

use std::sync::OnceLock;

use regex::Regex;

/// Tag reported when the fence opener carries no language
pub const FALLBACK_TAG: &str = "html";

/// The first code block found in a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtifact {
    pub language_tag: String,
    pub body: String,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    // Opener, optional ASCII word tag, optional newline, then the shortest
    // body that reaches either a closer or the end of input.
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```([0-9A-Za-z_]*)\n?(.*?)(?:```|\z)").expect("fence pattern is valid")
    })
}

/// Find the first fenced block in `text`, open or closed.
pub fn extract(text: &str) -> Option<ExtractedArtifact> {
    let caps = fence_regex().captures(text)?;

    let tag = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    Some(ExtractedArtifact {
        language_tag: if tag.is_empty() {
            FALLBACK_TAG.to_string()
        } else {
            tag.to_string()
        },
        body: body.to_string(),
    })
}

/// Editor syntax mode chosen from a block's language tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxMode {
    #[default]
    Markup,
    Python,
    Script,
}

impl SyntaxMode {
    /// Apply the tag rules in order; a tag no rule recognises keeps the
    /// current mode.
    pub fn refine(self, raw_tag: &str) -> SyntaxMode {
        let tag = raw_tag.to_lowercase();
        if tag.contains("py") {
            SyntaxMode::Python
        } else if tag.is_empty() || tag.contains("html") {
            SyntaxMode::Markup
        } else if tag.contains("js") {
            SyntaxMode::Script
        } else {
            self
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyntaxMode::Markup => "html",
            SyntaxMode::Python => "python",
            SyntaxMode::Script => "javascript",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SyntaxMode::Markup => "html",
            SyntaxMode::Python => "py",
            SyntaxMode::Script => "js",
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            SyntaxMode::Markup => "index.html",
            SyntaxMode::Python => "main.py",
            SyntaxMode::Script => "script.js",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_returns_none() {
        assert_eq!(extract("Sure, here is an explanation."), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("only two `` ticks"), None);
    }

    #[test]
    fn test_unterminated_block_is_returned() {
        let artifact = extract("intro ```py\nprint(1)").unwrap();
        assert!(artifact.language_tag.contains("py"));
        assert_eq!(artifact.body, "print(1)");
    }

    #[test]
    fn test_untagged_block_uses_fallback() {
        let artifact = extract("```\n<div></div>\n```").unwrap();
        assert_eq!(artifact.language_tag, FALLBACK_TAG);
        assert_eq!(artifact.body, "<div></div>\n");
    }

    #[test]
    fn test_only_first_block_is_extracted() {
        let text = "```js\nlet a = 1;\n```\nand\n```py\nb = 2\n```";
        let artifact = extract(text).unwrap();
        assert_eq!(artifact.language_tag, "js");
        assert_eq!(artifact.body, "let a = 1;\n");
    }

    #[test]
    fn test_non_ascii_text_after_fence_is_body() {
        let artifact = extract("```中文\nx").unwrap();
        assert_eq!(artifact.language_tag, FALLBACK_TAG);
        assert_eq!(artifact.body, "中文\nx");

        let artifact = extract("```pyé\nx").unwrap();
        assert_eq!(artifact.language_tag, "py");
        assert_eq!(artifact.body, "é\nx");
    }

    #[test]
    fn test_opener_without_newline_yet() {
        let artifact = extract("Here: ```pyth").unwrap();
        assert_eq!(artifact.language_tag, "pyth");
        assert_eq!(artifact.body, "");
    }

    #[test]
    fn test_body_grows_then_stabilizes() {
        let full = "Here you go:\n```html\n<p>hi</p>\n```\nEnjoy!";
        let opener_end = full.find("```").unwrap() + 3;

        let mut previous: Option<String> = None;
        let mut closed_body: Option<String> = None;
        for end in 0..=full.len() {
            if !full.is_char_boundary(end) {
                continue;
            }
            let prefix = &full[..end];
            match extract(prefix) {
                None => assert!(end < opener_end),
                Some(artifact) => {
                    if let Some(closed) = &closed_body {
                        assert_eq!(&artifact.body, closed);
                    } else if let Some(prev) = previous.as_deref().filter(|p| !p.ends_with('`')) {
                        // a half-typed closer is briefly part of the body
                        assert!(artifact.body.starts_with(prev));
                    }
                    if prefix.matches("```").count() >= 2 && closed_body.is_none() {
                        closed_body = Some(artifact.body.clone());
                    }
                    previous = Some(artifact.body);
                }
            }
        }
        assert_eq!(closed_body.as_deref(), Some("<p>hi</p>\n"));
    }

    #[test]
    fn test_syntax_mode_rules() {
        assert_eq!(SyntaxMode::Markup.refine("Python"), SyntaxMode::Python);
        assert_eq!(SyntaxMode::Markup.refine("py3"), SyntaxMode::Python);
        assert_eq!(SyntaxMode::Python.refine(""), SyntaxMode::Markup);
        assert_eq!(SyntaxMode::Python.refine("HTML"), SyntaxMode::Markup);
        assert_eq!(SyntaxMode::Markup.refine("js"), SyntaxMode::Script);
        assert_eq!(SyntaxMode::Markup.refine("json"), SyntaxMode::Script);
    }

    #[test]
    fn test_unknown_tag_keeps_previous_mode() {
        assert_eq!(SyntaxMode::Python.refine("rust"), SyntaxMode::Python);
        assert_eq!(SyntaxMode::Script.refine("css"), SyntaxMode::Script);
    }
}
