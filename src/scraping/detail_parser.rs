// src/scraping/detail_parser.rs
//! Description text from a job detail page.
//!
//! Output is one line per paragraph or list item, list items prefixed with
//! `- `. Inline anchors and spans are dropped along with the site's
//! "Show more" / "Show less" button labels.

use anyhow::Result;
use scraper::{node::Node, ElementRef, Html, Selector};

use super::parse_selector;
use crate::types::MISSING_DESCRIPTION;

const UI_ARTIFACTS: [&str; 2] = ["Show more", "Show less"];

const BLOCK_ELEMENTS: [&str; 20] = [
    "p", "div", "br", "ul", "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article",
    "table", "tr", "blockquote", "pre", "hr", "button",
];

pub struct DetailParser {
    description: Selector,
}

impl DetailParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            description: parse_selector("div.description__text.description__text--rich")?,
        })
    }

    /// Cleaned description, or [`MISSING_DESCRIPTION`] when the page has none
    pub fn parse_detail_page(&self, document: &Html) -> String {
        match document.select(&self.description).next() {
            Some(container) => {
                let mut collector = TextCollector::default();
                collector.walk(container);
                collector.finish()
            }
            None => MISSING_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Default)]
struct TextCollector {
    lines: Vec<String>,
    current: String,
    pending_space: bool,
}

impl TextCollector {
    fn walk(&mut self, element: ElementRef) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(el) => {
                    let name = el.name();
                    if matches!(name, "span" | "a" | "script" | "style") {
                        continue;
                    }
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };

                    if name == "li" {
                        self.flush();
                        self.current.push_str("- ");
                        self.walk(child_element);
                        self.flush();
                    } else if BLOCK_ELEMENTS.contains(&name) {
                        self.flush();
                        self.walk(child_element);
                        self.flush();
                    } else {
                        self.walk(child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn push_text(&mut self, raw: &str) {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !raw.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        let separated = self.pending_space || raw.starts_with(char::is_whitespace);
        if separated && !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(&collapsed);
        self.pending_space = raw.ends_with(char::is_whitespace);
    }

    fn flush(&mut self) {
        let mut line = self.current.trim().to_string();
        for artifact in UI_ARTIFACTS {
            line = line.replace(artifact, "");
        }
        let line = line.trim();
        // a bullet whose only content was a link
        if !line.is_empty() && line != "-" {
            self.lines.push(line.to_string());
        }
        self.current.clear();
        self.pending_space = false;
    }

    fn finish(mut self) -> String {
        self.flush();
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = include_str!("../../tests/fixtures/job_detail.html");

    fn parse(html: &str) -> String {
        DetailParser::new()
            .unwrap()
            .parse_detail_page(&Html::parse_document(html))
    }

    #[test]
    fn test_parses_fixture_description() {
        assert_eq!(
            parse(DETAIL_PAGE),
            "About the role\n\
             We are building a high-throughput ingestion platform in Rust, and we need an engineer who enjoys systems work.\n\
             What you will do\n\
             - Design and operate async services with tokio\n\
             - Own the storage layer\n\
             Apply via today."
        );
    }

    #[test]
    fn test_missing_container_yields_sentinel() {
        assert_eq!(parse("<html><body><h1>Sign in</h1></body></html>"), MISSING_DESCRIPTION);
    }

    #[test]
    fn test_one_line_per_list_item() {
        let html = r#"
            <div class="description__text description__text--rich">
              <ol><li>First <b>bold</b> point</li><li>Second</li></ol>
            </div>"#;
        assert_eq!(parse(html), "- First bold point\n- Second");
    }

    #[test]
    fn test_blank_runs_collapse() {
        let html = r#"
            <div class="description__text description__text--rich">
              <p>One</p><br><br><br><p></p><p>Two</p>
            </div>"#;
        assert_eq!(parse(html), "One\nTwo");
    }

    #[test]
    fn test_empty_container_yields_empty_text() {
        let html = r#"<div class="description__text description__text--rich"> </div>"#;
        assert_eq!(parse(html), "");
    }
}
