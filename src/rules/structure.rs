// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page structure and navigation
//!
//! - H25 (2.4.2, A): the document has a non-empty `<title>`
//! - G130 (2.4.6, AA): headings are descriptive, so never empty
//! - G91 (2.4.9, AAA): link text describes the link purpose on its own

use super::{is_blank, FindingSink, Rule};
use crate::document::{DocumentModel, Element};
use crate::error::RuleError;
use crate::finding::Level;
use async_trait::async_trait;

pub const H25: &str = "wcag-2.4.2-h25";
pub const G130: &str = "wcag-2.4.6-g130";
pub const G91: &str = "wcag-2.4.9-g91";

/// Link texts that say nothing about the destination
const GENERIC_LINK_TEXT: &[&str] = &[
    "click here",
    "click",
    "here",
    "more",
    "read more",
    "learn more",
    "link",
    "this link",
    "continue",
    "details",
];

/// H25: missing or empty document title
pub struct PageTitle;

#[async_trait(?Send)]
impl Rule for PageTitle {
    fn id(&self) -> &str {
        H25
    }

    fn description(&self) -> &str {
        "The document must have a non-empty title element"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        let titled = document
            .select("title")?
            .iter()
            .any(|title| !title.text().trim().is_empty());

        if !titled {
            let evidence = match document.select("head")?.first() {
                Some(head) => head.outer_html(),
                None => document.root().start_tag(),
            };
            sink.report(
                "A title should be provided for the document, using a non-empty title element in the head section",
                &evidence,
            );
        }
        Ok(())
    }
}

/// G130: headings with no text
pub struct EmptyHeading;

#[async_trait(?Send)]
impl Rule for EmptyHeading {
    fn id(&self) -> &str {
        G130
    }

    fn description(&self) -> &str {
        "Headings must not be empty"
    }

    fn default_level(&self) -> Level {
        Level::Warning
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for heading in document.select("h1, h2, h3, h4, h5, h6")? {
            if heading.text().trim().is_empty() && !has_image_text(&heading)? {
                sink.report(
                    "Heading elements must contain text that describes the section they introduce",
                    &heading.outer_html(),
                );
            }
        }
        Ok(())
    }
}

fn has_image_text(element: &Element<'_>) -> Result<bool, RuleError> {
    Ok(element
        .select("img")?
        .iter()
        .any(|img| !is_blank(img.attr("alt"))))
}

/// G91: links whose text is a generic phrase
pub struct GenericLinkText;

#[async_trait(?Send)]
impl Rule for GenericLinkText {
    fn id(&self) -> &str {
        G91
    }

    fn description(&self) -> &str {
        "Link text should describe the purpose of the link"
    }

    fn default_level(&self) -> Level {
        Level::Notice
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for link in document.select("a[href]")? {
            let text = normalize_link_text(&link.text());
            if GENERIC_LINK_TEXT.contains(&text.as_str()) && is_blank(link.attr("aria-label")) {
                sink.report(
                    &format!(
                        "Link text \"{}\" does not describe the purpose of the link",
                        text
                    ),
                    &link.outer_html(),
                );
            }
        }
        Ok(())
    }
}

/// Lowercase, collapse whitespace and drop trailing punctuation
fn normalize_link_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c == '\u{2026}')
        .to_string()
}
