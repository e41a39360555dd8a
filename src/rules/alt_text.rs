// SPDX-License-Identifier: PMPL-1.0-or-later
//! Text alternatives - WCAG 1.1.1 Non-text Content (Level A)
//!
//! - H30: linked images need alt text when the link has no other text
//! - H36: image inputs need an `alt` attribute
//! - H37: every `<img>` needs an `alt` attribute
//! - H67: an empty `alt` must not be paired with a non-empty `title`

use super::{is_blank, FindingSink, Rule};
use crate::document::DocumentModel;
use crate::error::RuleError;
use async_trait::async_trait;

pub const H30: &str = "wcag-1.1.1-h30";
pub const H36: &str = "wcag-1.1.1-h36";
pub const H37: &str = "wcag-1.1.1-h37";
pub const H67: &str = "wcag-1.1.1-h67";

/// H30: images that are the only content of a link
pub struct ImageInAnchorAlt;

#[async_trait(?Send)]
impl Rule for ImageInAnchorAlt {
    fn id(&self) -> &str {
        H30
    }

    fn description(&self) -> &str {
        "Linked images need alt text when the link contains no other text"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for img in document.select("a img")? {
            let alt = img.attr("alt");
            if alt.is_none() || !is_blank(alt) {
                continue;
            }
            let Some(parent) = img.parent() else {
                continue;
            };
            if parent.text().trim().is_empty() {
                sink.report(
                    "Images in anchors must have alternative text when the anchor contains no text content",
                    &parent.outer_html(),
                );
            }
        }
        Ok(())
    }
}

/// H36: `<input type="image">` without `alt`
pub struct ImageInputAlt;

#[async_trait(?Send)]
impl Rule for ImageInputAlt {
    fn id(&self) -> &str {
        H36
    }

    fn description(&self) -> &str {
        "Image inputs must have an alt attribute"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for input in document.select("input[type=image]")? {
            if !input.has_attr("alt") {
                sink.report("Image inputs must have an `alt` attribute", &input.outer_html());
            }
        }
        Ok(())
    }
}

/// H37: `<img>` without `alt`
pub struct ImageAlt;

#[async_trait(?Send)]
impl Rule for ImageAlt {
    fn id(&self) -> &str {
        H37
    }

    fn description(&self) -> &str {
        "Images must have an alt attribute"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for img in document.select("img")? {
            if !img.has_attr("alt") {
                sink.report("Images must have an `alt` attribute", &img.outer_html());
            }
        }
        Ok(())
    }
}

/// H67: decorative-looking images that still carry a title
pub struct TitledImageAlt;

#[async_trait(?Send)]
impl Rule for TitledImageAlt {
    fn id(&self) -> &str {
        H67
    }

    fn description(&self) -> &str {
        "Images with a non-empty title must have a non-empty alt attribute"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        for img in document.select("img")? {
            let alt = img.attr("alt");
            let empty_alt = alt.is_some() && is_blank(alt);
            if empty_alt && !is_blank(img.attr("title")) {
                sink.report(
                    "Images must have a non-empty `alt` attribute if their `title` attribute is non-empty",
                    &img.outer_html(),
                );
            }
        }
        Ok(())
    }
}
