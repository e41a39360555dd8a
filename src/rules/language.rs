// SPDX-License-Identifier: PMPL-1.0-or-later
//! Language of page - WCAG 3.1.1 (Level A), technique H57
//!
//! The `<html>` element must declare the page language so assistive
//! technology can pick the right pronunciation rules.

use super::{is_blank, FindingSink, Rule};
use crate::document::DocumentModel;
use crate::error::RuleError;
use async_trait::async_trait;

pub const H57: &str = "wcag-3.1.1-h57";

/// H57: `<html>` without a usable `lang`
pub struct PageLanguage;

#[async_trait(?Send)]
impl Rule for PageLanguage {
    fn id(&self) -> &str {
        H57
    }

    fn description(&self) -> &str {
        "The html element must have a non-empty lang attribute"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        let html = document.root();
        match html.attr("lang") {
            None => sink.report(
                "The html element should have a lang attribute which describes the language of the document",
                &html.start_tag(),
            ),
            lang if is_blank(lang) => sink.report(
                "The html element has an empty lang attribute",
                &html.start_tag(),
            ),
            Some(_) => {}
        }
        Ok(())
    }
}
