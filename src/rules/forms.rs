// SPDX-License-Identifier: PMPL-1.0-or-later
//! Form labels - WCAG 1.3.1 Info and Relationships (Level A), technique H44
//!
//! Every labelable form control needs an accessible name: a `<label for>`,
//! a wrapping `<label>`, `aria-label`, `aria-labelledby`, or `title`.

use super::{is_blank, FindingSink, Rule};
use crate::document::{DocumentModel, Element};
use crate::error::RuleError;
use crate::finding::Level;
use async_trait::async_trait;
use std::collections::HashSet;

pub const H44: &str = "wcag-1.3.1-h44";

/// Input types that do not need a visible label
const EXEMPT_INPUT_TYPES: &[&str] = &["hidden", "submit", "reset", "button", "image"];

/// H44: form controls without an associated label
pub struct ControlLabel;

#[async_trait(?Send)]
impl Rule for ControlLabel {
    fn id(&self) -> &str {
        H44
    }

    fn description(&self) -> &str {
        "Form controls must have an associated label"
    }

    async fn evaluate(
        &self,
        document: &DocumentModel,
        sink: &mut FindingSink,
    ) -> Result<(), RuleError> {
        let label_fors: HashSet<&str> = document
            .select("label[for]")?
            .into_iter()
            .filter_map(|label| label.attr("for"))
            .collect();

        for control in document.select("input, select, textarea")? {
            if control.name() == "input" {
                let input_type = control.attr("type").unwrap_or("text").to_lowercase();
                if EXEMPT_INPUT_TYPES.contains(&input_type.as_str()) {
                    continue;
                }
            }

            if has_label(&control, &label_fors) {
                continue;
            }

            if control.has_attr("placeholder") {
                // Placeholder alone is not a label, but the field is not nameless
                sink.report_as(
                    Level::Warning,
                    "Form control relies only on a placeholder for labelling",
                    &control.outer_html(),
                );
            } else {
                sink.report(
                    "Form controls must have an associated label, aria-label or aria-labelledby",
                    &control.outer_html(),
                );
            }
        }
        Ok(())
    }
}

fn has_label(control: &Element<'_>, label_fors: &HashSet<&str>) -> bool {
    let by_for = control
        .attr("id")
        .is_some_and(|id| label_fors.contains(id));
    let wrapped = control.ancestors().any(|e| e.name() == "label");
    let named = ["aria-label", "aria-labelledby", "title"]
        .iter()
        .any(|attr| !is_blank(control.attr(attr)));

    by_for || wrapped || named
}
