// SPDX-License-Identifier: PMPL-1.0-or-later
//! Read-only document model and the sources it can be loaded from.
//!
//! Rules only ever see `&DocumentModel`; there is no mutable access to the
//! parsed tree once a run starts.

use crate::error::{Error, Result, RuleError};
use scraper::{ElementRef, Html, Selector};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed HTML document
#[derive(Debug)]
pub struct DocumentModel {
    html: Html,
}

impl DocumentModel {
    /// Parse a full HTML document. Parsing is error-tolerant and never fails.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, query: &str) -> std::result::Result<Vec<Element<'_>>, RuleError> {
        let selector = parse_selector(query)?;
        Ok(self.html.select(&selector).map(Element).collect())
    }

    /// The `<html>` element
    pub fn root(&self) -> Element<'_> {
        Element(self.html.root_element())
    }
}

/// A borrowed element of a [`DocumentModel`]
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Lowercase tag name
    pub fn name(&self) -> &'a str {
        self.0.value().name()
    }

    /// Attribute value, `None` when the attribute is absent
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    /// Serialized markup of this element, including its children
    pub fn outer_html(&self) -> String {
        self.0.html()
    }

    /// Serialized start tag only, e.g. `<html lang="en">`
    pub fn start_tag(&self) -> String {
        let attrs: String = self
            .0
            .value()
            .attrs()
            .map(|(k, v)| format!(" {}=\"{}\"", k, v.replace('"', "&quot;")))
            .collect();
        format!("<{}{}>", self.name(), attrs)
    }

    /// Direct parent, if it is an element
    pub fn parent(&self) -> Option<Element<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Element)
    }

    /// Enclosing elements, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> {
        self.0.ancestors().filter_map(ElementRef::wrap).map(Element)
    }

    /// Descendants matching a CSS selector, in document order
    pub fn select(&self, query: &str) -> std::result::Result<Vec<Element<'a>>, RuleError> {
        let selector = parse_selector(query)?;
        Ok(self.0.select(&selector).map(Element).collect())
    }
}

fn parse_selector(query: &str) -> std::result::Result<Selector, RuleError> {
    Selector::parse(query).map_err(|e| RuleError::Selector {
        query: query.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Where the document under test comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Read everything from standard input
    Stdin,
    /// Read a local file
    File(PathBuf),
    /// The context itself is the markup
    Markup(String),
    /// A remote URL; fetching is not supported
    Url(String),
}

impl DocumentSource {
    /// Classify a command-line context argument.
    ///
    /// `None` and `-` read stdin, an existing path is a file, an
    /// `http(s)://` prefix is a URL, anything else is treated as markup.
    pub fn classify(context: Option<&str>) -> Self {
        match context {
            None | Some("-") => DocumentSource::Stdin,
            Some(c) if c.starts_with("http://") || c.starts_with("https://") => {
                DocumentSource::Url(c.to_string())
            }
            Some(c) if Path::new(c).is_file() => DocumentSource::File(PathBuf::from(c)),
            Some(c) => DocumentSource::Markup(c.to_string()),
        }
    }

    /// Fetch the raw markup
    pub fn read(&self) -> Result<String> {
        let markup = match self {
            DocumentSource::Stdin => {
                let mut stdin = std::io::stdin();
                if stdin.is_terminal() {
                    return Err(Error::DocumentUnavailable(
                        "no document given: pass a file, an HTML string, or pipe markup to stdin"
                            .to_string(),
                    ));
                }
                let mut buf = String::new();
                stdin
                    .read_to_string(&mut buf)
                    .map_err(|e| Error::DocumentUnavailable(format!("stdin: {}", e)))?;
                buf
            }
            DocumentSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                Error::DocumentUnavailable(format!("{}: {}", path.display(), e))
            })?,
            DocumentSource::Markup(markup) => markup.clone(),
            DocumentSource::Url(url) => {
                return Err(Error::DocumentUnavailable(format!(
                    "{}: fetching remote documents is not supported",
                    url
                )));
            }
        };

        debug!("Loaded {} bytes of markup from {:?}", markup.len(), self.kind());
        Ok(markup)
    }

    /// Load and parse in one step
    pub fn load(&self) -> Result<DocumentModel> {
        self.read().map(|markup| DocumentModel::parse(&markup))
    }

    fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Stdin => "stdin",
            DocumentSource::File(_) => "file",
            DocumentSource::Markup(_) => "markup",
            DocumentSource::Url(_) => "url",
        }
    }
}
