// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Unified parsing framework for DEF section items
//!
//! A section (`COMPONENTS`, `NETS`) is a run of `- name ... ;` items closed
//! by `END <section>`. Each item type plugs a [DefItemParser] into
//! [MultiLineParser], which walks preprocessed logical lines.

pub mod common;
pub mod component;
pub mod net;

use log::debug;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{0}")]
    InvalidFormat(String),
    #[error("{section} section is missing \"{end}\"")]
    UnexpectedEof { section: &'static str, end: String },
}

/// Result of handling a continuation line
#[derive(Debug, PartialEq)]
pub enum ContinuationResult {
    /// Continue processing more lines
    Continue,
    /// Current item is complete, move to next
    Complete,
    Error(String),
}

/// Parses one item type of a DEF section
pub trait DefItemParser {
    type Item;
    type Context;

    /// Parse the header of an item (`- NAME ...`)
    fn parse_header(&self, line: &str) -> Option<Self::Context>;

    /// Process the attribute text of the current item
    fn parse_continuation(&self, context: &mut Self::Context, line: &str) -> ContinuationResult;

    /// Build the item from the accumulated context
    fn finalize(&self, context: Self::Context) -> ParseResult<Self::Item>;

    fn item_name() -> &'static str;
}

/// Drives a [DefItemParser] over a section of logical lines
pub struct MultiLineParser<P: DefItemParser> {
    parser: P,
    debug_mode: bool,
}

impl<P: DefItemParser> MultiLineParser<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            debug_mode: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    /// Parse items from `start_index` up to the line starting with
    /// `end_pattern`. Returns the items and the index of the end line.
    /// Errors carry the logical line index they occurred at.
    pub fn parse_section_preprocessed_refs(
        &self,
        lines: &[&str],
        start_index: usize,
        end_pattern: &str,
    ) -> Result<(Vec<P::Item>, usize), (usize, ParseError)> {
        let mut items = Vec::new();
        let mut i = start_index;

        while i < lines.len() {
            let line = lines[i].trim();

            if line.starts_with(end_pattern) {
                if self.debug_mode {
                    debug!("Completed {} section: {} items", P::item_name(), items.len());
                }
                return Ok((items, i));
            }

            match self.parser.parse_header(line) {
                Some(mut context) => {
                    if self.debug_mode {
                        debug!("Parsing {} #{}: {line}", P::item_name(), items.len() + 1);
                    }
                    // Logical lines hold a whole item, so the header line is
                    // also its only continuation
                    match self.parser.parse_continuation(&mut context, line) {
                        ContinuationResult::Error(msg) => {
                            return Err((i, ParseError::InvalidFormat(msg)))
                        }
                        _ => {
                            let item = self.parser.finalize(context).map_err(|e| (i, e))?;
                            items.push(item);
                        }
                    }
                }
                None => {
                    if self.debug_mode {
                        debug!("Skipping non-item line: {line}");
                    }
                }
            }
            i += 1;
        }

        Err((
            i,
            ParseError::UnexpectedEof {
                section: P::item_name(),
                end: end_pattern.to_string(),
            },
        ))
    }
}
