// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use log::{debug, warn};
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{digit1, multispace0, space0, space1},
    combinator::map_res,
    multi::many1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::parser::component::DefComponentParser;
use super::parser::net::DefNetParser;
use super::parser::{DefItemParser, MultiLineParser};
use super::preprocessor::{preprocess, Preprocessed};
use super::Def;
use crate::error::{ChipError, ChipResult};

/// Sections whose items are not modelled; skipped up to `END <name>`
const SKIPPED_SECTIONS: &[&str] = &[
    "PROPERTYDEFINITIONS",
    "PINS",
    "PINPROPERTIES",
    "VIAS",
    "SPECIALNETS",
    "BLOCKAGES",
    "REGIONS",
    "GROUPS",
    "FILLS",
    "SLOTS",
    "STYLES",
    "SCANCHAINS",
    "NONDEFAULTRULES",
    "BEGINEXT",
];

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ';')(input)
}

fn integer(input: &str) -> IResult<&str, i32> {
    let (input, sign) = nom::combinator::opt(tag("-")).parse(input)?;
    let (input, value) = map_res(digit1, |d: &str| d.parse::<i32>()).parse(input)?;
    Ok((input, if sign.is_some() { -value } else { value }))
}

fn end_statement(input: &str) -> IResult<&str, ()> {
    let (input, _) = space0(input)?;
    let (input, _) = tag(";")(input)?;
    Ok((input, ()))
}

/// `DESIGN name ;`
fn parse_design(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag("DESIGN")(input)?;
    let (input, _) = space1(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, name))
}

/// `UNITS DISTANCE MICRONS n ;`
fn parse_units(input: &str) -> IResult<&str, u32> {
    let (input, _) = tag("UNITS")(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("DISTANCE")(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("MICRONS")(input)?;
    let (input, _) = space1(input)?;
    let (input, dbu) = map_res(digit1, |d: &str| d.parse::<u32>()).parse(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, dbu))
}

/// `( x y )`
fn parse_point(input: &str) -> IResult<&str, (i32, i32)> {
    let (input, _) = multispace0(input)?;
    delimited(
        (tag("("), space0),
        (integer, preceded(space1, integer)),
        (space0, tag(")")),
    )
    .parse(input)
}

/// `DIEAREA ( x y ) ( x y ) ... ;`
fn parse_die_area(input: &str) -> IResult<&str, Vec<(i32, i32)>> {
    let (input, _) = tag("DIEAREA")(input)?;
    let (input, points) = many1(parse_point).parse(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, points))
}

/// `KEYWORD count ;` opening a section
fn parse_section_header<'a>(input: &'a str, keyword: &str) -> IResult<&'a str, usize> {
    let (input, _) = tag(keyword)(input)?;
    let (input, _) = space1(input)?;
    let (input, count) = map_res(digit1, |d: &str| d.parse::<usize>()).parse(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, count))
}

struct DefSections<'a> {
    pre: &'a Preprocessed,
    lines: Vec<&'a str>,
}

impl<'a> DefSections<'a> {
    fn error(&self, index: usize, msg: impl Into<String>) -> ChipError {
        ChipError::DefParse {
            line: self.pre.line_number(index),
            msg: msg.into(),
        }
    }

    fn statement<T>(
        &self,
        index: usize,
        parser: impl FnOnce(&'a str) -> IResult<&'a str, T>,
    ) -> ChipResult<T> {
        let line = self.lines[index];
        parser(line)
            .map(|(_, v)| v)
            .map_err(|_| self.error(index, format!("malformed statement \"{line}\"")))
    }

    /// Parse the items of a section opened at `index`. Returns the items and
    /// the index of the closing `END` line.
    fn items<P: DefItemParser>(
        &self,
        parser: P,
        index: usize,
        keyword: &str,
    ) -> ChipResult<(Vec<P::Item>, usize)> {
        let declared = self.statement(index, |s| parse_section_header(s, keyword))?;
        let end = format!("END {keyword}");
        let (items, end_index) = MultiLineParser::new(parser)
            .with_debug(true)
            .parse_section_preprocessed_refs(&self.lines, index + 1, &end)
            .map_err(|(at, e)| self.error(at.min(self.lines.len().saturating_sub(1)), e.to_string()))?;
        if items.len() != declared {
            warn!(
                "{keyword} declares {declared} items but {} were parsed",
                items.len()
            );
        }
        Ok((items, end_index))
    }

    fn skip_section(&self, index: usize, keyword: &str) -> ChipResult<usize> {
        let end = format!("END {keyword}");
        self.lines[index + 1..]
            .iter()
            .position(|l| l.starts_with(&end))
            .map(|offset| index + 1 + offset)
            .ok_or_else(|| self.error(index, format!("{keyword} section is missing \"{end}\"")))
    }
}

/// Parse DEF text into design records. Only the header statements, the
/// `COMPONENTS` section and the `NETS` section are modelled.
pub fn parse_def(input: &str) -> ChipResult<Def> {
    let pre = preprocess(input);
    let sections = DefSections {
        pre: &pre,
        lines: pre.lines.iter().map(|s| s.as_str()).collect(),
    };
    let mut def = Def::default();
    let mut i = 0;

    while i < sections.lines.len() {
        let line = sections.lines[i];
        let keyword = line.split_whitespace().next().unwrap_or_default();
        match keyword {
            "DESIGN" => def.design = sections.statement(i, parse_design)?.to_string(),
            "UNITS" => def.dbu_per_micron = Some(sections.statement(i, parse_units)?),
            "DIEAREA" => def.die_area_points = sections.statement(i, parse_die_area)?,
            "COMPONENTS" => {
                let (components, end) = sections.items(DefComponentParser, i, "COMPONENTS")?;
                debug!("Parsed {} components", components.len());
                def.components = components;
                i = end;
            }
            "NETS" => {
                let (nets, end) = sections.items(DefNetParser::new(), i, "NETS")?;
                debug!("Parsed {} nets", nets.len());
                def.nets = nets;
                i = end;
            }
            kw if SKIPPED_SECTIONS.contains(&kw) => {
                debug!("Skipping {kw} section");
                i = sections.skip_section(i, kw)?;
            }
            "END" if line == "END DESIGN" => break,
            _ => (),
        }
        i += 1;
    }

    Ok(def)
}
