// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use log::{debug, warn};
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{digit1, space0, space1},
    combinator::opt,
    number::complete::double,
    IResult, Parser,
};

use super::{Lef, LefMacro, LefPin, LefPort, LefRect, PinDirection};
use crate::def::preprocessor::{preprocess_with, Preprocessed, LEF_BLOCK_KEYWORDS};
use crate::error::{ChipError, ChipResult};

/// Name or keyword: anything up to whitespace or `;`
fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ';')(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    let (input, _) = space1(input)?;
    double(input)
}

fn end_statement(input: &str) -> IResult<&str, ()> {
    let (input, _) = space0(input)?;
    let (input, _) = tag(";")(input)?;
    Ok((input, ()))
}

/// `SIZE x BY y ;`
fn parse_size(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, _) = tag("SIZE")(input)?;
    let (input, x) = number(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("BY")(input)?;
    let (input, y) = number(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, (x, y)))
}

/// `ORIGIN x y ;`
fn parse_origin(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, _) = tag("ORIGIN")(input)?;
    let (input, x) = number(input)?;
    let (input, y) = number(input)?;
    let (input, _) = end_statement(input)?;
    Ok((input, (x, y)))
}

/// `LAYER name [SPACING s | DESIGNRULEWIDTH w] ;` yields the layer name
fn parse_layer(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag("LAYER")(input)?;
    let (input, _) = space1(input)?;
    let (input, layer) = token(input)?;
    Ok((input, layer))
}

/// `RECT [MASK n] xl yl xh yh ;`
fn parse_rect<'a>(input: &'a str, layer: &str) -> IResult<&'a str, LefRect> {
    let (input, _) = tag("RECT")(input)?;
    let (input, _) = opt((space1, tag("MASK"), space1, digit1)).parse(input)?;
    let (input, xl) = number(input)?;
    let (input, yl) = number(input)?;
    let (input, xh) = number(input)?;
    let (input, yh) = number(input)?;
    let (input, _) = end_statement(input)?;
    Ok((
        input,
        LefRect {
            layer: layer.to_string(),
            xl: xl.min(xh),
            yl: yl.min(yh),
            xh: xl.max(xh),
            yh: yl.max(yh),
        },
    ))
}

/// `KEYWORD value ... ;` yields the first value
fn parse_keyword_value<'a>(input: &'a str, keyword: &str) -> IResult<&'a str, &'a str> {
    let (input, _) = tag(keyword)(input)?;
    let (input, _) = space1(input)?;
    token(input)
}

/// Walks the logical lines of one LEF file
struct LefCursor<'a> {
    pre: &'a Preprocessed,
    pos: usize,
}

impl<'a> LefCursor<'a> {
    fn next(&mut self) -> Option<&'a str> {
        let line = self.pre.lines.get(self.pos)?;
        self.pos += 1;
        Some(line.as_str())
    }

    /// Source line of the statement returned last
    fn line(&self) -> usize {
        self.pre.line_number(self.pos.saturating_sub(1))
    }

    fn error(&self, msg: impl Into<String>) -> ChipError {
        ChipError::LefParse {
            line: self.line(),
            msg: msg.into(),
        }
    }

    /// Run a statement parser over `stmt`, turning a nom failure into a
    /// located error
    fn statement<T>(
        &self,
        stmt: &'a str,
        parser: impl FnOnce(&'a str) -> IResult<&'a str, T>,
    ) -> ChipResult<T> {
        parser(stmt)
            .map(|(_, v)| v)
            .map_err(|_| self.error(format!("malformed statement \"{stmt}\"")))
    }

    /// Skip everything up to and including `END <name>`
    fn skip_block(&mut self, name: &str) -> ChipResult<()> {
        let end = format!("END {name}");
        let opened = self.line();
        while let Some(line) = self.next() {
            if line == end {
                return Ok(());
            }
        }
        Err(ChipError::LefParse {
            line: opened,
            msg: format!("block is missing \"{end}\""),
        })
    }
}

/// Parse LEF text into macro records. Top-level blocks other than `MACRO`
/// are skipped.
pub fn parse_lef(input: &str) -> ChipResult<Lef> {
    let pre = preprocess_with(input, LEF_BLOCK_KEYWORDS);
    debug!(
        "Preprocessed LEF: {} statements from {} lines",
        pre.lines.len(),
        input.lines().count()
    );
    let mut cursor = LefCursor { pre: &pre, pos: 0 };
    let mut lef = Lef::default();

    while let Some(line) = cursor.next() {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["MACRO", name] => {
                let macro_def = parse_macro(&mut cursor, name)?;
                debug!(
                    "Parsed MACRO {} ({:.3} x {:.3}, {} pins)",
                    macro_def.name,
                    macro_def.size_x,
                    macro_def.size_y,
                    macro_def.pins.len()
                );
                lef.macros.push(macro_def);
            }
            ["END", "LIBRARY"] => break,
            [kw] if !line.contains(';') => cursor.skip_block(kw)?,
            [_, name, ..] if !line.contains(';') => cursor.skip_block(name)?,
            _ => (),
        }
    }
    Ok(lef)
}

fn parse_macro(cursor: &mut LefCursor<'_>, name: &str) -> ChipResult<LefMacro> {
    let opened = cursor.line();
    let end = format!("END {name}");
    let mut mac = LefMacro {
        name: name.to_string(),
        ..Default::default()
    };

    while let Some(line) = cursor.next() {
        if line == end {
            return Ok(mac);
        }
        let first = line.split_whitespace().next().unwrap_or_default();
        match first {
            "CLASS" => {
                mac.class = line
                    .trim_start_matches("CLASS")
                    .trim_end_matches(';')
                    .trim()
                    .to_string();
            }
            "SIZE" => (mac.size_x, mac.size_y) = cursor.statement(line, parse_size)?,
            "ORIGIN" => mac.origin = cursor.statement(line, parse_origin)?,
            "PIN" => {
                let pin_name = line.split_whitespace().nth(1).unwrap_or_default();
                if pin_name.is_empty() {
                    return Err(cursor.error("PIN without a name"));
                }
                mac.pins.push(parse_pin(cursor, pin_name)?);
            }
            "OBS" => mac.obs = parse_geometry(cursor)?,
            "END" => return Err(cursor.error(format!("unexpected \"{line}\" in MACRO {name}"))),
            _ => (),
        }
    }
    Err(ChipError::LefParse {
        line: opened,
        msg: format!("MACRO {name} is missing \"{end}\""),
    })
}

fn parse_pin(cursor: &mut LefCursor<'_>, name: &str) -> ChipResult<LefPin> {
    let opened = cursor.line();
    let end = format!("END {name}");
    let mut pin = LefPin {
        name: name.to_string(),
        direction: None,
        use_type: String::new(),
        ports: Vec::new(),
    };

    while let Some(line) = cursor.next() {
        if line == end {
            return Ok(pin);
        }
        let first = line.split_whitespace().next().unwrap_or_default();
        match first {
            "DIRECTION" => {
                let word = cursor.statement(line, |s| parse_keyword_value(s, "DIRECTION"))?;
                pin.direction = PinDirection::from_keyword(word);
                if pin.direction.is_none() {
                    warn!("Pin {name}: unknown direction \"{word}\"");
                }
            }
            "USE" => {
                pin.use_type = cursor
                    .statement(line, |s| parse_keyword_value(s, "USE"))?
                    .to_string();
            }
            "PORT" => {
                let rects = parse_geometry(cursor)?;
                pin.ports.push(LefPort { rects });
            }
            "END" => return Err(cursor.error(format!("unexpected \"{line}\" in PIN {name}"))),
            _ => (),
        }
    }
    Err(ChipError::LefParse {
        line: opened,
        msg: format!("PIN {name} is missing \"{end}\""),
    })
}

/// Body of a `PORT` or `OBS` block, up to its bare `END`
fn parse_geometry(cursor: &mut LefCursor<'_>) -> ChipResult<Vec<LefRect>> {
    let opened = cursor.line();
    let mut rects = Vec::new();
    let mut layer = String::new();

    while let Some(line) = cursor.next() {
        let first = line.split_whitespace().next().unwrap_or_default();
        match first {
            "END" => return Ok(rects),
            "LAYER" => layer = cursor.statement(line, parse_layer)?.to_string(),
            "RECT" => rects.push(cursor.statement(line, |s| parse_rect(s, &layer))?),
            // POLYGON, VIA, WIDTH
            _ => (),
        }
    }
    Err(ChipError::LefParse {
        line: opened,
        msg: "geometry block is missing END".to_string(),
    })
}
