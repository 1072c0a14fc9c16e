//! Reading and writing greyscale Netpbm (PGM) images.
//!
//! Both the plain text `P2` and binary `P5` variants can be read. Images are
//! always written as `P2`.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    error::{QtbError, Result},
    raster::{check_dimensions, Raster},
};

/// Load a PGM image from a file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let file = File::open(path)?;
    read(BufReader::new(file))
}

/// Save an image to a file as a plain text PGM.
pub fn save<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let mut output = BufWriter::new(File::create(path)?);
    write(raster, &mut output)?;
    output.flush()?;

    Ok(())
}

/// Read a PGM image from anything that implements [`BufRead`].
pub fn read<I: BufRead>(mut input: I) -> Result<Raster> {
    let tag = next_token(&mut input)?;
    let binary = match tag.as_str() {
        "P2" => false,
        "P5" => true,
        _ => return Err(QtbError::InvalidTag(tag)),
    };

    let width = parse_header_value(&mut input, "width")?;
    let height = parse_header_value(&mut input, "height")?;
    let max_value = parse_header_value(&mut input, "maximum value")?;
    if !(1..=255).contains(&max_value) {
        return Err(QtbError::InvalidPgm(format!("unsupported maximum value {max_value}")))
    }

    check_dimensions(width as i64, height as i64)?;
    let expected = width as usize * height as usize;

    let samples = if binary {
        let mut samples = vec![0u8; expected];
        input.read_exact(&mut samples)?;
        samples
    } else {
        let mut text = String::new();
        input.read_to_string(&mut text)?;

        let samples = text
            .split_whitespace()
            .map(|s| s.parse::<u8>().map_err(|_| QtbError::InvalidPgm(format!("bad sample {s:?}"))))
            .collect::<Result<Vec<u8>>>()?;

        if samples.len() != expected {
            return Err(QtbError::InvalidPgm(format!(
                "expected {expected} samples, found {}",
                samples.len()
            )))
        }
        samples
    };

    if let Some(&bad) = samples.iter().find(|&&s| s as u32 > max_value) {
        return Err(QtbError::InvalidPgm(format!("sample {bad} exceeds maximum value {max_value}")))
    }

    Raster::from_raw(width, height, samples)
}

/// Write an image as a plain text PGM, one image row per line.
pub fn write<O: Write>(raster: &Raster, output: &mut O) -> Result<()> {
    writeln!(output, "P2")?;
    writeln!(output, "{} {}", raster.width(), raster.height())?;
    writeln!(output, "255")?;

    for row in raster.as_raw().chunks(raster.width() as usize) {
        for sample in row {
            write!(output, "{sample} ")?;
        }
        writeln!(output)?;
    }

    Ok(())
}

fn parse_header_value<I: BufRead>(input: &mut I, name: &str) -> Result<u32> {
    let token = next_token(input)?;
    token
        .parse()
        .map_err(|_| QtbError::InvalidPgm(format!("bad {name} {token:?}")))
}

/// Read one whitespace delimited header token, skipping `#` comments.
///
/// Consumes exactly one whitespace byte after the token, so the binary raster
/// of a `P5` image starts right where this leaves off.
fn next_token<I: BufRead>(input: &mut I) -> Result<String> {
    let mut token = String::new();
    let mut in_comment = false;
    let mut byte = [0u8; 1];

    loop {
        if input.read(&mut byte)? == 0 {
            if token.is_empty() {
                return Err(QtbError::InvalidPgm("unexpected end of header".into()))
            }
            return Ok(token)
        }

        let c = byte[0] as char;
        if in_comment {
            in_comment = c != '\n';
        } else if c == '#' && token.is_empty() {
            in_comment = true;
        } else if c.is_ascii_whitespace() {
            if !token.is_empty() {
                return Ok(token)
            }
        } else {
            token.push(c);
        }
    }
}
