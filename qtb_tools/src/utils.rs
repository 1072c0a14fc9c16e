use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use qtb::{pgm, Raster};
use text_io::read;

pub enum Assume {
    Yes,
    No,
}

/// Load an input image as 8 bit greyscale.
///
/// Netpbm files are read as PGM, so any tag other than `P2` or `P5` is an
/// error. Anything else goes through `image` and is converted to luma.
pub fn load_greyscale(path: &Path) -> Result<Raster> {
    if is_netpbm(path)? {
        return load_pgm(path)
    }

    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Could not decode {path:?}"))?
        .into_luma8();

    let (width, height) = image.dimensions();
    Ok(Raster::from_raw(width, height, image.into_raw())?)
}

/// Save a greyscale image. A `.pgm` extension is written as plain text PGM,
/// other extensions use whatever format `image` associates with them.
pub fn save_greyscale(raster: &Raster, path: &Path) -> Result<()> {
    let is_pgm_path = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pgm"));

    if is_pgm_path {
        pgm::save(raster, path)?;
    } else {
        image::save_buffer(
            path,
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::L8,
        )?;
    }

    Ok(())
}

/// Load a PGM image, failing on any other format.
pub fn load_pgm(path: &Path) -> Result<Raster> {
    pgm::open(path).with_context(|| format!("Could not read PGM {path:?}"))
}

/// Whether the file starts with a Netpbm tag such as `P2` or `P6`.
fn is_netpbm(path: &Path) -> Result<bool> {
    let mut magic = [0u8; 2];
    let read = fs::File::open(path)?.read(&mut magic)?;

    Ok(read == 2 && magic[0] == b'P' && magic[1].is_ascii_digit())
}

/// Print the overwrite question and make sure it is visible before reading.
fn write_prompt<O: Write>(output: &mut O, place: &str, action: &str, path: &Path) -> io::Result<()> {
    write!(output, "{place} file {path:?} already exists. {action}? [y/N] ")?;
    output.flush()
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<&Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    loop {
        let _ = write_prompt(&mut io::stdout(), place, action, path);

        let opt: String = read!("{}\n");
        let opt = opt.to_lowercase();

        if opt.is_empty() {
            return false
        } else if opt == "y" {
            return true
        } else if opt == "n" {
            return false
        }
    }
}
