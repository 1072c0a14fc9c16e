mod utils;

use std::{
    collections::BTreeMap,
    fs,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use qtb::{
    batch::encode_all,
    decoder::BlockReader,
    metrics::{compression_ratio, mean_squared_error, psnr},
    DecodeOptions, EncodeOptions,
};
use utils::{exists_decision, load_greyscale, load_pgm, save_greyscale, Assume};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'y', long = "overwrite", conflicts_with = "assumeno", global = true)]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'n', long = "preserve", conflicts_with = "assumeyes", global = true)]
    assumeno: bool,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Encode a greyscale image to QTB format
    Encode(EncodeArgs),

    /// Decode a QTB image into another format
    Decode(DecodeArgs),

    /// Encode, decode, and report how faithful and how small the result is
    Roundtrip(RoundtripArgs),

    /// Print the header and block statistics of a QTB file
    Inspect(InspectArgs),

    /// Encode several images in parallel
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Input PGM, or any image type supported by `image`
    input: PathBuf,

    /// Output path to QTB location
    output: PathBuf,

    /// Largest pixel difference treated as uniform. 0 is lossless.
    #[arg(default_value_t = 0, short, long)]
    tolerance: u8,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Input QTB image file
    input: PathBuf,

    /// Output image file, written as plain PGM if it ends in `.pgm`
    output: PathBuf,

    /// Reject streams that end partway through a block
    #[arg(short, long)]
    strict: bool,

    /// Reject streams that leave pixels unpainted
    #[arg(short, long)]
    verify: bool,
}

#[derive(Debug, Args)]
struct RoundtripArgs {
    /// Input PGM image
    input: PathBuf,

    /// Directory for the encoded and reconstructed files.
    ///
    /// Defaults to the directory of the input.
    #[arg(short, long)]
    workdir: Option<PathBuf>,

    /// Largest pixel difference treated as uniform. 0 is lossless.
    #[arg(default_value_t = 0, short, long)]
    tolerance: u8,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Input QTB image file
    input: PathBuf,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Input images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write `<name>.qtb` files into
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Largest pixel difference treated as uniform. 0 is lossless.
    #[arg(default_value_t = 0, short, long)]
    tolerance: u8,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Encode(a) => encode(a, assume),
        Subcommands::Decode(a) => decode(a, assume),
        Subcommands::Roundtrip(a) => roundtrip(a, assume),
        Subcommands::Inspect(a) => inspect(a),
        Subcommands::Batch(a) => batch(a, assume),
    }
}

fn check_input(input: &Path) -> Result<()> {
    if !input.try_exists()? {
        bail!("Input file {:?} does not exist", input);
    }

    Ok(())
}

fn may_write(output: &Path, assume: Option<&Assume>) -> Result<bool> {
    Ok(!output.try_exists()? || exists_decision("Output", "Overwrite", &output, assume))
}

fn encode(args: EncodeArgs, assume: Option<Assume>) -> Result<()> {
    check_input(&args.input)?;
    if !may_write(&args.output, assume.as_ref())? {
        return Ok(())
    }

    let image = load_greyscale(&args.input)?;
    let stats = qtb::save(&image, &args.output, EncodeOptions::lossy(args.tolerance))
        .with_context(|| format!("Could not encode to {:?}", args.output))?;

    info!(
        "encoded {}×{} image into {} blocks ({} bytes)",
        image.width(), image.height(), stats.leaves, stats.bytes_written
    );

    Ok(())
}

fn decode(args: DecodeArgs, assume: Option<Assume>) -> Result<()> {
    check_input(&args.input)?;
    if !may_write(&args.output, assume.as_ref())? {
        return Ok(())
    }

    let options = DecodeOptions {
        strict: args.strict,
        verify_coverage: args.verify,
    };
    let image = qtb::open(&args.input, options)
        .with_context(|| format!("Could not decode {:?}", args.input))?;

    save_greyscale(&image, &args.output)?;

    Ok(())
}

fn roundtrip(args: RoundtripArgs, assume: Option<Assume>) -> Result<()> {
    check_input(&args.input)?;

    let workdir = match args.workdir {
        Some(dir) => dir,
        None => args.input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    fs::create_dir_all(&workdir)?;

    let stem = args.input.file_stem().unwrap_or_default().to_string_lossy().into_owned();
    let encoded_path = workdir.join(format!("{stem}_quadtree.qtb"));
    let output_path = workdir.join(format!("{stem}_quadtree_reconstructed.pgm"));

    for path in [&encoded_path, &output_path] {
        if !may_write(path, assume.as_ref())? {
            return Ok(())
        }
    }

    let original = load_pgm(&args.input)?;
    println!("Loaded image: {}×{}", original.width(), original.height());

    println!("Encoding...");
    let stats = qtb::save(&original, &encoded_path, EncodeOptions::lossy(args.tolerance))?;
    println!("Wrote {:?} ({} blocks)", encoded_path, stats.leaves);

    println!("Decoding...");
    let reconstructed = qtb::open(&encoded_path, DecodeOptions::default())?;
    save_greyscale(&reconstructed, &output_path)?;
    println!("Reconstructed image saved to {:?}", output_path);

    let mse = mean_squared_error(&original, &reconstructed)?;
    let original_size = fs::metadata(&args.input)?.len();
    let encoded_size = fs::metadata(&encoded_path)?.len();

    println!(
        "Compression: {:.2}% (from {} bytes to {} bytes)",
        compression_ratio(original_size, encoded_size),
        original_size,
        encoded_size,
    );
    println!("MSE: {mse:.6}");
    println!("PSNR: {:.2} dB", psnr(mse));
    if mse == 0.0 {
        println!("Lossless compression.");
    } else {
        println!("Lossy compression (MSE > 0).");
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    check_input(&args.input)?;

    let input = BufReader::new(fs::File::open(&args.input)?);
    let records = BlockReader::new(input, true)?;
    let header = records.header();

    let mut sizes: BTreeMap<u16, usize> = BTreeMap::new();
    let mut total = 0;
    for record in records {
        *sizes.entry(record?.size).or_default() += 1;
        total += 1;
    }

    println!("Dimensions: {}×{}", header.width, header.height);
    println!("Covering size: {}", qtb::region::covering_size(header.width, header.height));
    println!("Blocks: {total}");
    for (size, count) in sizes.iter().rev() {
        println!("  {size:>5}×{size:<5} {count}");
    }

    Ok(())
}

fn batch(args: BatchArgs, assume: Option<Assume>) -> Result<()> {
    fs::create_dir_all(&args.out_dir)?;

    let mut outputs = Vec::new();
    let mut images = Vec::new();
    for input in &args.inputs {
        check_input(input)?;

        let stem = input.file_stem().unwrap_or_default().to_string_lossy().into_owned();
        let output = args.out_dir.join(format!("{stem}.qtb"));
        if !may_write(&output, assume.as_ref())? {
            continue
        }

        images.push(load_greyscale(input)?);
        outputs.push(output);
    }

    let results = encode_all(&images, EncodeOptions::lossy(args.tolerance));
    for (output, result) in outputs.iter().zip(results) {
        let encoded = result.with_context(|| format!("Could not encode {output:?}"))?;
        fs::write(output, &encoded.bytes)?;

        info!("wrote {:?} ({} blocks)", output, encoded.stats.leaves);
    }

    Ok(())
}
