use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use dctlab::image::Image;
use dctlab::ppm;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(
        help = "Input file",
        long_help = "Input file. A .dctc coefficient stream is decoded to an image. Any other file is read as an image and encoded; .ppm files use the built-in text raster reader, other formats are decoded by the image crate."
    )]
    input: PathBuf,

    #[arg(short, long, help = "Output file")]
    output: Option<PathBuf>,

    #[arg(
        long,
        help = "Encode then decode the input image and write the reconstruction"
    )]
    roundtrip: bool,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|v| v.to_str())
        .is_some_and(|v| v.eq_ignore_ascii_case(extension))
}

fn read_image(path: &Path) -> anyhow::Result<Image> {
    if has_extension(path, "ppm") {
        return Ok(ppm::read_ppm_file(path)?);
    }
    let rgb = image::open(path)?.to_rgb8();
    Ok(Image::from(&rgb))
}

fn write_image(decoded: &Image, path: &Path) -> anyhow::Result<()> {
    if has_extension(path, "ppm") {
        ppm::write_ppm_file(decoded, path)?;
    } else {
        decoded.to_rgb_image().save(path)?;
    }
    Ok(())
}

fn handle_stream(input: &Path, output: &Path) -> anyhow::Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let decoded = dctlab::decompress(&bytes)?;
    write_image(&decoded, output)
        .with_context(|| format!("failed to write {}", output.display()))
}

fn handle_others(input: &Path, output: &Path) -> anyhow::Result<()> {
    let source = read_image(input).with_context(|| format!("failed to read {}", input.display()))?;
    let bytes = dctlab::compress(&source)?;
    info!(
        "压缩后 {} 字节，原始 RGB 数据 {} 字节",
        bytes.len(),
        source.height() * source.width() * 3
    );
    fs::write(output, bytes).with_context(|| format!("failed to write {}", output.display()))
}

fn handle_roundtrip(input: &Path, output: &Path) -> anyhow::Result<()> {
    let source = read_image(input).with_context(|| format!("failed to read {}", input.display()))?;
    let decoded = dctlab::decompress(&dctlab::compress(&source)?)?;
    write_image(&decoded, output)
        .with_context(|| format!("failed to write {}", output.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let input = args.input.as_path();
    let start = Instant::now();

    if args.roundtrip {
        let output = args
            .output
            .unwrap_or_else(|| input.with_extension("roundtrip.ppm"));
        info!(
            "输入图片文件 {}，压缩后解压到 {}",
            input.display(),
            output.display()
        );
        handle_roundtrip(input, &output)?;
    } else if has_extension(input, "dctc") {
        let output = args.output.unwrap_or_else(|| input.with_extension("ppm"));
        info!(
            "输入系数流文件 {}，解压到 {}",
            input.display(),
            output.display()
        );
        handle_stream(input, &output)?;
    } else {
        let output = args.output.unwrap_or_else(|| input.with_extension("dctc"));
        info!(
            "输入图片文件 {}，压缩到 {}",
            input.display(),
            output.display()
        );
        handle_others(input, &output)?;
    }

    info!("耗时 {:?}", start.elapsed());
    Ok(())
}
