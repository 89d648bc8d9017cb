//! 文本格式的光栅文件（P3 风格）。
//!
//! 第 1 行是两个字符的标记，第 2 行是注释，第 3 行是宽和高，第 4 行是最大采样值，
//! 之后按行优先依次是每个像素的 R、G、B，每个值之间用空白分隔，通常一行一个。

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use log::debug;
use log::warn;

use crate::error::Error;
use crate::error::Result;
use crate::image::Image;
use crate::pixel::RgbPixel;

fn next_line<I>(lines: &mut I, what: &str) -> Result<String>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::Format(format!("missing {}", what))),
    }
}

fn parse_number(token: &str, what: &str) -> Result<usize> {
    token
        .trim()
        .parse()
        .map_err(|_| Error::Format(format!("invalid {} {:?}", what, token)))
}

/// 返回 (宽, 高)。兼容旧格式：宽和高各占 3 个字符，直接拼在一起。
fn parse_dimensions(line: &str) -> Result<(usize, usize)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [width, height] => Ok((parse_number(width, "width")?, parse_number(height, "height")?)),
        [packed] if packed.len() == 6 && packed.is_char_boundary(3) => Ok((
            parse_number(&packed[..3], "width")?,
            parse_number(&packed[3..], "height")?,
        )),
        _ => Err(Error::Format(format!("invalid dimensions {:?}", line))),
    }
}

/// 最大值不是 255 时线性缩放到 [0, 255]。
fn rescale(value: usize, max_value: usize) -> u8 {
    if max_value == 255 {
        value as u8
    } else {
        ((value * 255 + max_value / 2) / max_value) as u8
    }
}

pub fn read_ppm<R: BufRead>(reader: R) -> Result<Image> {
    let mut lines = reader.lines();

    let magic = next_line(&mut lines, "magic number")?;
    let magic = magic.trim();
    if magic.len() != 2 || !magic.starts_with('P') {
        return Err(Error::Format(format!("invalid magic number {:?}", magic)));
    }
    next_line(&mut lines, "comment line")?;
    let (width, height) = parse_dimensions(&next_line(&mut lines, "dimensions")?)?;
    let max_value = parse_number(&next_line(&mut lines, "max value")?, "max value")?;
    if !(1..=255).contains(&max_value) {
        return Err(Error::Format(format!("unsupported max value {}", max_value)));
    }
    debug!("光栅文件头：{} 宽 {} 高 {}，最大值 {}", magic, width, height, max_value);

    let expected = height
        .checked_mul(width)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| Error::Format(format!("dimensions {}x{} are too large", width, height)))?;
    // 头部不可信，容量随读到的采样值增长。
    let mut samples = Vec::new();
    let mut extra = 0_usize;
    for line in lines {
        let line = line?;
        for token in line.split_whitespace() {
            if samples.len() == expected {
                extra += 1;
                continue;
            }
            let value = parse_number(token, "sample")?;
            if value > max_value {
                return Err(Error::Format(format!(
                    "sample {} exceeds max value {}",
                    value, max_value
                )));
            }
            samples.push(rescale(value, max_value));
        }
    }

    if samples.len() < expected {
        return Err(Error::TruncatedPixelData {
            expected,
            actual: samples.len(),
        });
    }
    if extra > 0 {
        warn!("光栅文件末尾有 {} 个多余的采样值，已忽略", extra);
    }

    let pixels = samples
        .chunks_exact(3)
        .map(|rgb| RgbPixel::new(rgb[0], rgb[1], rgb[2]))
        .collect();
    Image::from_rgb(height, width, pixels)
}

pub fn read_ppm_file(path: impl AsRef<Path>) -> Result<Image> {
    read_ppm(BufReader::new(File::open(path)?))
}

pub fn write_ppm<W: Write>(image: &Image, mut writer: W) -> Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "# written by dctlab")?;
    writeln!(writer, "{} {}", image.width(), image.height())?;
    writeln!(writer, "255")?;
    for pixel in image.rgb() {
        writeln!(writer, "{}\n{}\n{}", pixel.red, pixel.green, pixel.blue)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_ppm_file(image: &Image, path: impl AsRef<Path>) -> Result<()> {
    write_ppm(image, BufWriter::new(File::create(path)?))
}
