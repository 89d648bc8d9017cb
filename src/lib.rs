pub mod block;
pub mod coefficient;
pub mod dct;
pub mod entropy;
pub mod error;
pub mod image;
pub mod partition;
pub mod pixel;
pub mod ppm;
pub mod quantization;
pub mod stream_file;
pub mod zigzag;

use log::debug;
use log::info;
use rayon::prelude::*;

use crate::block::Block;
use crate::block::BlockCollection;
use crate::block::ChannelKind;
use crate::coefficient::AcCoefficient;
use crate::error::Error;
use crate::error::Result;
use crate::image::Image;
use crate::partition::block_locations;
use crate::partition::BLOCK_SIZE;
use crate::stream_file::StreamOutputData;

pub fn show_image(image: &Image) {
    info!("图像大小：{}x{}", image.width(), image.height());
    if image.height() > 0 && image.width() > 0 {
        debug!("左上角像素：{:?}", image.ycbcr_at(0, 0));
    }
}

pub fn show_blocks(stage: &str, blocks: &BlockCollection) {
    info!(
        "{}：Y {} 块，Cb {} 块，Cr {} 块",
        stage,
        blocks.y.len(),
        blocks.cb.len(),
        blocks.cr.len()
    );
    for kind in ChannelKind::ALL {
        if let Some(block) = blocks.channel(kind).first() {
            debug!("{} 第一个 {:?} 块：{:?}", stage, kind, block.samples);
        }
    }
}

pub fn show_stream(stream: &[AcCoefficient]) {
    info!("系数流长度：{}", stream.len());
    debug!(
        "系数流开头：{:?}",
        &stream[..stream.len().min(8)]
    );
}

/// 分块、降采样、DCT 和量化。返回按块扫描顺序排列的三组 8x8 系数块。
pub fn encode(image: &Image) -> BlockCollection {
    show_image(image);

    let blocks = image.extract_blocks();
    show_blocks("分块", &blocks);

    let transformed = blocks.par_map(Block::forward_dct);
    show_blocks("DCT", &transformed);

    transformed
}

/// `encode` 的逆过程：反量化、IDCT，色度块缩小回 4x4，再放回图像中。
pub fn decode(y: &[Block], cb: &[Block], cr: &[Block], height: usize, width: usize) -> Image {
    let inverse = |blocks: &[Block]| -> Vec<Block> {
        blocks
            .par_iter()
            .map(|block| block.inverse_dct().compress_to_4x4())
            .collect()
    };

    let restored = BlockCollection {
        height,
        width,
        y: inverse(y),
        cb: inverse(cb),
        cr: inverse(cr),
    };
    show_blocks("IDCT", &restored);

    let image = Image::reconstruct(&restored.y, &restored.cb, &restored.cr, height, width);
    show_image(&image);
    image
}

/// 把所有块的行程编码连成一个码流：先是所有 Y 块，然后是 Cb，最后是 Cr。
pub fn entropy_encode_blocks(blocks: &BlockCollection) -> Vec<AcCoefficient> {
    let stream: Vec<AcCoefficient> = ChannelKind::ALL
        .iter()
        .flat_map(|&kind| blocks.channel(kind))
        .flat_map(Block::entropy_encode)
        .collect();
    show_stream(&stream);
    stream
}

/// 码流只能顺序解码。块的分量和位置由它在码流中的序号以及图像大小确定。
pub fn entropy_decode_blocks(
    stream: &[AcCoefficient],
    height: usize,
    width: usize,
) -> Result<BlockCollection> {
    let blocks = (height / BLOCK_SIZE)
        .saturating_mul(width / BLOCK_SIZE)
        .saturating_mul(ChannelKind::ALL.len());
    if blocks > stream.len() {
        return Err(Error::MissingCoefficients {
            blocks,
            available: stream.len(),
        });
    }

    let locations = block_locations(height, width);
    let mut cursor = 0;

    let mut decode_channel = |kind: ChannelKind| -> Result<Vec<Block>> {
        locations
            .iter()
            .map(|&location| Block::entropy_decode(stream, &mut cursor, kind, location))
            .collect()
    };

    let y = decode_channel(ChannelKind::Y)?;
    let cb = decode_channel(ChannelKind::Cb)?;
    let cr = decode_channel(ChannelKind::Cr)?;

    if cursor != stream.len() {
        return Err(Error::TrailingCoefficients {
            remaining: stream.len() - cursor,
        });
    }

    let blocks = BlockCollection {
        height,
        width,
        y,
        cb,
        cr,
    };
    show_blocks("熵解码", &blocks);
    Ok(blocks)
}

/// 编码并打包成系数流文件的字节。
pub fn compress(image: &Image) -> Result<Vec<u8>> {
    let blocks = encode(image);
    let data = StreamOutputData {
        height: image.height(),
        width: image.width(),
        coefficients: entropy_encode_blocks(&blocks),
    };
    data.to_bytes()
}

pub fn decompress(bytes: &[u8]) -> Result<Image> {
    let data = StreamOutputData::from_bytes(bytes)?;
    show_stream(&data.coefficients);

    let blocks = entropy_decode_blocks(&data.coefficients, data.height, data.width)?;
    Ok(decode(
        &blocks.y,
        &blocks.cb,
        &blocks.cr,
        data.height,
        data.width,
    ))
}
