use std::cell::OnceCell;

use image::RgbImage;

use crate::block::Block;
use crate::block::BlockCollection;
use crate::block::ChannelKind;
use crate::block::Du;
use crate::block::Samples;
use crate::block::SubsampledDu;
use crate::error::Error;
use crate::error::Result;
use crate::partition::block_locations;
use crate::partition::BlockLocation;
use crate::pixel::rgb_to_ycbcr;
use crate::pixel::ycbcr_to_rgb;
use crate::pixel::RgbPixel;
use crate::pixel::YCbCrPixel;

/// 图像。同时缓存 RGB 和 YCbCr 两种表示，至少有一种是有效的。
/// 需要另一种时整张图转换一次并缓存。像素按行优先存储。
#[derive(Debug, Clone)]
pub struct Image {
    height: usize,
    width: usize,
    rgb: OnceCell<Vec<RgbPixel>>,
    ycbcr: OnceCell<Vec<YCbCrPixel>>,
}

fn check_len(height: usize, width: usize, actual: usize) -> Result<()> {
    let expected = height * width;
    if actual != expected {
        return Err(Error::BufferSizeMismatch { expected, actual });
    }
    Ok(())
}

impl Image {
    pub fn from_rgb(height: usize, width: usize, pixels: Vec<RgbPixel>) -> Result<Self> {
        check_len(height, width, pixels.len())?;
        Ok(Self {
            height,
            width,
            rgb: OnceCell::from(pixels),
            ycbcr: OnceCell::new(),
        })
    }

    pub fn from_ycbcr(height: usize, width: usize, pixels: Vec<YCbCrPixel>) -> Result<Self> {
        check_len(height, width, pixels.len())?;
        Ok(Self {
            height,
            width,
            rgb: OnceCell::new(),
            ycbcr: OnceCell::from(pixels),
        })
    }

    /// 行数。
    pub fn height(&self) -> usize {
        self.height
    }

    /// 列数。
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rgb(&self) -> &[RgbPixel] {
        self.rgb.get_or_init(|| {
            let source = self.ycbcr.get().map(Vec::as_slice).unwrap_or_default();
            source.iter().map(|&p| ycbcr_to_rgb(p)).collect()
        })
    }

    pub fn ycbcr(&self) -> &[YCbCrPixel] {
        self.ycbcr.get_or_init(|| {
            let source = self.rgb.get().map(Vec::as_slice).unwrap_or_default();
            source.iter().map(|&p| rgb_to_ycbcr(p)).collect()
        })
    }

    pub fn rgb_at(&self, row: usize, col: usize) -> RgbPixel {
        self.rgb()[row * self.width + col]
    }

    pub fn ycbcr_at(&self, row: usize, col: usize) -> YCbCrPixel {
        self.ycbcr()[row * self.width + col]
    }

    pub fn block_locations(&self) -> Vec<BlockLocation> {
        block_locations(self.height, self.width)
    }

    /// 按块扫描顺序取出三个分量的块。Y 为 8x8，Cb 和 Cr 降采样为 4x4。
    pub fn extract_blocks(&self) -> BlockCollection {
        let ycbcr = self.ycbcr();
        let locations = self.block_locations();

        let extract = |kind: ChannelKind| -> Vec<Block> {
            locations
                .iter()
                .map(|&location| extract_block(ycbcr, self.width, kind, location))
                .collect()
        };

        BlockCollection {
            height: self.height,
            width: self.width,
            y: extract(ChannelKind::Y),
            cb: extract(ChannelKind::Cb),
            cr: extract(ChannelKind::Cr),
        }
    }

    /// 用解码出的块重建 YCbCr 图像。8x8 的块直接复制，4x4 的块每个值复制到 2x2 的区域。
    /// 没有被块覆盖的像素为黑色。
    pub fn reconstruct(
        y: &[Block],
        cb: &[Block],
        cr: &[Block],
        height: usize,
        width: usize,
    ) -> Image {
        let mut pixels = vec![YCbCrPixel::default(); height * width];

        for block in y.iter().chain(cb).chain(cr) {
            place_block(&mut pixels, height, width, block);
        }

        Image {
            height,
            width,
            rgb: OnceCell::new(),
            ycbcr: OnceCell::from(pixels),
        }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let mut img = RgbImage::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = self.rgb_at(y as usize, x as usize).into();
        }
        img
    }
}

impl From<&RgbImage> for Image {
    fn from(img: &RgbImage) -> Self {
        let pixels: Vec<RgbPixel> = img.pixels().map(|&p| RgbPixel::from(p)).collect();
        Image {
            height: img.height() as usize,
            width: img.width() as usize,
            rgb: OnceCell::from(pixels),
            ycbcr: OnceCell::new(),
        }
    }
}

fn sample(pixel: &YCbCrPixel, kind: ChannelKind) -> i32 {
    match kind {
        ChannelKind::Y => pixel.y as i32,
        ChannelKind::Cb => pixel.cb as i32,
        ChannelKind::Cr => pixel.cr as i32,
    }
}

fn extract_block(
    ycbcr: &[YCbCrPixel],
    width: usize,
    kind: ChannelKind,
    location: BlockLocation,
) -> Block {
    let (row, col) = location.top_left;
    let at = |i: usize, j: usize| sample(&ycbcr[(row + i) * width + col + j], kind);

    let samples = match kind {
        ChannelKind::Y => {
            let mut ret = [[0_i32; 8]; 8];
            for i in 0..8 {
                for j in 0..8 {
                    ret[i][j] = at(i, j);
                }
            }
            Samples::Full(Du(ret))
        }
        // 4:2:0，每个 2x2 区域取平均（整除 4）。
        ChannelKind::Cb | ChannelKind::Cr => {
            let mut ret = [[0_i32; 4]; 4];
            for i in 0..4 {
                for j in 0..4 {
                    let sum = at(2 * i, 2 * j)
                        + at(2 * i, 2 * j + 1)
                        + at(2 * i + 1, 2 * j)
                        + at(2 * i + 1, 2 * j + 1);
                    ret[i][j] = sum / 4;
                }
            }
            Samples::Subsampled(SubsampledDu(ret))
        }
    };

    Block::new(samples, kind, location)
}

fn place_block(pixels: &mut [YCbCrPixel], height: usize, width: usize, block: &Block) {
    let (row, col) = block.location.top_left;

    for i in 0..8 {
        for j in 0..8 {
            let (r, c) = (row + i, col + j);
            if r >= height || c >= width {
                continue;
            }
            let value = match &block.samples {
                Samples::Full(du) => du.0[i][j],
                Samples::Subsampled(du) => du.0[i / 2][j / 2],
            };
            let value = value.clamp(0, 255) as u8;

            let pixel = &mut pixels[r * width + c];
            match block.kind {
                ChannelKind::Y => pixel.y = value,
                ChannelKind::Cb => pixel.cb = value,
                ChannelKind::Cr => pixel.cr = value,
            }
        }
    }
}
