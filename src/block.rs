use rayon::prelude::*;

use crate::dct::dct;
use crate::dct::idct;
use crate::partition::BlockLocation;
use crate::quantization::QUANTIZATION_TABLE;

/// 块所属的分量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Y,
    Cb,
    Cr,
}

impl ChannelKind {
    /// 码流中分量的先后顺序。
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Y, ChannelKind::Cb, ChannelKind::Cr];
}

/// DU 是 8x8 的有符号数，既可以是采样值，也可以是系数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Du(pub [[i32; 8]; 8]);

/// 4:2:0 降采样后的色度 DU，对应原图的 8x8 区域。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsampledDu(pub [[i32; 4]; 4]);

impl SubsampledDu {
    /// 最近邻放大：(i, j) 复制到 (2i, 2j) 开始的 2x2 区域。
    pub fn expand(&self) -> Du {
        let mut ret = [[0_i32; 8]; 8];

        for i in 0..8 {
            for j in 0..8 {
                ret[i][j] = self.0[i / 2][j / 2];
            }
        }

        Du(ret)
    }
}

impl Du {
    /// 每个 2x2 区域取平均（整除 4），是 `SubsampledDu::expand` 的逆。
    pub fn compress(&self) -> SubsampledDu {
        let mut ret = [[0_i32; 4]; 4];

        for i in 0..4 {
            for j in 0..4 {
                let sum = self.0[2 * i][2 * j]
                    + self.0[2 * i][2 * j + 1]
                    + self.0[2 * i + 1][2 * j]
                    + self.0[2 * i + 1][2 * j + 1];
                ret[i][j] = sum / 4;
            }
        }

        SubsampledDu(ret)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Samples {
    Full(Du),
    Subsampled(SubsampledDu),
}

/// 变换编码的基本单位。所有变换都返回新的块，分量和位置保持不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub samples: Samples,
    pub kind: ChannelKind,
    pub location: BlockLocation,
}

impl Block {
    pub fn new(samples: Samples, kind: ChannelKind, location: BlockLocation) -> Self {
        Self {
            samples,
            kind,
            location,
        }
    }

    /// 8x8 的数据。对 4x4 的块调用是调用者的编程错误。
    pub fn du(&self) -> &Du {
        match &self.samples {
            Samples::Full(du) => du,
            Samples::Subsampled(_) => panic!(
                "{:?} block at {:?} is 4x4, expected 8x8",
                self.kind, self.location.top_left
            ),
        }
    }

    fn with_samples(&self, samples: Samples) -> Block {
        Block { samples, ..*self }
    }

    /// Y 块原样返回；色度块从 4x4 放大为 8x8。
    pub fn expand_to_8x8(&self) -> Block {
        match self.kind {
            ChannelKind::Y => *self,
            ChannelKind::Cb | ChannelKind::Cr => match &self.samples {
                Samples::Full(_) => *self,
                Samples::Subsampled(du) => self.with_samples(Samples::Full(du.expand())),
            },
        }
    }

    /// Y 块原样返回；色度块从 8x8 缩小为 4x4。
    pub fn compress_to_4x4(&self) -> Block {
        match self.kind {
            ChannelKind::Y => *self,
            ChannelKind::Cb | ChannelKind::Cr => match &self.samples {
                Samples::Full(du) => self.with_samples(Samples::Subsampled(du.compress())),
                Samples::Subsampled(_) => *self,
            },
        }
    }

    /// 放大、减去 128、DCT、量化。输出总是 8x8。
    /// 系数先四舍五入为整数，量化再向零截断。
    pub fn forward_dct(&self) -> Block {
        let expanded = self.expand_to_8x8();
        let shifted = expanded.du().0.map(|row| row.map(|it| (it - 128) as f64));
        let coefficients = dct(&shifted).map(|row| row.map(|it| it.round() as i32));

        self.with_samples(Samples::Full(QUANTIZATION_TABLE.quantize(&Du(coefficients))))
    }

    /// 反量化、IDCT、加上 128。输入必须是 8x8，输出限制在 [0, 255]。
    pub fn inverse_dct(&self) -> Block {
        let dequantized = QUANTIZATION_TABLE.dequantize(self.du());
        let input = dequantized.0.map(|row| row.map(|it| it as f64));
        let samples = idct(&input).map(|row| row.map(|it| (it.round() as i32 + 128).clamp(0, 255)));

        self.with_samples(Samples::Full(Du(samples)))
    }
}

/// 一张图像按分量分开的三组块，每组按块扫描顺序排列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCollection {
    pub height: usize,
    pub width: usize,
    pub y: Vec<Block>,
    pub cb: Vec<Block>,
    pub cr: Vec<Block>,
}

impl BlockCollection {
    pub fn channel(&self, kind: ChannelKind) -> &[Block] {
        match kind {
            ChannelKind::Y => &self.y,
            ChannelKind::Cb => &self.cb,
            ChannelKind::Cr => &self.cr,
        }
    }

    /// 所有分量的块数之和。
    pub fn len(&self) -> usize {
        self.y.len() + self.cb.len() + self.cr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 对每个块独立地做变换。块之间没有依赖，可以并行，结果保持原顺序。
    pub fn par_map<F>(&self, f: F) -> BlockCollection
    where
        F: Fn(&Block) -> Block + Sync + Send,
    {
        let map = |blocks: &Vec<Block>| -> Vec<Block> { blocks.par_iter().map(&f).collect() };

        BlockCollection {
            height: self.height,
            width: self.width,
            y: map(&self.y),
            cb: map(&self.cb),
            cr: map(&self.cr),
        }
    }
}
