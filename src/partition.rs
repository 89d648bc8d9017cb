use log::warn;

/// 块的边长。
pub const BLOCK_SIZE: usize = 8;

/// 原图中一个 8x8 区域的四个角，坐标为 (行, 列)。
/// 右边和下边的角是开区间的端点，即 `top_right.1 - top_left.1 == 8`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockLocation {
    pub top_left: (usize, usize),
    pub top_right: (usize, usize),
    pub bottom_left: (usize, usize),
    pub bottom_right: (usize, usize),
}

impl BlockLocation {
    /// 以左上角为锚点构造一个块位置。
    pub fn at(row: usize, col: usize) -> Self {
        Self {
            top_left: (row, col),
            top_right: (row, col + BLOCK_SIZE),
            bottom_left: (row + BLOCK_SIZE, col),
            bottom_right: (row + BLOCK_SIZE, col + BLOCK_SIZE),
        }
    }

    pub fn row_start(&self) -> usize {
        self.top_left.0
    }

    pub fn row_end(&self) -> usize {
        self.bottom_left.0
    }

    pub fn col_start(&self) -> usize {
        self.top_left.1
    }

    pub fn col_end(&self) -> usize {
        self.top_right.1
    }
}

/// 按行优先顺序计算覆盖图像的所有块位置。这个顺序就是编码和解码共用的块顺序。
/// 不足 8 的边缘行列被丢弃，不做填充。
pub fn block_locations(height: usize, width: usize) -> Vec<BlockLocation> {
    let block_rows = height / BLOCK_SIZE;
    let block_cols = width / BLOCK_SIZE;

    if height % BLOCK_SIZE != 0 || width % BLOCK_SIZE != 0 {
        warn!(
            "图像大小 {}x{} 不是 8 的倍数，丢弃右侧 {} 列和底部 {} 行",
            width,
            height,
            width % BLOCK_SIZE,
            height % BLOCK_SIZE,
        );
    }

    // 锚点网格，每相邻的 2x2 个锚点组成一个块。
    let anchors: Vec<Vec<(usize, usize)>> = (0..=block_rows)
        .map(|i| {
            (0..=block_cols)
                .map(|j| (i * BLOCK_SIZE, j * BLOCK_SIZE))
                .collect()
        })
        .collect();

    let mut locations = Vec::with_capacity(block_rows * block_cols);
    for i in 0..block_rows {
        for j in 0..block_cols {
            locations.push(BlockLocation {
                top_left: anchors[i][j],
                top_right: anchors[i][j + 1],
                bottom_left: anchors[i + 1][j],
                bottom_right: anchors[i + 1][j + 1],
            });
        }
    }
    locations
}
