use crate::block::Du;

/// 量化表。所有分量共用同一张表。
#[derive(Debug)]
pub struct QuantizationTable(pub [[u16; 8]; 8]);

/// 全局唯一的量化表，只读。
pub const QUANTIZATION_TABLE: QuantizationTable = QuantizationTable([
    [6, 4, 4, 6, 10, 16, 20, 24],
    [5, 5, 6, 8, 10, 23, 24, 22],
    [6, 5, 6, 10, 16, 23, 28, 22],
    [6, 7, 9, 12, 20, 35, 32, 25],
    [7, 9, 15, 22, 27, 44, 41, 31],
    [10, 14, 22, 26, 32, 42, 45, 37],
    [20, 26, 31, 35, 41, 48, 48, 40],
    [29, 37, 38, 39, 45, 40, 41, 40],
]);

impl QuantizationTable {
    /// 逐元素整除，向零截断，不做四舍五入。
    pub fn quantize(&self, du: &Du) -> Du {
        let mut ret = [[0_i32; 8]; 8];

        for i in 0..8 {
            for j in 0..8 {
                ret[i][j] = du.0[i][j] / self.0[i][j] as i32;
            }
        }

        Du(ret)
    }

    pub fn dequantize(&self, du: &Du) -> Du {
        let mut ret = [[0_i32; 8]; 8];

        for i in 0..8 {
            for j in 0..8 {
                ret[i][j] = du.0[i][j] * self.0[i][j] as i32;
            }
        }

        Du(ret)
    }
}
