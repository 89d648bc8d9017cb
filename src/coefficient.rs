use bitvec::mem::bits_of;
use bitvec::prelude::*;

/// 幅值的类别，即表示绝对值所需的二进制位数。只有 0 的类别是 0。
pub fn get_category(abs_value: u32) -> u8 {
    abs_value
        .view_bits::<Msb0>()
        .first_one()
        .map_or(0, |v| (bits_of::<u32>() - 1 - v) + 1) as u8
}

/// 带类别的有符号幅值。类别总是由幅值算出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcCoefficient {
    size: u8,
    amplitude: i32,
}

impl DcCoefficient {
    pub fn new(amplitude: i32) -> Self {
        Self {
            size: get_category(amplitude.unsigned_abs()),
            amplitude,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn amplitude(&self) -> i32 {
        self.amplitude
    }
}

/// 行程编码的一项：前面有 `run_length` 个 0，然后是 `coefficient`。
/// 类别为 0 的交流项是块结束标记 EOB。真实的交流幅值不会是 0（0 都计入游程），所以不会冲突。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcCoefficient {
    pub run_length: u8,
    pub coefficient: DcCoefficient,
}

impl AcCoefficient {
    pub fn new(run_length: u8, coefficient: DcCoefficient) -> Self {
        Self {
            run_length,
            coefficient,
        }
    }

    /// 块末尾剩下的 `run_length` 个 0。
    pub fn end_of_block(run_length: u8) -> Self {
        Self::new(run_length, DcCoefficient::new(0))
    }

    pub fn is_end_of_block(&self) -> bool {
        self.coefficient.size() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_category() {
        assert_eq!(get_category(0), 0);
        assert_eq!(get_category(1), 1);
        assert_eq!(get_category(2), 2);
        assert_eq!(get_category(3), 2);
        assert_eq!(get_category(4), 3);
        assert_eq!(get_category(255), 8);
        assert_eq!(get_category(256), 9);
        assert_eq!(get_category(1024), 11);
    }

    #[test]
    fn test_dc_coefficient() {
        let dc = DcCoefficient::new(-14);
        assert_eq!(dc.size(), 4);
        assert_eq!(dc.amplitude(), -14);

        assert_eq!(DcCoefficient::new(0).size(), 0);
        assert_eq!(DcCoefficient::new(-1).size(), 1);
    }

    #[test]
    fn test_end_of_block() {
        let eob = AcCoefficient::end_of_block(17);
        assert!(eob.is_end_of_block());
        assert_eq!(eob.run_length, 17);

        assert!(!AcCoefficient::new(3, DcCoefficient::new(-1)).is_end_of_block());
    }
}
