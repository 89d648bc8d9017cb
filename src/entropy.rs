use bitvec::prelude::*;

use crate::block::Block;
use crate::block::ChannelKind;
use crate::block::Du;
use crate::block::Samples;
use crate::coefficient::AcCoefficient;
use crate::coefficient::DcCoefficient;
use crate::error::Error;
use crate::error::Result;
use crate::partition::BlockLocation;

/// 打包后的系数流，高位在前。
pub type Scan = BitVec<u8, Msb0>;

/// 打包格式中游程字段的位数，足够表示 0 到 63。
const RUN_BITS: usize = 6;
/// 打包格式中类别字段的位数。
const SIZE_BITS: usize = 4;

/// AC 编码器的行程编码性质在单个 DU 内部使用，每个 DU 新建一个。
struct AcEncoder {
    pub zero_run_length: u8,
}

impl AcEncoder {
    pub fn new() -> Self {
        Self { zero_run_length: 0 }
    }

    fn next(&mut self, value: i32) -> Option<AcCoefficient> {
        if value == 0 {
            self.zero_run_length += 1;
            None
        } else {
            let ret = AcCoefficient::new(self.zero_run_length, DcCoefficient::new(value));
            self.zero_run_length = 0;
            Some(ret)
        }
    }

    /// 块结束时，如果还有零游程则输出 EOB。
    fn flush(&mut self) -> Option<AcCoefficient> {
        if self.zero_run_length != 0 {
            let ret = AcCoefficient::end_of_block(self.zero_run_length);
            self.zero_run_length = 0;
            Some(ret)
        } else {
            None
        }
    }
}

/// 按 Zigzag 顺序对 8x8 的系数做行程编码。
/// 第一项是游程为 0 的直流项。
pub fn entropy_encode(du: &Du) -> Vec<AcCoefficient> {
    let z = du.zigzag();
    let mut ret = vec![AcCoefficient::new(0, DcCoefficient::new(z[0]))];

    let mut ac_encoder = AcEncoder::new();
    ret.extend(z[1..].iter().filter_map(|&value| ac_encoder.next(value)));
    ret.extend(ac_encoder.flush());

    ret
}

/// 从 `cursor` 处读出一个块的 64 个值，并把 `cursor` 移到下一个块的开头。
/// 系数流提前耗尽时返回错误，不会用 0 补齐。
pub fn entropy_decode(stream: &[AcCoefficient], cursor: &mut usize) -> Result<Du> {
    let mut values = [0_i32; 64];

    let dc = stream
        .get(*cursor)
        .ok_or(Error::StreamUnderrun { produced: 0 })?;
    *cursor += 1;
    values[0] = dc.coefficient.amplitude();

    let mut produced = 1;
    while produced < values.len() {
        let ac = stream
            .get(*cursor)
            .ok_or(Error::StreamUnderrun { produced })?;
        *cursor += 1;

        let run = ac.run_length as usize;
        let end = if ac.is_end_of_block() {
            produced + run
        } else {
            produced + run + 1
        };
        if end > values.len() {
            return Err(Error::RunOverflow {
                position: produced,
                run,
            });
        }
        if !ac.is_end_of_block() {
            values[produced + run] = ac.coefficient.amplitude();
        }
        produced = end;
    }

    Ok(Du::from_zigzag(&values))
}

impl Block {
    /// 输入必须是 8x8 的量化系数块。
    pub fn entropy_encode(&self) -> Vec<AcCoefficient> {
        entropy_encode(self.du())
    }

    /// 码流中没有分量和位置信息，由调用者根据块在码流中的位置给出。
    pub fn entropy_decode(
        stream: &[AcCoefficient],
        cursor: &mut usize,
        kind: ChannelKind,
        location: BlockLocation,
    ) -> Result<Block> {
        let du = entropy_decode(stream, cursor)?;
        Ok(Block::new(Samples::Full(du), kind, location))
    }
}

fn push_bits(bits: &mut Scan, value: u32, width: usize) {
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

fn read_bits(bits: &BitSlice<u8, Msb0>, cursor: &mut usize, width: usize) -> Result<u32> {
    let field = bits
        .get(*cursor..*cursor + width)
        .ok_or(Error::InvalidStreamFile("coefficient payload is truncated"))?;
    *cursor += width;
    Ok(field.iter().fold(0, |acc, bit| (acc << 1) | *bit as u32))
}

/// 每一项依次写入：6 位游程，4 位类别，然后是与类别等长的幅值。
/// 正数直接写绝对值；负数写绝对值的反码，于是最高位为 1 表示正数，为 0 表示负数。
pub fn pack_coefficients(coefficients: &[AcCoefficient]) -> Result<Scan> {
    let mut ret = Scan::new();

    for (position, ac) in coefficients.iter().enumerate() {
        let run = ac.run_length as usize;
        if run >= 1 << RUN_BITS {
            return Err(Error::RunOverflow { position, run });
        }
        let size = ac.coefficient.size() as usize;
        if size >= 1 << SIZE_BITS {
            return Err(Error::AmplitudeOverflow(ac.coefficient.amplitude()));
        }

        push_bits(&mut ret, run as u32, RUN_BITS);
        push_bits(&mut ret, size as u32, SIZE_BITS);
        if size != 0 {
            let amplitude = ac.coefficient.amplitude();
            let abs_value = amplitude.unsigned_abs();
            let bits = if amplitude > 0 {
                abs_value
            } else {
                !abs_value & ((1 << size) - 1)
            };
            push_bits(&mut ret, bits, size);
        }
    }

    Ok(ret)
}

/// `pack_coefficients` 的逆，读出 `count` 项。
pub fn unpack_coefficients(bits: &BitSlice<u8, Msb0>, count: usize) -> Result<Vec<AcCoefficient>> {
    let mut ret = Vec::with_capacity(count.min(bits.len() / (RUN_BITS + SIZE_BITS)));
    let mut cursor = 0;

    for _ in 0..count {
        let run = read_bits(bits, &mut cursor, RUN_BITS)? as u8;
        let size = read_bits(bits, &mut cursor, SIZE_BITS)? as usize;
        let amplitude = if size == 0 {
            0
        } else {
            let raw = read_bits(bits, &mut cursor, size)?;
            if raw >> (size - 1) == 1 {
                raw as i32
            } else {
                -((!raw & ((1 << size) - 1)) as i32)
            }
        };
        ret.push(AcCoefficient::new(run, DcCoefficient::new(amplitude)));
    }

    Ok(ret)
}

#[cfg(test)]
mod test {
    use super::*;

    fn to_du(sequence: &[i32; 64]) -> Du {
        Du::from_zigzag(sequence)
    }

    fn round_trip(sequence: [i32; 64]) {
        let stream = entropy_encode(&to_du(&sequence));
        let mut cursor = 0;
        let decoded = entropy_decode(&stream, &mut cursor).unwrap();

        assert_eq!(decoded.zigzag(), sequence);
        assert_eq!(cursor, stream.len());
    }

    #[test]
    fn test_entropy_encode() {
        let mut sequence = [0_i32; 64];
        // 课件上的例子，前面加上直流项。
        let ac = [5, -2, 0, 2, 0, 0, 0, 1];
        sequence[0] = -26;
        sequence[1..9].copy_from_slice(&ac);
        sequence[31] = -1;

        let stream = entropy_encode(&to_du(&sequence));

        let truth = vec![
            AcCoefficient::new(0, DcCoefficient::new(-26)),
            AcCoefficient::new(0, DcCoefficient::new(5)),
            AcCoefficient::new(0, DcCoefficient::new(-2)),
            AcCoefficient::new(1, DcCoefficient::new(2)),
            AcCoefficient::new(3, DcCoefficient::new(1)),
            AcCoefficient::new(22, DcCoefficient::new(-1)),
            AcCoefficient::end_of_block(32),
        ];
        assert_eq!(stream, truth);
    }

    #[test]
    fn test_round_trip_trailing_zeros() {
        let mut sequence = [0_i32; 64];
        sequence[0] = 17;
        sequence[5] = -3;
        round_trip(sequence);

        let mut sequence = [0_i32; 64];
        sequence[63] = 4;
        round_trip(sequence);
    }

    #[test]
    fn test_round_trip_without_zeros() {
        let mut sequence = [0_i32; 64];
        for (i, it) in sequence.iter_mut().enumerate() {
            *it = if i % 2 == 0 { i as i32 + 1 } else { -(i as i32) };
        }

        let stream = entropy_encode(&to_du(&sequence));
        assert_eq!(stream.len(), 64);
        assert!(stream.iter().all(|it| it.run_length == 0));
        round_trip(sequence);
    }

    #[test]
    fn test_round_trip_pseudo_random() {
        let mut state = 12345_u32;
        for _ in 0..200 {
            let mut sequence = [0_i32; 64];
            for it in sequence.iter_mut() {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let r = (state >> 16) % 100;
                // 大约 70% 的 0，模拟量化后的系数。
                *it = if r < 70 { 0 } else { r as i32 - 85 };
            }
            sequence[0] = 1;
            round_trip(sequence);
        }
    }

    #[test]
    fn test_all_zero_block() {
        let stream = entropy_encode(&Du([[0; 8]; 8]));
        assert_eq!(
            stream,
            vec![
                AcCoefficient::new(0, DcCoefficient::new(0)),
                AcCoefficient::end_of_block(63),
            ]
        );
        round_trip([0; 64]);
    }

    #[test]
    fn test_consecutive_blocks_share_stream() {
        let mut a = [0_i32; 64];
        a[0] = 3;
        a[10] = 9;
        let mut b = [0_i32; 64];
        b[0] = -40;
        b[1] = 2;
        b[63] = -5;

        let mut stream = entropy_encode(&to_du(&a));
        stream.extend(entropy_encode(&to_du(&b)));

        let mut cursor = 0;
        assert_eq!(entropy_decode(&stream, &mut cursor).unwrap().zigzag(), a);
        assert_eq!(entropy_decode(&stream, &mut cursor).unwrap().zigzag(), b);
        assert_eq!(cursor, stream.len());
    }

    #[test]
    fn test_stream_underrun() {
        let mut sequence = [0_i32; 64];
        sequence[0] = 5;
        sequence[20] = 1;
        let mut stream = entropy_encode(&to_du(&sequence));
        stream.pop(); // 去掉 EOB。

        let mut cursor = 0;
        let result = entropy_decode(&stream, &mut cursor);
        assert!(matches!(result, Err(Error::StreamUnderrun { produced: 21 })));

        let mut cursor = 0;
        assert!(matches!(
            entropy_decode(&[], &mut cursor),
            Err(Error::StreamUnderrun { produced: 0 })
        ));
    }

    #[test]
    fn test_run_overflow() {
        let stream = vec![
            AcCoefficient::new(0, DcCoefficient::new(1)),
            AcCoefficient::new(62, DcCoefficient::new(7)),
            AcCoefficient::new(0, DcCoefficient::new(7)),
        ];
        let mut cursor = 0;
        assert!(entropy_decode(&stream, &mut cursor).is_ok());

        let stream = vec![
            AcCoefficient::new(0, DcCoefficient::new(1)),
            AcCoefficient::new(63, DcCoefficient::new(7)),
        ];
        let mut cursor = 0;
        assert!(matches!(
            entropy_decode(&stream, &mut cursor),
            Err(Error::RunOverflow { position: 1, run: 63 })
        ));
    }

    #[test]
    fn test_block_entropy_round_trip() {
        let mut values = [[0_i32; 8]; 8];
        values[0][0] = -12;
        values[1][2] = 4;
        let block = Block::new(
            Samples::Full(Du(values)),
            ChannelKind::Cb,
            BlockLocation::at(16, 8),
        );

        let stream = block.entropy_encode();
        let mut cursor = 0;
        let decoded =
            Block::entropy_decode(&stream, &mut cursor, ChannelKind::Cb, BlockLocation::at(16, 8))
                .unwrap();

        assert_eq!(decoded, block);
    }

    #[test]
    fn test_pack_coefficients() {
        let coefficients = [
            AcCoefficient::new(0, DcCoefficient::new(5)),
            AcCoefficient::new(3, DcCoefficient::new(-3)),
            AcCoefficient::end_of_block(60),
        ];

        let scan = pack_coefficients(&coefficients).unwrap();

        let truth = bits![u8, Msb0;
            0, 0, 0, 0, 0, 0, // 游程 0
            0, 0, 1, 1, // 类别 3
            1, 0, 1, // 5
            0, 0, 0, 0, 1, 1, // 游程 3
            0, 0, 1, 0, // 类别 2
            0, 0, // -3，反码
            1, 1, 1, 1, 0, 0, // 游程 60
            0, 0, 0, 0, // EOB
        ];
        assert_eq!(scan.as_bitslice(), truth);
        assert_eq!(unpack_coefficients(&scan, 3).unwrap(), coefficients);
    }

    #[test]
    fn test_pack_round_trip() {
        let mut stream = vec![];
        for amplitude in [-1024, -513, -2, -1, 1, 2, 255, 1024, 16383, -32767] {
            stream.push(AcCoefficient::new(7, DcCoefficient::new(amplitude)));
        }
        stream.push(AcCoefficient::end_of_block(1));

        let scan = pack_coefficients(&stream).unwrap();
        assert_eq!(unpack_coefficients(&scan, stream.len()).unwrap(), stream);
    }

    #[test]
    fn test_pack_rejects_wide_amplitude() {
        let stream = [AcCoefficient::new(0, DcCoefficient::new(40000))];
        assert!(matches!(
            pack_coefficients(&stream),
            Err(Error::AmplitudeOverflow(40000))
        ));
    }

    #[test]
    fn test_unpack_truncated() {
        let stream = [AcCoefficient::new(0, DcCoefficient::new(100))];
        let scan = pack_coefficients(&stream).unwrap();

        assert!(unpack_coefficients(&scan[..scan.len() - 1], 1).is_err());
    }

    #[test]
    fn test_unpack_count_larger_than_input() {
        let empty = Scan::new();
        assert!(matches!(
            unpack_coefficients(&empty, u32::MAX as usize),
            Err(Error::InvalidStreamFile(_))
        ));
    }
}
