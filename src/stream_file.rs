use bitvec::prelude::*;
use bytebuffer::ByteBuffer;
use bytebuffer::Endian;

use crate::coefficient::AcCoefficient;
use crate::entropy::pack_coefficients;
use crate::entropy::unpack_coefficients;
use crate::error::Error;
use crate::error::Result;

/// 文件开头的标记。
pub const MAGIC: &[u8; 4] = b"DCTC";
pub const VERSION: u8 = 1;
/// 每一项至少有游程和类别两个字段。
const MIN_ENTRY_BITS: usize = 10;

fn to_u32(value: usize, reason: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidStreamFile(reason))
}

/// 系数流文件的内容，可以据此解码出图像。
/// 系数按分量排列：先是所有 Y 块，然后是所有 Cb 块，最后是所有 Cr 块，每个分量内按块扫描顺序。
///
/// 文件格式（大端）：
///
/// | 字段 | 长度 |
/// | --- | --- |
/// | `DCTC` | 4 |
/// | 版本，总是为 1 | 1 |
/// | 高 | 4 |
/// | 宽 | 4 |
/// | 系数个数 | 4 |
/// | 系数流的位数 | 4 |
/// | 打包后的系数流，末尾补 0 到整字节 | 不定 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutputData {
    pub height: usize,
    pub width: usize,
    pub coefficients: Vec<AcCoefficient>,
}

impl StreamOutputData {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut scan = pack_coefficients(&self.coefficients)?;
        let bit_len = scan.len();
        scan.set_uninitialized(false);

        let mut buf = ByteBuffer::new();
        buf.set_endian(Endian::BigEndian);
        buf.write_bytes(MAGIC);
        buf.write_u8(VERSION);
        buf.write_u32(to_u32(self.height, "height does not fit in u32")?);
        buf.write_u32(to_u32(self.width, "width does not fit in u32")?);
        buf.write_u32(to_u32(self.coefficients.len(), "too many coefficients")?);
        buf.write_u32(to_u32(bit_len, "coefficient payload is too long")?);
        buf.write_bytes(&scan.into_vec());

        Ok(buf.as_bytes().to_vec())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let truncated = |_| Error::InvalidStreamFile("header is truncated");

        let mut buf = ByteBuffer::from_bytes(bytes);
        buf.set_endian(Endian::BigEndian);

        let magic = buf.read_bytes(MAGIC.len()).map_err(truncated)?;
        if magic.as_slice() != MAGIC {
            return Err(Error::InvalidStreamFile("missing DCTC magic"));
        }
        if buf.read_u8().map_err(truncated)? != VERSION {
            return Err(Error::InvalidStreamFile("unsupported version"));
        }
        let height = buf.read_u32().map_err(truncated)? as usize;
        let width = buf.read_u32().map_err(truncated)? as usize;
        let count = buf.read_u32().map_err(truncated)? as usize;
        let bit_len = buf.read_u32().map_err(truncated)? as usize;

        if count > bit_len / MIN_ENTRY_BITS {
            return Err(Error::InvalidStreamFile("coefficient count exceeds payload"));
        }
        let byte_len = (bit_len + 7) / 8;
        if buf.len() - buf.get_rpos() != byte_len {
            return Err(Error::InvalidStreamFile("payload length mismatch"));
        }
        let payload = buf.read_bytes(byte_len).map_err(truncated)?;
        let bits = &payload.view_bits::<Msb0>()[..bit_len];

        Ok(StreamOutputData {
            height,
            width,
            coefficients: unpack_coefficients(bits, count)?,
        })
    }
}
