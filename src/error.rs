//! 编解码器的错误类型。

use std::fmt;
use std::io;

/// 编解码操作的结果类型。
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// 光栅文件的头部或采样值格式错误。
    Format(String),
    /// 光栅文件在读完所有采样值之前结束。
    TruncatedPixelData { expected: usize, actual: usize },
    /// 像素缓冲区长度与 `height * width` 不一致。
    BufferSizeMismatch { expected: usize, actual: usize },
    /// 系数流在一个块凑齐 64 个值之前耗尽。不能用 0 补齐。
    StreamUnderrun { produced: usize },
    /// 零游程越过了块的末尾。
    RunOverflow { position: usize, run: usize },
    /// 所有块解码完后系数流还有剩余。
    TrailingCoefficients { remaining: usize },
    /// 图像大小要求的块数多于系数流的项数。每个块至少占一项。
    MissingCoefficients { blocks: usize, available: usize },
    /// 幅值超出打包格式中类别字段的表示范围。
    AmplitudeOverflow(i32),
    /// 系数流文件损坏。
    InvalidStreamFile(&'static str),
    Io(io::Error),
    Image(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(reason) => write!(f, "Malformed raster data: {}", reason),
            Error::TruncatedPixelData { expected, actual } => write!(
                f,
                "Truncated pixel data: expected {} samples, got {}",
                expected, actual
            ),
            Error::BufferSizeMismatch { expected, actual } => write!(
                f,
                "Buffer size mismatch: expected {} pixels, got {}",
                expected, actual
            ),
            Error::StreamUnderrun { produced } => write!(
                f,
                "Coefficient stream exhausted after {} of 64 values",
                produced
            ),
            Error::RunOverflow { position, run } => write!(
                f,
                "Zero run of {} at position {} overflows the block",
                run, position
            ),
            Error::TrailingCoefficients { remaining } => write!(
                f,
                "{} coefficients left after the last block",
                remaining
            ),
            Error::MissingCoefficients { blocks, available } => write!(
                f,
                "{} blocks cannot be decoded from {} coefficients",
                blocks, available
            ),
            Error::AmplitudeOverflow(amplitude) => {
                write!(f, "Amplitude {} does not fit the size-class field", amplitude)
            }
            Error::InvalidStreamFile(reason) => write!(f, "Invalid stream file: {}", reason),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e)
    }
}
