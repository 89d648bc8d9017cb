/// RGB 空间的像素。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbPixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// YCbCr 空间的像素。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YCbCrPixel {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

impl RgbPixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl YCbCrPixel {
    pub const fn new(y: u8, cb: u8, cr: u8) -> Self {
        Self { y, cb, cr }
    }
}

/// 未覆盖区域的填充值，转换到 RGB 为黑色。
impl Default for YCbCrPixel {
    fn default() -> Self {
        Self::new(0, 128, 128)
    }
}

impl From<image::Rgb<u8>> for RgbPixel {
    fn from(value: image::Rgb<u8>) -> Self {
        let [red, green, blue] = value.0;
        Self { red, green, blue }
    }
}

impl From<RgbPixel> for image::Rgb<u8> {
    fn from(value: RgbPixel) -> Self {
        image::Rgb([value.red, value.green, value.blue])
    }
}

/// 四舍五入并限制在 [0, 255]。
fn to_sample(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

pub fn rgb_to_ycbcr(pixel: RgbPixel) -> YCbCrPixel {
    let r = pixel.red as f64;
    let g = pixel.green as f64;
    let b = pixel.blue as f64;

    YCbCrPixel {
        y: to_sample(0.299 * r + 0.587 * g + 0.114 * b),
        cb: to_sample(128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b),
        cr: to_sample(128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b),
    }
}

/// 逆变换可能越界（上游有损），所以需要限制范围。
pub fn ycbcr_to_rgb(pixel: YCbCrPixel) -> RgbPixel {
    let y = pixel.y as f64;
    let cb = pixel.cb as f64 - 128.0;
    let cr = pixel.cr as f64 - 128.0;

    RgbPixel {
        red: to_sample(y + 1.402 * cr),
        green: to_sample(y - 0.344136 * cb - 0.714136 * cr),
        blue: to_sample(y + 1.772 * cb),
    }
}
