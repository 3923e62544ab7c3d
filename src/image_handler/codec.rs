//! # 编解码分发模块
//!
//! ## 设计思路
//!
//! 每种格式实现 `FormatCodec`（试探解码 + 编码），由 `CodecRegistry` 持有一个**有序**列表：
//! - 解码：按注册顺序逐个尝试，第一个接受输入的编解码器胜出；全部拒绝才报
//!   `UnsupportedFormat`。默认顺序固定为 PNG → JPEG，这是可测试的契约。
//! - 编码：由调用方显式传入 `ImageFormatTag`，不从内容或字符串推断。
//!
//! ## 实现思路
//!
//! 1. 先只读 header 尺寸，按像素/内存上限快速拒绝
//! 2. 完整解码并统一转换为 RGBA8
//! 3. 校验字节长度后构建 `PixelBuffer`
//!
//! “不是本格式”用 `Ok(None)` 表达，只有资源超限这类硬错误才返回 `Err`，
//! 避免把超大图误当作“格式不匹配”继续回退。

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder, ImageReader};
use std::io::Cursor;

use super::{ImageError, ImageFormatTag, PixelBuffer, SplitConfig};

/// 单一格式的编解码能力。
pub trait FormatCodec: Send + Sync {
    /// 该编解码器负责的格式。
    fn format(&self) -> ImageFormatTag;

    /// 尝试解码；输入不属于该格式（或已损坏）时返回 `Ok(None)`。
    fn try_decode(&self, bytes: &[u8]) -> Result<Option<PixelBuffer>, ImageError>;

    /// 将像素缓冲编码为该格式的字节。
    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, ImageError>;
}

/// 解码阶段的资源上限。
#[derive(Debug, Clone, Copy)]
pub struct DecodeLimits {
    pub max_pixels: u64,
    pub max_bytes: u64,
}

impl DecodeLimits {
    pub fn from_config(config: &SplitConfig) -> Self {
        Self {
            max_pixels: config.max_decoded_pixels,
            max_bytes: config.max_decoded_bytes,
        }
    }

    /// 校验像素数量与预计内存是否超过上限。
    fn check(&self, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > self.max_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                self.max_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::from_config(&SplitConfig::default())
    }
}

/// 借助 `image` crate 以指定格式解码；header 无法解析即视为“不是该格式”。
fn decode_with_image_crate(
    bytes: &[u8],
    format: ImageFormatTag,
    limits: &DecodeLimits,
) -> Result<Option<PixelBuffer>, ImageError> {
    let header = ImageReader::with_format(Cursor::new(bytes), format.to_image_format());
    let (header_width, header_height) = match header.into_dimensions() {
        Ok(dimensions) => dimensions,
        Err(err) => {
            log::debug!("{} 解码器拒绝输入（header）：{}", format, err);
            return Ok(None);
        }
    };
    limits.check(header_width, header_height)?;

    let decoded = match ImageReader::with_format(Cursor::new(bytes), format.to_image_format()).decode() {
        Ok(decoded) => decoded,
        Err(err) => {
            log::debug!("{} 解码器拒绝输入：{}", format, err);
            return Ok(None);
        }
    };

    let (width, height) = decoded.dimensions();
    limits.check(width, height)?;

    let rgba = decoded.to_rgba8();
    PixelBuffer::from_raw(width, height, rgba.into_raw()).map(Some)
}

/// 无损 PNG 编解码器（RGBA8）。
#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    limits: DecodeLimits,
}

impl PngCodec {
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }
}

impl FormatCodec for PngCodec {
    fn format(&self) -> ImageFormatTag {
        ImageFormatTag::Png
    }

    fn try_decode(&self, bytes: &[u8]) -> Result<Option<PixelBuffer>, ImageError> {
        decode_with_image_crate(bytes, ImageFormatTag::Png, &self.limits)
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                buffer.data(),
                buffer.width(),
                buffer.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;
        Ok(out)
    }
}

/// 有损 JPEG 编解码器。编码时丢弃 alpha 通道。
#[derive(Debug, Clone)]
pub struct JpegCodec {
    limits: DecodeLimits,
    quality: u8,
}

impl JpegCodec {
    pub fn new(limits: DecodeLimits, quality: u8) -> Self {
        Self {
            limits,
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(DecodeLimits::default(), SplitConfig::default().jpeg_quality)
    }
}

impl FormatCodec for JpegCodec {
    fn format(&self) -> ImageFormatTag {
        ImageFormatTag::Jpeg
    }

    fn try_decode(&self, bytes: &[u8]) -> Result<Option<PixelBuffer>, ImageError> {
        decode_with_image_crate(bytes, ImageFormatTag::Jpeg, &self.limits)
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, ImageError> {
        let rgb: Vec<u8> = buffer
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .write_image(&rgb, buffer.width(), buffer.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;
        Ok(out)
    }
}

/// 有序的编解码器注册表。
pub struct CodecRegistry {
    codecs: Vec<Box<dyn FormatCodec>>,
}

impl CodecRegistry {
    /// 按配置构建默认注册表：PNG 优先，其次 JPEG。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::{CodecRegistry, ImageFormatTag, SplitConfig};
    ///
    /// let registry = CodecRegistry::from_config(&SplitConfig::default());
    /// assert_eq!(registry.decode_order(), vec![ImageFormatTag::Png, ImageFormatTag::Jpeg]);
    /// ```
    pub fn from_config(config: &SplitConfig) -> Self {
        let limits = DecodeLimits::from_config(config);
        Self::with_codecs(vec![
            Box::new(PngCodec::new(limits)),
            Box::new(JpegCodec::new(limits, config.jpeg_quality)),
        ])
    }

    /// 使用自定义编解码器列表；列表顺序即解码尝试顺序。
    pub fn with_codecs(codecs: Vec<Box<dyn FormatCodec>>) -> Self {
        Self { codecs }
    }

    pub fn decode_order(&self) -> Vec<ImageFormatTag> {
        self.codecs.iter().map(|codec| codec.format()).collect()
    }

    /// 按注册顺序试探解码，返回像素缓冲与命中的格式。
    pub fn decode(&self, bytes: &[u8]) -> Result<(PixelBuffer, ImageFormatTag), ImageError> {
        for codec in &self.codecs {
            if let Some(buffer) = codec.try_decode(bytes)? {
                log::debug!(
                    "🔍 解码命中 {} - {}x{}",
                    codec.format(),
                    buffer.width(),
                    buffer.height()
                );
                return Ok((buffer, codec.format()));
            }
        }

        Err(ImageError::UnsupportedFormat(format!(
            "{} 字节的输入无法被任何已注册格式解码（尝试顺序：{:?}）",
            bytes.len(),
            self.decode_order()
        )))
    }

    /// 以显式指定的格式编码。
    pub fn encode(&self, buffer: &PixelBuffer, format: ImageFormatTag) -> Result<Vec<u8>, ImageError> {
        let codec = self
            .codecs
            .iter()
            .find(|codec| codec.format() == format)
            .ok_or_else(|| {
                ImageError::UnsupportedFormat(format!("未注册 {} 编码器", format))
            })?;

        codec.encode(buffer)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::from_config(&SplitConfig::default())
    }
}
