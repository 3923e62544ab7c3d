//! # 格式标签
//!
//! 编码目标格式以封闭枚举显式传递，扩展名字符串只在边界处解析一次，
//! 编解码层内部不再根据字符串猜测格式。

use std::fmt;

use super::ImageError;

/// 支持的图片格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormatTag {
    Png,
    Jpeg,
}

impl ImageFormatTag {
    /// 从文件扩展名解析格式（不区分大小写，不含点）。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::ImageFormatTag;
    ///
    /// assert_eq!(ImageFormatTag::from_extension("JPG")?, ImageFormatTag::Jpeg);
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn from_extension(ext: &str) -> Result<Self, ImageError> {
        match ext.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(ImageError::UnsupportedFormat(format!(
                "未知扩展名：{:?}（可选：png / jpg / jpeg）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for ImageFormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
