//! # 像素缓冲模型
//!
//! ## 设计思路
//!
//! `PixelBuffer` 是解码、裁剪、编码三阶段之间唯一流转的中间数据：
//! RGBA 四通道交错、行优先、无行填充，`data.len() == width * height * 4`。
//! 字段私有、构造即校验，保证任何持有者拿到的缓冲都满足该不变式。
//!
//! ## 实现思路
//!
//! 裁剪时所有偏移量均使用 `checked_*` 运算，先整体校验区域再逐行复制，
//! 越界请求直接返回 `ImageError::OutOfBounds`，不会读取源缓冲之外的内存。

use super::ImageError;

/// 每个像素占用的字节数（RGBA8）。
pub const BYTES_PER_PIXEL: usize = 4;

/// 不可变的 RGBA8 像素缓冲。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// 由原始 RGBA 字节构建缓冲，并校验字节长度。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::PixelBuffer;
    ///
    /// let buffer = PixelBuffer::from_raw(2, 1, vec![0; 8])?;
    /// assert_eq!(buffer.width(), 2);
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected_len = expected_len(width, height)?;

        if data.len() != expected_len {
            return Err(ImageError::InvalidBuffer(format!(
                "像素数据长度异常：{} 字节（{}x{} 期望 {} 字节）",
                data.len(),
                width,
                height,
                expected_len
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 行优先的 RGBA 字节。
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 裁剪出以 `(x, y)` 为左上角、尺寸 `width x height` 的子区域。
    ///
    /// 区域必须完全落在源图内，否则返回 `OutOfBounds`。
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<PixelBuffer, ImageError> {
        let out_of_bounds = || ImageError::OutOfBounds {
            x,
            y,
            crop_width: width,
            crop_height: height,
            source_width: self.width,
            source_height: self.height,
        };

        let right = x.checked_add(width).ok_or_else(out_of_bounds)?;
        let bottom = y.checked_add(height).ok_or_else(out_of_bounds)?;
        if right > self.width || bottom > self.height {
            return Err(out_of_bounds());
        }

        let row_len = width as usize * BYTES_PER_PIXEL;
        let source_stride = self.width as usize * BYTES_PER_PIXEL;
        let mut data = Vec::with_capacity(expected_len(width, height)?);

        for i in 0..height as usize {
            let start = (x as usize + (y as usize + i) * self.width as usize) * BYTES_PER_PIXEL;
            let end = start + row_len;
            debug_assert!(end <= (y as usize + i + 1) * source_stride);

            let row = self.data.get(start..end).ok_or_else(out_of_bounds)?;
            data.extend_from_slice(row);
        }

        Ok(PixelBuffer {
            width,
            height,
            data,
        })
    }
}

fn expected_len(width: u32, height: u32) -> Result<usize, ImageError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| ImageError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))
}
