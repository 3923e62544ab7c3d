//! # 网格切分模块
//!
//! ## 设计思路
//!
//! `TileSplitter` 只做纯计算：解码 → 整除校验 → 行优先裁剪 → 按源格式编码 → 命名。
//! 不创建目录、不写文件，输出是“文件名 → 编码字节”的有序集合，持久化交给写盘层。
//!
//! ## 实现思路
//!
//! - 格式标签由调用方给出的扩展名解析，编码时显式传入，不从内容推断。
//! - 任一单元裁剪或编码失败即整体失败，不产出残缺网格。
//! - 每个单元的裁剪缓冲只活到本轮编码结束。

use std::collections::BTreeMap;

use super::grid::{TileLayout, TileRegion, tile_filename};
use super::{CodecRegistry, GridSpec, ImageError, ImageFormatTag, PixelBuffer};

/// 裁剪出的单个网格单元，编码前的瞬时形态。
#[derive(Debug, Clone)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    pub filename: String,
    pub buffer: PixelBuffer,
}

/// 编码完成的网格单元。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTile {
    pub row: u32,
    pub col: u32,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 一次切分的完整结果，`tiles` 按行优先排列。
#[derive(Debug, Clone)]
pub struct SplitOutput {
    pub layout: TileLayout,
    pub format: ImageFormatTag,
    pub tiles: Vec<EncodedTile>,
}

impl SplitOutput {
    /// 转换为“文件名 → 编码字节”映射。
    pub fn into_map(self) -> BTreeMap<String, Vec<u8>> {
        self.tiles
            .into_iter()
            .map(|tile| (tile.filename, tile.bytes))
            .collect()
    }
}

/// 网格切分器，持有编解码注册表。
pub struct TileSplitter {
    registry: CodecRegistry,
}

impl TileSplitter {
    pub fn new(registry: CodecRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// 切分一段已编码的图片字节。
    ///
    /// `ext` 为源文件扩展名（不含点），同时决定输出格式与输出文件扩展名。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use tile_splitter::image_handler::{CodecRegistry, GridSpec, TileSplitter};
    ///
    /// let splitter = TileSplitter::new(CodecRegistry::default());
    /// let output = splitter.split_bytes(&png_bytes, "png", GridSpec::new(2, 2)?)?;
    /// assert_eq!(output.tiles.len(), 4);
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn split_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        grid: GridSpec,
    ) -> Result<SplitOutput, ImageError> {
        let ext = ext.trim_start_matches('.');
        let format = ImageFormatTag::from_extension(ext)?;

        let (source, detected) = self.registry.decode(bytes)?;
        if detected != format {
            log::warn!(
                "⚠️ 文件内容为 {}，与扩展名 .{} 不一致，按扩展名输出 {}",
                detected,
                ext,
                format
            );
        }

        self.split_buffer(&source, ext, format, grid)
    }

    /// 切分已解码的像素缓冲。
    pub fn split_buffer(
        &self,
        source: &PixelBuffer,
        ext: &str,
        format: ImageFormatTag,
        grid: GridSpec,
    ) -> Result<SplitOutput, ImageError> {
        let layout = TileLayout::new(source.width(), source.height(), grid)?;

        log::info!(
            "✂️ 开始切分 - 源图: {}x{} 网格: {}x{} 单块: {}x{} 格式: {}",
            source.width(),
            source.height(),
            grid.rows(),
            grid.cols(),
            layout.tile_width(),
            layout.tile_height(),
            format
        );

        let mut tiles = Vec::with_capacity(grid.tile_count());
        for region in layout.regions() {
            let tile = Self::cut_tile(source, region, ext)?;
            tiles.push(self.encode_tile(tile, format)?);
        }

        Ok(SplitOutput {
            layout,
            format,
            tiles,
        })
    }

    fn cut_tile(source: &PixelBuffer, region: TileRegion, ext: &str) -> Result<Tile, ImageError> {
        let buffer = source.crop(region.x, region.y, region.width, region.height)?;
        Ok(Tile {
            row: region.row,
            col: region.col,
            filename: tile_filename(region.row, region.col, ext),
            buffer,
        })
    }

    fn encode_tile(&self, tile: Tile, format: ImageFormatTag) -> Result<EncodedTile, ImageError> {
        let bytes = self.registry.encode(&tile.buffer, format)?;
        log::debug!("🧱 {} - {} 字节", tile.filename, bytes.len());

        Ok(EncodedTile {
            row: tile.row,
            col: tile.col,
            filename: tile.filename,
            bytes,
        })
    }
}

impl Default for TileSplitter {
    fn default() -> Self {
        Self::new(CodecRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::FormatCodec;

    /// 测试用假编解码器：输入以 `magic` 开头，随后为宽高（各 4 字节小端）与 RGBA 数据；
    /// 编码输出 `magic + 宽高 + 数据`。
    struct FakeCodec {
        magic: &'static [u8],
        format: ImageFormatTag,
    }

    impl FormatCodec for FakeCodec {
        fn format(&self) -> ImageFormatTag {
            self.format
        }

        fn try_decode(&self, bytes: &[u8]) -> Result<Option<PixelBuffer>, ImageError> {
            let Some(rest) = bytes.strip_prefix(self.magic) else {
                return Ok(None);
            };
            if rest.len() < 8 {
                return Ok(None);
            }
            let width = u32::from_le_bytes(rest[0..4].try_into().unwrap());
            let height = u32::from_le_bytes(rest[4..8].try_into().unwrap());
            PixelBuffer::from_raw(width, height, rest[8..].to_vec()).map(Some)
        }

        fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, ImageError> {
            let mut out = self.magic.to_vec();
            out.extend_from_slice(&buffer.width().to_le_bytes());
            out.extend_from_slice(&buffer.height().to_le_bytes());
            out.extend_from_slice(buffer.data());
            Ok(out)
        }
    }

    fn fake_registry() -> CodecRegistry {
        CodecRegistry::with_codecs(vec![
            Box::new(FakeCodec {
                magic: b"FAKEPNG",
                format: ImageFormatTag::Png,
            }),
            Box::new(FakeCodec {
                magic: b"FAKEJPG",
                format: ImageFormatTag::Jpeg,
            }),
        ])
    }

    fn fake_image(magic: &[u8], width: u32, height: u32) -> Vec<u8> {
        let mut out = magic.to_vec();
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend((0..width * height * 4).map(|i| i as u8));
        out
    }

    #[test]
    fn four_by_two_into_one_by_two_yields_two_square_tiles() {
        let splitter = TileSplitter::new(fake_registry());
        let bytes = fake_image(b"FAKEPNG", 4, 2);

        let output = splitter
            .split_bytes(&bytes, "png", GridSpec::new(1, 2).unwrap())
            .expect("split failed");

        assert_eq!((output.layout.tile_width(), output.layout.tile_height()), (2, 2));
        let names: Vec<&str> = output.tiles.iter().map(|t| t.filename.as_str()).collect();
        assert_eq!(names, vec!["r00_c00.png", "r00_c01.png"]);

        let (left, _) = splitter.registry().decode(&output.tiles[0].bytes).unwrap();
        let (right, _) = splitter.registry().decode(&output.tiles[1].bytes).unwrap();
        assert_eq!((left.width(), left.height()), (2, 2));
        assert_eq!(&left.data()[0..4], &[0, 1, 2, 3]);
        assert_eq!(&right.data()[0..4], &[8, 9, 10, 11]);
    }

    #[test]
    fn non_divisible_grid_produces_no_tiles() {
        let splitter = TileSplitter::new(fake_registry());
        let bytes = fake_image(b"FAKEPNG", 5, 2);

        let result = splitter.split_bytes(&bytes, "png", GridSpec::new(1, 2).unwrap());

        assert!(matches!(result, Err(ImageError::NonDivisibleGrid { width: 5, .. })));
    }

    #[test]
    fn output_format_follows_extension_not_content() {
        let splitter = TileSplitter::new(fake_registry());
        let bytes = fake_image(b"FAKEPNG", 2, 2);

        let output = splitter
            .split_bytes(&bytes, "jpg", GridSpec::new(1, 1).unwrap())
            .expect("split failed");

        assert_eq!(output.format, ImageFormatTag::Jpeg);
        assert!(output.tiles[0].bytes.starts_with(b"FAKEJPG"));
        assert_eq!(output.tiles[0].filename, "r00_c00.jpg");
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let splitter = TileSplitter::new(fake_registry());
        let bytes = fake_image(b"FAKEPNG", 2, 2);

        let result = splitter.split_bytes(&bytes, "bmp", GridSpec::new(1, 1).unwrap());

        assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    }

    #[test]
    fn decode_falls_through_in_registration_order() {
        let registry = fake_registry();

        let (_, format) = registry.decode(&fake_image(b"FAKEJPG", 1, 1)).unwrap();
        assert_eq!(format, ImageFormatTag::Jpeg);

        let same = |format| -> Box<dyn FormatCodec> {
            Box::new(FakeCodec {
                magic: b"SAME",
                format,
            })
        };
        let ambiguous = fake_image(b"SAME", 1, 1);

        let jpeg_first =
            CodecRegistry::with_codecs(vec![same(ImageFormatTag::Jpeg), same(ImageFormatTag::Png)]);
        assert_eq!(jpeg_first.decode(&ambiguous).unwrap().1, ImageFormatTag::Jpeg);

        let png_first =
            CodecRegistry::with_codecs(vec![same(ImageFormatTag::Png), same(ImageFormatTag::Jpeg)]);
        assert_eq!(png_first.decode(&ambiguous).unwrap().1, ImageFormatTag::Png);
    }

    #[test]
    fn into_map_keys_every_tile() {
        let splitter = TileSplitter::new(fake_registry());
        let bytes = fake_image(b"FAKEPNG", 6, 4);

        let map = splitter
            .split_bytes(&bytes, "png", GridSpec::new(2, 3).unwrap())
            .unwrap()
            .into_map();

        assert_eq!(map.len(), 6);
        assert!(map.contains_key("r01_c02.png"));
    }
}
