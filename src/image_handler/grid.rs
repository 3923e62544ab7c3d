//! # 网格布局
//!
//! ## 设计思路
//!
//! 把“能否整除 → 单块尺寸 → 各块原点 → 文件名”这组纯计算从切图流程里拆出来，
//! 不涉及像素与 I/O，便于穷举测试。
//!
//! 枚举顺序固定为行优先（外层行、内层列），它决定输出顺序与写盘顺序。

use super::ImageError;

/// 调用方给出的网格规格（行数 × 列数）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    rows: u32,
    cols: u32,
}

impl GridSpec {
    /// 构建网格规格，行列数必须为正。
    pub fn new(rows: u32, cols: u32) -> Result<Self, ImageError> {
        if rows == 0 || cols == 0 {
            return Err(ImageError::InvalidGrid(format!(
                "rows 与 cols 必须为正整数（rows={}, cols={}）",
                rows, cols
            )));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// 单个网格单元在源图中的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 已通过整除校验的网格布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    grid: GridSpec,
    tile_width: u32,
    tile_height: u32,
}

impl TileLayout {
    /// 校验 `width % cols == 0 && height % rows == 0` 并计算单块尺寸。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::{GridSpec, TileLayout};
    ///
    /// let layout = TileLayout::new(4, 2, GridSpec::new(1, 2)?)?;
    /// assert_eq!((layout.tile_width(), layout.tile_height()), (2, 2));
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn new(width: u32, height: u32, grid: GridSpec) -> Result<Self, ImageError> {
        if width % grid.cols != 0 || height % grid.rows != 0 {
            return Err(ImageError::NonDivisibleGrid {
                width,
                height,
                rows: grid.rows,
                cols: grid.cols,
            });
        }

        Ok(Self {
            grid,
            tile_width: width / grid.cols,
            tile_height: height / grid.rows,
        })
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    /// 行优先枚举所有网格单元。
    pub fn regions(&self) -> impl Iterator<Item = TileRegion> + '_ {
        (0..self.grid.rows).flat_map(move |row| {
            (0..self.grid.cols).map(move |col| TileRegion {
                row,
                col,
                x: col * self.tile_width,
                y: row * self.tile_height,
                width: self.tile_width,
                height: self.tile_height,
            })
        })
    }
}

/// 生成 `r{row:02}_c{col:02}.{ext}` 形式的文件名。
///
/// 两位是最小宽度，三位及以上的序号原样保留。
pub fn tile_filename(row: u32, col: u32, ext: &str) -> String {
    format!("r{:02}_c{:02}.{}", row, col, ext)
}
