//! # 数据源与中间模型
//!
//! 将“外部输入”和“流水线结果”解耦：
//! - `SourceImage` 表示已加载但未解码的源文件
//! - `SplitReport` 表示一次切图落盘后的汇总

use std::path::PathBuf;

use super::ImageFormatTag;

/// 加载阶段输出：原始字节与由路径推导出的信息。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    /// 原始图片字节。
    pub bytes: Vec<u8>,
    /// 源文件扩展名（不含点），输出文件沿用。
    pub extension: String,
    /// 切片输出目录。
    pub output_dir: PathBuf,
}

/// 一次切图的结果汇总。
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    /// 按行优先排列的切片文件路径。
    pub files: Vec<PathBuf>,
    pub format: ImageFormatTag,
    pub tile_width: u32,
    pub tile_height: u32,
}
