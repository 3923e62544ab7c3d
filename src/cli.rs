//! 命令行参数解析
//!
//! 读取前三个位置参数 `<image> <rows> <cols>`，多余参数忽略，解析失败统一返回 `AppError::Usage`。

use std::path::PathBuf;

use crate::error::AppError;
use crate::image_handler::GridSpec;

pub const USAGE: &str = "\
用法: tile-splitter <image> <rows> <cols>

将图片切分为 rows 行 x cols 列。
切片保存在源图片去掉扩展名后的同名目录中，文件名为 rXX_cXX.<扩展名>。
图片高度不能被 rows 整除、或宽度不能被 cols 整除时报错。

环境变量:
  TILE_SPLITTER_CONFIG  JSON 配置文件路径（可选）
  RUST_LOG              日志级别（默认 info）";

/// 解析后的命令行参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub image: PathBuf,
    pub grid: GridSpec,
}

impl CliArgs {
    /// 解析不含程序名的参数列表。
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, AppError> {
        let Some([image, rows, cols]) = args.get(..3) else {
            return Err(AppError::Usage(format!(
                "至少需要 3 个参数，实际收到 {} 个",
                args.len()
            )));
        };

        let rows = parse_count("rows", rows.as_ref())?;
        let cols = parse_count("cols", cols.as_ref())?;
        let grid = GridSpec::new(rows, cols).map_err(|e| AppError::Usage(e.to_string()))?;

        Ok(Self {
            image: PathBuf::from(image.as_ref()),
            grid,
        })
    }
}

fn parse_count(name: &str, value: &str) -> Result<u32, AppError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| AppError::Usage(format!("{} 必须为正整数，实际为 {:?}", name, value)))
}
