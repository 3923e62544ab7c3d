//! # 加载与路径推导模块
//!
//! ## 设计思路
//!
//! 统一处理源文件的读取，并在“尽可能早”的阶段执行输入校验，
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 扩展名：决定输出格式与输出文件扩展名，缺失即报 `UnsupportedFormat`。
//! - 输出目录：源文件去掉扩展名后的同级目录（`a/cat.png` → `a/cat`）。
//! - 读取：存在性 + metadata 体积限制 + 读取。

use std::path::{Path, PathBuf};

use super::source::SourceImage;
use super::{ImageError, SplitConfig};

/// 取源文件扩展名（不含点，保持原样大小写）。
pub fn extension_of(path: &Path) -> Result<String, ImageError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ImageError::UnsupportedFormat(format!("无法从路径识别扩展名：{}", path.display()))
        })
}

/// 输出目录：去掉最后一个扩展名后的路径。
pub fn output_dir_for(path: &Path) -> Result<PathBuf, ImageError> {
    extension_of(path)?;
    Ok(path.with_extension(""))
}

/// 从本地路径加载源图片。
pub async fn load_from_file(path: &Path, config: &SplitConfig) -> Result<SourceImage, ImageError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

    let extension = extension_of(path)?;
    let output_dir = output_dir_for(path)?;

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        ImageError::FileSystem(format!("无法读取文件信息 {}：{}", path.display(), e))
    })?;

    if !metadata.is_file() {
        return Err(ImageError::FileSystem(format!("不是文件：{}", path.display())));
    }

    if metadata.len() > config.max_file_size {
        return Err(ImageError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    Ok(SourceImage {
        path: path.to_path_buf(),
        bytes,
        extension,
        output_dir,
    })
}
