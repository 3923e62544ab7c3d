//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `SplitConfig`，保证运行时行为可观测、可调整、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - 可选 JSON 覆盖文件，缺省字段回落到默认值（`#[serde(default)]`）。
//! - `validate` 统一做取值范围校验，加载后立即执行。

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ImageError;

/// 指定 JSON 覆盖文件路径的环境变量。
pub const CONFIG_ENV_VAR: &str = "TILE_SPLITTER_CONFIG";

/// 切图配置。
///
/// 字段覆盖了读取、解码、编码与写盘四个阶段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// 读取源文件时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// JPEG 编码质量（1~100）。
    pub jpeg_quality: u8,
    /// 同时写盘的最大文件数。
    pub max_open_files: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            jpeg_quality: 90,
            max_open_files: 8,
        }
    }
}

impl SplitConfig {
    /// 解析 JSON 配置文本并校验。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::SplitConfig;
    ///
    /// let config = SplitConfig::from_json_str(r#"{ "jpeg_quality": 75 }"#)?;
    /// assert_eq!(config.jpeg_quality, 75);
    /// assert_eq!(config.max_open_files, SplitConfig::default().max_open_files);
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn from_json_str(content: &str) -> Result<Self, ImageError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ImageError::InvalidConfig(format!("解析配置失败：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取配置。
    pub fn from_json_file(path: &Path) -> Result<Self, ImageError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImageError::FileSystem(format!("无法读取配置文件 {}：{}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// 若设置了 `TILE_SPLITTER_CONFIG` 则读取该文件，否则使用默认配置。
    pub fn from_env() -> Result<Self, ImageError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                let config = Self::from_json_file(Path::new(&path))?;
                log::info!("⚙️ 已加载配置文件：{}", Path::new(&path).display());
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }

    /// 序列化为紧凑 JSON，用于输出生效配置。
    pub fn to_json(&self) -> Result<String, ImageError> {
        serde_json::to_string(self)
            .map_err(|e| ImageError::InvalidConfig(format!("序列化配置失败：{}", e)))
    }

    /// 校验取值范围。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.max_file_size == 0 {
            return Err(ImageError::InvalidConfig("max_file_size 必须大于 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::InvalidConfig("max_decoded_pixels 必须大于 0".to_string()));
        }
        if self.max_decoded_bytes < 4 {
            return Err(ImageError::InvalidConfig("max_decoded_bytes 不能小于 4 字节".to_string()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ImageError::InvalidConfig("jpeg_quality 必须在 1~100 之间".to_string()));
        }
        if !(1..=256).contains(&self.max_open_files) {
            return Err(ImageError::InvalidConfig("max_open_files 必须在 1~256 之间".to_string()));
        }
        Ok(())
    }
}
