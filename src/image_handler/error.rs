//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载切图链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//! 网格与越界错误携带结构化字段，便于测试断言与诊断输出。

/// 切图处理统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`，最终由命令行入口输出。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("不支持的图片格式：{0}")]
    UnsupportedFormat(String),

    #[error("图片尺寸 ({width}x{height}) 无法被 cols={cols}, rows={rows} 整除")]
    NonDivisibleGrid {
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
    },

    #[error(
        "裁剪区域越界：({x}, {y}) {crop_width}x{crop_height} 超出源图 {source_width}x{source_height}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        crop_width: u32,
        crop_height: u32,
        source_width: u32,
        source_height: u32,
    },

    #[error("网格参数错误：{0}")]
    InvalidGrid(String),

    #[error("像素缓冲异常：{0}")]
    InvalidBuffer(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("后台任务异常终止：{0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ImageError {
    /// 稳定错误码，供日志与脚本侧匹配。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::NonDivisibleGrid { .. } => "non_divisible_grid",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::InvalidGrid(_) => "invalid_grid",
            Self::InvalidBuffer(_) => "invalid_buffer",
            Self::Encode(_) => "encode_failed",
            Self::FileSystem(_) => "file_system",
            Self::ResourceLimit(_) => "resource_limit",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Task(_) => "task_failed",
        }
    }

    /// 出错所在的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "config",
            Self::FileSystem(_) | Self::ResourceLimit(_) => "io",
            Self::UnsupportedFormat(_) | Self::InvalidBuffer(_) => "decode",
            Self::NonDivisibleGrid { .. }
            | Self::InvalidGrid(_)
            | Self::OutOfBounds { .. }
            | Self::Task(_) => "split",
            Self::Encode(_) => "encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_errors_report_split_stage() {
        let error = ImageError::NonDivisibleGrid {
            width: 5,
            height: 2,
            rows: 1,
            cols: 2,
        };

        assert_eq!(error.code(), "non_divisible_grid");
        assert_eq!(error.stage(), "split");
        assert_eq!(error.to_string(), "图片尺寸 (5x2) 无法被 cols=2, rows=1 整除");
    }

    #[tokio::test]
    async fn panicked_background_task_reports_task_failure() {
        let join_error = tokio::task::spawn_blocking(|| -> u8 { panic!("split worker crashed") })
            .await
            .unwrap_err();

        let error = ImageError::from(join_error);

        assert_eq!(error.code(), "task_failed");
        assert_eq!(error.stage(), "split");
    }
}
