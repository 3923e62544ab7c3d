//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，命令行入口只面对这一种错误，
//! 并据此决定输出内容与退出码。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` 提供 `From` 转换，无需手动 map。

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 命令行参数缺失或非法
    #[error("参数错误: {0}")]
    Usage(String),

    /// 切图流水线错误（读取 / 解码 / 切分 / 写盘）
    #[error("{0}")]
    Image(#[from] ImageError),
}

impl AppError {
    /// 进程退出码：参数错误为 1，处理失败为 2。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 1,
            Self::Image(_) => 2,
        }
    }
}
