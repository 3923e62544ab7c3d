//! # 网格切图工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main.rs ── cli (参数解析) ── AppError (退出码)           │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓
//! ┌───────┴──────────────────────────────────────────────────┐
//! │  image_handler                                           │
//! │   ├─ handler      编排 + 阶段耗时                        │
//! │   ├─ loader       读取源文件 / 推导输出目录              │
//! │   ├─ splitter     解码 → 整除校验 → 裁剪 → 编码          │
//! │   │   ├─ codec    PNG / JPEG 有序注册表                  │
//! │   │   ├─ grid     行优先单元 + rXX_cXX 命名              │
//! │   │   └─ buffer   RGBA 缓冲 + 越界检查裁剪               │
//! │   └─ writer       有界并发写盘 + 失败清理                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，决定命令行退出码 |
//! | [`cli`] | `<image> <rows> <cols>` 参数解析与用法文本 |
//! | [`image_handler`] | 解码、切分、编码与写盘的完整流水线 |

pub mod cli;
pub mod error;
pub mod image_handler;
