//! # 切图模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“读取源文件 → 解码 → 网格切分 → 编码 → 写盘”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `buffer`：RGBA 像素缓冲与越界检查的裁剪
//! - `format`：封闭的格式标签枚举
//! - `codec`：按格式的编解码器与有序注册表（解码回退、按标签编码）
//! - `grid`：整除校验、单块尺寸、行优先枚举与文件命名
//! - `splitter`：纯计算的切分流程，输出“文件名 → 字节”
//! - `loader`：源文件读取、扩展名与输出目录推导
//! - `writer`：有界并发、全有或全无的写盘
//! - `handler`：编排整条处理流水线
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! main.rs（参数解析）
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（读取 + 体积校验 + 路径推导）
//!    ├─ splitter.rs（解码 + 整除校验 + 裁剪 + 编码）
//!    │     ├─ codec.rs（PNG → JPEG 顺序试探解码）
//!    │     ├─ grid.rs（行优先单元 + r00_c00 命名）
//!    │     └─ buffer.rs（越界检查的裁剪）
//!    └─ writer.rs（有界并发写盘 + 失败清理）
//!    ↓
//! 返回 ImageError，由 AppError 上转给命令行
//! ```

mod buffer;
mod codec;
mod config;
mod error;
mod format;
mod grid;
mod handler;
pub mod loader;
mod source;
mod splitter;
mod writer;

pub use buffer::{BYTES_PER_PIXEL, PixelBuffer};
pub use codec::{CodecRegistry, DecodeLimits, FormatCodec, JpegCodec, PngCodec};
pub use config::{CONFIG_ENV_VAR, SplitConfig};
pub use error::ImageError;
pub use format::ImageFormatTag;
pub use grid::{GridSpec, TileLayout, TileRegion, tile_filename};
pub use handler::SplitHandler;
pub use source::{SourceImage, SplitReport};
pub use splitter::{EncodedTile, SplitOutput, Tile, TileSplitter};
pub use writer::{FsTileWriter, TileWriter};
