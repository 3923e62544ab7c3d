//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `SplitHandler` 只负责流程编排与配置管理。处理链路固定为：
//! 1. 读取配置快照
//! 2. 加载源文件（扩展名、输出目录、体积校验）
//! 3. 解码并按网格切分、编码（纯计算，放到阻塞线程池）
//! 4. 交给写盘层持久化
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<SplitConfig>>` 支持运行时替换。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/split/write/total` 阶段耗时，便于性能诊断。
//! - 切分失败时不会触碰文件系统，整除校验失败不会创建输出目录。

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::SplitReport;
use super::writer::{FsTileWriter, TileWriter};
use super::{CodecRegistry, GridSpec, ImageError, SplitConfig, TileSplitter, loader};

/// 切图处理器。
pub struct SplitHandler {
    config: Arc<RwLock<SplitConfig>>,
}

impl SplitHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use tile_splitter::image_handler::{SplitConfig, SplitHandler};
    ///
    /// let handler = SplitHandler::new(SplitConfig::default())?;
    /// # Ok::<(), tile_splitter::image_handler::ImageError>(())
    /// ```
    pub fn new(config: SplitConfig) -> Result<Self, ImageError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<SplitConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 整体替换配置，替换前先校验。
    pub fn set_config(&self, config: SplitConfig) -> Result<(), ImageError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        *current = config;
        Ok(())
    }

    /// 处理主入口：切分本地图片并写入同名目录。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use tile_splitter::image_handler::{GridSpec, SplitConfig, SplitHandler};
    ///
    /// # async fn demo() -> Result<(), tile_splitter::image_handler::ImageError> {
    /// let handler = SplitHandler::new(SplitConfig::default())?;
    /// let report = handler
    ///     .split_file("photos/cat.png".as_ref(), GridSpec::new(2, 3)?)
    ///     .await?;
    /// assert_eq!(report.files.len(), 6);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn split_file(&self, path: &Path, grid: GridSpec) -> Result<SplitReport, ImageError> {
        let config = self.config_snapshot()?;
        let writer = FsTileWriter::new(config.max_open_files);
        Self::split_file_inner(path, grid, &writer, config).await
    }

    /// 与 `split_file` 相同，但由调用方提供写盘实现。
    pub async fn split_file_with<W: TileWriter>(
        &self,
        path: &Path,
        grid: GridSpec,
        writer: &W,
    ) -> Result<SplitReport, ImageError> {
        let config = self.config_snapshot()?;
        Self::split_file_inner(path, grid, writer, config).await
    }

    /// 整条链路只使用传入的这一份配置。
    async fn split_file_inner<W: TileWriter>(
        path: &Path,
        grid: GridSpec,
        writer: &W,
        config: SplitConfig,
    ) -> Result<SplitReport, ImageError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("⚙️ 生效配置: {}", config.to_json()?);
        }
        let total_start = Instant::now();

        let load_start = Instant::now();
        let source = loader::load_from_file(path, &config).await?;
        let load_elapsed = load_start.elapsed();

        let split_start = Instant::now();
        let extension = source.extension.clone();
        let bytes = source.bytes;
        let output = tokio::task::spawn_blocking(move || {
            TileSplitter::new(CodecRegistry::from_config(&config)).split_bytes(&bytes, &extension, grid)
        })
        .await??;
        let split_elapsed = split_start.elapsed();

        let layout = output.layout;
        let format = output.format;

        let write_start = Instant::now();
        let files = writer.write_tiles(&source.output_dir, output.tiles).await?;
        let write_elapsed = write_start.elapsed();

        log::info!(
            "✅ 切图完成 - {} 个切片 -> {} load={}ms split={}ms write={}ms total={}ms",
            files.len(),
            source.output_dir.display(),
            load_elapsed.as_millis(),
            split_elapsed.as_millis(),
            write_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(SplitReport {
            output_dir: source.output_dir,
            files,
            format,
            tile_width: layout.tile_width(),
            tile_height: layout.tile_height(),
        })
    }
}
