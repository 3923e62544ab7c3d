//! # 写盘模块
//!
//! ## 设计思路
//!
//! 切片之间互不依赖，可以并发写盘，但同时打开的文件数受 `max_open_files` 约束。
//! 写盘是“全有或全无”：任一切片失败时，本次计划写入的文件都会被尽力清理，
//! 并返回第一个错误，调用方不会把残缺目录当作成功结果。
//!
//! ## 实现思路
//!
//! - `TileWriter` 抽象持久化动作，测试可替换为记录调用顺序的假实现。
//! - `FsTileWriter` 基于 `tokio::fs` + `Semaphore` + `JoinSet` 实现有界并发。

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{EncodedTile, ImageError};

/// 切片持久化能力。
pub trait TileWriter {
    /// 将全部切片写入 `dir`，成功时按输入顺序返回文件路径。
    fn write_tiles(
        &self,
        dir: &Path,
        tiles: Vec<EncodedTile>,
    ) -> impl Future<Output = Result<Vec<PathBuf>, ImageError>> + Send;
}

/// 写入本地文件系统的切片写盘器。
#[derive(Debug, Clone)]
pub struct FsTileWriter {
    max_open_files: usize,
}

impl FsTileWriter {
    pub fn new(max_open_files: usize) -> Self {
        Self {
            max_open_files: max_open_files.max(1),
        }
    }

    async fn cleanup(paths: &[PathBuf]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => log::warn!("⚠️ 清理切片失败 {}：{}", path.display(), err),
            }
        }
    }
}

impl TileWriter for FsTileWriter {
    async fn write_tiles(
        &self,
        dir: &Path,
        tiles: Vec<EncodedTile>,
    ) -> Result<Vec<PathBuf>, ImageError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ImageError::FileSystem(format!("创建输出目录 {} 失败：{}", dir.display(), e))
        })?;

        let planned: Vec<PathBuf> = tiles.iter().map(|tile| dir.join(&tile.filename)).collect();
        let jobs = tiles.into_iter().zip(planned.iter().cloned()).collect();

        let first_error = run_bounded(
            jobs,
            self.max_open_files,
            |(tile, path): (EncodedTile, PathBuf)| async move {
                tokio::fs::write(&path, &tile.bytes).await.map_err(|e| {
                    ImageError::FileSystem(format!("写入切片 {} 失败：{}", path.display(), e))
                })
            },
        )
        .await;

        if let Some(err) = first_error {
            log::warn!("⚠️ 写盘失败，清理本次输出 - 目录: {}", dir.display());
            Self::cleanup(&planned).await;
            return Err(err);
        }

        Ok(planned)
    }
}

/// 以至多 `max_in_flight` 个并发执行 `job`，全部结束后返回第一个错误。
///
/// 许可在任务内部、`job` 的 future 开始执行前获取。
async fn run_bounded<T, F, Fut>(items: Vec<T>, max_in_flight: usize, job: F) -> Option<ImageError>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), ImageError>> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut running = JoinSet::new();

    for item in items {
        let permits = Arc::clone(&permits);
        let work = job(item);
        running.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| ImageError::FileSystem(format!("写盘并发控制异常：{}", e)))?;
            work.await
        });
    }

    let mut first_error: Option<ImageError> = None;
    while let Some(joined) = running.join_next().await {
        if let Err(err) = joined.map_err(ImageError::from).and_then(|done| done) {
            first_error.get_or_insert(err);
        }
    }
    first_error
}
