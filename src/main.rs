//! # 网格切图工具 — 应用入口
//!
//! 本文件仅负责日志初始化、参数解析与退出码映射。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;

use tile_splitter::cli::{CliArgs, USAGE};
use tile_splitter::error::AppError;
use tile_splitter::image_handler::{SplitConfig, SplitHandler};

async fn run(args: &[String]) -> Result<(), AppError> {
    let args = CliArgs::parse(args)?;
    let handler = SplitHandler::new(SplitConfig::from_env()?)?;

    let report = handler.split_file(&args.image, args.grid).await?;
    log::info!(
        "📦 输出目录: {}（{} 个 {}x{} 切片，格式 {}）",
        report.output_dir.display(),
        report.files.len(),
        report.tile_width,
        report.tile_height,
        report.format
    );

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ AppError::Usage(_)) => {
            eprintln!("{err}\n\n{USAGE}");
            ExitCode::from(err.exit_code())
        }
        Err(err) => {
            if let AppError::Image(image_err) = &err {
                log::error!("切图失败 [{}@{}]: {image_err}", image_err.code(), image_err.stage());
            }
            eprintln!("错误: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
