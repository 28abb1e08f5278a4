//! # 徽章图标归一化 — CLI 入口
//!
//! 本文件仅负责命令行参数解析与结果落盘，充当“上传协作方”的替身。
//! 业务逻辑全部在 `normalizer` 模块中，详见 `lib.rs` 架构文档。

use badge_icon::{IconService, IconSource};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("用法：badge-icon <输入图片路径> [输出路径，默认 icon.png]");
        return ExitCode::FAILURE;
    };
    let output = args.next().unwrap_or_else(|| "icon.png".to_string());

    let service = match IconService::new() {
        Ok(service) => service,
        Err(err) => {
            log::error!("服务初始化失败：{}", err);
            return ExitCode::FAILURE;
        }
    };

    match service.normalize(IconSource::FilePath(input)).await {
        Ok(icon) => {
            if let Err(err) = std::fs::write(&output, &icon.png_bytes) {
                log::error!("写入输出文件失败：{}", err);
                return ExitCode::FAILURE;
            }

            log::info!(
                "✅ 已写入 {} - 绘制 {}x{}@({},{}) 预览 {} 字符",
                output,
                icon.fit.width,
                icon.fit.height,
                icon.fit.x,
                icon.fit.y,
                icon.preview_data_url.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("归一化失败 [{}/{}]：{}", err.stage(), err.code(), err);
            ExitCode::FAILURE
        }
    }
}
