//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `IconNormalizer` 只负责流程编排与配置管理，不与任何 UI 框架绑定。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节并执行前置校验
//! 3. 在阻塞线程池上解码、渲染、编码
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<NormalizerConfig>>` 支持运行时动态切档。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 解码/渲染通过 `spawn_blocking` 下放，调用方事件线程只在一个 await 点挂起。
//! - 记录 `load/render/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::NormalizedIcon;
use super::{IconError, IconQualityProfile, IconSource, NormalizerConfig};

/// 图标归一化处理器。
///
/// 封装配置状态，并编排各子模块实现完整流程。
pub struct IconNormalizer {
    pub(super) config: Arc<RwLock<NormalizerConfig>>,
}

impl IconNormalizer {
    /// 根据初始配置创建处理器。
    pub fn new(config: NormalizerConfig) -> Result<Self, IconError> {
        if config.icon_dimension == 0 {
            return Err(IconError::InvalidConfig("icon_dimension 不能为 0".to_string()));
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub(super) fn config_snapshot(&self) -> Result<NormalizerConfig, IconError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| IconError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置质量档位。
    pub fn set_quality_profile(&self, profile: IconQualityProfile) -> Result<(), IconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| IconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_quality_profile(profile);

        log::info!(
            "⚙️ 已切换图标质量档位：{:?}（filter={:?}, max_pixels={}, max_bytes={}）",
            profile,
            config.resize_filter,
            config.max_decoded_pixels,
            config.max_decoded_bytes
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_quality_profile(&self) -> Result<IconQualityProfile, IconError> {
        let config = self
            .config
            .read()
            .map_err(|_| IconError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_quality_profile())
    }

    /// 设置解码安全上限。
    pub fn set_decode_limits(
        &self,
        max_decoded_pixels: u64,
        max_decoded_bytes: u64,
    ) -> Result<(), IconError> {
        if max_decoded_pixels < 16_384 {
            return Err(IconError::InvalidConfig(
                "max_decoded_pixels 不能小于 16384（128×128）".to_string(),
            ));
        }
        if max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(IconError::InvalidConfig("max_decoded_bytes 不能小于 8MB".to_string()));
        }

        let mut config = self
            .config
            .write()
            .map_err(|_| IconError::ResourceLimit("配置写入锁已中毒".to_string()))?;

        config.max_decoded_pixels = max_decoded_pixels;
        config.max_decoded_bytes = max_decoded_bytes;

        Ok(())
    }

    /// 获取解码安全上限快照。
    pub fn get_decode_limits(&self) -> Result<(u64, u64), IconError> {
        let config = self
            .config
            .read()
            .map_err(|_| IconError::ResourceLimit("配置读取锁已中毒".to_string()))?;

        Ok((config.max_decoded_pixels, config.max_decoded_bytes))
    }

    /// 处理主入口：从任意来源加载并归一化为规范图标。
    ///
    /// 前置校验（体积 / 声明类型）同步完成；解码与渲染在阻塞线程池执行，
    /// 对调用方表现为单次 pending→resolved/rejected 转换。
    pub async fn normalize(&self, source: IconSource) -> Result<NormalizedIcon, IconError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = match source {
            IconSource::Bytes { data, content_type } => {
                self.load_from_bytes(data, &content_type, &config)?
            }
            IconSource::DataUrl(data) => self.load_from_data_url(&data, &config)?,
            IconSource::FilePath(path) => self.load_from_file(&path, &config)?,
        };
        let load_elapsed = load_start.elapsed();

        let render_start = Instant::now();
        let icon = tokio::task::spawn_blocking(move || Self::render_canonical_icon(raw, &config))
            .await
            .map_err(|e| IconError::Decode(format!("后台渲染任务中断：{}", e)))??;
        let render_elapsed = render_start.elapsed();

        let total_elapsed = total_start.elapsed();
        log::info!(
            "✅ 图标归一化完成 - load={}ms render={}ms total={}ms 输出={}B",
            load_elapsed.as_millis(),
            render_elapsed.as_millis(),
            total_elapsed.as_millis(),
            icon.png_bytes.len()
        );

        Ok(icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::source::FitRect;
    use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use std::sync::Arc;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let dyn_img = DynamicImage::ImageRgba8(img);
        let mut cursor = Cursor::new(Vec::new());
        dyn_img
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    #[tokio::test]
    async fn normalize_bytes_end_to_end() {
        let handler = IconNormalizer::new(NormalizerConfig::default()).expect("handler init failed");

        let icon = handler
            .normalize(IconSource::Bytes {
                data: create_png_bytes(800, 400),
                content_type: "image/png".to_string(),
            })
            .await
            .expect("normalize should succeed");

        assert_eq!(icon.fit, FitRect { x: 0, y: 32, width: 128, height: 64 });

        let (width, height) = image::load_from_memory(&icon.png_bytes)
            .expect("output should decode")
            .dimensions();
        assert_eq!((width, height), (128, 128));
    }

    #[tokio::test]
    async fn normalize_rejects_oversized_payload_without_decoding() {
        let handler = IconNormalizer::new(NormalizerConfig::default()).expect("handler init failed");
        let config = handler.config_snapshot().expect("config snapshot failed");

        let result = handler
            .normalize(IconSource::Bytes {
                data: vec![0_u8; (config.max_file_size + 1) as usize],
                content_type: "image/png".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IconError::SizeLimit(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_normalizations_resolve_independently() {
        let handler = Arc::new(
            IconNormalizer::new(NormalizerConfig::default()).expect("handler init failed"),
        );

        let cases = [(800_u32, 400_u32), (300, 600), (128, 128), (1, 1)];
        let mut tasks = Vec::with_capacity(cases.len());

        for (width, height) in cases {
            let handler = Arc::clone(&handler);
            tasks.push(tokio::spawn(async move {
                handler
                    .normalize(IconSource::Bytes {
                        data: create_png_bytes(width, height),
                        content_type: "image/png".to_string(),
                    })
                    .await
            }));
        }

        for task in tasks {
            let icon = task
                .await
                .expect("task should not panic")
                .expect("normalize should succeed");
            let (width, height) = image::load_from_memory(&icon.png_bytes)
                .expect("output should decode")
                .dimensions();
            assert_eq!((width, height), (128, 128));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn discarded_in_flight_result_does_not_panic() {
        let handler = Arc::new(
            IconNormalizer::new(NormalizerConfig::default()).expect("handler init failed"),
        );

        // 调用方提前放弃结果：任务允许跑完，结果被丢弃即可。
        let detached = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let _ = handler
                    .normalize(IconSource::Bytes {
                        data: create_png_bytes(512, 512),
                        content_type: "image/png".to_string(),
                    })
                    .await;
            })
        };
        drop(detached);

        // 同一处理器仍可正常服务后续请求。
        let icon = handler
            .normalize(IconSource::Bytes {
                data: create_png_bytes(64, 64),
                content_type: "image/png".to_string(),
            })
            .await
            .expect("normalize should succeed");

        assert_eq!(icon.fit.width.max(icon.fit.height), 128);
    }

    #[test]
    fn decode_limits_validation_rejects_out_of_range_values() {
        let handler = IconNormalizer::new(NormalizerConfig::default()).expect("handler init failed");

        assert!(matches!(
            handler.set_decode_limits(1_000, 160 * 1024 * 1024),
            Err(IconError::InvalidConfig(_))
        ));
        assert!(matches!(
            handler.set_decode_limits(40_000_000, 1024),
            Err(IconError::InvalidConfig(_))
        ));

        handler
            .set_decode_limits(24_000_000, 96 * 1024 * 1024)
            .expect("valid limits should be accepted");
        let (pixels, bytes) = handler.get_decode_limits().expect("read limits failed");
        assert_eq!(pixels, 24_000_000);
        assert_eq!(bytes, 96 * 1024 * 1024);
    }

    #[test]
    fn zero_dimension_config_is_rejected() {
        let mut config = NormalizerConfig::default();
        config.icon_dimension = 0;

        assert!(matches!(
            IconNormalizer::new(config),
            Err(IconError::InvalidConfig(_))
        ));
    }
}
