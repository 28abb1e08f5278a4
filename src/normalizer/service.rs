//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `IconService` 作为胶水层持有的注入状态，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由应用入口统一管理）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 后续可扩展多实例或按会话配置
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `normalize_upload`：执行完整归一化链路，产出上传回调载荷
//! - `set_quality_profile` / `get_quality_profile`：档位切换与查询
//! - `set_decode_limits` / `get_decode_limits`：解码上限调整
//!
//! 错误统一转换为 `{ code, stage, message }` 结构透传给前端。

use base64::{Engine as _, engine::general_purpose};
use serde::Serializer;

use super::source::NormalizedIcon;
use super::{IconError, IconNormalizer, IconQualityProfile, IconSource, NormalizerConfig};

/// 上传回调载荷：`{ kind: "image", encoded_blob, preview_data_url }`。
///
/// `encoded_blob` 序列化为 Base64 字符串，便于跨 IPC/JSON 边界传输。
#[derive(Debug, Clone, serde::Serialize)]
pub struct IconUploadPayload {
    /// 载荷类别，恒为 `"image"`。
    pub kind: &'static str,
    /// 规范图标 PNG 字节。
    #[serde(serialize_with = "serialize_bytes_as_base64")]
    pub encoded_blob: Vec<u8>,
    /// 与 `encoded_blob` 逐像素一致的预览 Data URL。
    pub preview_data_url: String,
}

fn serialize_bytes_as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
}

impl From<NormalizedIcon> for IconUploadPayload {
    fn from(icon: NormalizedIcon) -> Self {
        Self {
            kind: "image",
            encoded_blob: icon.png_bytes,
            preview_data_url: icon.preview_data_url,
        }
    }
}

/// 服务边界错误：稳定 code/stage 加人类可读消息。
#[derive(Debug, Clone, serde::Serialize)]
pub struct IconServiceError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<IconError> for IconServiceError {
    fn from(error: IconError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// 图标归一化服务状态。
///
/// 由胶水层（上传表单、徽章管理界面）注入持有，内部封装 `IconNormalizer`。
pub struct IconService {
    normalizer: IconNormalizer,
}

impl IconService {
    /// 使用默认配置创建服务状态。
    pub fn new() -> Result<Self, IconError> {
        Self::with_config(NormalizerConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    ///
    /// 主要用于测试或后续按场景注入不同策略。
    pub fn with_config(config: NormalizerConfig) -> Result<Self, IconError> {
        let normalizer = IconNormalizer::new(config)?;
        Ok(Self { normalizer })
    }

    /// 执行完整归一化流程，产出上传回调载荷。
    pub async fn normalize_upload(
        &self,
        source: IconSource,
    ) -> Result<IconUploadPayload, IconServiceError> {
        let icon = self
            .normalizer
            .normalize(source)
            .await
            .map_err(IconServiceError::from)?;
        Ok(IconUploadPayload::from(icon))
    }

    /// 执行完整归一化流程，返回原始产物（CLI / 内部调用）。
    pub async fn normalize(&self, source: IconSource) -> Result<NormalizedIcon, IconError> {
        self.normalizer.normalize(source).await
    }

    /// 设置质量档位。
    pub fn set_quality_profile(&self, profile: &str) -> Result<(), IconError> {
        let profile = IconQualityProfile::from_str(profile)?;
        self.normalizer.set_quality_profile(profile)
    }

    /// 获取当前生效质量档位（字符串）。
    pub fn get_quality_profile(&self) -> Result<String, IconError> {
        let profile = self.normalizer.get_quality_profile()?;
        Ok(profile.as_str().to_string())
    }

    /// 设置解码安全上限。
    pub fn set_decode_limits(&self, max_pixels: u64, max_bytes: u64) -> Result<(), IconError> {
        self.normalizer.set_decode_limits(max_pixels, max_bytes)
    }

    /// 获取解码安全上限。
    pub fn get_decode_limits(&self) -> Result<(u64, u64), IconError> {
        self.normalizer.get_decode_limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use std::sync::Arc;
    use std::thread;

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
    async fn upload_payload_has_stable_image_kind_and_base64_blob() {
        let service = IconService::new().expect("service init failed");

        let payload = service
            .normalize_upload(IconSource::Bytes {
                data: create_png_bytes(300, 600),
                content_type: "image/png".to_string(),
            })
            .await
            .expect("normalize should succeed");

        assert_eq!(payload.kind, "image");
        assert!(payload.preview_data_url.starts_with("data:image/png;base64,"));

        let json = serde_json::to_value(&payload).expect("payload should serialize");
        assert_eq!(json["kind"], "image");

        let blob = json["encoded_blob"].as_str().expect("blob should be a string");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(blob)
            .expect("blob should be base64");
        assert_eq!(decoded, payload.encoded_blob);
    }

    #[tokio::test]
    async fn service_error_carries_code_and_stage() {
        let service = IconService::new().expect("service init failed");

        let err = service
            .normalize_upload(IconSource::Bytes {
                data: b"plain text".to_vec(),
                content_type: "text/plain".to_string(),
            })
            .await
            .expect_err("non-image type must be rejected");

        assert_eq!(err.code, "E_UNSUPPORTED_TYPE");
        assert_eq!(err.stage, "validate");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn service_set_and_get_profile_roundtrip() {
        let service = IconService::new().expect("service init failed");

        service.set_quality_profile("quality").expect("set quality should succeed");
        assert_eq!(service.get_quality_profile().expect("get profile should succeed"), "quality");

        service.set_quality_profile("balanced").expect("set balanced should succeed");
        assert_eq!(service.get_quality_profile().expect("get profile should succeed"), "balanced");

        service.set_quality_profile("speed").expect("set speed should succeed");
        assert_eq!(service.get_quality_profile().expect("get profile should succeed"), "speed");
    }

    #[test]
    fn service_rejects_invalid_profile() {
        let service = IconService::new().expect("service init failed");

        let result = service.set_quality_profile("unknown-profile");
        assert!(matches!(result, Err(IconError::InvalidConfig(_))));
    }

    #[test]
    fn service_profile_concurrent_access_stress() {
        let service = Arc::new(IconService::new().expect("service init failed"));

        let workers = 8;
        let iterations = 200;

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let service = Arc::clone(&service);
            handles.push(thread::spawn(move || {
                let profiles = ["quality", "balanced", "speed"];

                for i in 0..iterations {
                    let profile = profiles[(worker_id + i) % profiles.len()];
                    service.set_quality_profile(profile).expect("set profile should succeed");

                    let current = service.get_quality_profile().expect("get profile should succeed");
                    assert!(matches!(current.as_str(), "quality" | "balanced" | "speed"));
                }
            }));
        }

        for handle in handles {
            handle.join().expect("worker thread should not panic");
        }
    }
}
