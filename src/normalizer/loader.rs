//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（选择器字节 / Data URL / 本地文件）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验。目标是尽快失败，减少不必要内存与 CPU 消耗。
//! 体积与声明类型的校验必须发生在任何解码动作之前。
//!
//! ## 实现思路
//!
//! - 字节：体积上限 + 声明类型 + 文件签名校验。
//! - Data URL：头部解析 + 解码前体积估算 + 解码后体积限制 + 签名校验。
//! - 文件：存在性 + metadata 体积限制 + 读取 + 签名嗅探。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawIconUpload;
use super::{IconError, IconNormalizer, NormalizerConfig};

impl IconNormalizer {
    /// 从文件选择器提交的字节加载。
    ///
    /// 校验顺序固定：体积 → 声明类型 → 文件签名，全部通过后才允许进入解码。
    pub(super) fn load_from_bytes(
        &self,
        data: Vec<u8>,
        content_type: &str,
        config: &NormalizerConfig,
    ) -> Result<RawIconUpload, IconError> {
        log::info!("📎 开始处理上传字节 - 声明类型: {}", content_type);

        Self::validate_upload_size(data.len() as u64, config)?;

        if !Self::is_image_content_type(content_type) {
            return Err(IconError::UnsupportedType(format!(
                "声明类型不是图片：{}",
                content_type
            )));
        }

        Self::validate_image_signature(&data)?;

        Ok(RawIconUpload {
            bytes: data,
            content_type: content_type.to_string(),
            source_hint: "bytes",
        })
    }

    /// 从 Data URL 加载。
    pub(super) fn load_from_data_url(
        &self,
        data: &str,
        config: &NormalizerConfig,
    ) -> Result<RawIconUpload, IconError> {
        log::info!("📝 开始处理 Data URL 图标");

        let (content_type, bytes) = Self::parse_data_url_with_limit(data, config.max_file_size)?;

        Self::validate_upload_size(bytes.len() as u64, config)?;

        if !Self::is_image_content_type(&content_type) {
            return Err(IconError::UnsupportedType(format!(
                "Data URL 声明类型不是图片：{}",
                content_type
            )));
        }

        Self::validate_image_signature(&bytes)?;

        Ok(RawIconUpload {
            bytes,
            content_type,
            source_hint: "data-url",
        })
    }

    /// 从本地路径加载（CLI 与测试场景）。
    ///
    /// 声明类型来自文件签名嗅探，而非扩展名。
    pub(super) fn load_from_file(
        &self,
        path: &str,
        config: &NormalizerConfig,
    ) -> Result<RawIconUpload, IconError> {
        log::info!("📁 开始读取本地图标 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(IconError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| IconError::FileSystem(format!("无法读取文件信息：{}", e)))?;
        Self::validate_upload_size(metadata.len(), config)?;

        let bytes = std::fs::read(file_path)
            .map_err(|e| IconError::FileSystem(format!("无法读取图片文件：{}", e)))?;

        let kind = infer::get(&bytes)
            .ok_or_else(|| IconError::UnsupportedType("无法识别文件类型".to_string()))?;
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(IconError::UnsupportedType(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(RawIconUpload {
            bytes,
            content_type: kind.mime_type().to_string(),
            source_hint: "file",
        })
    }

    /// 体积上限校验，任何解码动作之前执行。
    fn validate_upload_size(len: u64, config: &NormalizerConfig) -> Result<(), IconError> {
        if len > config.max_file_size {
            return Err(IconError::SizeLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 判断声明的媒体类型是否为图片。
    pub(crate) fn is_image_content_type(content_type: &str) -> bool {
        content_type
            .split(';')
            .next()
            .map(|base| base.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), IconError> {
        if bytes.is_empty() {
            return Err(IconError::UnsupportedType("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| IconError::UnsupportedType("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(IconError::UnsupportedType(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }

    /// 估算 Base64 解码后的体积上界（不实际解码）。
    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, IconError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| IconError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| IconError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    /// 解析 Data URL，返回声明类型与解码字节。
    ///
    /// 解码前先按估算体积拒绝超限输入，避免先分配再报错。
    fn parse_data_url_with_limit(
        data: &str,
        max_file_size: u64,
    ) -> Result<(String, Vec<u8>), IconError> {
        let normalized = data.trim();

        let payload = normalized
            .strip_prefix("data:")
            .ok_or_else(|| IconError::UnsupportedType("缺少 data: 前缀".to_string()))?;

        let base64_start = payload
            .find(";base64,")
            .ok_or_else(|| IconError::UnsupportedType("缺少 base64 标记".to_string()))?;

        let content_type = payload[..base64_start].to_string();
        let base64_data = &payload[base64_start + 8..];

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(base64_data)?;
        if estimated_len > max_file_size {
            return Err(IconError::SizeLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = general_purpose::STANDARD
            .decode(base64_data)
            .map_err(|e| IconError::Decode(format!("Base64 解码失败：{}", e)))?;

        Ok((content_type, bytes))
    }
}
