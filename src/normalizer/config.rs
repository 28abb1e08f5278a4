//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `NormalizerConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中质量档位（quality / balanced / speed）作为高层语义，映射到底层滤镜与解码上限组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置（5 MiB 体积上限 / 128 画布）。
//! - `IconQualityProfile` 负责档位字符串解析与反向输出。
//! - `apply_quality_profile` 将档位转换为具体参数。
//! - `infer_quality_profile` 用于从当前配置反推档位（给前端展示状态）。

use image::imageops::FilterType;

use super::IconError;

/// 上传体积上限：5 MiB，超过直接拒绝，不进入解码。
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// 规范图标边长（正方形画布）。
pub const ICON_DIMENSION: u32 = 128;

/// 图标归一化配置。
///
/// 字段覆盖了前置校验、解码上限与重采样三个阶段。
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// 上传原始字节允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 输出画布边长（像素，正方形）。
    pub icon_dimension: u32,
    /// 解码后的像素上限（`width * height`），按 header 提前拦截。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 重采样滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_UPLOAD_BYTES,
            icon_dimension: ICON_DIMENSION,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::CatmullRom,
        }
    }
}

/// 图标质量档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真（大图缩到 128 时细节最好）
/// - `Balanced`：质量与耗时平衡
/// - `Speed`：优先处理速度
#[derive(Debug, Clone, Copy)]
pub enum IconQualityProfile {
    Quality,
    Balanced,
    Speed,
}

impl IconQualityProfile {
    /// 从外部字符串解析档位。
    pub(crate) fn from_str(profile: &str) -> Result<Self, IconError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(IconError::InvalidConfig(format!(
                "未知质量档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供前端展示与持久化。
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl NormalizerConfig {
    /// 基于当前参数反推质量档位。
    ///
    /// 用于“后端当前生效档位”查询场景。
    pub(crate) fn infer_quality_profile(&self) -> IconQualityProfile {
        match self.resize_filter {
            FilterType::Lanczos3 => IconQualityProfile::Quality,
            FilterType::Nearest | FilterType::Triangle => IconQualityProfile::Speed,
            _ => IconQualityProfile::Balanced,
        }
    }

    /// 应用指定质量档位到实际参数。
    ///
    /// 保持“档位语义稳定”，便于前端按档位切换而无需了解底层细节。
    pub(crate) fn apply_quality_profile(&mut self, profile: IconQualityProfile) {
        match profile {
            IconQualityProfile::Quality => {
                self.resize_filter = FilterType::Lanczos3;
                self.max_decoded_pixels = 64_000_000;
                self.max_decoded_bytes = 256 * 1024 * 1024;
            }
            IconQualityProfile::Balanced => {
                self.resize_filter = FilterType::CatmullRom;
                self.max_decoded_pixels = 40_000_000;
                self.max_decoded_bytes = 160 * 1024 * 1024;
            }
            IconQualityProfile::Speed => {
                self.resize_filter = FilterType::Triangle;
                self.max_decoded_pixels = 24_000_000;
                self.max_decoded_bytes = 96 * 1024 * 1024;
            }
        }
    }
}
