//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图标归一化链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//! `code()` / `stage()` 提供稳定标识，供服务层上报给前端。

/// 图标归一化统一错误类型。
///
/// 该类型会在服务层被转换为 `{ code, stage, message }` 结构，最终透传给前端。
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("体积超限：{0}")]
    SizeLimit(String),

    #[error("类型不支持：{0}")]
    UnsupportedType(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl IconError {
    /// 稳定错误码，前端据此做分支提示。
    pub fn code(&self) -> &'static str {
        match self {
            Self::SizeLimit(_) => "E_SIZE_LIMIT",
            Self::UnsupportedType(_) => "E_UNSUPPORTED_TYPE",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILESYSTEM",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::InvalidConfig(_) => "E_INVALID_CONFIG",
        }
    }

    /// 发生错误的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::SizeLimit(_) | Self::UnsupportedType(_) => "validate",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "load",
            Self::ResourceLimit(_) => "decode",
            Self::InvalidConfig(_) => "config",
        }
    }
}

impl From<IconError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: IconError) -> Self {
        error.to_string()
    }
}
