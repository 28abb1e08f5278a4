//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `IconSource` 表示外部来源语义（文件选择器字节 / Data URL / 本地路径）
//! - `RawIconUpload` 表示已加载、已通过前置校验但未解码的字节
//! - `FitRect` 表示 contain 适配计算出的绘制矩形
//! - `NormalizedIcon` 表示最终 128×128 PNG 产物与预览

/// 图标输入来源。
pub enum IconSource {
    /// 文件选择器提交的字节与声明的媒体类型（如 `image/png`）。
    Bytes {
        /// 原始文件字节。
        data: Vec<u8>,
        /// 选择器声明的 MIME 类型。
        content_type: String,
    },
    /// Data URL（`data:image/...;base64,...`）。
    DataUrl(String),
    /// 本地文件路径来源（CLI / 测试场景）。
    FilePath(String),
}

/// 加载阶段输出：原始字节、声明类型与来源标识。
pub(crate) struct RawIconUpload {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 声明的 MIME 类型（来自选择器 / Data URL 头 / 签名嗅探）。
    pub(crate) content_type: String,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// contain 适配后的绘制矩形（画布内坐标）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    /// 水平偏移（短边居中时非零）。
    pub x: u32,
    /// 垂直偏移。
    pub y: u32,
    /// 绘制宽度（长边恒等于画布边长）。
    pub width: u32,
    /// 绘制高度。
    pub height: u32,
}

/// 归一化产物：固定尺寸 PNG 与同一渲染结果的预览表示。
pub struct NormalizedIcon {
    /// 无损 PNG 编码字节，尺寸恒为 `icon_dimension`²。
    pub png_bytes: Vec<u8>,
    /// `data:image/png;base64,` 预览，与 `png_bytes` 逐像素一致。
    pub preview_data_url: String,
    /// 实际绘制矩形（测试与诊断用）。
    pub fit: FitRect,
}
