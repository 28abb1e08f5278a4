//! # 徽章图标归一化 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │               前端胶水层（上传表单 / 徽章管理）            │
//! │                                                          │
//! │   文件选择器 ── 上传回调 ── 预览展示                      │
//! │        │            ↑                                    │
//! └────────┼────────────┼────────────────────────────────────┘
//!          ↓            │ IconUploadPayload / IconServiceError
//! ┌────────┼────────────┼────────────────────────────────────┐
//! │        ↓        本库（Rust）                             │
//! │                                                          │
//! │  ┌─ normalizer                                           │
//! │  │   ├─ service    注入状态、载荷/错误边界适配            │
//! │  │   ├─ handler    编排 + 配置快照 + spawn_blocking       │
//! │  │   ├─ loader     体积/类型前置校验 + 来源加载           │
//! │  │   ├─ pipeline   解码·contain 适配·渲染·PNG 编码        │
//! │  │   └─ config/error/source  策略、错误、数据模型         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`normalizer`] | 任意光栅图 → 128×128 透明画布 contain 适配 → 无损 PNG + 预览 Data URL |
//!
//! 持久化与上传属于外部协作方；本库不落盘、不发网络请求。

pub mod normalizer;

pub use normalizer::{
    FitRect, ICON_DIMENSION, IconError, IconNormalizer, IconQualityProfile, IconService,
    IconServiceError, IconSource, IconUploadPayload, MAX_UPLOAD_BYTES, NormalizedIcon,
    NormalizerConfig,
};
