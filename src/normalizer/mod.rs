//! # 图标归一化模块（normalizer）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载校验 → 解码缩放 → PNG 编码 → 服务暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：承载可注入状态（`IconService`）与边界载荷/错误
//! - `handler`：编排整条处理流水线
//! - `loader`：负责字节/Data URL/文件加载与前置校验
//! - `pipeline`：负责解码、contain 适配、渲染与编码
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 实现思路
//!
//! 对外仅暴露必要类型，内部细节保持 `mod` 私有。
//! 胶水层通过 `IconService` 注入状态，提升测试隔离与后续扩展能力。
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 上传表单（胶水层）
//!    ↓
//! service.rs（State 注入、载荷/错误适配）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志 + spawn_blocking）
//!    ├─ loader.rs（来源加载 + 体积/类型前置校验）
//!    └─ pipeline.rs（解码 + contain 适配 + 渲染 + PNG 编码）
//!    ↓
//! IconUploadPayload / IconServiceError 返回给前端
//! ```
//!
//! ## 分层职责建议
//!
//! - 边界载荷变更（字段名/序列化格式）优先改 `service.rs`
//! - 配置与策略变更优先改 `config.rs`
//! - 业务流程顺序变更优先改 `handler.rs`
//! - 单阶段行为优化分别改 `loader/pipeline`

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;

pub use config::{ICON_DIMENSION, IconQualityProfile, MAX_UPLOAD_BYTES, NormalizerConfig};
pub use error::IconError;
pub use handler::IconNormalizer;
pub use service::{IconService, IconServiceError, IconUploadPayload};
pub use source::{FitRect, IconSource, NormalizedIcon};
