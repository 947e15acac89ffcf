// crates/sf_foundation/src/lib.rs

//! SharpFlow Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 数值常量与浮点工具函数
//! - [`metrics`]: 轻量级性能计数器
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **零开销抽象**: release 模式下最小化运行时开销
//! 3. **无物理概念**: 物理相关类型在 sf_mesh / sf_advect 中定义

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod metrics;

// 重导出常用类型
pub use error::{SfError, SfResult};
pub use float::{SMALL, pos0, sign};
pub use metrics::{Counter, TimeAccumulator};
