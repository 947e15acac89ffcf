// crates/sf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `SfError` 枚举和 `SfResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，算法相关错误在 sf_advect 中扩展
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **可追溯**: 支持错误链
//!
//! # 示例
//!
//! ```
//! use sf_foundation::error::{SfError, SfResult};
//!
//! fn read_config() -> SfResult<()> {
//!     Err(SfError::config("配置文件格式错误"))
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type SfResult<T> = Result<T, SfError>;

/// SharpFlow 错误类型
///
/// 核心错误类型，用于整个项目。
#[derive(Error, Debug)]
pub enum SfError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 错误描述
        message: String,
        /// 底层错误
        #[source]
        source: Option<std::io::Error>,
    },

    // ========================================================================
    // 配置相关错误
    // ========================================================================
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 错误描述
        message: String,
    },

    // ========================================================================
    // 网格相关错误
    // ========================================================================
    /// 网格拓扑错误
    #[error("网格错误: {message}")]
    Mesh {
        /// 错误描述
        message: String,
    },

    // ========================================================================
    // 分区交换相关错误
    // ========================================================================
    /// 分区边界交换错误
    #[error("分区交换错误: {message}")]
    Exchange {
        /// 错误描述
        message: String,
    },

    // ========================================================================
    // 数值相关错误
    // ========================================================================
    /// 数值错误（非法的非有限值等）
    #[error("数值错误: {message}")]
    Numerical {
        /// 错误描述
        message: String,
    },
}

impl SfError {
    /// 创建 IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 创建网格错误
    pub fn mesh(message: impl Into<String>) -> Self {
        Self::Mesh {
            message: message.into(),
        }
    }

    /// 创建分区交换错误
    pub fn exchange(message: impl Into<String>) -> Self {
        Self::Exchange {
            message: message.into(),
        }
    }

    /// 创建数值错误
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for SfError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
            source: Some(e),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
