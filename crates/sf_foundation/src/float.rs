// crates/sf_foundation/src/float.rs

//! 数值常量与浮点工具函数
//!
//! 提供有限体积计算中常用的容差常量和符号函数。
//! 所有除法保护、通量阈值均以 [`SMALL`] 为基准。

/// 极小正数，用于除法保护和近零判断
///
/// 量级与 f64 机器精度的 10 倍左右相当。通量阈值通常取 `10.0 * SMALL`。
pub const SMALL: f64 = 1e-15;

/// 极大正数
pub const GREAT: f64 = 1e15;

/// 符号函数：正返回 1，负返回 -1，零返回 0
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 非负指示函数：x >= 0 返回 1，否则返回 0
#[inline]
pub fn pos0(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// 非正指示函数：x <= 0 返回 1，否则返回 0
#[inline]
pub fn neg0(x: f64) -> f64 {
    if x <= 0.0 {
        1.0
    } else {
        0.0
    }
}

/// 检查切片中所有值是否有限
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

// ============================================================================
// 测试
// ============================================================================
