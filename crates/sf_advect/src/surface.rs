// crates/sf_advect/src/surface.rs

//! 界面单元判定
//!
//! 相分数严格落在容差带 `(tol, 1 - tol)` 内的单元视为被界面穿过。
//! 纯函数，无副作用。

/// 是否为界面单元
#[inline]
pub fn is_surface_cell(cell_fraction: f64, tol: f64) -> bool {
    tol < cell_fraction && cell_fraction < 1.0 - tol
}

// ============================================================================
// 测试
// ============================================================================
