// crates/sf_advect/src/config.rs

//! 求解参数配置
//!
//! 使用纯 f64 / bool 字段，serde 序列化友好，
//! 所有字段均有默认值，可从 JSON 配置文件部分覆盖。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use sf_foundation::error::{SfError, SfResult};

/// 相分数输运配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvectionConfig {
    /// 守恒修正最大遍数
    #[serde(default = "default_n_alpha_bounds")]
    pub n_alpha_bounds: usize,

    /// 等值面搜索容差
    #[serde(default = "default_iso_face_tol")]
    pub iso_face_tol: f64,

    /// 界面单元带容差
    ///
    /// 相分数满足 `surf_cell_tol < alpha < 1 - surf_cell_tol` 的单元
    /// 视为界面单元。
    #[serde(default = "default_surf_cell_tol")]
    pub surf_cell_tol: f64,

    /// 切割引擎等值面搜索最大迭代次数
    #[serde(default = "default_max_cut_iter")]
    pub max_cut_iter: usize,

    /// 界面法向来源
    ///
    /// true 时使用平滑后的相分数梯度构造顶点距离函数，
    /// false 时直接将相分数插值到顶点。
    #[serde(default)]
    pub grad_alpha_normal: bool,

    /// 相分数贴靠容差
    ///
    /// 大于零时，修正后相分数距 0 或 1 小于该值的单元贴靠到 0 或 1。
    /// 非守恒后处理。
    #[serde(default)]
    pub snap_tol: f64,

    /// 是否硬裁剪到 [0, 1]
    ///
    /// 非守恒后处理。
    #[serde(default = "default_clip")]
    pub clip: bool,

    /// 是否输出等值面多边形
    #[serde(default)]
    pub write_iso_faces: bool,

    /// 是否输出界面单元集
    #[serde(default)]
    pub write_surf_cells: bool,

    /// 是否输出被修正单元集
    #[serde(default)]
    pub write_bounded_cells: bool,

    /// 诊断文件输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_n_alpha_bounds() -> usize {
    3
}
fn default_iso_face_tol() -> f64 {
    1e-10
}
fn default_surf_cell_tol() -> f64 {
    1e-8
}
fn default_max_cut_iter() -> usize {
    100
}
fn default_clip() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AdvectionConfig {
    fn default() -> Self {
        Self {
            n_alpha_bounds: default_n_alpha_bounds(),
            iso_face_tol: default_iso_face_tol(),
            surf_cell_tol: default_surf_cell_tol(),
            max_cut_iter: default_max_cut_iter(),
            grad_alpha_normal: false,
            snap_tol: 0.0,
            clip: default_clip(),
            write_iso_faces: false,
            write_surf_cells: false,
            write_bounded_cells: false,
            output_dir: default_output_dir(),
        }
    }
}

impl AdvectionConfig {
    /// 校验配置合法性
    pub fn validate(&self) -> SfResult<()> {
        if self.iso_face_tol <= 0.0 {
            return Err(SfError::config("iso_face_tol 必须为正"));
        }
        if !(0.0..0.5).contains(&self.surf_cell_tol) {
            return Err(SfError::config("surf_cell_tol 必须在 [0, 0.5) 内"));
        }
        if self.snap_tol < 0.0 || self.snap_tol >= 0.5 {
            return Err(SfError::config("snap_tol 必须在 [0, 0.5) 内"));
        }
        if self.max_cut_iter == 0 {
            return Err(SfError::config("max_cut_iter 必须大于零"));
        }
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AdvectionConfig::default();
        assert_eq!(cfg.n_alpha_bounds, 3);
        assert_eq!(cfg.iso_face_tol, 1e-10);
        assert_eq!(cfg.surf_cell_tol, 1e-8);
        assert_eq!(cfg.max_cut_iter, 100);
        assert!(!cfg.grad_alpha_normal);
        assert_eq!(cfg.snap_tol, 0.0);
        assert!(cfg.clip);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let cfg = AdvectionConfig {
            iso_face_tol: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdvectionConfig {
            surf_cell_tol: 0.6,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AdvectionConfig {
            snap_tol: -1e-3,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        // 仅覆盖部分字段，其余取默认
        let cfg: AdvectionConfig =
            serde_json::from_str(r#"{"n_alpha_bounds": 5, "clip": false}"#).unwrap();
        assert_eq!(cfg.n_alpha_bounds, 5);
        assert!(!cfg.clip);
        assert_eq!(cfg.surf_cell_tol, 1e-8);
    }
}
