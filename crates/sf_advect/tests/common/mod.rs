// crates/sf_advect/tests/common/mod.rs

//! 集成测试共用工具
//!
//! 几何切割引擎用可控桩实现：对指定单元返回预设等值面，
//! 面输运取 `transport_fraction * phi * dt`，便于手工核对结果。

#![allow(dead_code)]

use std::collections::HashMap;

use glam::DVec3;

use sf_advect::{CellCut, CuttingEngine, IsoSurface};
use sf_foundation::float::sign;
use sf_mesh::MeshTopology;

/// 可控切割桩
pub struct MockCutter {
    /// 被切割单元及其预设等值面
    pub cuts: HashMap<usize, IsoSurface>,
    /// 面输运占全通量的比例
    pub transport_fraction: f64,
}

impl MockCutter {
    /// 在给定单元处放置法向 +x 的平面等值面
    pub fn with_plane_cuts(cells: &[(usize, f64)], transport_fraction: f64) -> Self {
        let cuts = cells
            .iter()
            .map(|&(cell, x)| {
                (
                    cell,
                    IsoSurface {
                        centre: DVec3::new(x, 0.5, 0.5),
                        area: DVec3::X,
                        iso_value: 0.0,
                        points: vec![
                            DVec3::new(x, 0.0, 0.0),
                            DVec3::new(x, 1.0, 0.0),
                            DVec3::new(x, 1.0, 1.0),
                            DVec3::new(x, 0.0, 1.0),
                        ],
                    },
                )
            })
            .collect();
        Self {
            cuts,
            transport_fraction,
        }
    }
}

impl CuttingEngine for MockCutter {
    fn classify_and_cut(
        &mut self,
        cell: usize,
        _target_fraction: f64,
        _vertex_values: &[f64],
        _tol: f64,
        _max_iter: usize,
    ) -> CellCut {
        match self.cuts.get(&cell) {
            Some(iso) => CellCut::Cut(iso.clone()),
            None => CellCut::Below,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn face_transport(
        &mut self,
        _face: usize,
        _iso_centre: DVec3,
        _iso_normal: DVec3,
        _normal_speed: f64,
        _iso_value: f64,
        dt: f64,
        face_flux: f64,
        _face_area: f64,
    ) -> f64 {
        self.transport_fraction * face_flux * dt
    }
}

/// 均匀 +x 流动的面通量场
///
/// x 向面按面积矢量的 x 分量符号取 `±flux`，y/z 向面为零。
pub fn x_flow_phi<M: MeshTopology>(mesh: &M, flux: f64) -> Vec<f64> {
    (0..mesh.n_faces())
        .map(|f| flux * sign(mesh.face_area_vec(f).x))
        .collect()
}

/// 相体积总量 `sum(alpha * V)`
pub fn total_volume<M: MeshTopology>(mesh: &M, alpha: &[f64]) -> f64 {
    alpha
        .iter()
        .enumerate()
        .map(|(c, a)| a * mesh.cell_volume(c))
        .sum()
}

/// 边界面净流出相体积 `sum(dvf)` over boundary faces
pub fn boundary_outflow<M: MeshTopology>(mesh: &M, dvf: &[f64]) -> f64 {
    (mesh.n_internal_faces()..mesh.n_faces())
        .map(|f| dvf[f])
        .sum()
}
