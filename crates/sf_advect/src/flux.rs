// crates/sf_advect/src/flux.rs

//! 界面通量估算
//!
//! 对每个界面单元重构等值面，按等值面法向速度推进，
//! 为该单元所有下游面填入时间积分体积输运 dVf，
//! 同时标记后续需要做守恒检查的候选单元。
//!
//! 边界面在单元循环中先记录等值面数据延迟处理，
//! 待拿到边界通量后统一计算，processor 补丁面登记到同步器。

use glam::DVec3;

use sf_foundation::error::SfResult;
use sf_mesh::MeshTopology;

use crate::config::AdvectionConfig;
use crate::cutting::{CellCut, CuttingEngine, VelocityInterpolator};
use crate::gradient::green_gauss;
use crate::interpolate::{cell_to_point, normalise_and_smooth, set_cell_vertex_values};
use crate::operators::FLUX_EPS;
use crate::surface::is_surface_cell;
use crate::sync::{BoundaryFluxSynchronizer, ProcessExchange};

/// 延迟处理的边界面记录
///
/// 单元循环中尚不掌握边界通量上下文，先存下等值面数据。
#[derive(Debug, Clone)]
struct BoundaryFaceRecord {
    face: usize,
    centre: DVec3,
    normal: DVec3,
    speed: f64,
    iso_value: f64,
}

/// 界面通量估算器
///
/// 工作数组在调用间复用，调用开始时清空重建，不跨时间步保留状态。
pub struct FluxEstimator {
    /// 顶点标量场（相分数插值或法向距离函数）
    vertex_values: Vec<f64>,
    /// 本步界面单元列表
    surf_cells: Vec<usize>,
    /// 守恒检查候选标记
    check_bounding: Vec<bool>,
    /// 延迟处理的边界面
    boundary_records: Vec<BoundaryFaceRecord>,
    /// 本步等值面多边形（仅 write_iso_faces 时收集）
    iso_face_points: Vec<Vec<DVec3>>,
}

impl FluxEstimator {
    /// 按网格规模创建
    pub fn new<M: MeshTopology>(mesh: &M) -> Self {
        Self {
            vertex_values: vec![0.0; mesh.n_points()],
            surf_cells: Vec::new(),
            check_bounding: vec![false; mesh.n_cells()],
            boundary_records: Vec::new(),
            iso_face_points: Vec::new(),
        }
    }

    /// 本步界面单元列表
    pub fn surface_cells(&self) -> &[usize] {
        &self.surf_cells
    }

    /// 守恒检查候选标记
    pub fn check_bounding(&self) -> &[bool] {
        &self.check_bounding
    }

    /// 本步收集的等值面多边形
    pub fn iso_face_points(&self) -> &[Vec<DVec3>] {
        &self.iso_face_points
    }

    fn clear<M: MeshTopology>(&mut self, mesh: &M) {
        self.surf_cells.clear();
        self.boundary_records.clear();
        self.iso_face_points.clear();
        self.check_bounding.clear();
        self.check_bounding.resize(mesh.n_cells(), false);
        self.vertex_values.resize(mesh.n_points(), 0.0);
    }

    /// 估算本步所有界面单元邻近面的时间积分输运
    ///
    /// 覆盖 `dvf` 中界面单元下游面的迎风初值，标记候选单元，
    /// 末尾执行一次分区边界同步。返回界面单元数。
    #[allow(clippy::too_many_arguments)]
    pub fn time_integrated_flux<M, C, V, E>(
        &mut self,
        mesh: &M,
        alpha: &[f64],
        phi: &[f64],
        dvf: &mut [f64],
        cutter: &mut C,
        velocity: &V,
        sync: &mut BoundaryFluxSynchronizer<E>,
        dt: f64,
        config: &AdvectionConfig,
    ) -> SfResult<usize>
    where
        M: MeshTopology,
        C: CuttingEngine,
        V: VelocityInterpolator,
        E: ProcessExchange,
    {
        self.clear(mesh);

        // 顶点标量场：梯度法向距离函数或相分数顶点插值
        let cell_normals = if config.grad_alpha_normal {
            let mut normals = green_gauss(mesh, alpha);
            normalise_and_smooth(mesh, &mut normals);
            Some(normals)
        } else {
            cell_to_point(mesh, alpha, &mut self.vertex_values);
            None
        };

        for celli in 0..mesh.n_cells() {
            if !is_surface_cell(alpha[celli], config.surf_cell_tol) {
                continue;
            }

            self.surf_cells.push(celli);
            self.check_bounding[celli] = true;

            if let Some(normals) = &cell_normals {
                set_cell_vertex_values(mesh, celli, normals[celli], &mut self.vertex_values);
            }

            // 搜索等值面；带内单元未被切割属于容差附近的正常误判，跳过
            let iso = match cutter.classify_and_cut(
                celli,
                alpha[celli],
                &self.vertex_values,
                config.iso_face_tol,
                config.max_cut_iter,
            ) {
                CellCut::Cut(iso) => iso,
                CellCut::Below | CellCut::Above => continue,
            };

            let x0 = iso.centre;
            let n0 = iso.unit_normal();
            let f0 = iso.iso_value;
            // 等值面法向速度
            let un0 = velocity.interpolate(x0, celli).dot(n0);

            if config.write_iso_faces && !iso.points.is_empty() {
                self.iso_face_points.push(iso.points);
            }

            log::trace!("界面单元 {celli}: alpha = {}, Un0 = {un0}", alpha[celli]);

            for &facei in mesh.cell_faces(celli) {
                if mesh.is_internal_face(facei) {
                    let owner = mesh.face_owner(facei);
                    let (is_downwind, other_cell) = if owner == celli {
                        (
                            phi[facei] > FLUX_EPS,
                            mesh.face_neighbour(facei).unwrap_or(owner),
                        )
                    } else {
                        (phi[facei] < -FLUX_EPS, owner)
                    };

                    if is_downwind {
                        dvf[facei] = cutter.face_transport(
                            facei,
                            x0,
                            n0,
                            un0,
                            f0,
                            dt,
                            phi[facei],
                            mesh.face_area(facei),
                        );
                    }

                    // 对侧单元及其邻居也可能越界，纳入守恒检查；
                    // 界面一步之内可能进入点邻居单元
                    self.check_bounding[other_cell] = true;
                    for &nn in mesh.cell_neighbours(other_cell) {
                        self.check_bounding[nn] = true;
                    }
                } else {
                    self.boundary_records.push(BoundaryFaceRecord {
                        face: facei,
                        centre: x0,
                        normal: n0,
                        speed: un0,
                        iso_value: f0,
                    });
                }
            }
        }

        // 延迟处理边界面：仅流出面（phi > 阈值）计算输运
        for record in &self.boundary_records {
            let facei = record.face;
            let phi_p = phi[facei];
            if phi_p > FLUX_EPS {
                dvf[facei] = cutter.face_transport(
                    facei,
                    record.centre,
                    record.normal,
                    record.speed,
                    record.iso_value,
                    dt,
                    phi_p,
                    mesh.face_area(facei),
                );
                sync.register_face(mesh, facei);
            }
        }

        sync.sync(mesh, dvf)?;

        Ok(self.surf_cells.len())
    }
}

// ============================================================================
// 测试
// ============================================================================
