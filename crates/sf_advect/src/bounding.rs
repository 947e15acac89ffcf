// crates/sf_advect/src/bounding.rs

//! 迭代守恒修正
//!
//! 界面通量估算后相分数可能越出 [0, 1]。修正不直接裁剪相分数，
//! 而是把越界单元的多余相体积沿下游面让渡给邻居单元，
//! 让渡量以各面剩余容量 |phi*dt - dVf| 为上限，因此修正本身守恒。
//!
//! 下越界通过互补场处理：对 1 - alpha 与互补输运 phi*dt - dVf
//! 执行同一上界修正，再换算回原输运场。
//!
//! 每遍修正前重新计算全场极值，两类越界都消除后提前结束。

use sf_foundation::error::SfResult;
use sf_foundation::float::{sign, SMALL};
use sf_mesh::MeshTopology;

use crate::operators::{downwind_faces, field_min_max, net_flux, surface_integrate};
use crate::sync::{BoundaryFluxSynchronizer, ProcessExchange};

/// 全场越界检测容差
const ALPHA_TOL: f64 = 1.0e-12;

/// 单元内让渡量与面容量的相对容差
const BOUND_TOL: f64 = 10.0 * SMALL;

/// 守恒修正引擎
///
/// 工作数组在调用间复用。`cell_is_bounded` 记录本步被修正过的单元，
/// 供诊断输出使用。
pub struct BoundingEngine {
    /// 本步被修正过的单元标记
    cell_is_bounded: Vec<bool>,
    /// 本遍被改写的面（写回与同步只针对这些面）
    corrected_faces: Vec<usize>,
    /// 下游面搜索缓存
    downwind: Vec<usize>,
    /// 当前单元可让渡面及其通量、剩余容量
    pass_faces: Vec<usize>,
    pass_phi: Vec<f64>,
    pass_capacity: Vec<f64>,
}

impl BoundingEngine {
    /// 按网格规模创建
    pub fn new<M: MeshTopology>(mesh: &M) -> Self {
        Self {
            cell_is_bounded: vec![false; mesh.n_cells()],
            corrected_faces: Vec::new(),
            downwind: Vec::with_capacity(8),
            pass_faces: Vec::with_capacity(8),
            pass_phi: Vec::with_capacity(8),
            pass_capacity: Vec::with_capacity(8),
        }
    }

    /// 本步被修正过的单元标记
    pub fn cell_is_bounded(&self) -> &[bool] {
        &self.cell_is_bounded
    }

    /// 本步被修正过的单元列表
    pub fn bounded_cells(&self) -> Vec<usize> {
        self.cell_is_bounded
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(c, _)| c)
            .collect()
    }

    /// 对输运场执行至多 `n_alpha_bounds` 遍守恒修正
    ///
    /// 每遍重新计算推进后的全场极值，分别处理上越界与下越界；
    /// 被改写的面在每遍末尾做一次分区边界同步。
    #[allow(clippy::too_many_arguments)]
    pub fn limit_fluxes<M, E>(
        &mut self,
        mesh: &M,
        alpha: &[f64],
        phi: &[f64],
        dt: f64,
        dvf: &mut [f64],
        check_bounding: &[bool],
        n_alpha_bounds: usize,
        sync: &mut BoundaryFluxSynchronizer<E>,
    ) -> SfResult<()>
    where
        M: MeshTopology,
        E: ProcessExchange,
    {
        self.cell_is_bounded.clear();
        self.cell_is_bounded.resize(mesh.n_cells(), false);

        for pass in 0..n_alpha_bounds {
            let alpha_new: Vec<f64> = {
                let div = surface_integrate(mesh, dvf);
                alpha.iter().zip(&div).map(|(a, d)| a - d).collect()
            };
            // 极值取全分区归约值，保证各分区修正分支与同步步调一致
            let (local_min, local_max) = field_min_max(&alpha_new);
            let (min_alpha, max_alpha) = sync.reduce_min_max(local_min, local_max)?;

            if pass == 0 {
                log::info!(
                    "守恒修正前: min(alpha) = {min_alpha:.3e}, max(alpha) = 1 + {:.3e}",
                    max_alpha - 1.0
                );
            } else {
                log::debug!(
                    "守恒修正第 {pass} 遍后: min(alpha) = {min_alpha:.3e}, \
                     max(alpha) = 1 + {:.3e}",
                    max_alpha - 1.0
                );
            }

            let overshooting = max_alpha - 1.0 > ALPHA_TOL;
            let undershooting = min_alpha < -ALPHA_TOL;
            if !overshooting && !undershooting {
                break;
            }

            if overshooting {
                let mut dvf_corrected = dvf.to_vec();
                self.bound_from_above(
                    mesh,
                    alpha,
                    phi,
                    dt,
                    &mut dvf_corrected,
                    check_bounding,
                    sync,
                );
                for &facei in &self.corrected_faces {
                    dvf[facei] = dvf_corrected[facei];
                }
                sync.sync(mesh, dvf)?;
            }

            if undershooting {
                // 互补场：alpha2 = 1 - alpha，dVf2 = phi*dt - dVf
                let alpha2: Vec<f64> = alpha.iter().map(|a| 1.0 - a).collect();
                let mut dvf_corrected: Vec<f64> = phi
                    .iter()
                    .zip(dvf.iter())
                    .map(|(&p, &d)| p * dt - d)
                    .collect();
                self.bound_from_above(
                    mesh,
                    &alpha2,
                    phi,
                    dt,
                    &mut dvf_corrected,
                    check_bounding,
                    sync,
                );
                for &facei in &self.corrected_faces {
                    dvf[facei] = phi[facei] * dt - dvf_corrected[facei];
                }
                sync.sync(mesh, dvf)?;
            }
        }

        Ok(())
    }

    /// 单遍上界修正
    ///
    /// 对每个候选单元，把超出体积 1 的相体积按 |phi*dt| 比例
    /// 分摊到各下游面，单面让渡不超过其剩余容量，
    /// 让渡后重算单元值直至不再越界或所有面容量耗尽。
    /// 第一轮分摊写入 `corrected_faces` 并登记 processor 面。
    #[allow(clippy::too_many_arguments)]
    fn bound_from_above<M, E>(
        &mut self,
        mesh: &M,
        alpha1: &[f64],
        phi: &[f64],
        dt: f64,
        dvf_c: &mut [f64],
        check_bounding: &[bool],
        sync: &mut BoundaryFluxSynchronizer<E>,
    ) where
        M: MeshTopology,
        E: ProcessExchange,
    {
        self.corrected_faces.clear();

        for celli in 0..mesh.n_cells() {
            if !check_bounding[celli] {
                continue;
            }

            let vol = mesh.cell_volume(celli);
            let mut alpha_new = alpha1[celli] - net_flux(mesh, dvf_c, celli) / vol;
            let mut overshoot = alpha_new - 1.0;
            let mut fluid_to_pass = overshoot * vol;
            let mut n_receiving = 1;
            let mut first_loop = true;

            while overshoot > BOUND_TOL && n_receiving > 0 {
                log::trace!("修正单元 {celli}: 上越界 {overshoot:.3e}");
                self.cell_is_bounded[celli] = true;

                // 收集仍有容量的下游面
                downwind_faces(mesh, phi, celli, &mut self.downwind);
                self.pass_faces.clear();
                self.pass_phi.clear();
                self.pass_capacity.clear();
                let mut total_budget = 0.0;
                n_receiving = 0;

                for &facei in &self.downwind {
                    // dVf 与 phi 同号且 |dVf| <= |phi*dt|，
                    // 容量即该面本步尚未输运相体积的部分
                    let capacity = (phi[facei] * dt - dvf_c[facei]).abs();
                    if capacity / vol > BOUND_TOL {
                        self.pass_faces.push(facei);
                        self.pass_phi.push(phi[facei]);
                        self.pass_capacity.push(capacity);
                        total_budget += (phi[facei] * dt).abs();
                    }
                }

                // 按 |phi*dt| 比例分摊，封顶到面容量
                for i in 0..self.pass_faces.len() {
                    let facei = self.pass_faces[i];
                    let mut through =
                        fluid_to_pass * (self.pass_phi[i] * dt).abs() / total_budget;

                    if self.pass_capacity[i] >= through {
                        n_receiving += 1;
                    }
                    through = through.min(self.pass_capacity[i]);
                    dvf_c[facei] += sign(self.pass_phi[i]) * through;

                    if first_loop {
                        sync.register_face(mesh, facei);
                        self.corrected_faces.push(facei);
                    }
                }

                first_loop = false;
                alpha_new = alpha1[celli] - net_flux(mesh, dvf_c, celli) / vol;
                overshoot = alpha_new - 1.0;
                fluid_to_pass = overshoot * vol;
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
