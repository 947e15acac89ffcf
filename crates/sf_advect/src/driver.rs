// crates/sf_advect/src/driver.rs

//! 单步输运编排
//!
//! [`IsoAdvector`] 持有配置与全部工作状态，按固定顺序执行一个时间步:
//! 迎风初始化 → 界面通量估算 → 守恒修正 → 相分数更新 →
//! 贴靠/裁剪后处理 → 诊断输出。
//!
//! 相分数场与通量场由调用方持有，每步传入；几何切割与速度插值
//! 通过 [`CuttingEngine`] / [`VelocityInterpolator`] 协作者注入。

use std::time::{Duration, Instant};

use sf_foundation::error::{SfError, SfResult};
use sf_foundation::float::{all_finite, neg0, pos0};
use sf_foundation::metrics::{Counter, TimeAccumulator};
use sf_mesh::MeshTopology;

use crate::bounding::BoundingEngine;
use crate::config::AdvectionConfig;
use crate::cutting::{CuttingEngine, VelocityInterpolator};
use crate::diagnostics;
use crate::flux::FluxEstimator;
use crate::operators::{field_min_max, surface_integrate, upwind_transport, FLUX_EPS};
use crate::sync::{BoundaryFluxSynchronizer, ProcessExchange};

/// 单步输运结果摘要
#[derive(Debug, Clone)]
pub struct AdvectionReport {
    /// 界面单元数
    pub n_surface_cells: usize,
    /// 被守恒修正过的单元数
    pub n_bounded_cells: usize,
    /// 贴靠/裁剪前的全场最小相分数
    pub alpha_min: f64,
    /// 贴靠/裁剪前的全场最大相分数
    pub alpha_max: f64,
    /// 本步墙钟耗时
    pub elapsed: Duration,
}

/// 相分数输运求解器
///
/// 工作数组按网格规模分配并跨时间步复用。
pub struct IsoAdvector<E: ProcessExchange> {
    config: AdvectionConfig,
    sync: BoundaryFluxSynchronizer<E>,
    estimator: FluxEstimator,
    bounding: BoundingEngine,
    /// 面时间积分体积输运，上一步的值在迎风初始化时被整体覆盖
    dvf: Vec<f64>,
    step: u64,
    advect_time: TimeAccumulator,
    surface_cell_count: Counter,
}

impl<E: ProcessExchange> IsoAdvector<E> {
    /// 创建求解器并校验配置
    pub fn new<M: MeshTopology>(
        mesh: &M,
        config: AdvectionConfig,
        exchange: E,
    ) -> SfResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sync: BoundaryFluxSynchronizer::new(mesh, exchange),
            estimator: FluxEstimator::new(mesh),
            bounding: BoundingEngine::new(mesh),
            dvf: vec![0.0; mesh.n_faces()],
            step: 0,
            advect_time: TimeAccumulator::new(),
            surface_cell_count: Counter::new(),
        })
    }

    /// 当前配置
    pub fn config(&self) -> &AdvectionConfig {
        &self.config
    }

    /// 上一步的面时间积分体积输运
    pub fn dvf(&self) -> &[f64] {
        &self.dvf
    }

    /// 上一步的界面单元列表
    pub fn surface_cells(&self) -> &[usize] {
        self.estimator.surface_cells()
    }

    /// 上一步被守恒修正过的单元标记
    pub fn cell_is_bounded(&self) -> &[bool] {
        self.bounding.cell_is_bounded()
    }

    /// 已完成的时间步数
    pub fn step(&self) -> u64 {
        self.step
    }

    /// 输运步累计墙钟耗时
    pub fn advect_time(&self) -> Duration {
        self.advect_time.total()
    }

    /// 累计处理过的界面单元数
    pub fn total_surface_cells(&self) -> u64 {
        self.surface_cell_count.get()
    }

    /// 与上一步输运一致的质量通量场
    ///
    /// `rhoPhi[f] = (rho1 - rho2) * dVf[f] / dt + rho2 * phi[f]`，
    /// 供动量方程按与相分数相同的输运量对流密度。
    pub fn rho_phi(&self, phi: &[f64], dt: f64, rho1: f64, rho2: f64) -> Vec<f64> {
        self.dvf
            .iter()
            .zip(phi)
            .map(|(&dvf, &phi)| (rho1 - rho2) * dvf / dt + rho2 * phi)
            .collect()
    }

    /// 推进相分数场一个时间步
    ///
    /// `alpha` 为单元相分数场（就地更新），`phi` 为面通量场。
    /// 几何切割与速度插值由 `cutter` / `velocity` 协作者提供。
    pub fn advect<M, C, V>(
        &mut self,
        mesh: &M,
        alpha: &mut [f64],
        phi: &[f64],
        cutter: &mut C,
        velocity: &V,
        dt: f64,
    ) -> SfResult<AdvectionReport>
    where
        M: MeshTopology,
        C: CuttingEngine,
        V: VelocityInterpolator,
    {
        if alpha.len() != mesh.n_cells() {
            return Err(SfError::mesh(format!(
                "相分数场长度 {} 与单元数 {} 不一致",
                alpha.len(),
                mesh.n_cells()
            )));
        }
        if phi.len() != mesh.n_faces() {
            return Err(SfError::mesh(format!(
                "通量场长度 {} 与面数 {} 不一致",
                phi.len(),
                mesh.n_faces()
            )));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SfError::numerical(format!("非法时间步长 dt = {dt}")));
        }

        let start = Instant::now();

        // 一阶迎风初始化全部面，界面单元邻近面随后被覆盖
        self.dvf.resize(mesh.n_faces(), 0.0);
        upwind_transport(mesh, alpha, phi, dt, &mut self.dvf);

        // 分区边界面的迎风初值只用到本地 owner 值，
        // 以流出侧（持有迎风单元的一侧）计算的值统一两侧
        if self.sync.is_distributed() {
            for patch in mesh.patches() {
                if !patch.is_processor() {
                    continue;
                }
                for facei in patch.start..patch.start + patch.size {
                    if phi[facei] > FLUX_EPS {
                        self.sync.register_face(mesh, facei);
                    }
                }
            }
            self.sync.sync(mesh, &mut self.dvf)?;
        }

        let n_surface_cells = self.estimator.time_integrated_flux(
            mesh,
            alpha,
            phi,
            &mut self.dvf,
            cutter,
            velocity,
            &mut self.sync,
            dt,
            &self.config,
        )?;

        // 动网格：在守恒修正前按体积比缩放旧值，
        // 使越界检测针对缩放后的相分数进行
        if mesh.is_moving() {
            for (cell, a) in alpha.iter_mut().enumerate() {
                *a *= mesh.cell_volume_ratio(cell);
            }
        }

        self.bounding.limit_fluxes(
            mesh,
            alpha,
            phi,
            dt,
            &mut self.dvf,
            self.estimator.check_bounding(),
            self.config.n_alpha_bounds,
            &mut self.sync,
        )?;

        // 相分数更新
        let div = surface_integrate(mesh, &self.dvf);
        for (cell, a) in alpha.iter_mut().enumerate() {
            *a -= div[cell];
        }

        let (alpha_min, alpha_max) = field_min_max(alpha);
        log::info!(
            "输运步 {}: 界面单元 {n_surface_cells} 个, min(alpha) = {alpha_min:.3e}, \
             max(alpha) = 1 + {:.3e}",
            self.step,
            alpha_max - 1.0
        );

        self.apply_brute_force_bounding(alpha);

        if !all_finite(alpha) {
            return Err(SfError::numerical("相分数场出现非有限值"));
        }

        self.write_diagnostics()?;

        let n_bounded_cells = self.bounding.bounded_cells().len();
        self.step += 1;
        self.surface_cell_count.add(n_surface_cells as u64);
        self.advect_time.record_since(start);

        Ok(AdvectionReport {
            n_surface_cells,
            n_bounded_cells,
            alpha_min,
            alpha_max,
            elapsed: start.elapsed(),
        })
    }

    /// 非守恒后处理：贴靠近 0/1 的值，再硬裁剪到 [0, 1]
    fn apply_brute_force_bounding(&self, alpha: &mut [f64]) {
        if self.config.snap_tol > 0.0 {
            let snap_tol = self.config.snap_tol;
            for a in alpha.iter_mut() {
                // 低于 snap_tol 归零，高于 1 - snap_tol 归一
                *a = *a * pos0(*a - snap_tol) * neg0(*a - 1.0 + snap_tol)
                    + pos0(*a - 1.0 + snap_tol);
            }
        }
        if self.config.clip {
            for a in alpha.iter_mut() {
                *a = a.clamp(0.0, 1.0);
            }
        }
    }

    fn write_diagnostics(&self) -> SfResult<()> {
        let dir = &self.config.output_dir;
        if self.config.write_iso_faces {
            diagnostics::write_iso_faces(dir, self.step, self.estimator.iso_face_points())?;
        }
        if self.config.write_surf_cells {
            diagnostics::write_cell_set(dir, "surfCells", self.step, self.estimator.surface_cells())?;
        }
        if self.config.write_bounded_cells {
            diagnostics::write_cell_set(
                dir,
                "boundedCells",
                self.step,
                &self.bounding.bounded_cells(),
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================
