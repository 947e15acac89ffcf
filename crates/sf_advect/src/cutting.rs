// crates/sf_advect/src/cutting.rs

//! 切割引擎与速度插值外部接口
//!
//! 几何切割（在单个多面体单元内求等值面、求单面时间积分输运）
//! 由外部协作者提供，核心只依赖本模块定义的 trait。
//! 切割实现必须是确定性的，且不得修改网格状态。

use glam::DVec3;

use sf_foundation::float::SMALL;

// ============================================================
// 等值面记录
// ============================================================

/// 单元内等值面记录
///
/// 生命周期限于单个界面单元的处理过程：切割一次，
/// 供该单元所有面的输运计算复用，不跨单元缓存。
#[derive(Debug, Clone)]
pub struct IsoSurface {
    /// 等值面形心
    pub centre: DVec3,
    /// 等值面面积矢量（未归一化，指向顶点值增大方向）
    pub area: DVec3,
    /// 等值
    pub iso_value: f64,
    /// 等值面多边形顶点（仅诊断输出使用，可为空）
    pub points: Vec<DVec3>,
}

impl IsoSurface {
    /// 单位法向
    #[inline]
    pub fn unit_normal(&self) -> DVec3 {
        self.area / (self.area.length() + SMALL)
    }
}

/// 单元切割结果
///
/// Below / Above 表示等值面未穿过该单元。带内单元出现这两种状态
/// 属于容差附近的正常误判，按无界面输运处理，不是错误。
#[derive(Debug, Clone)]
pub enum CellCut {
    /// 单元完全位于等值面下方
    Below,
    /// 单元被等值面切割
    Cut(IsoSurface),
    /// 单元完全位于等值面上方
    Above,
}

impl CellCut {
    /// 是否被切割
    #[inline]
    pub fn is_cut(&self) -> bool {
        matches!(self, Self::Cut(_))
    }
}

// ============================================================
// 外部协作者 trait
// ============================================================

/// 几何切割引擎
///
/// 实现者持有网格引用；所有方法对网格状态只读。
pub trait CuttingEngine {
    /// 在单元内搜索给定目标相分数对应的等值面
    ///
    /// # 参数
    /// - `cell`: 单元编号
    /// - `target_fraction`: 目标相分数
    /// - `vertex_values`: 全网格顶点标量场（相分数插值或法向距离函数）
    /// - `tol`: 等值面搜索容差
    /// - `max_iter`: 最大迭代次数；不收敛按未切割处理
    fn classify_and_cut(
        &mut self,
        cell: usize,
        target_fraction: f64,
        vertex_values: &[f64],
        tol: f64,
        max_iter: usize,
    ) -> CellCut;

    /// 给定等值面，计算单面在一个时间步内的相体积输运
    ///
    /// 返回值与 `face_flux` 同号，且模不超过 `|face_flux * dt|`。
    #[allow(clippy::too_many_arguments)]
    fn face_transport(
        &mut self,
        face: usize,
        iso_centre: DVec3,
        iso_normal: DVec3,
        normal_speed: f64,
        iso_value: f64,
        dt: f64,
        face_flux: f64,
        face_area: f64,
    ) -> f64;
}

/// 速度场点插值
pub trait VelocityInterpolator {
    /// 在指定单元内任意点插值速度
    fn interpolate(&self, position: DVec3, cell: usize) -> DVec3;
}

// ============================================================
// 单元中心速度插值
// ============================================================

/// 零阶速度插值：返回单元中心值
///
/// 测试与粗算例用；高阶插值由外部协作者提供。
#[derive(Debug, Clone)]
pub struct CellCentreVelocity {
    values: Vec<DVec3>,
}

impl CellCentreVelocity {
    /// 从单元中心速度场创建
    pub fn new(values: Vec<DVec3>) -> Self {
        Self { values }
    }

    /// 全场均匀速度
    pub fn uniform(velocity: DVec3, n_cells: usize) -> Self {
        Self {
            values: vec![velocity; n_cells],
        }
    }
}

impl VelocityInterpolator for CellCentreVelocity {
    fn interpolate(&self, _position: DVec3, cell: usize) -> DVec3 {
        self.values[cell]
    }
}

// ============================================================
// 测试
// ============================================================
