// crates/sf_mesh/src/topology.rs

//! 网格拓扑抽象
//!
//! 提供求解器对非结构化多面体网格的统一只读接口。
//! 具体网格实现（笛卡尔网格、导入网格）实现本 trait。

use glam::DVec3;

use crate::patch::Patch;

/// 网格拓扑 trait
///
/// 求解核心只通过本接口访问网格。所有方法均为只读；
/// 面编号先内部面后边界面，边界面按补丁分组。
pub trait MeshTopology: Send + Sync {
    // ========== 基本信息 ==========

    /// 单元数量
    fn n_cells(&self) -> usize;

    /// 面数量（内部面 + 边界面）
    fn n_faces(&self) -> usize;

    /// 内部面数量
    fn n_internal_faces(&self) -> usize;

    /// 网格顶点数量
    fn n_points(&self) -> usize;

    /// 边界面数量
    fn n_boundary_faces(&self) -> usize {
        self.n_faces() - self.n_internal_faces()
    }

    // ========== 拓扑数据 ==========

    /// 面的 owner 单元
    fn face_owner(&self, face: usize) -> usize;

    /// 面的 neighbour 单元（边界面返回 None）
    fn face_neighbour(&self, face: usize) -> Option<usize>;

    /// 单元的所有面编号
    fn cell_faces(&self, cell: usize) -> &[usize];

    /// 单元的面相邻单元编号
    fn cell_neighbours(&self, cell: usize) -> &[usize];

    /// 单元的顶点编号
    fn cell_points(&self, cell: usize) -> &[usize];

    /// 顶点的相邻单元编号
    fn point_cells(&self, point: usize) -> &[usize];

    /// 是否为内部面
    fn is_internal_face(&self, face: usize) -> bool {
        face < self.n_internal_faces()
    }

    // ========== 几何数据 ==========

    /// 顶点坐标
    fn point(&self, point: usize) -> DVec3;

    /// 单元中心坐标
    fn cell_centre(&self, cell: usize) -> DVec3;

    /// 单元体积
    fn cell_volume(&self, cell: usize) -> f64;

    /// 面面积矢量（由 owner 指向 neighbour，边界面指向域外）
    fn face_area_vec(&self, face: usize) -> DVec3;

    /// 面面积（模长）
    fn face_area(&self, face: usize) -> f64 {
        self.face_area_vec(face).length()
    }

    // ========== 补丁与分区 ==========

    /// 补丁列表
    fn patches(&self) -> &[Patch];

    /// 边界面所属的补丁编号（内部面返回 None）
    fn patch_of_face(&self, face: usize) -> Option<usize> {
        if self.is_internal_face(face) {
            return None;
        }
        self.patches().iter().position(|p| p.contains(face))
    }

    // ========== 网格运动 ==========

    /// 网格当前是否在运动
    fn is_moving(&self) -> bool {
        false
    }

    /// 旧体积与新体积之比（静止网格为 1）
    fn cell_volume_ratio(&self, _cell: usize) -> f64 {
        1.0
    }
}
