// crates/sf_advect/src/interpolate.rs

//! 单元场到顶点的插值与界面法向平滑
//!
//! 顶点值取相邻单元中心值的反距离加权平均。
//! `normalise_and_smooth` 将单元法向经顶点往返插值一次，
//! 抑制梯度法向在三角/四面体网格上的棋盘噪声。

use glam::DVec3;
use rayon::prelude::*;

use sf_foundation::float::SMALL;
use sf_mesh::MeshTopology;

/// 单元标量场插值到网格顶点（反距离加权），写入 `out`
pub fn cell_to_point<M: MeshTopology>(mesh: &M, field: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.reserve(mesh.n_points());
    (0..mesh.n_points())
        .into_par_iter()
        .map(|p| {
            let x = mesh.point(p);
            let mut num = 0.0;
            let mut den = 0.0;
            for &c in mesh.point_cells(p) {
                let w = 1.0 / ((x - mesh.cell_centre(c)).length() + SMALL);
                num += w * field[c];
                den += w;
            }
            num / (den + SMALL)
        })
        .collect_into_vec(out);
}

/// 单元矢量场插值到网格顶点（反距离加权）
pub fn cell_to_point_vec<M: MeshTopology>(mesh: &M, field: &[DVec3]) -> Vec<DVec3> {
    (0..mesh.n_points())
        .into_par_iter()
        .map(|p| {
            let x = mesh.point(p);
            let mut num = DVec3::ZERO;
            let mut den = 0.0;
            for &c in mesh.point_cells(p) {
                let w = 1.0 / ((x - mesh.cell_centre(c)).length() + SMALL);
                num += w * field[c];
                den += w;
            }
            num / (den + SMALL)
        })
        .collect()
}

/// 归一化并平滑单元法向场
///
/// 归一化 → 插值到顶点再归一化 → 反距离加权插回单元并归一化。
pub fn normalise_and_smooth<M: MeshTopology>(mesh: &M, cell_normals: &mut [DVec3]) {
    for n in cell_normals.iter_mut() {
        *n /= n.length() + SMALL;
    }

    let mut vertex_normals = cell_to_point_vec(mesh, cell_normals);
    for n in vertex_normals.iter_mut() {
        *n /= n.length() + SMALL;
    }

    for (cell, n) in cell_normals.iter_mut().enumerate() {
        let centre = mesh.cell_centre(cell);
        let mut acc = DVec3::ZERO;
        for &p in mesh.cell_points(cell) {
            let w = 1.0 / ((mesh.point(p) - centre).length() + SMALL);
            acc += w * vertex_normals[p];
        }
        *n = acc / (acc.length() + SMALL);
    }
}

/// 按单元法向设置该单元顶点的距离函数值
///
/// `vertex_values[p] = (x_p - x_c) · n_c`，仅覆盖该单元的顶点。
pub fn set_cell_vertex_values<M: MeshTopology>(
    mesh: &M,
    cell: usize,
    normal: DVec3,
    vertex_values: &mut [f64],
) {
    let centre = mesh.cell_centre(cell);
    for &p in mesh.cell_points(cell) {
        vertex_values[p] = (mesh.point(p) - centre).dot(normal);
    }
}

// ============================================================================
// 测试
// ============================================================================
