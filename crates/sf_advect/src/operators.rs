// crates/sf_advect/src/operators.rs

//! 面场算子
//!
//! 面体积输运场的散度（面积分）、单元净通量、一阶迎风初始化、
//! 全场极值等有限体积基础算子。
//!
//! 符号约定：面值为正表示由 owner 流向 neighbour（边界面流出域外）。

use rayon::prelude::*;

use sf_foundation::float::{GREAT, SMALL};
use sf_mesh::MeshTopology;

/// 通量阈值：小于该值的面通量视为零
pub const FLUX_EPS: f64 = 10.0 * SMALL;

/// 面场对单元的面积分（散度乘体积再除体积）
///
/// 返回每单元 `(Σ signed face value) / V`。
pub fn surface_integrate<M: MeshTopology>(mesh: &M, face_field: &[f64]) -> Vec<f64> {
    let mut div = vec![0.0; mesh.n_cells()];
    for (face, &value) in face_field.iter().enumerate() {
        div[mesh.face_owner(face)] += value;
        if let Some(neighbour) = mesh.face_neighbour(face) {
            div[neighbour] -= value;
        }
    }
    for (cell, d) in div.iter_mut().enumerate() {
        *d /= mesh.cell_volume(cell);
    }
    div
}

/// 单元净流出量：面场带符号求和（owner 流出为正）
pub fn net_flux<M: MeshTopology>(mesh: &M, face_field: &[f64], cell: usize) -> f64 {
    let mut dv = 0.0;
    for &face in mesh.cell_faces(cell) {
        if mesh.face_owner(face) == cell {
            dv += face_field[face];
        } else {
            dv -= face_field[face];
        }
    }
    dv
}

/// 一阶迎风输运初始化
///
/// `dvf[f] = phi[f] * alpha[upwind(f)] * dt`。边界面取 owner 单元值。
/// 界面单元邻近面的值随后被界面通量估算覆盖。
pub fn upwind_transport<M: MeshTopology>(
    mesh: &M,
    alpha: &[f64],
    phi: &[f64],
    dt: f64,
    dvf: &mut [f64],
) {
    for face in 0..mesh.n_faces() {
        let upwind = if phi[face] >= 0.0 {
            mesh.face_owner(face)
        } else {
            mesh.face_neighbour(face).unwrap_or(mesh.face_owner(face))
        };
        dvf[face] = phi[face] * alpha[upwind] * dt;
    }
}

/// 单元下游面：面通量离开该单元的面
pub fn downwind_faces<M: MeshTopology>(mesh: &M, phi: &[f64], cell: usize, out: &mut Vec<usize>) {
    out.clear();
    for &face in mesh.cell_faces(cell) {
        if mesh.face_owner(face) == cell {
            if phi[face] > FLUX_EPS {
                out.push(face);
            }
        } else if phi[face] < -FLUX_EPS {
            out.push(face);
        }
    }
}

/// 全场最小值与最大值
pub fn field_min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (GREAT, -GREAT);
    }
    values
        .par_iter()
        .fold(
            || (GREAT, -GREAT),
            |(min, max), &v| (min.min(v), max.max(v)),
        )
        .reduce(|| (GREAT, -GREAT), |(a, b), (c, d)| (a.min(c), b.max(d)))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::CartesianMesh;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_surface_integrate_two_cells() {
        let mesh = CartesianMesh::new(2, 1, 1, 1.0, 1.0, 1.0).unwrap();
        let mut face_field = vec![0.0; mesh.n_faces()];
        face_field[0] = 0.3; // 唯一内部面，owner = 0

        let div = surface_integrate(&mesh, &face_field);
        assert!(approx_eq(div[0], 0.3));
        assert!(approx_eq(div[1], -0.3));
    }

    #[test]
    fn test_net_flux_sign_convention() {
        let mesh = CartesianMesh::new(2, 1, 1, 1.0, 1.0, 1.0).unwrap();
        let mut face_field = vec![0.0; mesh.n_faces()];
        face_field[0] = 0.5;
        assert!(approx_eq(net_flux(&mesh, &face_field, 0), 0.5));
        assert!(approx_eq(net_flux(&mesh, &face_field, 1), -0.5));
    }

    #[test]
    fn test_upwind_transport() {
        let mesh = CartesianMesh::new(2, 1, 1, 1.0, 1.0, 1.0).unwrap();
        let alpha = vec![1.0, 0.0];
        let mut phi = vec![0.0; mesh.n_faces()];
        phi[0] = 0.3;

        let mut dvf = vec![0.0; mesh.n_faces()];
        upwind_transport(&mesh, &alpha, &phi, 1.0, &mut dvf);
        assert!(approx_eq(dvf[0], 0.3)); // 迎风取左侧 alpha = 1

        // 反向流动迎风取右侧 alpha = 0
        phi[0] = -0.3;
        upwind_transport(&mesh, &alpha, &phi, 1.0, &mut dvf);
        assert!(approx_eq(dvf[0], 0.0));
    }

    #[test]
    fn test_downwind_faces() {
        let mesh = CartesianMesh::new(2, 1, 1, 1.0, 1.0, 1.0).unwrap();
        let mut phi = vec![0.0; mesh.n_faces()];
        phi[0] = 1.0; // 内部面 owner = 0

        let mut out = Vec::new();
        downwind_faces(&mesh, &phi, 0, &mut out);
        assert_eq!(out, vec![0]);
        downwind_faces(&mesh, &phi, 1, &mut out);
        assert!(out.is_empty());

        // 近零通量不视为下游
        phi[0] = SMALL;
        downwind_faces(&mesh, &phi, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_field_min_max() {
        let (min, max) = field_min_max(&[0.2, -1.0, 3.5, 0.0]);
        assert!(approx_eq(min, -1.0));
        assert!(approx_eq(max, 3.5));
    }
}
