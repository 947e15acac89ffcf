// crates/sf_advect/src/gradient.rs

//! Green-Gauss 梯度计算
//!
//! 使用 Green 定理将体积分转化为面积分:
//! ∇φ ≈ (1/V) ∮ φ·n dS
//!
//! 内部面取两侧算术平均，边界面取 owner 单元值。
//! 用于 `grad_alpha_normal` 模式下的界面法向估计。

use glam::DVec3;

use sf_mesh::MeshTopology;

/// 计算单元标量场的 Green-Gauss 梯度
pub fn green_gauss<M: MeshTopology>(mesh: &M, field: &[f64]) -> Vec<DVec3> {
    let mut grad = vec![DVec3::ZERO; mesh.n_cells()];

    for face in 0..mesh.n_faces() {
        let sf = mesh.face_area_vec(face);
        let owner = mesh.face_owner(face);
        match mesh.face_neighbour(face) {
            Some(neighbour) => {
                let phi_f = 0.5 * (field[owner] + field[neighbour]);
                grad[owner] += phi_f * sf;
                grad[neighbour] -= phi_f * sf;
            }
            None => {
                grad[owner] += field[owner] * sf;
            }
        }
    }

    for (cell, g) in grad.iter_mut().enumerate() {
        *g /= mesh.cell_volume(cell);
    }

    grad
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::CartesianMesh;

    #[test]
    fn test_linear_field_interior() {
        // 线性场 f = 2x + 3y - z，内部单元梯度应精确
        let mesh = CartesianMesh::new(4, 4, 4, 0.5, 0.5, 0.5).unwrap();
        let field: Vec<f64> = (0..mesh.n_cells())
            .map(|c| {
                let x = mesh.cell_centre(c);
                2.0 * x.x + 3.0 * x.y - x.z
            })
            .collect();

        let grad = green_gauss(&mesh, &field);

        // 仅检查内部单元（边界单元受一阶外推影响）
        for k in 1..3 {
            for j in 1..3 {
                for i in 1..3 {
                    let g = grad[mesh.cell_id(i, j, k)];
                    assert!((g.x - 2.0).abs() < 1e-10, "gx = {}", g.x);
                    assert!((g.y - 3.0).abs() < 1e-10, "gy = {}", g.y);
                    assert!((g.z + 1.0).abs() < 1e-10, "gz = {}", g.z);
                }
            }
        }
    }

    #[test]
    fn test_uniform_field_is_gradient_free() {
        let mesh = CartesianMesh::new(3, 3, 3, 1.0, 1.0, 1.0).unwrap();
        let field = vec![0.7; mesh.n_cells()];
        let grad = green_gauss(&mesh, &field);
        for g in &grad {
            assert!(g.length() < 1e-12);
        }
    }
}
