// crates/sf_advect/tests/distributed_sync.rs

//! 三分区输运算例
//!
//! 六单元柱拆成 3 个分区（每区 2 个单元），界面单元紧邻分区边界。
//! 校验共享面两侧输运值等值反号，且分区结果与单分区一致。

mod common;

use common::{MockCutter, x_flow_phi};

use glam::DVec3;
use sf_advect::{AdvectionConfig, CellCentreVelocity, ChannelExchange, IsoAdvector, SerialExchange};
use sf_mesh::{CartesianMesh, MeshTopology};

/// 一个分区推进一步后的观测值
struct RankResult {
    alpha: Vec<f64>,
    /// (对侧分区编号, 共享面上的 dVf)
    shared_faces: Vec<(usize, f64)>,
}

/// 全局算例：6 个单元，alpha = [1, 1, 0.5, 0.5, 0, 0]，
/// 均匀 +x 流动 phi = 0.3，切割单元 2、3，输运比例 0.8
const GLOBAL_ALPHA: [f64; 6] = [1.0, 1.0, 0.5, 0.5, 0.0, 0.0];
const FLUX: f64 = 0.3;
const FRACTION: f64 = 0.8;

fn run_rank(rank: usize, exchange: ChannelExchange) -> RankResult {
    let mesh = CartesianMesh::x_slab(6, 1, 1, 1.0, 1.0, 1.0, rank, 3).unwrap();
    let mut advector =
        IsoAdvector::new(&mesh, AdvectionConfig::default(), exchange).unwrap();

    // 本分区局部相分数与切割单元（全局单元 2、3 位于分区 1）
    let mut alpha: Vec<f64> = GLOBAL_ALPHA[2 * rank..2 * rank + 2].to_vec();
    let cuts: Vec<(usize, f64)> = if rank == 1 {
        vec![(0, 2.5), (1, 3.5)]
    } else {
        Vec::new()
    };
    let mut cutter = MockCutter::with_plane_cuts(&cuts, FRACTION);
    let velocity = CellCentreVelocity::uniform(DVec3::X, mesh.n_cells());
    let phi = x_flow_phi(&mesh, FLUX);

    advector
        .advect(&mesh, &mut alpha, &phi, &mut cutter, &velocity, 1.0)
        .unwrap();

    let shared_faces = mesh
        .patches()
        .iter()
        .filter(|p| p.is_processor())
        .map(|p| (p.neighbour_rank().unwrap(), advector.dvf()[p.start]))
        .collect();

    RankResult {
        alpha,
        shared_faces,
    }
}

fn shared_value(results: &[RankResult], from: usize, to: usize) -> f64 {
    results[from]
        .shared_faces
        .iter()
        .find(|(n, _)| *n == to)
        .map(|(_, v)| *v)
        .unwrap()
}

#[test]
fn test_three_partition_advection_matches_serial() {
    let handles: Vec<_> = ChannelExchange::connect(3)
        .into_iter()
        .enumerate()
        .map(|(rank, exchange)| std::thread::spawn(move || run_rank(rank, exchange)))
        .collect();
    let results: Vec<RankResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // 共享面两侧的输运值等值反号
    let v01 = shared_value(&results, 0, 1);
    let v10 = shared_value(&results, 1, 0);
    assert!(v01.abs() > 0.0);
    assert!((v01 + v10).abs() < 1e-14);

    let v12 = shared_value(&results, 1, 2);
    let v21 = shared_value(&results, 2, 1);
    assert!(v12.abs() > 0.0);
    assert!((v12 + v21).abs() < 1e-14);

    // 流出侧计算的值为权威值
    assert!((v01 - FLUX).abs() < 1e-12); // 迎风单元全相: dVf = phi * dt
    assert!((v12 - FRACTION * FLUX).abs() < 1e-12); // 界面单元经切割输运

    // 分区结果与单分区运行一致
    let mesh = CartesianMesh::new(6, 1, 1, 1.0, 1.0, 1.0).unwrap();
    let mut advector =
        IsoAdvector::new(&mesh, AdvectionConfig::default(), SerialExchange).unwrap();
    let mut cutter = MockCutter::with_plane_cuts(&[(2, 2.5), (3, 3.5)], FRACTION);
    let velocity = CellCentreVelocity::uniform(DVec3::X, mesh.n_cells());
    let mut alpha_serial = GLOBAL_ALPHA.to_vec();
    let phi = x_flow_phi(&mesh, FLUX);
    advector
        .advect(&mesh, &mut alpha_serial, &phi, &mut cutter, &velocity, 1.0)
        .unwrap();

    let alpha_distributed: Vec<f64> = results.iter().flat_map(|r| r.alpha.clone()).collect();
    for (a, b) in alpha_distributed.iter().zip(&alpha_serial) {
        assert!((a - b).abs() < 1e-12, "分区 {a} 与单分区 {b} 不一致");
    }
}
