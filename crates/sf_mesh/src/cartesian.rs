// crates/sf_mesh/src/cartesian.rs

//! 笛卡尔六面体网格
//!
//! 提供规则六面体网格的完整拓扑实现，用于测试与算例。
//! 支持沿 x 方向的条带分区，分区交界处生成 processor 补丁，
//! 两侧补丁内的面均按 (j, k) 顺序排列，局部编号一一对应。

use glam::DVec3;
use serde::{Deserialize, Serialize};

use sf_foundation::error::{SfError, SfResult};

use crate::patch::{Patch, PatchKind};
use crate::topology::MeshTopology;

/// 笛卡尔六面体网格
///
/// 单元编号 `c = i + nx*(j + ny*k)`，顶点编号
/// `p = i + (nx+1)*(j + (ny+1)*k)`。面编号先内部面（x、y、z 方向），
/// 后边界面（x_min、x_max、y_min、y_max、z_min、z_max 六个补丁）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartesianMesh {
    nx: usize,
    ny: usize,
    nz: usize,
    dx: f64,
    dy: f64,
    dz: f64,
    origin: DVec3,

    points: Vec<DVec3>,
    owner: Vec<usize>,
    neighbour: Vec<Option<usize>>,
    area_vec: Vec<DVec3>,
    n_internal: usize,

    cell_faces: Vec<Vec<usize>>,
    cell_neighbours: Vec<Vec<usize>>,
    cell_points: Vec<Vec<usize>>,
    point_cells: Vec<Vec<usize>>,

    patches: Vec<Patch>,
}

impl CartesianMesh {
    /// 创建单分区网格，六个边界补丁均为物理补丁
    pub fn new(nx: usize, ny: usize, nz: usize, dx: f64, dy: f64, dz: f64) -> SfResult<Self> {
        Self::build(
            nx,
            ny,
            nz,
            dx,
            dy,
            dz,
            DVec3::ZERO,
            PatchKind::Physical,
            PatchKind::Physical,
        )
    }

    /// 创建沿 x 方向条带分区的本地网格
    ///
    /// 将 `global_nx` 个单元尽量均匀地分给 `n_ranks` 个分区，
    /// 返回 `rank` 分区的本地网格。分区交界处的 x_min / x_max
    /// 补丁为 processor 补丁，携带对侧分区编号。
    pub fn x_slab(
        global_nx: usize,
        ny: usize,
        nz: usize,
        dx: f64,
        dy: f64,
        dz: f64,
        rank: usize,
        n_ranks: usize,
    ) -> SfResult<Self> {
        if n_ranks == 0 || rank >= n_ranks {
            return Err(SfError::mesh(format!(
                "非法分区编号: rank={rank}, n_ranks={n_ranks}"
            )));
        }
        if global_nx < n_ranks {
            return Err(SfError::mesh(format!(
                "单元数不足以分区: global_nx={global_nx}, n_ranks={n_ranks}"
            )));
        }

        // 均匀划分，余数摊给前几个分区
        let base = global_nx / n_ranks;
        let extra = global_nx % n_ranks;
        let local_nx = base + usize::from(rank < extra);
        let i0 = rank * base + rank.min(extra);

        let x_min_kind = if rank > 0 {
            PatchKind::Processor { neighbour: rank - 1 }
        } else {
            PatchKind::Physical
        };
        let x_max_kind = if rank + 1 < n_ranks {
            PatchKind::Processor { neighbour: rank + 1 }
        } else {
            PatchKind::Physical
        };

        Self::build(
            local_nx,
            ny,
            nz,
            dx,
            dy,
            dz,
            DVec3::new(i0 as f64 * dx, 0.0, 0.0),
            x_min_kind,
            x_max_kind,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        nx: usize,
        ny: usize,
        nz: usize,
        dx: f64,
        dy: f64,
        dz: f64,
        origin: DVec3,
        x_min_kind: PatchKind,
        x_max_kind: PatchKind,
    ) -> SfResult<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(SfError::mesh("网格各方向单元数必须大于零"));
        }
        if dx <= 0.0 || dy <= 0.0 || dz <= 0.0 {
            return Err(SfError::mesh("网格步长必须为正"));
        }

        let n_cells = nx * ny * nz;
        let cell_id = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);
        let point_id = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);

        // 顶点坐标
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push(
                        origin + DVec3::new(i as f64 * dx, j as f64 * dy, k as f64 * dz),
                    );
                }
            }
        }

        let mut owner = Vec::new();
        let mut neighbour: Vec<Option<usize>> = Vec::new();
        let mut area_vec = Vec::new();

        let ax = DVec3::new(dy * dz, 0.0, 0.0);
        let ay = DVec3::new(0.0, dx * dz, 0.0);
        let az = DVec3::new(0.0, 0.0, dx * dy);

        // 内部面：x 方向
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx.saturating_sub(1) {
                    owner.push(cell_id(i, j, k));
                    neighbour.push(Some(cell_id(i + 1, j, k)));
                    area_vec.push(ax);
                }
            }
        }
        // 内部面：y 方向
        for k in 0..nz {
            for j in 0..ny.saturating_sub(1) {
                for i in 0..nx {
                    owner.push(cell_id(i, j, k));
                    neighbour.push(Some(cell_id(i, j + 1, k)));
                    area_vec.push(ay);
                }
            }
        }
        // 内部面：z 方向
        for k in 0..nz.saturating_sub(1) {
            for j in 0..ny {
                for i in 0..nx {
                    owner.push(cell_id(i, j, k));
                    neighbour.push(Some(cell_id(i, j, k + 1)));
                    area_vec.push(az);
                }
            }
        }
        let n_internal = owner.len();

        // 边界补丁：x_min, x_max, y_min, y_max, z_min, z_max
        // x 补丁按 (j, k) 排列，分区两侧顺序一致
        let mut patches = Vec::with_capacity(6);
        let mut add_patch = |name: &str,
                             kind: PatchKind,
                             owner: &mut Vec<usize>,
                             neighbour: &mut Vec<Option<usize>>,
                             area_vec: &mut Vec<DVec3>,
                             faces: Vec<(usize, DVec3)>| {
            let start = owner.len();
            let size = faces.len();
            for (cell, area) in faces {
                owner.push(cell);
                neighbour.push(None);
                area_vec.push(area);
            }
            patches.push(Patch {
                name: name.to_string(),
                start,
                size,
                kind,
            });
        };

        let mut faces = Vec::with_capacity(ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                faces.push((cell_id(0, j, k), -ax));
            }
        }
        add_patch("x_min", x_min_kind, &mut owner, &mut neighbour, &mut area_vec, faces);

        let mut faces = Vec::with_capacity(ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                faces.push((cell_id(nx - 1, j, k), ax));
            }
        }
        add_patch("x_max", x_max_kind, &mut owner, &mut neighbour, &mut area_vec, faces);

        let mut faces = Vec::with_capacity(nx * nz);
        for k in 0..nz {
            for i in 0..nx {
                faces.push((cell_id(i, 0, k), -ay));
            }
        }
        add_patch("y_min", PatchKind::Physical, &mut owner, &mut neighbour, &mut area_vec, faces);

        let mut faces = Vec::with_capacity(nx * nz);
        for k in 0..nz {
            for i in 0..nx {
                faces.push((cell_id(i, ny - 1, k), ay));
            }
        }
        add_patch("y_max", PatchKind::Physical, &mut owner, &mut neighbour, &mut area_vec, faces);

        let mut faces = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                faces.push((cell_id(i, j, 0), -az));
            }
        }
        add_patch("z_min", PatchKind::Physical, &mut owner, &mut neighbour, &mut area_vec, faces);

        let mut faces = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                faces.push((cell_id(i, j, nz - 1), az));
            }
        }
        add_patch("z_max", PatchKind::Physical, &mut owner, &mut neighbour, &mut area_vec, faces);

        // 单元-面、单元-单元映射
        let mut cell_faces = vec![Vec::with_capacity(6); n_cells];
        let mut cell_neighbours = vec![Vec::with_capacity(6); n_cells];
        for (f, (&o, &n)) in owner.iter().zip(neighbour.iter()).enumerate() {
            cell_faces[o].push(f);
            if let Some(n) = n {
                cell_faces[n].push(f);
                cell_neighbours[o].push(n);
                cell_neighbours[n].push(o);
            }
        }

        // 单元-顶点、顶点-单元映射
        let mut cell_points = vec![Vec::with_capacity(8); n_cells];
        let mut point_cells = vec![Vec::new(); points.len()];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = cell_id(i, j, k);
                    for dk in 0..2 {
                        for dj in 0..2 {
                            for di in 0..2 {
                                let p = point_id(i + di, j + dj, k + dk);
                                cell_points[c].push(p);
                                point_cells[p].push(c);
                            }
                        }
                    }
                }
            }
        }

        Ok(Self {
            nx,
            ny,
            nz,
            dx,
            dy,
            dz,
            origin,
            points,
            owner,
            neighbour,
            area_vec,
            n_internal,
            cell_faces,
            cell_neighbours,
            cell_points,
            point_cells,
            patches,
        })
    }

    /// x 方向单元数
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// y 方向单元数
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// z 方向单元数
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// 由 (i, j, k) 求单元编号
    pub fn cell_id(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny && k < self.nz);
        i + self.nx * (j + self.ny * k)
    }
}

impl MeshTopology for CartesianMesh {
    fn n_cells(&self) -> usize {
        self.cell_faces.len()
    }

    fn n_faces(&self) -> usize {
        self.owner.len()
    }

    fn n_internal_faces(&self) -> usize {
        self.n_internal
    }

    fn n_points(&self) -> usize {
        self.points.len()
    }

    fn face_owner(&self, face: usize) -> usize {
        self.owner[face]
    }

    fn face_neighbour(&self, face: usize) -> Option<usize> {
        self.neighbour[face]
    }

    fn cell_faces(&self, cell: usize) -> &[usize] {
        &self.cell_faces[cell]
    }

    fn cell_neighbours(&self, cell: usize) -> &[usize] {
        &self.cell_neighbours[cell]
    }

    fn cell_points(&self, cell: usize) -> &[usize] {
        &self.cell_points[cell]
    }

    fn point_cells(&self, point: usize) -> &[usize] {
        &self.point_cells[point]
    }

    fn point(&self, point: usize) -> DVec3 {
        self.points[point]
    }

    fn cell_centre(&self, cell: usize) -> DVec3 {
        let i = cell % self.nx;
        let j = (cell / self.nx) % self.ny;
        let k = cell / (self.nx * self.ny);
        self.origin
            + DVec3::new(
                (i as f64 + 0.5) * self.dx,
                (j as f64 + 0.5) * self.dy,
                (k as f64 + 0.5) * self.dz,
            )
    }

    fn cell_volume(&self, _cell: usize) -> f64 {
        self.dx * self.dy * self.dz
    }

    fn face_area_vec(&self, face: usize) -> DVec3 {
        self.area_vec[face]
    }

    fn patches(&self) -> &[Patch] {
        &self.patches
    }
}

// ============================================================================
// 测试
// ============================================================================
