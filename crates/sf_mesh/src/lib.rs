// crates/sf_mesh/src/lib.rs

//! SharpFlow 网格层
//!
//! 提供非结构化多面体网格的统一拓扑抽象，包括：
//! - [`topology`]: `MeshTopology` trait，求解器对网格的唯一访问入口
//! - [`patch`]: 边界补丁与分区（processor）补丁类型
//! - [`cartesian`]: 笛卡尔六面体网格，用于测试与算例
//!
//! # 面约定
//!
//! 面编号先内部面后边界面；边界面按补丁分组连续存放。
//! 面面积矢量由 owner 指向 neighbour（边界面指向域外）。
//! 面通量 phi > 0 表示流体由 owner 流向 neighbour。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cartesian;
pub mod patch;
pub mod topology;

pub use cartesian::CartesianMesh;
pub use patch::{Patch, PatchKind};
pub use topology::MeshTopology;
