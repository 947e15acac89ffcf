// crates/sf_advect/src/lib.rs

//! SharpFlow 相分数输运核心
//!
//! 在非结构化多面体网格上，给定面通量场 phi 与单元速度场，
//! 将有界相分数场（每单元一个 [0,1] 标量）推进一个时间步。
//! 算法在界面单元内重构等值面，估算各下游面的时间积分体积输运，
//! 再通过迭代守恒修正保证相分数不越界。
//!
//! # 模块概览
//!
//! - [`config`]: 求解参数配置
//! - [`cutting`]: 切割引擎与速度插值外部接口
//! - [`surface`]: 界面单元判定
//! - [`gradient`]: Green-Gauss 梯度
//! - [`interpolate`]: 单元场到顶点的插值与法向平滑
//! - [`operators`]: 面场的散度、迎风初始化等算子
//! - [`flux`]: 界面通量估算（FluxEstimator）
//! - [`bounding`]: 守恒修正（BoundingEngine）
//! - [`sync`]: 分区边界输运同步（BoundaryFluxSynchronizer）
//! - [`driver`]: 单步输运编排（IsoAdvector）
//! - [`diagnostics`]: 等值面与单元集诊断输出
//!
//! # 参考
//!
//! Roenby, J., Bredmose, H. and Jasak, H. (2016).
//! A computational method for sharp interface advection.
//! Royal Society Open Science, 3. doi 10.1098/rsos.160405

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bounding;
pub mod config;
pub mod cutting;
pub mod diagnostics;
pub mod driver;
pub mod flux;
pub mod gradient;
pub mod interpolate;
pub mod operators;
pub mod surface;
pub mod sync;

// 重导出常用类型
pub use bounding::BoundingEngine;
pub use config::AdvectionConfig;
pub use cutting::{CellCut, CellCentreVelocity, CuttingEngine, IsoSurface, VelocityInterpolator};
pub use driver::{AdvectionReport, IsoAdvector};
pub use flux::FluxEstimator;
pub use surface::is_surface_cell;
pub use sync::{
    BoundaryFluxSynchronizer, ChannelExchange, ProcessExchange, SerialExchange, TransportMessage,
};
