// crates/sf_advect/src/sync.rs

//! 分区边界输运同步
//!
//! 每个分区在界面通量估算与守恒修正过程中，把发生写入的
//! processor 补丁面登记到待交换列表；[`BoundaryFluxSynchronizer::sync`]
//! 将列表成对交换，使共享面两侧的输运值大小相等、符号相反。
//!
//! 协议：先对所有 processor 补丁投递非阻塞发送，再阻塞接收；
//! 接收到的远端值视为权威值，以 `-remote` 覆盖本地值。
//! 交换完成后清空待交换列表，空列表再次同步是安全的空操作。

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

use serde::{Deserialize, Serialize};

use sf_foundation::error::{SfError, SfResult};
use sf_foundation::float::SMALL;
use sf_mesh::MeshTopology;

// ============================================================
// 交换消息与传输层
// ============================================================

/// 一个补丁的输运交换消息
///
/// `face_ids` 为补丁内局部面编号，两侧按相同顺序排列。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportMessage {
    /// 补丁内局部面编号
    pub face_ids: Vec<usize>,
    /// 对应的面体积输运值
    pub values: Vec<f64>,
}

/// 分区间消息传输层
///
/// 发送不得阻塞，接收阻塞直到对端消息到达。
/// 单步内没有超时与取消语义：对端失联即整步停滞。
pub trait ProcessExchange: Send {
    /// 是否为多分区运行
    fn is_distributed(&self) -> bool;

    /// 向对侧分区投递消息（非阻塞）
    fn send(&mut self, neighbour: usize, message: TransportMessage) -> SfResult<()>;

    /// 阻塞接收对侧分区的消息
    fn recv(&mut self, neighbour: usize) -> SfResult<TransportMessage>;

    /// 全分区最小/最大值归约
    ///
    /// 所有分区必须以相同次序同时调用，返回全局 (min, max)。
    /// 守恒修正以该结果决定分支，保证各分区同步步调一致。
    fn reduce_min_max(&mut self, min: f64, max: f64) -> SfResult<(f64, f64)>;
}

/// 单分区运行的空传输层
#[derive(Debug, Default, Clone)]
pub struct SerialExchange;

impl ProcessExchange for SerialExchange {
    fn is_distributed(&self) -> bool {
        false
    }

    fn send(&mut self, neighbour: usize, _message: TransportMessage) -> SfResult<()> {
        Err(SfError::exchange(format!(
            "单分区运行不应向分区 {neighbour} 发送消息"
        )))
    }

    fn recv(&mut self, neighbour: usize) -> SfResult<TransportMessage> {
        Err(SfError::exchange(format!(
            "单分区运行不应从分区 {neighbour} 接收消息"
        )))
    }

    fn reduce_min_max(&mut self, min: f64, max: f64) -> SfResult<(f64, f64)> {
        Ok((min, max))
    }
}

/// 进程内通道传输层
///
/// 用 `std::sync::mpsc` 在线程间建立全连接通道，
/// 供多分区测试与单机多线程算例使用。
#[derive(Debug)]
pub struct ChannelExchange {
    rank: usize,
    senders: HashMap<usize, Sender<TransportMessage>>,
    receivers: HashMap<usize, Receiver<TransportMessage>>,
}

impl ChannelExchange {
    /// 建立 `n_ranks` 个分区之间的全连接通道
    ///
    /// 返回按分区编号排列的传输层实例，每个实例移交给对应分区线程。
    pub fn connect(n_ranks: usize) -> Vec<ChannelExchange> {
        let mut senders: Vec<HashMap<usize, Sender<TransportMessage>>> =
            (0..n_ranks).map(|_| HashMap::new()).collect();
        let mut receivers: Vec<HashMap<usize, Receiver<TransportMessage>>> =
            (0..n_ranks).map(|_| HashMap::new()).collect();

        for from in 0..n_ranks {
            for to in 0..n_ranks {
                if from == to {
                    continue;
                }
                let (tx, rx) = channel();
                senders[from].insert(to, tx);
                receivers[to].insert(from, rx);
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (senders, receivers))| ChannelExchange {
                rank,
                senders,
                receivers,
            })
            .collect()
    }

    /// 本分区编号
    pub fn rank(&self) -> usize {
        self.rank
    }
}

impl ProcessExchange for ChannelExchange {
    fn is_distributed(&self) -> bool {
        true
    }

    fn send(&mut self, neighbour: usize, message: TransportMessage) -> SfResult<()> {
        self.senders
            .get(&neighbour)
            .ok_or_else(|| SfError::exchange(format!("分区 {neighbour} 无发送通道")))?
            .send(message)
            .map_err(|_| SfError::exchange(format!("分区 {neighbour} 接收端已关闭")))
    }

    fn recv(&mut self, neighbour: usize) -> SfResult<TransportMessage> {
        self.receivers
            .get(&neighbour)
            .ok_or_else(|| SfError::exchange(format!("分区 {neighbour} 无接收通道")))?
            .recv()
            .map_err(|_| SfError::exchange(format!("分区 {neighbour} 发送端已关闭")))
    }

    fn reduce_min_max(&mut self, min: f64, max: f64) -> SfResult<(f64, f64)> {
        // 先向所有对端投递本地值，再依次接收合并，避免环路等待
        let peers: Vec<usize> = self.senders.keys().copied().collect();
        for &peer in &peers {
            self.send(
                peer,
                TransportMessage {
                    face_ids: Vec::new(),
                    values: vec![min, max],
                },
            )?;
        }

        let mut global_min = min;
        let mut global_max = max;
        let peers: Vec<usize> = self.receivers.keys().copied().collect();
        for &peer in &peers {
            let message = self.recv(peer)?;
            if message.values.len() != 2 {
                return Err(SfError::exchange(format!(
                    "分区 {peer} 的归约消息长度错误"
                )));
            }
            global_min = global_min.min(message.values[0]);
            global_max = global_max.max(message.values[1]);
        }
        Ok((global_min, global_max))
    }
}

// ============================================================
// 边界输运同步器
// ============================================================

/// 分区边界输运同步器
///
/// 维护每个 processor 补丁的待交换面列表，按
/// 登记（post）→ 交换（drain）→ 清空（clear）的生命周期工作。
pub struct BoundaryFluxSynchronizer<E: ProcessExchange> {
    exchange: E,
    /// processor 补丁编号列表
    proc_patches: Vec<usize>,
    /// 每补丁的待交换补丁内局部面编号
    pending: Vec<Vec<usize>>,
}

impl<E: ProcessExchange> BoundaryFluxSynchronizer<E> {
    /// 从网格补丁表创建
    pub fn new<M: MeshTopology>(mesh: &M, exchange: E) -> Self {
        let proc_patches = mesh
            .patches()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_processor() && p.size > 0)
            .map(|(i, _)| i)
            .collect();
        let pending = vec![Vec::new(); mesh.patches().len()];
        Self {
            exchange,
            proc_patches,
            pending,
        }
    }

    /// 是否为多分区运行
    pub fn is_distributed(&self) -> bool {
        self.exchange.is_distributed()
    }

    /// 全分区最小/最大值归约（单分区直接返回本地值）
    pub fn reduce_min_max(&mut self, min: f64, max: f64) -> SfResult<(f64, f64)> {
        self.exchange.reduce_min_max(min, max)
    }

    /// 登记一个面：若位于 processor 补丁则加入待交换列表
    ///
    /// 内部面与物理边界面被静默忽略，调用方无需预判面的类别。
    pub fn register_face<M: MeshTopology>(&mut self, mesh: &M, face: usize) {
        if mesh.is_internal_face(face) {
            return;
        }
        if let Some(patch_id) = mesh.patch_of_face(face) {
            let patch = &mesh.patches()[patch_id];
            if patch.is_processor() {
                self.pending[patch_id].push(patch.local_face(face));
            }
        }
    }

    /// 交换所有待交换面的输运值并清空列表
    ///
    /// 对每个 processor 补丁先投递发送，再阻塞接收；
    /// 本地值被 `-remote` 覆盖。单分区运行为空操作。
    pub fn sync<M: MeshTopology>(&mut self, mesh: &M, dvf: &mut [f64]) -> SfResult<()> {
        if !self.exchange.is_distributed() {
            for p in self.pending.iter_mut() {
                p.clear();
            }
            return Ok(());
        }

        // 投递发送
        for &patch_id in &self.proc_patches {
            let patch = &mesh.patches()[patch_id];
            let neighbour = patch
                .neighbour_rank()
                .ok_or_else(|| SfError::exchange("processor 补丁缺少对侧分区编号"))?;

            let face_ids = self.pending[patch_id].clone();
            let values = face_ids
                .iter()
                .map(|&local| dvf[patch.global_face(local)])
                .collect();
            self.exchange
                .send(neighbour, TransportMessage { face_ids, values })?;
        }

        // 阻塞接收并覆盖
        for &patch_id in &self.proc_patches {
            let patch = &mesh.patches()[patch_id];
            let neighbour = patch
                .neighbour_rank()
                .ok_or_else(|| SfError::exchange("processor 补丁缺少对侧分区编号"))?;

            let message = self.exchange.recv(neighbour)?;
            if message.face_ids.len() != message.values.len() {
                return Err(SfError::exchange(format!(
                    "补丁 {} 收到长度不一致的交换消息",
                    patch.name
                )));
            }

            for (&local, &remote) in message.face_ids.iter().zip(&message.values) {
                if local >= patch.size {
                    return Err(SfError::exchange(format!(
                        "补丁 {} 收到越界面编号 {local}",
                        patch.name
                    )));
                }
                let face = patch.global_face(local);
                if (dvf[face] + remote).abs() > 10.0 * SMALL {
                    log::debug!(
                        "补丁 {} 面 {local}: 本地 {} 与远端 {remote} 不一致，采用远端值",
                        patch.name,
                        dvf[face]
                    );
                }
                dvf[face] = -remote;
            }
        }

        // 清空待交换列表
        for p in self.pending.iter_mut() {
            p.clear();
        }
        Ok(())
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sf_mesh::CartesianMesh;

    #[test]
    fn test_serial_sync_is_noop() {
        let mesh = CartesianMesh::new(2, 1, 1, 1.0, 1.0, 1.0).unwrap();
        let mut sync = BoundaryFluxSynchronizer::new(&mesh, SerialExchange);
        let mut dvf = vec![0.5; mesh.n_faces()];
        let before = dvf.clone();

        // 物理补丁面登记后同步不改变任何值
        sync.register_face(&mesh, mesh.n_internal_faces());
        sync.sync(&mesh, &mut dvf).unwrap();
        assert_eq!(dvf, before);
    }

    #[test]
    fn test_register_ignores_internal_and_physical() {
        let mesh = CartesianMesh::x_slab(4, 1, 1, 1.0, 1.0, 1.0, 0, 2).unwrap();
        let mut sync = BoundaryFluxSynchronizer::new(&mesh, SerialExchange);

        sync.register_face(&mesh, 0); // 内部面
        let phys = mesh
            .patches()
            .iter()
            .find(|p| !p.is_processor())
            .unwrap()
            .start;
        sync.register_face(&mesh, phys);
        assert!(sync.pending.iter().all(|p| p.is_empty()));

        let proc = mesh
            .patches()
            .iter()
            .find(|p| p.is_processor())
            .unwrap()
            .start;
        sync.register_face(&mesh, proc);
        assert_eq!(sync.pending.iter().map(|p| p.len()).sum::<usize>(), 1);
    }

    #[test]
    fn test_channel_pair_exchange() {
        // 两个分区，各 2 个单元，共享一个 processor 面
        let meshes: Vec<_> = (0..2)
            .map(|rank| CartesianMesh::x_slab(4, 1, 1, 1.0, 1.0, 1.0, rank, 2).unwrap())
            .collect();
        let exchanges = ChannelExchange::connect(2);

        let handles: Vec<_> = meshes
            .into_iter()
            .zip(exchanges)
            .enumerate()
            .map(|(rank, (mesh, exchange))| {
                std::thread::spawn(move || {
                    let mut sync = BoundaryFluxSynchronizer::new(&mesh, exchange);
                    let mut dvf = vec![0.0; mesh.n_faces()];

                    let proc_face = mesh
                        .patches()
                        .iter()
                        .find(|p| p.is_processor())
                        .unwrap()
                        .start;
                    if rank == 0 {
                        // 只有分区 0 计算了该面的输运
                        dvf[proc_face] = 0.25;
                        sync.register_face(&mesh, proc_face);
                    }
                    sync.sync(&mesh, &mut dvf).unwrap();

                    // 空列表再次同步是安全空操作
                    let before = dvf.clone();
                    sync.sync(&mesh, &mut dvf).unwrap();
                    assert_eq!(dvf, before);

                    dvf[proc_face]
                })
            })
            .collect();

        let values: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!((values[0] - 0.25).abs() < 1e-14);
        assert!((values[1] + 0.25).abs() < 1e-14);
    }

    #[test]
    fn test_reduce_min_max() {
        let locals = [(0.2, 0.8), (-0.1, 0.5), (0.0, 1.3)];
        let handles: Vec<_> = ChannelExchange::connect(3)
            .into_iter()
            .zip(locals)
            .map(|(mut exchange, (min, max))| {
                std::thread::spawn(move || exchange.reduce_min_max(min, max).unwrap())
            })
            .collect();

        for handle in handles {
            let (min, max) = handle.join().unwrap();
            assert_eq!(min, -0.1);
            assert_eq!(max, 1.3);
        }

        // 单分区归约返回本地值
        let mut serial = SerialExchange;
        assert_eq!(serial.reduce_min_max(0.1, 0.9).unwrap(), (0.1, 0.9));
    }
}
