// crates/sf_mesh/src/patch.rs

//! 边界补丁类型定义
//!
//! 补丁是一段连续编号的边界面。普通物理边界（壁面、进出口等）对求解核心
//! 没有区别，统一为 [`PatchKind::Physical`]；分区边界为
//! [`PatchKind::Processor`]，携带对侧分区编号。
//!
//! 分区补丁两侧的面按相同的补丁内顺序排列，补丁内局部编号即可一一对应。

use serde::{Deserialize, Serialize};

/// 补丁类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchKind {
    /// 物理边界补丁（壁面、进出口等）
    Physical,
    /// 分区边界补丁
    Processor {
        /// 对侧分区编号
        neighbour: usize,
    },
}

/// 边界补丁
///
/// 表示全局面编号区间 `[start, start + size)` 上的一段边界面。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    /// 补丁名称
    pub name: String,
    /// 起始全局面编号
    pub start: usize,
    /// 补丁内面数
    pub size: usize,
    /// 补丁类型
    pub kind: PatchKind,
}

impl Patch {
    /// 创建物理边界补丁
    pub fn physical(name: impl Into<String>, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            start,
            size,
            kind: PatchKind::Physical,
        }
    }

    /// 创建分区边界补丁
    pub fn processor(name: impl Into<String>, start: usize, size: usize, neighbour: usize) -> Self {
        Self {
            name: name.into(),
            start,
            size,
            kind: PatchKind::Processor { neighbour },
        }
    }

    /// 是否为分区补丁
    #[inline]
    pub fn is_processor(&self) -> bool {
        matches!(self.kind, PatchKind::Processor { .. })
    }

    /// 对侧分区编号（非分区补丁返回 None）
    #[inline]
    pub fn neighbour_rank(&self) -> Option<usize> {
        match self.kind {
            PatchKind::Processor { neighbour } => Some(neighbour),
            PatchKind::Physical => None,
        }
    }

    /// 全局面编号是否落在本补丁内
    #[inline]
    pub fn contains(&self, face: usize) -> bool {
        face >= self.start && face < self.start + self.size
    }

    /// 全局面编号转补丁内局部编号
    ///
    /// 调用方需保证 `face` 落在本补丁内。
    #[inline]
    pub fn local_face(&self, face: usize) -> usize {
        debug_assert!(self.contains(face));
        face - self.start
    }

    /// 补丁内局部编号转全局面编号
    #[inline]
    pub fn global_face(&self, local: usize) -> usize {
        debug_assert!(local < self.size);
        self.start + local
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_indexing() {
        let p = Patch::physical("x_min", 10, 4);
        assert!(p.contains(10));
        assert!(p.contains(13));
        assert!(!p.contains(14));
        assert_eq!(p.local_face(12), 2);
        assert_eq!(p.global_face(2), 12);
    }

    #[test]
    fn test_processor_patch() {
        let p = Patch::processor("proc0to1", 20, 2, 1);
        assert!(p.is_processor());
        assert_eq!(p.neighbour_rank(), Some(1));

        let q = Patch::physical("wall", 0, 1);
        assert!(!q.is_processor());
        assert_eq!(q.neighbour_rank(), None);
    }
}
