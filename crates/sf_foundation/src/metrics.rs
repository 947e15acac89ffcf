// crates/sf_foundation/src/metrics.rs

//! 基础性能计数器
//!
//! 提供轻量级的原子计数和耗时累积功能，仅用于基础统计。
//! 求解器相关的统计（界面单元数、修正单元数等）在 sf_advect 层维护。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 原子计数器（无锁）
///
/// 仅提供基础递增/读取功能。
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// 创建零值计数器
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// 增加计数
    #[inline]
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// 增加指定值
    #[inline]
    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    /// 获取当前值
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// 重置为零
    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// 墙钟耗时累积器
///
/// 跨多次调用累积某一阶段的耗时，用于输运步的时间统计。
#[derive(Debug, Default, Clone)]
pub struct TimeAccumulator {
    total: Duration,
}

impl TimeAccumulator {
    /// 创建零值累积器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录自 `start` 起经过的时间
    pub fn record_since(&mut self, start: Instant) {
        self.total += start.elapsed();
    }

    /// 累计总时长
    pub fn total(&self) -> Duration {
        self.total
    }

    /// 重置为零
    pub fn reset(&mut self) {
        self.total = Duration::ZERO;
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);
        counter.inc();
        counter.inc();
        counter.add(3);
        assert_eq!(counter.get(), 5);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_time_accumulator() {
        let mut acc = TimeAccumulator::new();
        let start = Instant::now();
        acc.record_since(start);
        acc.record_since(start);
        assert!(acc.total() >= Duration::ZERO);
        acc.reset();
        assert_eq!(acc.total(), Duration::ZERO);
    }
}
