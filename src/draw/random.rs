use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 随机数来源，返回 [0, 1) 区间内的均匀分布浮点数
pub trait RandomSource: Send + Sync {
    fn next_uniform(&self) -> f64;
}

/// 默认实现：线程本地随机数生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_uniform(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// 固定种子的随机源（可复现）
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.r#gen::<f64>()
    }
}

/// 按顺序循环返回给定数值
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_uniform(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[idx]
    }
}
