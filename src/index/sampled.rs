use serde::{Deserialize, Serialize};

/// 稀疏后缀数组：只保留 SA 值为 `interval` 倍数的行。
///
/// 行是否被采样由位向量标记，配合每个字的前缀 popcount 把行号映射到
/// 按行序存放的采样值，查询 O(1)，布局只取决于 SA 本身。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledSa {
    interval: u32,
    marks: Vec<u64>,
    /// mark_ranks[w] = marks[..w] 中置位总数
    mark_ranks: Vec<u32>,
    values: Vec<u32>,
}

impl SampledSa {
    pub fn build(sa: &[u32], interval: u32) -> Self {
        debug_assert!(interval > 0);
        let words = (sa.len() + 63) / 64;
        let mut marks = vec![0u64; words];
        let mut values = Vec::with_capacity(sa.len() / interval as usize + 1);
        for (row, &pos) in sa.iter().enumerate() {
            if pos % interval == 0 {
                marks[row / 64] |= 1u64 << (row % 64);
                values.push(pos);
            }
        }

        let mut mark_ranks = Vec::with_capacity(words);
        let mut acc = 0u32;
        for &w in &marks {
            mark_ranks.push(acc);
            acc += w.count_ones();
        }

        Self { interval, marks, mark_ranks, values }
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// 采样行数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 若该行被采样，返回其 SA 值
    #[inline]
    pub fn get(&self, row: usize) -> Option<u32> {
        let word = *self.marks.get(row / 64)?;
        let bit = row % 64;
        if (word >> bit) & 1 == 0 {
            return None;
        }
        let below = (word & ((1u64 << bit) - 1)).count_ones();
        Some(self.values[(self.mark_ranks[row / 64] + below) as usize])
    }
}
