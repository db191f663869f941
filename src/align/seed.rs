use crate::error::{Error, Result};
use crate::index::fm::FMIndex;

/// 定长精确匹配种子：read 上 [read_offset, read_offset+len) 的 k-mer 及其在参考上的全部出现位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerSeed {
    pub read_offset: usize,
    pub len: usize,
    /// 参考上的起始位置，升序；可能为空。调用方应按集合使用
    pub positions: Vec<u32>,
}

impl KmerSeed {
    pub fn is_hit(&self) -> bool {
        !self.positions.is_empty()
    }
}

/// 对 read 的每个起点 i ∈ [0, len-k] 取 k-mer，用 FM 索引反向搜索并恢复全部位置。
///
/// 每个起点恰好返回一个 `KmerSeed`。含表外字节的 k-mer 得到空位置集合。
pub fn find_kmer_seeds(fm: &FMIndex, read: &[u8], k: usize) -> Result<Vec<KmerSeed>> {
    if k == 0 {
        return Err(Error::ZeroSeedLength);
    }
    if read.is_empty() {
        return Err(Error::EmptySequence("read"));
    }
    if k > read.len() {
        return Err(Error::SeedLongerThanRead { k, read_len: read.len() });
    }

    let pattern = fm.alphabet().encode_pattern(read);
    let seeds = (0..=read.len() - k)
        .map(|qb| {
            let (l, r) = fm.backward_search(&pattern[qb..qb + k]);
            let mut positions = fm.sa_interval_positions(l, r);
            positions.sort_unstable();
            KmerSeed { read_offset: qb, len: k, positions }
        })
        .collect();
    Ok(seeds)
}

/// 所有种子命中的位置总数
pub fn total_hits(seeds: &[KmerSeed]) -> usize {
    seeds.iter().map(|s| s.positions.len()).sum()
}
