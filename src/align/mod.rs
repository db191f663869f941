pub mod affine;
pub mod score;
pub mod seed;

pub use affine::{affine_align, affine_align_with_buf, AffineAlignment, AffineBuffer, AffineParams};
pub use score::{cigar, edit_distance, mapping_quality, Candidate, MAX_MAPQ};
pub use seed::{find_kmer_seeds, total_hits, KmerSeed};

use std::time::Instant;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::fm::FMIndex;

/// 比对参数（默认值与常见短读长打分一致：匹配 +2，错配 -1，开空位 -2，延伸 -1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOpt {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    /// 种子 k-mer 长度
    pub seed_len: usize,
}

impl Default for AlignOpt {
    fn default() -> Self {
        Self { match_score: 2, mismatch_penalty: 1, gap_open: 2, gap_extend: 1, seed_len: 12 }
    }
}

impl AlignOpt {
    pub fn validate(&self) -> Result<()> {
        if self.seed_len == 0 {
            return Err(Error::ZeroSeedLength);
        }
        self.affine_params().validate()
    }

    pub fn affine_params(&self) -> AffineParams {
        AffineParams {
            match_score: self.match_score,
            mismatch_penalty: self.mismatch_penalty,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
        }
    }
}

/// 单条 read 的比对结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    /// 参考窗口起点（0 起）
    pub offset: u32,
    pub score: i32,
    pub cigar: String,
    /// 0..=60
    pub mapq: u8,
    /// 编辑距离
    pub nm: u32,
    /// 比对串按字母表原始字节保存，空位为 `-`
    pub aligned_ref: Vec<u8>,
    pub aligned_query: Vec<u8>,
}

/// 种子-延伸比对一条 read。
///
/// 返回 `Ok(None)` 表示没有任何 k-mer 精确命中参考（无种子）；由调用方决定丢弃或重试。
pub fn align_read(fm: &FMIndex, read: &[u8], opt: &AlignOpt) -> Result<Option<AlignmentRecord>> {
    align_read_with_buf(fm, read, opt, &mut AffineBuffer::new(), None)
}

/// 带截止时间的 [`align_read`]；截止时间只在候选窗口之间检查。
pub fn align_read_before(
    fm: &FMIndex,
    read: &[u8],
    opt: &AlignOpt,
    deadline: Instant,
) -> Result<Option<AlignmentRecord>> {
    align_read_with_buf(fm, read, opt, &mut AffineBuffer::new(), Some(deadline))
}

pub fn align_read_with_buf(
    fm: &FMIndex,
    read: &[u8],
    opt: &AlignOpt,
    buf: &mut AffineBuffer,
    deadline: Option<Instant>,
) -> Result<Option<AlignmentRecord>> {
    opt.validate()?;
    let seeds = find_kmer_seeds(fm, read, opt.seed_len)?;
    let candidates = score::candidate_windows(&seeds);
    if candidates.is_empty() {
        debug!("no seed hit for read of length {}", read.len());
        return Ok(None);
    }
    debug!(
        "{} seeds, {} hits, {} candidate windows",
        seeds.len(),
        total_hits(&seeds),
        candidates.len()
    );

    // 与参考窗口同样使用规范化符号比较
    let alphabet = fm.alphabet();
    let query: Vec<u8> = read.iter().map(|&b| alphabet.canonical(b)).collect();

    let best = score::best_candidate(fm, &query, &candidates, opt.affine_params(), buf, deadline)?;
    let Some(best) = best else {
        return Ok(None);
    };

    let aln = best.alignment;
    debug!("best candidate: offset={} score={}", best.ref_start, aln.score);
    Ok(Some(AlignmentRecord {
        offset: best.ref_start as u32,
        score: aln.score,
        cigar: cigar(&aln.aligned_ref, &aln.aligned_query),
        mapq: mapping_quality(aln.score, read.len()),
        nm: edit_distance(&aln.aligned_ref, &aln.aligned_query),
        aligned_ref: aln.aligned_ref,
        aligned_query: aln.aligned_query,
    }))
}

/// 并行比对一批 read，结果与输入顺序一一对应。
///
/// 每个工作线程持有一份 DP 缓冲区；单条 read 的错误只体现在对应位置，不影响其他 read。
/// 线程数由全局 rayon 线程池决定。
pub fn align_batch<R>(fm: &FMIndex, reads: &[R], opt: &AlignOpt) -> Vec<Result<Option<AlignmentRecord>>>
where
    R: AsRef<[u8]> + Sync,
{
    reads
        .par_iter()
        .map_init(AffineBuffer::new, |buf, read| align_read_with_buf(fm, read.as_ref(), opt, buf, None))
        .collect()
}
