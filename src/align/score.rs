use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::Instant;

use log::trace;

use super::affine::{affine_align_with_buf, AffineAlignment, AffineBuffer, AffineParams};
use super::seed::KmerSeed;
use crate::error::{Error, Result};
use crate::index::fm::FMIndex;
use crate::util::alphabet::GAP;

/// MAPQ 上限
pub const MAX_MAPQ: u8 = 60;

/// 候选参考窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// 窗口在参考上的起点
    pub ref_start: usize,
    /// 产生该候选的种子在 read 上的偏移
    pub read_offset: usize,
    /// 种子命中的参考位置
    pub hit: u32,
}

/// 最佳候选及其比对
#[derive(Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub ref_start: usize,
    pub alignment: AffineAlignment,
}

/// 把种子命中换算为窗口起点（命中位置减去种子在 read 上的偏移，低于 0 时取 0）。
/// 按种子顺序、再按命中位置顺序展开，同一起点只保留第一次出现。
pub fn candidate_windows(seeds: &[KmerSeed]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for seed in seeds {
        for &hit in &seed.positions {
            let ref_start = (hit as usize).saturating_sub(seed.read_offset);
            if seen.insert(ref_start) {
                out.push(Candidate { ref_start, read_offset: seed.read_offset, hit });
            }
        }
    }
    out
}

/// 逐个候选窗口做仿射比对，保留得分严格最高者；同分时保留先出现的候选。
///
/// 截止时间只在两个候选之间检查，单次 DP 不会被打断。
pub fn best_candidate(
    fm: &FMIndex,
    read: &[u8],
    candidates: &[Candidate],
    p: AffineParams,
    buf: &mut AffineBuffer,
    deadline: Option<Instant>,
) -> Result<Option<ScoredCandidate>> {
    let mut best: Option<ScoredCandidate> = None;
    for (visited, cand) in candidates.iter().enumerate() {
        if deadline.map_or(false, |d| Instant::now() >= d) {
            return Err(Error::DeadlineExceeded { visited, total: candidates.len() });
        }
        let window = fm.reference_window(cand.ref_start, read.len());
        if window.is_empty() {
            continue;
        }
        let alignment = affine_align_with_buf(&window, read, p, buf)?;
        trace!(
            "candidate ref_start={} (seed at read offset {} hit {}) score={}",
            cand.ref_start,
            cand.read_offset,
            cand.hit,
            alignment.score
        );
        if best.as_ref().map_or(true, |b| alignment.score > b.alignment.score) {
            best = Some(ScoredCandidate { ref_start: cand.ref_start, alignment });
        }
    }
    Ok(best)
}

#[inline]
fn column_op(r: u8, q: u8) -> char {
    match (r == GAP, q == GAP) {
        (true, false) => 'I',
        (false, true) => 'D',
        _ => 'M',
    }
}

/// 由比对串生成 CIGAR：read 中的空位为 D，参考中的空位为 I，其余（含错配）为 M。
/// 只合并相邻的同类操作。
pub fn cigar(aligned_ref: &[u8], aligned_query: &[u8]) -> String {
    let ops: Vec<char> = aligned_ref
        .iter()
        .zip(aligned_query)
        .map(|(&r, &q)| column_op(r, q))
        .collect();
    ops_to_cigar(&ops)
}

pub fn ops_to_cigar(ops: &[char]) -> String {
    let mut cigar = String::new();
    let Some((&first, rest)) = ops.split_first() else {
        return cigar;
    };
    let mut cur = first;
    let mut len = 1usize;
    for &op in rest {
        if op == cur {
            len += 1;
        } else {
            let _ = write!(&mut cigar, "{}{}", len, cur);
            cur = op;
            len = 1;
        }
    }
    let _ = write!(&mut cigar, "{}{}", len, cur);
    cigar
}

/// 编辑距离（NM）：错配列数加空位列数
pub fn edit_distance(aligned_ref: &[u8], aligned_query: &[u8]) -> u32 {
    aligned_ref.iter().zip(aligned_query).filter(|(r, q)| r != q).count() as u32
}

/// 比对质量：p = score / (2 * read_len)，MAPQ = -10·log10(1 - p)，截断取整并封顶 60。
/// score < 0 或 p <= 0 时为 0，p >= 1 时直接封顶，不会产生 NaN。
pub fn mapping_quality(score: i32, read_len: usize) -> u8 {
    let max_possible = 2.0 * read_len as f64;
    if score < 0 || max_possible <= 0.0 {
        return 0;
    }
    let p = f64::from(score) / max_possible;
    if p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return MAX_MAPQ;
    }
    let q = -10.0 * (1.0 - p).log10();
    (q as u32).min(u32::from(MAX_MAPQ)) as u8
}
