use crate::error::{Error, Result};
use crate::util::alphabet::GAP;

const NEG_INF: i32 = i32::MIN / 4;
/// DP 中任一有限得分的绝对值上界；NEG_INF 再减去罚分仍不会溢出
const SCORE_LIMIT: i64 = (i32::MAX / 8) as i64;

/// 仿射间隙打分：长度为 L 的连续空位代价为 gap_open + (L-1) * gap_extend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffineParams {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl AffineParams {
    pub fn validate(&self) -> Result<()> {
        if self.match_score <= 0 {
            return Err(Error::InvalidScoring(format!("match score must be positive, got {}", self.match_score)));
        }
        for (name, v) in [
            ("mismatch penalty", self.mismatch_penalty),
            ("gap open", self.gap_open),
            ("gap extend", self.gap_extend),
        ] {
            if v < 0 {
                return Err(Error::InvalidScoring(format!("{} must not be negative, got {}", name, v)));
            }
        }
        Ok(())
    }

    /// m×n 的比对中每一列的得分变化不超过最大的一项参数，路径最多 m+n 列
    fn check_range(&self, m: usize, n: usize) -> Result<()> {
        let step = self.match_score.max(self.mismatch_penalty).max(self.gap_open).max(self.gap_extend);
        let bound = (m as i64 + n as i64)
            .saturating_mul(i64::from(step))
            .saturating_add(i64::from(self.gap_open));
        if bound > SCORE_LIMIT {
            return Err(Error::InvalidScoring(format!(
                "scores of a {}x{} alignment may reach {}, limit is {}",
                m, n, bound, SCORE_LIMIT
            )));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct AffineAlignment {
    pub score: i32,
    /// 比对后的参考串，空位为 `-`
    pub aligned_ref: Vec<u8>,
    /// 比对后的查询串，空位为 `-`
    pub aligned_query: Vec<u8>,
}

/// lower / upper 矩阵的回溯指针
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GapStep {
    Extend,
    Open,
}

/// middle 矩阵的回溯指针；取值相同时按 FromLower、FromUpper、Diagonal 的顺序取先者
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MiddleStep {
    FromLower,
    FromUpper,
    Diagonal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Lower,
    Upper,
    Middle,
}

/// DP 工作缓冲区，可跨调用复用（每个线程持有一份）
pub struct AffineBuffer {
    lower: Vec<i32>,
    upper: Vec<i32>,
    middle: Vec<i32>,
    lower_bt: Vec<GapStep>,
    upper_bt: Vec<GapStep>,
    middle_bt: Vec<MiddleStep>,
}

impl Default for AffineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AffineBuffer {
    pub fn new() -> Self {
        Self {
            lower: Vec::new(),
            upper: Vec::new(),
            middle: Vec::new(),
            lower_bt: Vec::new(),
            upper_bt: Vec::new(),
            middle_bt: Vec::new(),
        }
    }

    fn resize(&mut self, cells: usize, bt_cells: usize) {
        self.lower.clear();
        self.lower.resize(cells, NEG_INF);
        self.upper.clear();
        self.upper.resize(cells, NEG_INF);
        self.middle.clear();
        self.middle.resize(cells, NEG_INF);
        self.lower_bt.clear();
        self.lower_bt.resize(bt_cells, GapStep::Open);
        self.upper_bt.clear();
        self.upper_bt.resize(bt_cells, GapStep::Open);
        self.middle_bt.clear();
        self.middle_bt.resize(bt_cells, MiddleStep::Diagonal);
    }
}

/// Gotoh 三矩阵仿射间隙全局比对：reference 为候选参考窗口 s，query 为 read t。
pub fn affine_align(reference: &[u8], query: &[u8], p: AffineParams) -> Result<AffineAlignment> {
    affine_align_with_buf(reference, query, p, &mut AffineBuffer::new())
}

/// 同 [`affine_align`]，使用调用方提供的缓冲区。
///
/// lower 记录“只消耗 s 的字符”（t 中空位），upper 记录“只消耗 t 的字符”（s 中空位），
/// middle 为对齐字符对或关闭任一空位状态。回溯用显式循环完成，深度不受 read 长度限制。
pub fn affine_align_with_buf(
    reference: &[u8],
    query: &[u8],
    p: AffineParams,
    buf: &mut AffineBuffer,
) -> Result<AffineAlignment> {
    p.validate()?;
    if reference.is_empty() {
        return Err(Error::EmptySequence("reference"));
    }
    if query.is_empty() {
        return Err(Error::EmptySequence("query"));
    }

    let m = reference.len();
    let n = query.len();
    p.check_range(m, n)?;
    let cols = n + 1;
    buf.resize((m + 1) * cols, m * n);

    // 边界：首行首列只能由一段空位到达，原点不计空位
    buf.middle[0] = 0;
    for i in 1..=m {
        buf.middle[i * cols] = -(p.gap_open + (i as i32 - 1) * p.gap_extend);
    }
    for j in 1..=n {
        buf.middle[j] = -(p.gap_open + (j as i32 - 1) * p.gap_extend);
    }

    for i in 1..=m {
        for j in 1..=n {
            let idx = i * cols + j;
            let up_idx = (i - 1) * cols + j;
            let left_idx = idx - 1;
            let diag_idx = up_idx - 1;
            let bt = (i - 1) * n + (j - 1);

            let ext = buf.lower[up_idx] - p.gap_extend;
            let open = buf.middle[up_idx] - p.gap_open;
            if ext >= open {
                buf.lower[idx] = ext;
                buf.lower_bt[bt] = GapStep::Extend;
            } else {
                buf.lower[idx] = open;
                buf.lower_bt[bt] = GapStep::Open;
            }

            let ext = buf.upper[left_idx] - p.gap_extend;
            let open = buf.middle[left_idx] - p.gap_open;
            if ext >= open {
                buf.upper[idx] = ext;
                buf.upper_bt[bt] = GapStep::Extend;
            } else {
                buf.upper[idx] = open;
                buf.upper_bt[bt] = GapStep::Open;
            }

            let subst = if reference[i - 1] == query[j - 1] {
                p.match_score
            } else {
                -p.mismatch_penalty
            };
            let diag = buf.middle[diag_idx] + subst;

            let mut best = buf.lower[idx];
            let mut step = MiddleStep::FromLower;
            if buf.upper[idx] > best {
                best = buf.upper[idx];
                step = MiddleStep::FromUpper;
            }
            if diag > best {
                best = diag;
                step = MiddleStep::Diagonal;
            }
            buf.middle[idx] = best;
            buf.middle_bt[bt] = step;
        }
    }

    let last = m * cols + n;
    let score = buf.lower[last].max(buf.middle[last]).max(buf.upper[last]);

    let (aligned_ref, aligned_query) = backtrack(reference, query, buf);
    Ok(AffineAlignment { score, aligned_ref, aligned_query })
}

fn backtrack(reference: &[u8], query: &[u8], buf: &AffineBuffer) -> (Vec<u8>, Vec<u8>) {
    let n = query.len();
    let cap = reference.len() + n;
    let mut ref_out = Vec::with_capacity(cap);
    let mut query_out = Vec::with_capacity(cap);

    // 回溯指针矩阵下标（0 起），从右下角的 middle 状态开始
    let mut i = reference.len() as isize - 1;
    let mut j = n as isize - 1;
    let mut state = State::Middle;

    while i >= 0 && j >= 0 {
        let (iu, ju) = (i as usize, j as usize);
        let bt = iu * n + ju;
        match state {
            State::Middle => match buf.middle_bt[bt] {
                MiddleStep::FromLower => state = State::Lower,
                MiddleStep::FromUpper => state = State::Upper,
                MiddleStep::Diagonal => {
                    ref_out.push(reference[iu]);
                    query_out.push(query[ju]);
                    i -= 1;
                    j -= 1;
                }
            },
            State::Lower => {
                ref_out.push(reference[iu]);
                query_out.push(GAP);
                if buf.lower_bt[bt] == GapStep::Open {
                    state = State::Middle;
                }
                i -= 1;
            }
            State::Upper => {
                ref_out.push(GAP);
                query_out.push(query[ju]);
                if buf.upper_bt[bt] == GapStep::Open {
                    state = State::Middle;
                }
                j -= 1;
            }
        }
    }

    // 一侧耗尽后，另一侧剩余字符对空位
    while i >= 0 {
        ref_out.push(reference[i as usize]);
        query_out.push(GAP);
        i -= 1;
    }
    while j >= 0 {
        ref_out.push(GAP);
        query_out.push(query[j as usize]);
        j -= 1;
    }

    ref_out.reverse();
    query_out.reverse();
    (ref_out, query_out)
}
