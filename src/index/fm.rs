use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::sampled::SampledSa;
use crate::index::{bwt, sa};
use crate::util::alphabet::{Alphabet, SENTINEL};

/// 反向搜索无匹配时返回的空区间
pub const EMPTY_RANGE: (usize, usize) = (0, 0);

/// 索引构建参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOpt {
    /// Occ 检查点间隔：每隔多少个 BWT 位置保存一次全字母表累计计数
    pub checkpoint_interval: u32,
    /// 稀疏 SA 采样间隔：只保存 SA 值为其倍数的行
    pub sa_interval: u32,
}

impl Default for IndexOpt {
    fn default() -> Self {
        Self { checkpoint_interval: 5, sa_interval: 5 }
    }
}

impl IndexOpt {
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_interval == 0 {
            return Err(Error::InvalidInterval { name: "checkpoint_interval" });
        }
        if self.sa_interval == 0 {
            return Err(Error::InvalidInterval { name: "sa_interval" });
        }
        Ok(())
    }
}

/// FM 索引：
/// - 字母表编码为 [0..sigma)，0 为哨兵 $，文本末尾恰有一个哨兵。
/// - Occ 按固定间隔打检查点（行优先展平），查询时从最近检查点顺扫补偿。
/// - 稀疏 SA 只保存 SA 值为采样间隔倍数的行，其余行沿 LF 映射回溯定位。
///
/// 构建完成后不再修改，`&self` 上的查询可在多个线程间直接共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FMIndex {
    alphabet: Alphabet,
    /// C[c] = 文本中严格小于 c 的符号数量
    c: Vec<u32>,
    /// BWT 序列（与文本同长度）
    bwt: Vec<u8>,
    /// 检查点间隔
    block: u32,
    /// occ_samples[k * sigma + c] = bwt[0 .. k*block) 中 c 的出现次数
    occ_samples: Vec<u32>,
    sampled_sa: SampledSa,
    /// 编码后的文本（含末尾哨兵），用于截取候选参考窗口
    text: Vec<u8>,
}

impl FMIndex {
    /// 从参考序列构建索引。参考中的表外字节折叠为字母表通配符。
    pub fn from_reference(reference: &[u8], alphabet: Alphabet, opt: &IndexOpt) -> Result<Self> {
        opt.validate()?;
        if reference.len() >= u32::MAX as usize {
            return Err(Error::ReferenceTooLong(reference.len()));
        }

        let mut text = alphabet.encode_reference(reference);
        text.push(SENTINEL);

        info!("building suffix array: {} symbols (sigma={})", text.len(), alphabet.sigma());
        let sa_arr = sa::build_sa(&text);
        let fm = Self::build(text, &sa_arr, alphabet, opt)?;
        info!(
            "FM index ready: bwt_len={}, checkpoints={}, sampled_rows={}",
            fm.bwt.len(),
            fm.occ_samples.len() / fm.alphabet.sigma(),
            fm.sampled_sa.len()
        );
        Ok(fm)
    }

    /// 由编码文本与其后缀数组构建 BWT、C 表、Occ 检查点与稀疏 SA。
    pub fn build(text: Vec<u8>, sa: &[u32], alphabet: Alphabet, opt: &IndexOpt) -> Result<Self> {
        opt.validate()?;
        let n = text.len();
        let sigma = alphabet.sigma();
        debug_assert_eq!(sa.len(), n);
        debug_assert!(text.iter().all(|&ch| (ch as usize) < sigma));

        // 采样间隔大于文本长度时 LF 回溯没有意义，收紧到 n
        let mut sa_interval = opt.sa_interval;
        if n > 0 && sa_interval as usize > n {
            warn!("sa_interval {} exceeds text length {}, clamped", sa_interval, n);
            sa_interval = n as u32;
        }

        let bwt = bwt::build_bwt(&text, sa);

        // 计算 C 表
        let mut freq = vec![0u32; sigma];
        for &ch in &bwt {
            freq[ch as usize] += 1;
        }
        let mut c = vec![0u32; sigma];
        let mut acc = 0u32;
        for (slot, &f) in c.iter_mut().zip(&freq) {
            *slot = acc;
            acc += f;
        }

        // Occ 检查点：位置 0, block, 2*block, ... <= n
        let block = opt.checkpoint_interval as usize;
        let mut occ_samples = Vec::with_capacity((n / block + 1) * sigma);
        let mut running = vec![0u32; sigma];
        for i in 0..=n {
            if i % block == 0 {
                occ_samples.extend_from_slice(&running);
            }
            if i < n {
                running[bwt[i] as usize] += 1;
            }
        }

        let sampled_sa = SampledSa::build(sa, sa_interval);

        Ok(Self { alphabet, c, bwt, block: opt.checkpoint_interval, occ_samples, sampled_sa, text })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn bwt(&self) -> &[u8] {
        &self.bwt
    }

    pub fn c_table(&self) -> &[u32] {
        &self.c
    }

    pub fn checkpoints(&self) -> &[u32] {
        &self.occ_samples
    }

    pub fn checkpoint_interval(&self) -> u32 {
        self.block
    }

    pub fn sampled_sa(&self) -> &SampledSa {
        &self.sampled_sa
    }

    /// 文本长度（含哨兵）
    #[inline]
    pub fn len(&self) -> usize {
        self.bwt.len()
    }

    /// 参考序列长度（不含哨兵）
    #[inline]
    pub fn reference_len(&self) -> usize {
        self.text.len().saturating_sub(1)
    }

    /// 参考序列是否为空（索引中只有哨兵）
    pub fn is_empty(&self) -> bool {
        self.reference_len() == 0
    }

    /// 返回 BWT[0..pos) 中 c 的出现次数
    #[inline]
    pub fn rank(&self, c: u8, pos: usize) -> u32 {
        let sigma = self.alphabet.sigma();
        let block = self.block as usize;
        let k = pos / block;
        let base = self.occ_samples[k * sigma + c as usize];
        let add = self.bwt[k * block..pos].iter().filter(|&&ch| ch == c).count() as u32;
        base + add
    }

    /// LF 映射：行 row 对应后缀的前一个文本位置所在的行
    #[inline]
    pub fn lf(&self, row: usize) -> usize {
        let c = self.bwt[row];
        self.c[c as usize] as usize + self.rank(c, row) as usize
    }

    #[inline]
    pub fn rank_range(&self, c: u8, l: usize, r: usize) -> (usize, usize) {
        // 返回在区间 [l, r) 上向左扩展字符 c 后的新区间
        let c0 = self.c[c as usize] as usize;
        (c0 + self.rank(c, l) as usize, c0 + self.rank(c, r) as usize)
    }

    /// 反向搜索精确匹配，返回半开行区间 [top, bot)。
    ///
    /// `pat` 为编码后的模式；含哨兵、表外符号（如 `ABSENT`）或无匹配时返回 [`EMPTY_RANGE`]，
    /// 空模式同样返回空区间。
    pub fn backward_search(&self, pat: &[u8]) -> (usize, usize) {
        if pat.is_empty() {
            return EMPTY_RANGE;
        }
        let sigma = self.alphabet.sigma();
        let mut top = 0usize;
        let mut bot = self.bwt.len();
        for &a in pat.iter().rev() {
            if a == SENTINEL || a as usize >= sigma {
                return EMPTY_RANGE;
            }
            let (nt, nb) = self.rank_range(a, top, bot);
            if nt >= nb {
                return EMPTY_RANGE;
            }
            top = nt;
            bot = nb;
        }
        (top, bot)
    }

    /// 匹配次数
    pub fn count(&self, pat: &[u8]) -> usize {
        let (top, bot) = self.backward_search(pat);
        bot - top
    }

    /// 沿 LF 映射回溯到采样行，恢复该行的文本位置
    pub fn recover_offset(&self, row: usize) -> u32 {
        let n = self.bwt.len();
        let mut row = row;
        let mut steps = 0usize;
        loop {
            if let Some(pos) = self.sampled_sa.get(row) {
                return ((pos as usize + steps) % n) as u32;
            }
            row = self.lf(row);
            steps += 1;
            debug_assert!(steps <= n, "LF walk did not reach a sampled row");
        }
    }

    /// 取出 SA 区间内每一行对应的文本位置
    pub fn sa_interval_positions(&self, l: usize, r: usize) -> Vec<u32> {
        (l..r).map(|row| self.recover_offset(row)).collect()
    }

    /// 以原始字节查找模式的所有出现位置（升序）
    pub fn search(&self, pattern: &[u8]) -> Vec<u32> {
        let pat = self.alphabet.encode_pattern(pattern);
        let (l, r) = self.backward_search(&pat);
        let mut positions = self.sa_interval_positions(l, r);
        positions.sort_unstable();
        positions
    }

    /// 截取参考窗口 [start, start+len)，超出参考末尾的部分被截断，返回解码后的符号
    pub fn reference_window(&self, start: usize, len: usize) -> Vec<u8> {
        let ref_len = self.reference_len();
        let start = start.min(ref_len);
        let end = start.saturating_add(len).min(ref_len);
        self.text[start..end].iter().map(|&c| self.alphabet.decode(c)).collect()
    }

    /// 仅用 BWT 与 LF 映射还原参考序列（不含哨兵）
    pub fn reconstruct(&self) -> Vec<u8> {
        let n = self.bwt.len();
        if n == 0 {
            return Vec::new();
        }
        // 第 0 行是哨兵后缀，其 BWT 字符为参考的最后一个符号
        let mut out = vec![0u8; n - 1];
        let mut row = 0usize;
        for slot in out.iter_mut().rev() {
            let c = self.bwt[row];
            *slot = self.alphabet.decode(c);
            row = self.lf(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn build_test_fm(seq: &[u8], opt: IndexOpt) -> FMIndex {
        FMIndex::from_reference(seq, Alphabet::dna(), &opt).unwrap()
    }

    fn make_reference(len: usize, seed: u32) -> Vec<u8> {
        let bases = b"ACGT";
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                bases[(x >> 16) as usize % 4]
            })
            .collect()
    }

    fn brute_force(text: &[u8], pat: &[u8]) -> BTreeSet<u32> {
        if pat.is_empty() || pat.len() > text.len() {
            return BTreeSet::new();
        }
        (0..=text.len() - pat.len())
            .filter(|&i| &text[i..i + pat.len()] == pat)
            .map(|i| i as u32)
            .collect()
    }

    #[test]
    fn c_table_counts_smaller_symbols() {
        // ACGTACGT$：A=1 C=2 G=3 N=4 T=5
        let fm = build_test_fm(b"ACGTACGT", IndexOpt::default());
        assert_eq!(fm.c_table(), &[0, 1, 3, 5, 7, 7]);
        assert_eq!(fm.len(), 9);
        assert_eq!(fm.reference_len(), 8);
    }

    #[test]
    fn rank_matches_naive_count() {
        let reference = make_reference(97, 7);
        for block in [1u32, 3, 5, 64] {
            let fm = build_test_fm(&reference, IndexOpt { checkpoint_interval: block, sa_interval: 5 });
            for c in 0..fm.alphabet().sigma() as u8 {
                for pos in 0..=fm.len() {
                    let naive = fm.bwt()[..pos].iter().filter(|&&ch| ch == c).count() as u32;
                    assert_eq!(fm.rank(c, pos), naive, "block={} c={} pos={}", block, c, pos);
                }
            }
        }
    }

    #[test]
    fn backward_search_exact() {
        let fm = build_test_fm(b"ACGTACGT", IndexOpt::default());
        assert_eq!(fm.search(b"ACGT"), vec![0, 4]);
        assert_eq!(fm.search(b"GTA"), vec![2]);
        assert_eq!(fm.count(&fm.alphabet().encode_pattern(b"CG")), 2);
        assert!(fm.search(b"TT").is_empty());
    }

    #[test]
    fn backward_search_agrees_with_brute_force() {
        let reference = make_reference(400, 99);
        for sa_interval in [1u32, 4, 32] {
            let fm = build_test_fm(&reference, IndexOpt { checkpoint_interval: 5, sa_interval });
            for start in (0..380).step_by(7) {
                for len in [1usize, 3, 6, 11] {
                    let pat = &reference[start..start + len];
                    let got: BTreeSet<u32> = fm.search(pat).into_iter().collect();
                    assert_eq!(got, brute_force(&reference, pat), "pattern {:?}", pat);
                }
            }
            // 参考中不存在的模式
            let absent = b"ACGTACGTACGTACGTACGTACGT";
            assert_eq!(
                fm.search(absent).into_iter().collect::<BTreeSet<_>>(),
                brute_force(&reference, absent)
            );
        }
    }

    #[test]
    fn absent_symbols_give_empty_range() {
        let fm = build_test_fm(b"ACGTACGT", IndexOpt::default());
        let pat = fm.alphabet().encode_pattern(b"AC*T");
        assert_eq!(fm.backward_search(&pat), EMPTY_RANGE);
        // 字母表中有 N 但文本中没有
        assert_eq!(fm.backward_search(&fm.alphabet().encode_pattern(b"N")), EMPTY_RANGE);
        // 哨兵不参与匹配
        assert_eq!(fm.backward_search(&[SENTINEL]), EMPTY_RANGE);
        assert_eq!(fm.backward_search(&[]), EMPTY_RANGE);
    }

    #[test]
    fn empty_reference_answers_nothing() {
        let fm = build_test_fm(b"", IndexOpt::default());
        assert!(fm.is_empty());
        assert_eq!(fm.len(), 1);
        assert!(fm.search(b"A").is_empty());
        assert!(fm.reconstruct().is_empty());
        assert!(fm.reference_window(0, 10).is_empty());
    }

    #[test]
    fn recover_offset_matches_suffix_array() {
        let reference = make_reference(150, 3);
        let mut text = Alphabet::dna().encode_reference(&reference);
        text.push(SENTINEL);
        let sa_arr = sa::build_sa(&text);
        for sa_interval in [1u32, 2, 7, 16] {
            let opt = IndexOpt { checkpoint_interval: 4, sa_interval };
            let fm = FMIndex::build(text.clone(), &sa_arr, Alphabet::dna(), &opt).unwrap();
            for (row, &pos) in sa_arr.iter().enumerate() {
                assert_eq!(fm.recover_offset(row), pos, "row {} interval {}", row, sa_interval);
            }
        }
    }

    #[test]
    fn oversized_sa_interval_is_clamped() {
        let fm = build_test_fm(b"ACG", IndexOpt { checkpoint_interval: 5, sa_interval: 1000 });
        assert_eq!(fm.sampled_sa().interval(), 4);
        assert_eq!(fm.search(b"CG"), vec![1]);
        assert_eq!(fm.search(b"G"), vec![2]);
    }

    #[test]
    fn reconstruct_round_trip() {
        for len in [1usize, 2, 17, 256] {
            let reference = make_reference(len, len as u32);
            let fm = build_test_fm(&reference, IndexOpt::default());
            assert_eq!(fm.reconstruct(), reference);
        }
        // 小写与非 ACGT 字节被规范化
        let fm = build_test_fm(b"acgXt", IndexOpt::default());
        assert_eq!(fm.reconstruct(), b"ACGNT");
    }

    #[test]
    fn reference_window_is_clipped() {
        let fm = build_test_fm(b"ACGTACGT", IndexOpt::default());
        assert_eq!(fm.reference_window(2, 4), b"GTAC");
        assert_eq!(fm.reference_window(6, 10), b"GT");
        assert!(fm.reference_window(20, 3).is_empty());
    }

    #[test]
    fn build_is_deterministic() {
        let reference = make_reference(500, 11);
        let a = build_test_fm(&reference, IndexOpt::default());
        let b = build_test_fm(&reference, IndexOpt::default());
        assert_eq!(a.bwt(), b.bwt());
        assert_eq!(a.c_table(), b.c_table());
        assert_eq!(a.checkpoints(), b.checkpoints());
        assert_eq!(bincode::serialize(&a).unwrap(), bincode::serialize(&b).unwrap());
    }

    #[test]
    fn invalid_intervals_are_rejected() {
        let opt = IndexOpt { checkpoint_interval: 0, sa_interval: 5 };
        assert_eq!(
            FMIndex::from_reference(b"ACGT", Alphabet::dna(), &opt).unwrap_err(),
            Error::InvalidInterval { name: "checkpoint_interval" }
        );
        let opt = IndexOpt { checkpoint_interval: 5, sa_interval: 0 };
        assert!(FMIndex::from_reference(b"ACGT", Alphabet::dna(), &opt).is_err());
    }

    #[test]
    fn generic_alphabet_index() {
        let alpha = Alphabet::new(b"abcdefghijklmnopqrstuvwxyz").unwrap();
        let fm = FMIndex::from_reference(b"mississippi", alpha, &IndexOpt::default()).unwrap();
        assert_eq!(fm.search(b"ssi"), vec![2, 5]);
        assert_eq!(fm.search(b"i"), vec![1, 4, 7, 10]);
        assert!(fm.search(b"SSI").is_empty());
        assert_eq!(fm.reconstruct(), b"mississippi");
    }
}
