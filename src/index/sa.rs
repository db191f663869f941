/// 构建后缀数组（前缀倍增法，O(n log² n)）。
///
/// 输入为编码后的文本，编码值即秩函数（0 为哨兵 $）。
/// 初始按 (text[i], text[i+1]) 二元组排序，此后每轮把比较长度翻倍：
/// 先把相同键的后缀压成稠密秩，再取 i + len 处后缀的秩作为次键（越界记 -1）重新排序，
/// 直到所有秩互不相同或比较长度覆盖全文。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sa: Vec<u32> = (0..n as u32).collect();
    let mut keys: Vec<(i64, i64)> = (0..n)
        .map(|i| {
            let next = if i + 1 < n { text[i + 1] as i64 } else { -1 };
            (text[i] as i64, next)
        })
        .collect();
    sa.sort_unstable_by_key(|&i| keys[i as usize]);

    let mut rank: Vec<i64> = vec![0; n];
    let mut len = 2usize;
    loop {
        // 相同键的后缀共享秩
        rank[sa[0] as usize] = 0;
        for w in 1..n {
            let prev = sa[w - 1] as usize;
            let cur = sa[w] as usize;
            rank[cur] = rank[prev] + i64::from(keys[cur] != keys[prev]);
        }
        if rank[sa[n - 1] as usize] as usize == n - 1 || len >= n {
            break;
        }

        for (i, key) in keys.iter_mut().enumerate() {
            let next = if i + len < n { rank[i + len] } else { -1 };
            *key = (rank[i], next);
        }
        sa.sort_unstable_by_key(|&i| keys[i as usize]);
        len <<= 1;
    }

    sa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_sa(text: &[u8]) -> Vec<u32> {
        let n = text.len();
        let mut suffixes: Vec<(usize, &[u8])> = (0..n).map(|i| (i, &text[i..])).collect();
        suffixes.sort_by(|a, b| a.1.cmp(b.1));
        suffixes.into_iter().map(|(i, _)| i as u32).collect()
    }

    fn make_text(len: usize, sigma: u32) -> Vec<u8> {
        let mut x: u32 = 1_234_567;
        let mut v = Vec::with_capacity(len);
        for _ in 0..len {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            v.push(((x >> 16) % sigma) as u8 + 1);
        }
        v.push(0);
        v
    }

    #[test]
    fn sa_basic() {
        // 文本：A C G T $ -> 1 2 3 4 0
        let text = [1u8, 2, 3, 4, 0];
        assert_eq!(build_sa(&text), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn sa_empty_text() {
        assert!(build_sa(&[]).is_empty());
    }

    #[test]
    fn sa_matches_naive_on_small_random_texts() {
        for sigma in [2u32, 4, 26] {
            for len in 0..=40 {
                let text = make_text(len, sigma);
                assert_eq!(build_sa(&text), naive_sa(&text), "mismatch on len={} sigma={}", len, sigma);
            }
        }
    }

    #[test]
    fn sa_handles_runs_without_sentinel() {
        // 没有唯一哨兵时也要靠越界 -1 区分不同长度的后缀
        let text = [3u8; 17];
        let sa = build_sa(&text);
        let expected: Vec<u32> = (0..17).rev().collect();
        assert_eq!(sa, expected);
    }

    #[test]
    fn sa_is_sorted_permutation() {
        let text = make_text(300, 4);
        let sa = build_sa(&text);
        let mut seen = vec![false; text.len()];
        for &p in &sa {
            assert!(!seen[p as usize]);
            seen[p as usize] = true;
        }
        for w in sa.windows(2) {
            assert!(text[w[0] as usize..] <= text[w[1] as usize..]);
        }
    }
}
