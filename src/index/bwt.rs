/// 根据后缀数组构建 BWT：`bwt[i] = text[(sa[i] - 1) mod n]`。
/// 每个文本符号在 BWT 中恰好出现一次。
pub fn build_bwt(text: &[u8], sa: &[u32]) -> Vec<u8> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    sa.iter()
        .map(|&p| {
            let i = p as usize;
            text[if i == 0 { n - 1 } else { i - 1 }]
        })
        .collect()
}
