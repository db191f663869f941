/// DNA 字母表的规范符号，按字节序排列（N 位于 G 与 T 之间）
pub const SYMBOLS: &[u8] = b"ACGNT";

/// 规范化单个碱基：转大写，RNA 的 U 视为 T；其余字节原样返回
#[inline]
pub fn normalize_base(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'U' => b'T',
        up @ (b'A' | b'C' | b'G' | b'T' | b'N') => up,
        _ => b,
    }
}

pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| normalize_base(b)).collect()
}
