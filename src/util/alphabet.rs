use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::dna;

/// 哨兵 $ 的编码，小于所有字母
pub const SENTINEL: u8 = 0;
/// 模式串中不属于字母表的符号的编码；反向搜索遇到它直接返回空区间
pub const ABSENT: u8 = u8::MAX;
/// 比对结果中的空位符号
pub const GAP: u8 = b'-';

const SENTINEL_BYTE: u8 = b'$';

/// 任意字节字母表及其秩函数。
///
/// 符号按字节序排序后依次编码为 1..sigma，0 预留给哨兵，
/// 因此编码序与原始字节序一致，后缀数组的顺序即原文本的字典序。
/// 参考序列中出现的表外字节一律折叠为通配符（默认取最后一个符号，DNA 为 N），
/// 所以建索引不会因序列内容失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<u8>,
    /// 256 项查找表：字节 -> 编码，表外为 ABSENT
    codes: Vec<u8>,
    wildcard: u8,
}

impl Alphabet {
    pub fn new(symbols: &[u8]) -> Result<Self> {
        let mut sorted = symbols.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        if let Some(&b) = sorted.iter().find(|&&b| b == SENTINEL_BYTE || b == GAP) {
            return Err(Error::ReservedSymbol(char::from(b)));
        }
        let wildcard = sorted.len() as u8;
        Ok(Self::from_sorted(sorted, wildcard))
    }

    /// DNA 字母表 ACGTN：大小写不敏感，U 视为 T，通配符为 N
    pub fn dna() -> Self {
        let mut alpha = Self::from_sorted(dna::SYMBOLS.to_vec(), 0);
        alpha.wildcard = alpha.codes[b'N' as usize];
        for b in 0..=u8::MAX {
            let canon = dna::normalize_base(b);
            if canon != b {
                alpha.codes[b as usize] = alpha.codes[canon as usize];
            }
        }
        alpha
    }

    /// 指定通配符（必须是字母表中的符号）
    pub fn with_wildcard(mut self, symbol: u8) -> Result<Self> {
        match self.encode(symbol) {
            Some(code) => {
                self.wildcard = code;
                Ok(self)
            }
            None => Err(Error::InvalidWildcard(char::from(symbol))),
        }
    }

    fn from_sorted(symbols: Vec<u8>, wildcard: u8) -> Self {
        let mut codes = vec![ABSENT; 256];
        for (i, &b) in symbols.iter().enumerate() {
            codes[b as usize] = (i + 1) as u8;
        }
        Self { symbols, codes, wildcard }
    }

    /// 字母表大小（含哨兵）
    #[inline]
    pub fn sigma(&self) -> usize {
        self.symbols.len() + 1
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn wildcard(&self) -> u8 {
        self.decode(self.wildcard)
    }

    #[inline]
    pub fn encode(&self, b: u8) -> Option<u8> {
        match self.codes[b as usize] {
            ABSENT => None,
            code => Some(code),
        }
    }

    #[inline]
    pub fn decode(&self, code: u8) -> u8 {
        if code == SENTINEL {
            return SENTINEL_BYTE;
        }
        self.symbols.get(code as usize - 1).copied().unwrap_or(b'?')
    }

    /// 规范化字节：字母表内符号返回其规范形式，表外字节原样返回
    #[inline]
    pub fn canonical(&self, b: u8) -> u8 {
        match self.encode(b) {
            Some(code) => self.decode(code),
            None => b,
        }
    }

    /// 编码参考序列，表外字节折叠为通配符（不含哨兵）
    pub fn encode_reference(&self, seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|&b| self.encode(b).unwrap_or(self.wildcard)).collect()
    }

    /// 编码查询模式，表外字节编码为 ABSENT
    pub fn encode_pattern(&self, seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|&b| self.codes[b as usize]).collect()
    }
}
