//! FM 索引构建：后缀数组 -> BWT -> FM 索引（Occ 检查点 + 稀疏 SA）

pub mod bwt;
pub mod fm;
pub mod sa;
pub mod sampled;

pub use fm::{FMIndex, IndexOpt, EMPTY_RANGE};

use crate::error::Result;
use crate::util::Alphabet;

/// 以 DNA 字母表与默认参数为参考序列建索引
pub fn build_index(reference: &[u8]) -> Result<FMIndex> {
    FMIndex::from_reference(reference, Alphabet::dna(), &IndexOpt::default())
}
