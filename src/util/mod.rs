//! 字母表与 DNA 辅助函数

pub mod alphabet;
pub mod dna;

pub use alphabet::Alphabet;
