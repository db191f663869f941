//! # fmalign
//!
//! 基于 FM 索引的种子-延伸短读比对核心。
//!
//! - **索引构建**：前缀倍增后缀数组 -> BWT -> FM 索引（Occ 检查点 + 稀疏 SA）
//! - **种子查找**：对 read 的每个 k-mer 做反向搜索，恢复全部精确命中位置
//! - **序列比对**：Gotoh 三矩阵仿射间隙比对，迭代回溯得到比对串
//! - **打分**：选出最佳候选窗口，生成 CIGAR、NM 与 MAPQ
//!
//! 索引构建后只读，可在多个线程间共享；DP 缓冲区按线程/调用分配。
//! FASTA/FASTQ 解析与命令行不在本 crate 范围内。
//!
//! ## 快速示例
//!
//! ```rust
//! use fmalign::align::{align_read, AlignOpt};
//! use fmalign::index::build_index;
//!
//! let fm = build_index(b"TTGACCATGACGTAGCTAGGCTTAACG").unwrap();
//! assert_eq!(fm.search(b"GACG"), vec![8]);
//!
//! let opt = AlignOpt { seed_len: 5, ..AlignOpt::default() };
//! let rec = align_read(&fm, b"CATGACTTAGCT", &opt).unwrap().expect("seeded");
//! assert_eq!(rec.offset, 5);
//! assert_eq!(rec.cigar, "12M");
//! assert_eq!(rec.nm, 1);
//! ```
//!
//! ## 模块说明
//!
//! - [`index`] — 后缀数组、BWT、FM 索引与稀疏 SA
//! - [`align`] — k-mer 种子、仿射间隙比对、候选打分
//! - [`util`] — 字母表编码与 DNA 规范化
//! - [`error`] — 错误类型

pub mod align;
pub mod error;
pub mod index;
pub mod util;

pub use error::{Error, Result};
