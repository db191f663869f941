use thiserror::Error;

/// crate 统一的 Result 别名
pub type Result<T> = std::result::Result<T, Error>;

/// 索引构建与比对过程中的错误。
///
/// 空匹配区间与“无种子命中”不属于错误，分别以空区间 `(0, 0)` 与 `Ok(None)` 表示。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// 字母表中没有任何符号
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    /// 使用了保留字节（`$` 哨兵或 `-` 空位）
    #[error("symbol {0:?} is reserved and cannot be part of an alphabet")]
    ReservedSymbol(char),

    /// 通配符不在字母表中
    #[error("wildcard {0:?} is not a symbol of the alphabet")]
    InvalidWildcard(char),

    /// 采样间隔为 0
    #[error("{name} must be at least 1")]
    InvalidInterval { name: &'static str },

    /// 参考序列长度超出 u32 位置编码范围
    #[error("reference of length {0} does not fit 32-bit positions")]
    ReferenceTooLong(usize),

    /// 打分参数非法
    #[error("invalid scoring: {0}")]
    InvalidScoring(String),

    /// 种子长度为 0
    #[error("seed length must be at least 1")]
    ZeroSeedLength,

    /// 种子长度大于 read 长度
    #[error("seed length {k} exceeds read length {read_len}")]
    SeedLongerThanRead { k: usize, read_len: usize },

    /// 参与比对的序列为空
    #[error("{0} sequence is empty")]
    EmptySequence(&'static str),

    /// 候选窗口之间检查到截止时间已过
    #[error("deadline exceeded after {visited} of {total} candidate windows")]
    DeadlineExceeded { visited: usize, total: usize },
}

impl Error {
    /// 是否为单条 read 的运行期结果（可重试或跳过）。
    ///
    /// 种子长度、空序列与打分参数的问题属于调用约定错误，`align_read` 立即返回；
    /// `align_batch` 同样把它们放在对应 read 的位置上，由调用方决定是否中止整批。
    pub fn is_per_read(&self) -> bool {
        matches!(self, Error::DeadlineExceeded { .. })
    }
}
