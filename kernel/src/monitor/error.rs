// kernel/src/monitor/error.rs
//
// コマンドが失敗したときの 1 行メッセージ。
// どれもモニタを止めない（ディスパッチャが表示してループを続ける）。

use thiserror::Error;

use crate::mem::addr::{PhysAddr, VirtAddr};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    // --- 引数 ---
    #[error("Not enough arguments")]
    NotEnoughArguments,

    #[error("Invalid arguments")]
    InvalidArguments,

    #[error("invalid number of parameters")]
    InvalidParameterCount,

    #[error("Too many arguments (max {max})")]
    TooManyArguments { max: usize },

    #[error("Illegal range")]
    IllegalRange,

    #[error("Illegal address")]
    IllegalAddress,

    #[error("Invalid permissions: '{0}'")]
    InvalidPermission(char),

    #[error("Not a valid operation")]
    InvalidOperation,

    #[error("Invalid type")]
    InvalidType,

    // --- 参照 ---
    #[error("{0:x}: Page not found")]
    PageNotFound(VirtAddr),

    #[error("{0:x}: outside physical memory")]
    PhysOutOfRange(PhysAddr),

    #[error("{0:x}: stack unreadable")]
    StackUnreadable(VirtAddr),

    #[error("{0:08x}: no symbol information")]
    SymbolNotFound(u32),

    #[error("backtrace stopped after {0} frames")]
    BacktraceTooDeep(usize),

    // --- 再開 ---
    #[error("{0} error.")]
    NoTrapContext(&'static str),

    #[error("console write failed")]
    Console(#[from] core::fmt::Error),
}

pub type Result<T> = core::result::Result<T, MonitorError>;
