// kernel/src/kernel/mod.rs
//
// 実機（target_os = "none"）でモニタを起動するための glue。
// - entry: ハードウェア版の Console / PhysMemory / Cpu を組み立ててモニタに渡す

pub mod entry;

pub use entry::enter_monitor;
