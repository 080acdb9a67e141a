// kernel/src/lib.rs
//
// kmonitor: 32bit x86 教育用カーネルに組み込む対話モニタ
//
// 役割:
// - "K> " プロンプトから、現在のアドレス空間のページテーブルを読む / 書き換える、
//   メモリをダンプする、スタックを辿る、トラップ元を再開するコマンドを提供する。
//
// 構成:
// - types / mem: アドレスの型、PTE のビット表現、物理メモリ境界
// - mm: ページテーブル walker と物理フレームアロケータ
// - monitor: コマンド表、ディスパッチャ、各コマンド
// - console / kdebug / arch: モニタが借りる協調オブジェクトの trait
// - logging / kernel / panic: 実機（target_os = "none"）向けの glue
//
// 方針:
// - モニタ本体は trait 越しにしか機械に触らないので、ホストでそのままテストできる。
// - 任意アドレスの参照外しは mem::phys::KernelPhysMemory だけ。

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod console;
pub mod kdebug;
pub mod logging;
pub mod mem;
pub mod mm;
pub mod monitor;
pub mod types;

#[cfg(target_os = "none")]
pub mod kernel;

#[cfg(all(target_os = "none", feature = "panic_handler"))]
mod panic;

#[cfg(test)]
mod testing;

pub use monitor::{Flow, Monitor, MonitorCtx, MonitorError, MonitorExit};
