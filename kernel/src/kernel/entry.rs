// kernel/src/kernel/entry.rs
//
// 役割:
// - トラップ経路（またはブート直後のカーネル）からモニタに入る入口。
// - ハードウェア版の協調オブジェクト（SerialConsole / KernelPhysMemory / HardwareCpu）を作り、
//   組み込みコマンド表でモニタを回す。
//
// やること:
// - logging の初期化（2 回目以降は何もしない）
// - モニタ終了理由（MonitorExit）をそのまま返す
//
// やらないこと:
// - Trapframe からの復帰（iret）。Resume を受けた呼び出し側が行う。

use log::LevelFilter;

use crate::arch::trapframe::Trapframe;
use crate::arch::HardwareCpu;
use crate::console::SerialConsole;
use crate::kdebug::SymbolTable;
use crate::logging;
use crate::mem::layout::KernelLayout;
use crate::mem::phys::KernelPhysMemory;
use crate::monitor::{Monitor, MonitorCtx, MonitorExit, Registry};

/// モニタに入る。
///
/// - tf: トラップから来たなら退避済みのレジスタ。c / si はこれを書き換えて Resume を返す。
/// - npages: 物理メモリのページ数
///
/// # Safety
/// - 物理 [0, npages * PAGE_SIZE) が KERNBASE 直マップとして現在の CR3 に張られていること。
/// - 他の CPU / 割り込みハンドラがページテーブルを同時に触らないこと。
pub unsafe fn enter_monitor(
    tf: Option<&mut Trapframe>,
    npages: u32,
    symbols: &dyn SymbolTable,
    layout: &KernelLayout,
) -> MonitorExit {
    logging::init(LevelFilter::Info);
    log::info!("monitor: enter (npages={}, trap={})", npages, tf.is_some());

    let mut mem = KernelPhysMemory::new(npages);
    let mut console = SerialConsole::new();
    let cpu = HardwareCpu;
    let registry = Registry::builtin();

    let ctx = MonitorCtx {
        registry: &registry,
        console: &mut console,
        mem: &mut mem,
        cpu: &cpu,
        symbols,
        layout,
    };
    let exit = Monitor::new(ctx).run(tf);

    log::info!("monitor: leave ({:?})", exit);
    exit
}
