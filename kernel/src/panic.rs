// kernel/src/panic.rs
//
// no_std カーネル用 panic ハンドラ（feature = "panic_handler" のときだけ）。
// - "kernel panic at file:line: message" を COM1 に 1 行出して止まる。
// - COM1 の書き込みはロックを取らないので、logger や console の途中で panic しても出せる。
// - 二重 panic は何も出さずに止まる。

use core::fmt::Write;
use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch;
use crate::logging::serial::{self, SerialWriter};

static PANIC_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    arch::cpu::disable_interrupts();

    if PANIC_IN_PROGRESS.swap(true, Ordering::AcqRel) {
        arch::halt_loop();
    }

    serial::init();
    let mut out = SerialWriter;
    let _ = match info.location() {
        Some(loc) => writeln!(out, "kernel panic at {}:{}: {}", loc.file(), loc.line(), info.message()),
        None => writeln!(out, "kernel panic: {}", info.message()),
    };

    arch::halt_loop()
}
