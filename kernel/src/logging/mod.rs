// kernel/src/logging/mod.rs
//
// 役割:
// - log facade のバックエンド（KernelLogger）。COM1 に 1 行ずつ出す。vga_mirror なら VGA にも。
// - 行の整形（write_record）はハードウェアに依存しないのでホストでもテストする。
//
// やらないこと:
// - バッファリング / 非同期出力（モニタは停止中のマシン上で動く）

#[cfg(target_os = "none")]
pub mod serial;
#[cfg(target_os = "none")]
pub mod vga;

use core::fmt;

use log::{Level, Record};

pub fn level_prefix(level: Level) -> &'static str {
    match level {
        Level::Error => "[ERROR] ",
        Level::Warn => "[WARN] ",
        Level::Info => "[INFO] ",
        Level::Debug => "[DEBUG] ",
        Level::Trace => "[TRACE] ",
    }
}

/// `[INFO] message` + 改行
pub fn write_record<W: fmt::Write>(w: &mut W, record: &Record<'_>) -> fmt::Result {
    w.write_str(level_prefix(record.level()))?;
    w.write_fmt(*record.args())?;
    w.write_str("\n")
}

#[cfg(target_os = "none")]
pub use self::kernel::init;

#[cfg(target_os = "none")]
mod kernel {
    use log::{LevelFilter, Metadata, Record};

    use super::{serial, vga, write_record};

    struct KernelLogger;

    static LOGGER: KernelLogger = KernelLogger;

    impl log::Log for KernelLogger {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record<'_>) {
            if !self.enabled(record.metadata()) {
                return;
            }
            // 出力先が壊れていても呼び出し側には返さない
            let _ = write_record(&mut serial::SerialWriter, record);
            if cfg!(feature = "vga_mirror") {
                vga::with_writer(|w| {
                    let _ = write_record(w, record);
                });
            }
        }

        fn flush(&self) {}
    }

    /// シリアル / VGA を初期化して logger を登録する。2 回目以降は何もしない。
    pub fn init(level: LevelFilter) {
        vga::init();
        serial::init();
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }

}
