// kernel/src/monitor/mod.rs
//
// カーネルモニタ本体。
//
// 役割:
// - プロンプト "K> " で 1 行読み、コマンド表から引いたハンドラを実行するループ。
// - ハンドラに渡す文脈（MonitorCtx）をまとめる。
//
// やること:
// - 起動時のバナーとトラップフレームダンプ
// - Flow::Exit / Flow::Resume / 入力終端でループを抜け、理由を MonitorExit で返す
//
// やらないこと:
// - 実際の再開（env_run 相当）。呼び出し側（トラップ経路）が Trapframe を使って戻る。
// - 外部の資源の生成。Console / PhysMemory / Cpu / SymbolTable はすべて借りるだけ。

pub mod backtrace;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod info;
pub mod mappings;
pub mod parse;

use core::fmt::Write;

use crate::arch::trapframe::{print_trapframe, Trapframe};
use crate::arch::Cpu;
use crate::console::Console;
use crate::kdebug::SymbolTable;
use crate::mem::layout::KernelLayout;
use crate::mem::phys::PhysMemory;
use crate::mm::pgdir::PageDirectory;

pub use dispatch::{Command, Registry};
pub use error::MonitorError;

/// 1 行の最大長（VGA 1 行分）
pub const CMDBUF_SIZE: usize = 80;

/// ハンドラの結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// 次のコマンドへ
    Continue,
    /// モニタを抜ける
    Exit,
    /// トラップ元を再開する（Trapframe は書き換え済み）
    Resume,
}

/// モニタが終わった理由
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorExit {
    Exit,
    Resume,
    EndOfInput,
}

/// ハンドラが触れるもの一式
pub struct MonitorCtx<'a> {
    pub registry: &'a Registry<'a>,
    pub console: &'a mut dyn Console,
    pub mem: &'a mut dyn PhysMemory,
    pub cpu: &'a dyn Cpu,
    pub symbols: &'a dyn SymbolTable,
    pub layout: &'a KernelLayout,
}

impl MonitorCtx<'_> {
    /// 現在のアドレス空間（CR3）のページディレクトリ
    pub fn page_directory(&self) -> PageDirectory {
        PageDirectory::new(self.cpu.page_directory_root())
    }
}

pub struct Monitor<'a> {
    ctx: MonitorCtx<'a>,
}

impl<'a> Monitor<'a> {
    pub fn new(ctx: MonitorCtx<'a>) -> Self {
        Monitor { ctx }
    }

    pub fn ctx(&mut self) -> &mut MonitorCtx<'a> {
        &mut self.ctx
    }

    /// 入力が尽きるか、ハンドラが Exit / Resume を返すまで回る。
    pub fn run(&mut self, mut tf: Option<&mut Trapframe>) -> MonitorExit {
        if let Err(e) = self.banner(tf.as_deref()) {
            log::warn!("monitor: banner: {}", e);
        }

        let mut buf = [0u8; CMDBUF_SIZE];
        loop {
            let Some(line) = self.ctx.console.read_line("K> ", &mut buf) else {
                log::info!("monitor: end of console input");
                return MonitorExit::EndOfInput;
            };

            match dispatch::runcmd(&mut self.ctx, line, tf.as_deref_mut()) {
                Flow::Continue => {}
                Flow::Exit => return MonitorExit::Exit,
                Flow::Resume => return MonitorExit::Resume,
            }
        }
    }

    fn banner(&mut self, tf: Option<&Trapframe>) -> core::fmt::Result {
        let out = &mut *self.ctx.console;
        writeln!(out, "Welcome to the kernel monitor!")?;
        writeln!(out, "Type 'help' for a list of commands.")?;
        if let Some(tf) = tf {
            print_trapframe(out, tf)?;
        }
        Ok(())
    }
}
