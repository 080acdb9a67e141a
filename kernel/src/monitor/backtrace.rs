// kernel/src/monitor/backtrace.rs
//
// 役割:
// - 現在の EBP から保存 EBP の連鎖を辿り、フレームごとに eip と引数 5 語、シンボルを表示する。
//
// スタックフレーム（cdecl, 32bit）:
//   ebp + 0  : 呼び出し元の ebp
//   ebp + 4  : 戻り先 eip
//   ebp + 8..: 引数
//
// 方針:
// - スタックはページテーブル越しに読む。読めない語があればそこで止めてエラーにする。
// - シンボルが引けない eip に当たったら止める（行は出した後）。
// - 連鎖が循環していても止まるよう、深さに上限を置く。

use core::fmt::Write;

use crate::arch::trapframe::Trapframe;
use crate::mem::addr::VirtAddr;
use crate::mem::phys::PhysMemory;
use crate::mm::pgdir::PageDirectory;

use super::error::{MonitorError, Result};
use super::{Flow, MonitorCtx};

pub const MAX_BACKTRACE_DEPTH: usize = 64;

const NARGS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StackFrame {
    ebp: u32,
    saved_ebp: u32,
    eip: u32,
    args: [u32; NARGS],
}

impl StackFrame {
    fn read(pgdir: &PageDirectory, mem: &dyn PhysMemory, ebp: u32) -> Result<Self> {
        let word = |index: u32| {
            let va = ebp.checked_add(index * 4).map(VirtAddr);
            va.and_then(|va| pgdir.read_virt_u32(mem, va))
                .ok_or(MonitorError::StackUnreadable(VirtAddr(ebp.wrapping_add(index * 4))))
        };

        let mut args = [0u32; NARGS];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = word(2 + i as u32)?;
        }
        Ok(StackFrame {
            ebp,
            saved_ebp: word(0)?,
            eip: word(1)?,
            args,
        })
    }
}

pub fn mon_backtrace(ctx: &mut MonitorCtx<'_>, _argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    writeln!(ctx.console, "Stack backtrace:")?;

    let pgdir = ctx.page_directory();
    let mut ebp = ctx.cpu.frame_pointer();
    let mut depth = 0;

    while ebp != 0 {
        if depth == MAX_BACKTRACE_DEPTH {
            return Err(MonitorError::BacktraceTooDeep(depth));
        }
        let frame = StackFrame::read(&pgdir, &*ctx.mem, ebp)?;
        let [a0, a1, a2, a3, a4] = frame.args;
        writeln!(
            ctx.console,
            "ebp {:08x}  eip {:08x}  args {:08x} {:08x} {:08x} {:08x} {:08x}",
            frame.ebp, frame.eip, a0, a1, a2, a3, a4
        )?;

        let info = ctx
            .symbols
            .debuginfo_eip(frame.eip)
            .ok_or(MonitorError::SymbolNotFound(frame.eip))?;
        writeln!(
            ctx.console,
            "\t{}:{}: {}+{}",
            info.file,
            info.line,
            info.fn_name,
            info.offset(frame.eip)
        )?;

        ebp = frame.saved_ebp;
        depth += 1;
    }
    Ok(Flow::Continue)
}
