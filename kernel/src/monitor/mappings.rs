// kernel/src/monitor/mappings.rs
//
// 役割:
// - showmappings: [start, end) のページごとにフレームと権限を表示する（読むだけ）
// - modifyperm: 1 ページの PTE の W/U を set / clear / change する
//
// 不変条件:
// - どちらもページテーブルを新しく作らない（walk に allocator を渡さない）
// - PRESENT でない PTE は「無い」として扱い、書き換えない
// - TLB は flush しない。反映はトラップから戻るときのカーネルに任せる。

use core::fmt::Write;

use crate::arch::trapframe::Trapframe;
use crate::mem::addr::VirtAddr;
use crate::mem::paging::{parse_perm, PermOp, PteFlags};
use crate::types::PAGE_SIZE;

use super::error::{MonitorError, Result};
use super::parse::{parse_nonzero_hex, parse_range};
use super::{Flow, MonitorCtx};

/// `showmappings start end`
pub fn mon_showmappings(ctx: &mut MonitorCtx<'_>, argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    if argv.len() < 3 {
        return Err(MonitorError::NotEnoughArguments);
    }
    let (start, end) = parse_range(argv[1], argv[2])?;
    let pgdir = ctx.page_directory();

    writeln!(ctx.console, "virtual addr             frame addr        permissions")?;

    let mut va = Some(VirtAddr(start));
    while let Some(cur) = va.filter(|v| v.0 < end) {
        match pgdir.translate(&*ctx.mem, cur) {
            Some(t) => {
                write!(ctx.console, "0x{:x}\t 0x{:x}\t\t", cur, t.pte.frame_addr())?;
                let flags = t.pte.flags();
                for (bit, label) in [
                    (PteFlags::PRESENT, "PTE_P "),
                    (PteFlags::WRITABLE, "PTE_W "),
                    (PteFlags::USER, "PTE_U "),
                ] {
                    if flags.contains(bit) {
                        ctx.console.write_str(label)?;
                    }
                }
                writeln!(ctx.console)?;
            }
            None => writeln!(ctx.console, "0x{:x}\t Page unmapped", cur)?,
        }
        va = cur.checked_add(PAGE_SIZE);
    }
    Ok(Flow::Continue)
}

/// `modifyperm set|clear|change va [wu]`
pub fn mon_modifyperm(ctx: &mut MonitorCtx<'_>, argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    if argv.len() < 3 {
        return Err(MonitorError::NotEnoughArguments);
    }
    let va = VirtAddr(parse_nonzero_hex(argv[2]).ok_or(MonitorError::IllegalAddress)?);
    let perm = match argv.get(3) {
        Some(p) => parse_perm(p).map_err(MonitorError::InvalidPermission)?,
        None => PteFlags::empty(),
    };
    let op = PermOp::parse(argv[1]).ok_or(MonitorError::InvalidOperation)?;

    let pgdir = ctx.page_directory();
    let slot = pgdir
        .lookup(&*ctx.mem, va)
        .ok_or(MonitorError::PageNotFound(va))?;
    let old = slot
        .load(&*ctx.mem)
        .filter(|pte| pte.is_present())
        .ok_or(MonitorError::PageNotFound(va))?;

    let mut new = old;
    new.apply(op, perm);
    slot.store(&mut *ctx.mem, new)
        .ok_or(MonitorError::PhysOutOfRange(slot.addr()))?;

    log::info!("modifyperm: {:?} {:?} {:?}: {:?} -> {:?}", op, va, perm, old, new);
    Ok(Flow::Continue)
}
