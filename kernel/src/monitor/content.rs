// kernel/src/monitor/content.rs
//
// `content v|p start end`: [start, end) を 4 byte ずつダンプする。
//
// - p: 物理アドレス。KERNBASE 直マップ上の別名も並べて出す。
// - v: 仮想アドレス。ページごとに現在のページテーブルで引き、見つからなければそこで止める。
//   ページ末尾をまたぐ語は次の仮想ページの中身で埋める。
//
// 読み出しはすべて PhysMemory 越し。物理メモリの外は読まずにエラーで止める。

use core::fmt::Write;

use crate::arch::trapframe::Trapframe;
use crate::mem::addr::{PhysAddr, VirtAddr};
use crate::mem::layout::KERNBASE;
use crate::mm::pgdir::PageDirectory;
use crate::types::{pgnum, pgoff, round_down, PAGE_SIZE};

use super::error::{MonitorError, Result};
use super::parse::parse_range;
use super::{Flow, MonitorCtx};

const WORD: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Space {
    Virtual,
    Physical,
}

pub fn mon_content(ctx: &mut MonitorCtx<'_>, argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    if argv.len() != 4 {
        return Err(MonitorError::InvalidArguments);
    }
    let space = match argv[1].as_bytes().first() {
        Some(b'v') => Space::Virtual,
        Some(b'p') => Space::Physical,
        _ => return Err(MonitorError::InvalidType),
    };
    let (start, end) = parse_range(argv[2], argv[3])?;

    match space {
        Space::Physical => dump_physical(ctx, start, end)?,
        Space::Virtual => dump_virtual(ctx, start, end)?,
    }
    Ok(Flow::Continue)
}

fn dump_physical(ctx: &mut MonitorCtx<'_>, start: u32, end: u32) -> Result<()> {
    let mut pa = start;
    while pa < end {
        let addr = PhysAddr(pa);
        let word = ctx
            .mem
            .read_u32(addr)
            .ok_or(MonitorError::PhysOutOfRange(addr))?;
        writeln!(
            ctx.console,
            "pa: 0x{:x}\t va: 0x{:x}\t content:0x{:x}",
            pa,
            pa.wrapping_add(KERNBASE),
            word
        )?;
        match pa.checked_add(WORD) {
            Some(next) => pa = next,
            None => break,
        }
    }
    Ok(())
}

fn dump_virtual(ctx: &mut MonitorCtx<'_>, start: u32, end: u32) -> Result<()> {
    let pgdir = ctx.page_directory();

    let mut va = start;
    while va < end {
        let page = round_down(va, PAGE_SIZE);
        let t = pgdir
            .translate(&*ctx.mem, VirtAddr(va))
            .ok_or(MonitorError::PageNotFound(VirtAddr(va)))?;
        let frame = t.pte.frame_addr().0;

        let first = pgoff(va);
        let last = if pgnum(va) == pgnum(end) {
            pgoff(end)
        } else {
            PAGE_SIZE
        };

        let mut off = first;
        while off < last {
            let pa = PhysAddr(frame + off);
            let word = if off <= PAGE_SIZE - WORD {
                ctx.mem
                    .read_u32(pa)
                    .ok_or(MonitorError::PhysOutOfRange(pa))?
            } else {
                read_across_pages(ctx, &pgdir, page, off)?
            };
            writeln!(
                ctx.console,
                "va:0x{:x}\tpa:0x{:x}\tcontent:0x{:x}",
                page + off,
                pa,
                word
            )?;
            off += WORD;
        }

        match page.checked_add(PAGE_SIZE) {
            Some(next) => va = next,
            None => break,
        }
    }
    Ok(())
}

/// ページ末尾をまたぐ語。後半は次の仮想ページから読む。
fn read_across_pages(ctx: &MonitorCtx<'_>, pgdir: &PageDirectory, page: u32, off: u32) -> Result<u32> {
    if let Some(word) = pgdir.read_virt_u32(&*ctx.mem, VirtAddr(page + off)) {
        return Ok(word);
    }
    let next = VirtAddr(page.wrapping_add(PAGE_SIZE));
    match pgdir.translate(&*ctx.mem, next) {
        None => Err(MonitorError::PageNotFound(next)),
        Some(t) => Err(MonitorError::PhysOutOfRange(t.pa)),
    }
}

#[cfg(test)]
mod tests {
    use crate::mem::addr::PhysAddr;
    use crate::mem::layout::KERNBASE;
    use crate::mem::paging::PteFlags;
    use crate::monitor::Flow;
    use crate::testing::TestMachine;

    const PW: PteFlags = PteFlags::PRESENT.union(PteFlags::WRITABLE);

    fn contents(out: &str) -> Vec<&str> {
        out.lines()
            .map(|l| l.rsplit("content:").next().unwrap_or(""))
            .collect()
    }

    #[test]
    fn physical_dump_shows_kernel_alias() {
        let mut m = TestMachine::new();
        m.poke(PhysAddr(0x0010_0000), 0x1bad_b002);
        m.poke(PhysAddr(0x0010_0004), 0x0000_0003);

        let (flow, out) = m.exec("content p 0x100000 0x100008");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            out,
            "pa: 0x100000\t va: 0xf0100000\t content:0x1badb002\n\
             pa: 0x100004\t va: 0xf0100004\t content:0x3\n"
        );
    }

    #[test]
    fn virtual_dump_crosses_pages() {
        let mut m = TestMachine::new();
        m.map(0x0080_0000, 0x0030_0000, PW);
        m.map(0x0080_1000, 0x0040_0000, PW);
        m.poke(PhysAddr(0x0030_0ff8), 0xaaaa_aaaa);
        m.poke(PhysAddr(0x0030_0ffc), 0xbbbb_bbbb);
        m.poke(PhysAddr(0x0040_0000), 0xcccc_cccc);

        let (_, out) = m.exec("content v 0x800ff8 0x801008");
        assert_eq!(
            out,
            "va:0x800ff8\tpa:0x300ff8\tcontent:0xaaaaaaaa\n\
             va:0x800ffc\tpa:0x300ffc\tcontent:0xbbbbbbbb\n\
             va:0x801000\tpa:0x400000\tcontent:0xcccccccc\n\
             va:0x801004\tpa:0x400004\tcontent:0x0\n"
        );
    }

    #[test]
    fn unaligned_word_at_page_end_reads_the_next_virtual_page() {
        let mut m = TestMachine::new();
        m.map(0x0080_0000, 0x0030_0000, PW);
        m.map(0x0080_1000, 0x0040_0000, PW);
        m.poke(PhysAddr(0x0030_0ffc), 0xbbbb_aaaa);
        m.poke(PhysAddr(0x0040_0000), 0xdddd_cccc);
        m.poke(PhysAddr(0x0030_1000), 0x1111_2222);

        let (flow, out) = m.exec("content v 0x800ffe 0x801000");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "va:0x800ffe\tpa:0x300ffe\tcontent:0xccccbbbb\n");
    }

    #[test]
    fn word_running_into_a_missing_page_is_reported() {
        let mut m = TestMachine::new();
        m.map(0x0080_0000, 0x0030_0000, PW);

        let (flow, out) = m.exec("content v 0x800ffa 0x801000");
        assert_eq!(flow, Flow::Continue);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("va:0x800ffa\t"));
        assert_eq!(lines[1], "801000: Page not found");
    }

    #[test]
    fn missing_first_page_prints_only_the_error() {
        let mut m = TestMachine::new();
        assert_eq!(m.exec("content v 0x800000 0x800010").1, "800000: Page not found\n");
        assert_eq!(m.exec("content v 0x800ffe 0x801004").1, "800ffe: Page not found\n");
    }

    #[test]
    fn virtual_dump_stops_at_first_missing_page() {
        let mut m = TestMachine::new();
        m.map(0x0080_0000, 0x0030_0000, PW);

        let (flow, out) = m.exec("content v 0x800ff8 0x802000");
        assert_eq!(flow, Flow::Continue);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "801000: Page not found");
    }

    #[test]
    fn direct_map_views_agree() {
        let mut m = TestMachine::new();
        m.map_direct(0x0020_0000, 2);
        for (i, pa) in (0x0020_0ff0..0x0020_1010).step_by(4).enumerate() {
            m.poke(PhysAddr(pa), 0x5a5a_0000 + i as u32);
        }

        let (_, phys) = m.exec("content p 0x200ff0 0x201010");
        let (_, virt) = m.exec(&format!(
            "content v {:#x} {:#x}",
            0x0020_0ff0 + KERNBASE,
            0x0020_1010 + KERNBASE
        ));
        assert_eq!(contents(&phys).len(), 8);
        assert_eq!(contents(&phys), contents(&virt));
    }

    #[test]
    fn argument_errors() {
        let mut m = TestMachine::new();
        assert_eq!(m.exec("content v 0x1000").1, "Invalid arguments\n");
        assert_eq!(m.exec("content v 0x1000 0x2000 0x3000").1, "Invalid arguments\n");
        assert_eq!(m.exec("content x 0x1000 0x2000").1, "Invalid type\n");
        assert_eq!(m.exec("content p 0 0x2000").1, "Illegal range\n");
        assert_eq!(m.exec("content p 0x2000 0x1000").1, "Illegal range\n");
    }

    #[test]
    fn physical_dump_refuses_memory_past_the_end() {
        let mut m = TestMachine::new();
        let top = m.mem.top();
        let (_, out) = m.exec(&format!("content p {:#x} {:#x}", top - 4, top + 4));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("outside physical memory"));
    }
}
