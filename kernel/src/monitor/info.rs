// kernel/src/monitor/info.rs
//
// help / kerninfo

use core::fmt::Write;

use crate::arch::trapframe::Trapframe;
use crate::mem::layout::KernelLayout;

use super::error::Result;
use super::{Flow, MonitorCtx};

pub fn mon_help(ctx: &mut MonitorCtx<'_>, _argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    for cmd in ctx.registry.commands() {
        writeln!(ctx.console, "{} - {}", cmd.name, cmd.desc)?;
    }
    Ok(Flow::Continue)
}

pub fn mon_kerninfo(ctx: &mut MonitorCtx<'_>, _argv: &[&str], _tf: Option<&mut Trapframe>) -> Result<Flow> {
    let layout = *ctx.layout;
    let out = &mut *ctx.console;

    writeln!(out, "Special kernel symbols:")?;
    writeln!(out, "  _start                  {:08x} (phys)", layout.start)?;
    for (name, virt) in [
        ("entry", layout.entry),
        ("etext", layout.etext),
        ("edata", layout.edata),
        ("end", layout.end),
    ] {
        writeln!(
            out,
            "  {:<6} {:08x} (virt)  {:08x} (phys)",
            name,
            virt,
            KernelLayout::phys_of(virt)
        )?;
    }
    writeln!(
        out,
        "Kernel executable memory footprint: {}KB",
        layout.footprint_kib()
    )?;
    Ok(Flow::Continue)
}
