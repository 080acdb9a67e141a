// kernel/src/arch/trapframe.rs
//
// 役割:
// - トラップ入口の asm がスタックに積む i386 のレジスタ退避レイアウト（Trapframe）を定義する。
// - モニタ起動時のダンプ（print_trapframe）と、c / si が触る EFLAGS.TF の操作を提供する。
//
// やらないこと:
// - トラップ入口 / 復帰の asm（カーネル側の責務）
// - 割り込みディスパッチ

use core::fmt;

use x86_64::registers::rflags::RFlags;

/// pushal が積む汎用レジスタ（積まれた順の逆）
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PushRegs {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// pushal が積む無意味な esp
    pub oesp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Trapframe {
    pub regs: PushRegs,
    pub es: u16,
    pub padding1: u16,
    pub ds: u16,
    pub padding2: u16,
    pub trapno: u32,
    // 以下はハードウェアが積む
    pub err: u32,
    pub eip: u32,
    pub cs: u16,
    pub padding3: u16,
    pub eflags: u32,
    // 特権レベルが変わったときだけ有効
    pub esp: u32,
    pub ss: u16,
    pub padding4: u16,
}

const _: () = assert!(core::mem::size_of::<Trapframe>() == 68);

/// ページフォルト
pub const T_PGFLT: u32 = 14;
/// システムコール
pub const T_SYSCALL: u32 = 48;
/// 外部割り込み（IRQ0）のベクタ
pub const IRQ_OFFSET: u32 = 32;

/// EFLAGS.TF（1 命令ごとに #DB）
const FL_TF: u32 = RFlags::TRAP_FLAG.bits() as u32;

impl Trapframe {
    /// 特権レベルの変化を伴うトラップか（CPL=3 から来た）
    pub fn from_user(&self) -> bool {
        self.cs & 3 != 0
    }

    pub fn single_step(&self) -> bool {
        self.eflags & FL_TF != 0
    }

    pub fn set_single_step(&mut self, on: bool) {
        if on {
            self.eflags |= FL_TF;
        } else {
            self.eflags &= !FL_TF;
        }
    }
}

/// トラップ番号の名前
pub fn trapname(trapno: u32) -> &'static str {
    const EXCNAMES: [&str; 20] = [
        "Divide error",
        "Debug",
        "Non-Maskable Interrupt",
        "Breakpoint",
        "Overflow",
        "BOUND Range Exceeded",
        "Invalid Opcode",
        "Device Not Available",
        "Double Fault",
        "Coprocessor Segment Overrun",
        "Invalid TSS",
        "Segment Not Present",
        "Stack Fault",
        "General Protection",
        "Page Fault",
        "(unknown trap)",
        "x87 FPU Floating-Point Error",
        "Alignment Check",
        "Machine-Check",
        "SIMD Floating-Point Exception",
    ];

    match trapno {
        n if (n as usize) < EXCNAMES.len() => EXCNAMES[n as usize],
        T_SYSCALL => "System call",
        n if (IRQ_OFFSET..IRQ_OFFSET + 16).contains(&n) => "Hardware Interrupt",
        _ => "(unknown trap)",
    }
}

pub fn print_regs<W: fmt::Write + ?Sized>(w: &mut W, regs: &PushRegs) -> fmt::Result {
    writeln!(w, "  edi  0x{:08x}", regs.edi)?;
    writeln!(w, "  esi  0x{:08x}", regs.esi)?;
    writeln!(w, "  ebp  0x{:08x}", regs.ebp)?;
    writeln!(w, "  oesp 0x{:08x}", regs.oesp)?;
    writeln!(w, "  ebx  0x{:08x}", regs.ebx)?;
    writeln!(w, "  edx  0x{:08x}", regs.edx)?;
    writeln!(w, "  ecx  0x{:08x}", regs.ecx)?;
    writeln!(w, "  eax  0x{:08x}", regs.eax)
}

/// モニタ起動時のトラップフレームダンプ
pub fn print_trapframe<W: fmt::Write + ?Sized>(w: &mut W, tf: &Trapframe) -> fmt::Result {
    writeln!(w, "TRAP frame at {:p}", tf as *const Trapframe)?;
    print_regs(w, &tf.regs)?;
    writeln!(w, "  es   0x----{:04x}", tf.es)?;
    writeln!(w, "  ds   0x----{:04x}", tf.ds)?;
    writeln!(w, "  trap 0x{:08x} {}", tf.trapno, trapname(tf.trapno))?;
    write!(w, "  err  0x{:08x}", tf.err)?;
    if tf.trapno == T_PGFLT {
        // U/S, W/R, P
        write!(
            w,
            " [{}, {}, {}]",
            if tf.err & 4 != 0 { "user" } else { "kernel" },
            if tf.err & 2 != 0 { "write" } else { "read" },
            if tf.err & 1 != 0 { "protection" } else { "not-present" },
        )?;
    }
    writeln!(w)?;
    writeln!(w, "  eip  0x{:08x}", tf.eip)?;
    writeln!(w, "  cs   0x----{:04x}", tf.cs)?;
    writeln!(w, "  flag 0x{:08x}", tf.eflags)?;
    if tf.from_user() {
        writeln!(w, "  esp  0x{:08x}", tf.esp)?;
        writeln!(w, "  ss   0x----{:04x}", tf.ss)?;
    }
    Ok(())
}
