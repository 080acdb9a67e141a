// src/arch/cpu.rs
// CPU 命令ラッパ。unsafe は最小限。
// - rcr3 / read_ebp: モニタが現在のアドレス空間とフレームポインタを知るための読み出しだけ。
// - 32bit (x86) と 64bit (x86_64) のどちらでもビルドできるようにレジスタ名を切り替える。

/// CR3（ページディレクトリの物理アドレス + PWT/PCD）
pub fn rcr3() -> u32 {
    let value: usize;
    unsafe {
        core::arch::asm!("mov {}, cr3", out(reg) value, options(nomem, nostack, preserves_flags));
    }
    value as u32
}

/// 呼び出し元のフレームポインタ
#[inline(always)]
pub fn read_ebp() -> u32 {
    let value: usize;
    unsafe {
        #[cfg(target_arch = "x86")]
        core::arch::asm!("mov {}, ebp", out(reg) value, options(nomem, nostack, preserves_flags));
        #[cfg(target_arch = "x86_64")]
        core::arch::asm!("mov {}, rbp", out(reg) value, options(nomem, nostack, preserves_flags));
    }
    value as u32
}

pub fn halt_loop() -> ! {
    loop {
        unsafe {
            core::arch::asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }
}

/// 割り込み禁止（panic 経路用）
pub fn disable_interrupts() {
    unsafe {
        core::arch::asm!("cli", options(nomem, nostack));
    }
}
