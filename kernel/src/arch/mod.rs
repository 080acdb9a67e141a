// kernel/src/arch/mod.rs
//
// アーキ依存部。unsafe をできるだけここに閉じ込める方針。
// - trapframe: トラップ時に退避されるレジスタのレイアウト（ホストでもテスト可能）
// - cpu: rcr3 / read_ebp / hlt_loop など CPU 固有処理（ベアメタルのみ）
// - port: I/O ポート（ベアメタルのみ）
//
// モニタ本体は Cpu trait 越しにしかレジスタを読まない。

pub mod trapframe;

#[cfg(target_os = "none")]
pub mod cpu;
#[cfg(target_os = "none")]
pub mod port;

use crate::mem::addr::PhysAddr;

/// モニタが読む CPU 状態
pub trait Cpu {
    /// 現在のページディレクトリの物理アドレス（CR3）
    fn page_directory_root(&self) -> PhysAddr;

    /// backtrace の起点になるフレームポインタ（EBP）
    fn frame_pointer(&self) -> u32;
}

/// 実機のレジスタを読む Cpu
#[cfg(target_os = "none")]
pub struct HardwareCpu;

#[cfg(target_os = "none")]
impl Cpu for HardwareCpu {
    fn page_directory_root(&self) -> PhysAddr {
        PhysAddr(cpu::rcr3()).align_down()
    }

    /// dyn 越しに呼ばれるので、読んだ EBP は自分のフレーム。保存 EBP を 1 つ辿って
    /// 呼び出し元（backtrace）のフレームを返す。
    #[inline(never)]
    fn frame_pointer(&self) -> u32 {
        let own = cpu::read_ebp();
        // SAFETY: 自分のフレーム先頭。フレームポインタ付きでビルドされていれば呼び出し元の EBP が入っている。
        unsafe { core::ptr::read_volatile(own as usize as *const u32) }
    }
}

/// CPU を停止させるループ
#[cfg(target_os = "none")]
pub fn halt_loop() -> ! {
    cpu::halt_loop()
}
