// kernel/src/mem/layout.rs
//
// 32bit 教育用カーネルの仮想アドレスレイアウト（モニタが前提にする部分だけ）
//
//   0x0000_0000 ..= 0xefff_ffff
//     - ユーザ環境 + カーネルの補助領域。環境ごとにページディレクトリが異なる。
//
//   0xf000_0000 ..= 0xffff_ffff
//     - KERNBASE 直マップ。物理 [0, 256MiB) をそのまま KERNBASE + pa に写す。
//     - 全環境のページディレクトリで共有される。
//

/// 物理メモリ直マップの開始仮想アドレス。
pub const KERNBASE: u32 = 0xf000_0000;

/// 直マップがカバーする物理範囲（KERNBASE から 4GiB の終端まで）。
pub const PHYSMAP_SIZE: u32 = 0u32.wrapping_sub(KERNBASE);

/// 直マップで参照できる最大フレーム数。
pub const PHYSMAP_MAX_FRAMES: u32 = PHYSMAP_SIZE / crate::types::PAGE_SIZE;

/// カーネルイメージのリンカシンボル（すべて仮想アドレス）。
///
/// kerninfo 用。値はカーネル側がリンカスクリプトのシンボルから埋める。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelLayout {
    /// `_start`（物理アドレスでリンクされるエントリ）
    pub start: u32,
    pub entry: u32,
    pub etext: u32,
    pub edata: u32,
    pub end: u32,
}

impl KernelLayout {
    /// 仮想アドレスを直マップ前提で物理アドレスに戻す
    pub const fn phys_of(virt: u32) -> u32 {
        virt.wrapping_sub(KERNBASE)
    }

    /// メモリフットプリント（KiB, 1KiB 単位で切り上げ）
    pub fn footprint_kib(&self) -> u32 {
        crate::types::round_up(self.end.wrapping_sub(self.entry), 1024) / 1024
    }
}
