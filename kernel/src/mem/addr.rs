// src/mem/addr.rs
//
// 役割:
// - 物理アドレス / 仮想アドレス / フレームなど、メモリ関連の基本型を定義する。
// - 32bit x86 の 2 段ページングを前提に、u32 の生値に型を付ける。
// やること:
// - 「これは物理アドレス」「これは仮想アドレス」と区別し、KERNBASE 直マップ上の別名を求める。
// やらないこと:
// - 生ポインタの参照外し（それは mem::phys の PhysMemory に閉じ込める）。

use core::fmt;

use crate::mem::layout::{KERNBASE, PHYSMAP_SIZE};
use crate::types::{self, PAGE_SIZE};

/// 物理アドレス（バイト単位）
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct PhysAddr(pub u32);

/// 仮想アドレス（バイト単位）
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct VirtAddr(pub u32);

/// 物理フレーム（4KiB ごとの番号）
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct PhysFrame {
    pub number: u32, // frame index = phys_addr / PAGE_SIZE
}

impl PhysAddr {
    /// 下位ビットを切り捨てて、ページ境界に揃える。
    pub fn align_down(self) -> PhysAddr {
        PhysAddr(self.0 & !(PAGE_SIZE - 1))
    }

    /// このアドレスが含まれる物理フレームを返す。
    pub fn frame(self) -> PhysFrame {
        PhysFrame {
            number: self.0 / PAGE_SIZE,
        }
    }

    /// KERNBASE 直マップ上の別名（KADDR 相当）。直マップの外なら None。
    pub fn kernel_alias(self) -> Option<VirtAddr> {
        if self.0 >= PHYSMAP_SIZE {
            return None;
        }
        Some(VirtAddr(self.0 + KERNBASE))
    }
}

impl VirtAddr {
    pub fn pdx(self) -> usize {
        types::pdx(self.0)
    }

    pub fn ptx(self) -> usize {
        types::ptx(self.0)
    }

    pub fn page_offset(self) -> u32 {
        types::pgoff(self.0)
    }

    pub fn checked_add(self, rhs: u32) -> Option<VirtAddr> {
        self.0.checked_add(rhs).map(VirtAddr)
    }
}

impl PhysFrame {
    /// フレーム先頭の物理アドレスを返す。
    pub fn start_address(self) -> PhysAddr {
        PhysAddr(self.number * PAGE_SIZE)
    }

    /// インデックスから直接フレームを作る（テスト用途など）。
    pub const fn from_index(number: u32) -> Self {
        PhysFrame { number }
    }
}

// --- Debug 実装（ログで見やすくするため） ---

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#x})", self.0)
    }
}

impl fmt::Debug for PhysFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysFrame({:#x})", self.start_address().0)
    }
}

// モニタ出力は {:x} / {:08x} で生値を出すので、幅指定ごと u32 に委譲する

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_offsets_split_addresses() {
        let pa = PhysAddr(0x0123_4567);
        assert_eq!(pa.frame(), PhysFrame::from_index(0x1234));
        assert_eq!(pa.frame().start_address(), pa.align_down());

        let va = VirtAddr(0xf010_0abc);
        assert_eq!(va.page_offset(), 0xabc);
        assert_eq!(va.pdx(), 0x3c0);
        assert_eq!(va.ptx(), 0x100);
    }

    #[test]
    fn kernel_alias_stays_inside_direct_map() {
        assert_eq!(PhysAddr(0x1000).kernel_alias(), Some(VirtAddr(0xf000_1000)));
        assert_eq!(PhysAddr(PHYSMAP_SIZE).kernel_alias(), None);
    }

    #[test]
    fn lower_hex_honours_width() {
        assert_eq!(format!("{:08x}", VirtAddr(0x10)), "00000010");
        assert_eq!(format!("{:#x}", PhysAddr(0x1234000)), "0x1234000");
    }
}
