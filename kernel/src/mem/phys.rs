// kernel/src/mem/phys.rs
//
// 役割:
// - 物理メモリへの 1 語読み書きと、物理フレーム確保の「境界」を trait として定義する。
// - 任意アドレスの参照外し（unsafe）は KernelPhysMemory の read/write だけに閉じ込める。
//
// やること:
// - PhysMemory: 範囲チェック付きの read_u32 / write_u32。範囲外は None（フォールトさせない）。
// - FrameAllocator: 新しいページテーブル用のフレームを 1 枚返す。
//
// やらないこと:
// - ページテーブルの解釈（mm::pgdir）
// - フレーム確保の方針（FrameAllocator を実装する呼び出し側のカーネル）

use crate::mem::addr::{PhysAddr, PhysFrame};
use crate::types::PAGE_SIZE;

/// 物理メモリの 1 語アクセス。
pub trait PhysMemory {
    /// 参照できる物理フレーム数（[0, max_frames) が有効）
    fn max_frames(&self) -> u32;

    fn read_u32(&self, pa: PhysAddr) -> Option<u32>;

    fn write_u32(&mut self, pa: PhysAddr, value: u32) -> Option<()>;

    /// [pa, pa + len) がすべて物理メモリ内か
    fn contains(&self, pa: PhysAddr, len: u32) -> bool {
        let end = pa.0 as u64 + len as u64;
        end <= self.max_frames() as u64 * PAGE_SIZE as u64
    }

    fn contains_frame(&self, frame: PhysFrame) -> bool {
        frame.number < self.max_frames()
    }

    /// フレーム全体を 0 で埋める
    fn zero_frame(&mut self, frame: PhysFrame) -> Option<()> {
        if !self.contains_frame(frame) {
            return None;
        }
        let base = frame.start_address();
        for off in (0..PAGE_SIZE).step_by(4) {
            self.write_u32(PhysAddr(base.0 + off), 0)?;
        }
        Some(())
    }
}

/// 物理フレームの確保
pub trait FrameAllocator {
    /// 次の利用可能なフレームを 1 つ返す。尽きたら None。
    fn allocate_frame(&mut self) -> Option<PhysFrame>;
}

#[cfg(target_os = "none")]
pub use self::kernel::KernelPhysMemory;

#[cfg(target_os = "none")]
mod kernel {
    use core::ptr::{read_unaligned, read_volatile, write_unaligned, write_volatile};

    use super::PhysMemory;
    use crate::mem::addr::PhysAddr;
    use crate::mem::layout::PHYSMAP_MAX_FRAMES;

    /// KERNBASE 直マップ経由で物理メモリを読む実装。
    ///
    /// - 物理 → 仮想の変換は PhysAddr::kernel_alias() の 1 か所だけ。
    /// - 直マップの外と npages の外は None を返す。
    pub struct KernelPhysMemory {
        npages: u32,
    }

    impl KernelPhysMemory {
        /// # Safety
        /// - [KERNBASE, KERNBASE + npages * PAGE_SIZE) が物理 [0, npages * PAGE_SIZE) の
        ///   直マップとして現在のページディレクトリに張られていること。
        pub unsafe fn new(npages: u32) -> Self {
            KernelPhysMemory {
                npages: npages.min(PHYSMAP_MAX_FRAMES),
            }
        }

        fn word_ptr(&self, pa: PhysAddr) -> Option<*mut u32> {
            if !self.contains(pa, 4) {
                return None;
            }
            let va = pa.kernel_alias()?;
            Some(va.0 as usize as *mut u32)
        }
    }

    impl PhysMemory for KernelPhysMemory {
        fn max_frames(&self) -> u32 {
            self.npages
        }

        fn read_u32(&self, pa: PhysAddr) -> Option<u32> {
            let p = self.word_ptr(pa)?;
            // Safety: new() の前提により p は直マップ内の有効な 4 byte
            let v = unsafe {
                if pa.0 % 4 == 0 {
                    read_volatile(p)
                } else {
                    read_unaligned(p)
                }
            };
            Some(v)
        }

        fn write_u32(&mut self, pa: PhysAddr, value: u32) -> Option<()> {
            let p = self.word_ptr(pa)?;
            // Safety: 同上
            unsafe {
                if pa.0 % 4 == 0 {
                    write_volatile(p, value);
                } else {
                    write_unaligned(p, value);
                }
            }
            Some(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimPhysMemory;

    #[test]
    fn contains_checks_the_last_byte() {
        let mem = SimPhysMemory::new(2);
        assert!(mem.contains(PhysAddr(0x1ffc), 4));
        assert!(!mem.contains(PhysAddr(0x1ffd), 4));
        assert!(!mem.contains(PhysAddr(u32::MAX), 4));
    }

    #[test]
    fn zero_frame_clears_every_word_and_rejects_out_of_range() {
        let mut mem = SimPhysMemory::new(4);
        mem.write_u32(PhysAddr(0x2000), 0xdead_beef).unwrap();
        mem.write_u32(PhysAddr(0x2ffc), 0x1234_5678).unwrap();

        mem.zero_frame(PhysFrame::from_index(2)).unwrap();
        assert_eq!(mem.read_u32(PhysAddr(0x2000)), Some(0));
        assert_eq!(mem.read_u32(PhysAddr(0x2ffc)), Some(0));

        assert_eq!(mem.zero_frame(PhysFrame::from_index(4)), None);
    }
}
