/*!
 * types
 *
 * 役割:
 *   - モニタ全体で共有する素朴な型・定数を集約する。
 *
 * やること:
 *   - 32bit 仮想アドレスの分解（PDX / PTX / PGOFF / PGNUM）と丸め。
 *
 * やらないこと:
 *   - ページテーブルの読み書き（mm::pgdir の責務）。
 *
 * 設計方針:
 *   - 依存を増やさず、ビット演算の共通処理をここに寄せる。
 */

pub const PAGE_SIZE: u32 = 4096;
pub const PAGE_SHIFT: u32 = 12;

pub const PTX_SHIFT: u32 = 12;
pub const PDX_SHIFT: u32 = 22;
const INDEX_MASK: u32 = 0x3ff;

/// 仮想アドレスからページディレクトリ index を取り出す（bits 31..22）
#[inline(always)]
pub const fn pdx(va: u32) -> usize {
    ((va >> PDX_SHIFT) & INDEX_MASK) as usize
}

/// 仮想アドレスからページテーブル index を取り出す（bits 21..12）
#[inline(always)]
pub const fn ptx(va: u32) -> usize {
    ((va >> PTX_SHIFT) & INDEX_MASK) as usize
}

/// ページ内オフセット（bits 11..0）
#[inline(always)]
pub const fn pgoff(addr: u32) -> u32 {
    addr & (PAGE_SIZE - 1)
}

/// ページ番号（PDX と PTX を連結したもの）
#[inline(always)]
pub const fn pgnum(addr: u32) -> u32 {
    addr >> PAGE_SHIFT
}

#[inline(always)]
pub const fn round_down(addr: u32, align: u32) -> u32 {
    addr - addr % align
}

/// 切り上げ。u32 を溢れる場合は u32::MAX 側に飽和させずそのまま wrap する
#[inline(always)]
pub const fn round_up(addr: u32, align: u32) -> u32 {
    round_down(addr.wrapping_add(align - 1), align)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_virtual_address() {
        let va = 0xf011_a123;
        assert_eq!(pdx(va), 0x3c0);
        assert_eq!(ptx(va), 0x11a);
        assert_eq!(pgoff(va), 0x123);
        assert_eq!(pgnum(va), 0xf011a);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_down(0x1fff, PAGE_SIZE), 0x1000);
        assert_eq!(round_up(0x1001, PAGE_SIZE), 0x2000);
        assert_eq!(round_up(0x2000, PAGE_SIZE), 0x2000);
        assert_eq!(round_up(1025, 1024), 2048);
    }
}
