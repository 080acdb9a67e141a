// kernel/src/mem/paging.rs
//
// 役割:
// - 32bit x86 のページディレクトリ / ページテーブルエントリ（PDE/PTE）のビット表現を扱う。
// - 「フレームの取り出し」「権限ビットの set / clear / toggle」をここに集約する。
// やらないこと:
// - エントリの所在（物理メモリ上のどこか）を辿る処理（mm::pgdir の責務）。

use core::fmt;

use crate::mem::addr::{PhysAddr, PhysFrame};

bitflags::bitflags! {
    /// PDE/PTE の下位 12bit
    ///
    /// - PRESENT: エントリが有効
    /// - WRITABLE: 書き込み可能
    /// - USER: ユーザ特権からアクセス可能
    /// - ACCESSED / DIRTY: ハードウェアが立てる履歴ビット（モニタは作らない）
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PteFlags: u32 {
        const PRESENT = 1 << 0;
        const WRITABLE = 1 << 1;
        const USER = 1 << 2;
        const WRITE_THROUGH = 1 << 3;
        const CACHE_DISABLE = 1 << 4;
        const ACCESSED = 1 << 5;
        const DIRTY = 1 << 6;
        /// PDE では 4MiB ページ
        const PAGE_SIZE = 1 << 7;
        const GLOBAL = 1 << 8;
        /// ソフトウェアが自由に使える 3bit
        const AVAIL = 0x7 << 9;
    }
}

impl PteFlags {
    /// モニタが set / clear / change で触る保護ビット
    pub const PROTECTION: PteFlags = PteFlags::WRITABLE.union(PteFlags::USER);
}

/// エントリの下位フラグ部分
const FLAGS_MASK: u32 = 0xfff;

/// PDE / PTE 1 語
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Pte(pub u32);

impl Pte {
    pub fn new(frame: PhysFrame, flags: PteFlags) -> Self {
        Pte(frame.start_address().0 | (flags.bits() & FLAGS_MASK))
    }

    /// フレーム先頭の物理アドレス（下位 12bit を 0 にしたもの）
    pub fn frame_addr(self) -> PhysAddr {
        PhysAddr(self.0 & !FLAGS_MASK)
    }

    pub fn frame(self) -> PhysFrame {
        self.frame_addr().frame()
    }

    pub fn flags(self) -> PteFlags {
        PteFlags::from_bits_retain(self.0 & FLAGS_MASK)
    }

    pub fn is_present(self) -> bool {
        self.flags().contains(PteFlags::PRESENT)
    }

    pub fn set_flags(&mut self, flags: PteFlags) {
        self.0 |= flags.bits() & FLAGS_MASK;
    }

    /// WRITABLE と USER を落とす。PRESENT・フレーム・その他のビットは残す。
    pub fn clear_protection(&mut self) {
        self.0 &= !PteFlags::PROTECTION.bits();
    }

    pub fn toggle(&mut self, flags: PteFlags) {
        self.0 ^= flags.bits() & FLAGS_MASK;
    }

    /// modifyperm の 1 操作を適用する。
    pub fn apply(&mut self, op: PermOp, flags: PteFlags) {
        match op {
            PermOp::Set => {
                self.clear_protection();
                self.set_flags(flags);
            }
            PermOp::Clear => self.clear_protection(),
            PermOp::Change => self.toggle(flags),
        }
    }
}

impl fmt::Debug for Pte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pte({:#x}, {:?})", self.frame_addr().0, self.flags())
    }
}

/// modifyperm の操作種別
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermOp {
    Set,
    Clear,
    Change,
}

impl PermOp {
    /// 先頭文字で判定する（`s…` / `cl…` / `ch…`）。`set` `clear` `change` の省略形も通す。
    pub fn parse(word: &str) -> Option<PermOp> {
        let bytes = word.as_bytes();
        match (bytes.first(), bytes.get(1)) {
            (Some(b's'), _) => Some(PermOp::Set),
            (Some(b'c'), Some(b'l')) => Some(PermOp::Clear),
            (Some(b'c'), Some(b'h')) => Some(PermOp::Change),
            _ => None,
        }
    }
}

/// 権限文字列（`w` / `u` の並び）をフラグに変換する。
/// 不正な文字があればその文字を返す。
pub fn parse_perm(perms: &str) -> Result<PteFlags, char> {
    let mut flags = PteFlags::empty();
    for c in perms.chars() {
        match c {
            'w' => flags |= PteFlags::WRITABLE,
            'u' => flags |= PteFlags::USER,
            other => return Err(other),
        }
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const P: PteFlags = PteFlags::PRESENT;
    const W: PteFlags = PteFlags::WRITABLE;
    const U: PteFlags = PteFlags::USER;

    #[test]
    fn frame_and_flags_are_split_at_bit_12() {
        let pte = Pte(0x0123_4067);
        assert_eq!(pte.frame_addr(), PhysAddr(0x0123_4000));
        assert_eq!(pte.frame(), PhysFrame::from_index(0x1234));
        assert_eq!(
            pte.flags(),
            P | W | U | PteFlags::ACCESSED | PteFlags::DIRTY
        );
    }

    #[test]
    fn clear_protection_keeps_present_frame_and_history_bits() {
        let mut pte = Pte::new(PhysFrame::from_index(0x1234), P | W | U | PteFlags::ACCESSED);
        pte.clear_protection();
        assert_eq!(pte.frame_addr(), PhysAddr(0x0123_4000));
        assert_eq!(pte.flags(), P | PteFlags::ACCESSED);
    }

    #[test]
    fn scenario_clear_set_change() {
        let mut pte = Pte::new(PhysFrame::from_index(0x1234), P | W);

        pte.apply(PermOp::Clear, PteFlags::empty());
        assert_eq!(pte, Pte(0x0123_4000 | P.bits()));

        pte.apply(PermOp::Set, W | U);
        assert_eq!(pte.flags(), P | W | U);

        pte.apply(PermOp::Change, W);
        assert_eq!(pte.flags(), P | U);
        assert_eq!(pte.frame_addr(), PhysAddr(0x0123_4000));
    }

    #[test]
    fn perm_parsing() {
        assert_eq!(parse_perm("wu"), Ok(W | U));
        assert_eq!(parse_perm("uuw"), Ok(W | U));
        assert_eq!(parse_perm(""), Ok(PteFlags::empty()));
        assert_eq!(parse_perm("wx"), Err('x'));
        assert_eq!(parse_perm("p"), Err('p'));
    }

    #[test]
    fn op_parsing_follows_prefixes() {
        assert_eq!(PermOp::parse("set"), Some(PermOp::Set));
        assert_eq!(PermOp::parse("s"), Some(PermOp::Set));
        assert_eq!(PermOp::parse("clear"), Some(PermOp::Clear));
        assert_eq!(PermOp::parse("change"), Some(PermOp::Change));
        assert_eq!(PermOp::parse("c"), None);
        assert_eq!(PermOp::parse("toggle"), None);
        assert_eq!(PermOp::parse(""), None);
    }

    fn arb_perm() -> impl Strategy<Value = PteFlags> {
        (0u32..4).prop_map(|bits| PteFlags::from_bits_truncate(bits << 1))
    }

    proptest! {
        #[test]
        fn set_then_clear_drops_protection(raw in any::<u32>(), flags in arb_perm()) {
            let mut pte = Pte(raw);
            let present = pte.is_present();
            pte.apply(PermOp::Set, flags);
            pte.apply(PermOp::Clear, PteFlags::empty());
            prop_assert!(!pte.flags().intersects(PteFlags::PROTECTION));
            prop_assert_eq!(pte.is_present(), present);
            prop_assert_eq!(pte.frame_addr(), Pte(raw).frame_addr());
        }

        #[test]
        fn change_is_an_involution(raw in any::<u32>(), flags in arb_perm()) {
            let mut pte = Pte(raw);
            pte.apply(PermOp::Change, flags);
            pte.apply(PermOp::Change, flags);
            prop_assert_eq!(pte, Pte(raw));
        }

        #[test]
        fn set_installs_exactly_requested_protection(raw in any::<u32>(), flags in arb_perm()) {
            let mut pte = Pte(raw);
            pte.apply(PermOp::Set, flags);
            prop_assert_eq!(pte.flags() & PteFlags::PROTECTION, flags);
            prop_assert_eq!(pte.flags() - PteFlags::PROTECTION, Pte(raw).flags() - PteFlags::PROTECTION);
        }
    }
}
