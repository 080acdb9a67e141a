// kernel/src/mm/pgdir.rs
//
// 役割:
// - 2 段ページング（PD → PT）を、物理メモリ境界（PhysMemory）越しに辿る。
// - モニタが読む / 書く PTE の「所在」（PteSlot）をここで決める。
//
// やること:
// - walk: PDE が無ければ（許可されていれば）PT を確保・0 埋め・PDE 設置してから PTE を返す
// - lookup / translate: 作成なしの参照
// - read_virt_u32: ページテーブル越しに仮想アドレスの 1 語を読む（backtrace / content v 用）
//
// やらないこと:
// - TLB flush（モニタは停止中のマシンを触るだけ。反映はカーネル側の責務）
// - 4MiB ページ（PDE.PS）の解釈
//
// 設計方針:
// - 物理メモリの外を指す PDE は「無い」として扱う。フォールトさせない。
// - 失敗はすべて Option の None。panic しない。

use crate::mem::addr::{PhysAddr, PhysFrame, VirtAddr};
use crate::mem::paging::{Pte, PteFlags};
use crate::mem::phys::{FrameAllocator, PhysMemory};
use crate::types::PAGE_SIZE;

/// エントリ 1 語のバイト数
const ENTRY_SIZE: u32 = core::mem::size_of::<u32>() as u32;

/// 新しく作る PT を指す PDE の権限。PTE 側で絞る前提で最大にしておく。
const NEW_TABLE_FLAGS: PteFlags = PteFlags::PRESENT
    .union(PteFlags::WRITABLE)
    .union(PteFlags::USER);

/// ページテーブル内の 1 エントリの所在（物理アドレス）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PteSlot(PhysAddr);

impl PteSlot {
    pub fn addr(self) -> PhysAddr {
        self.0
    }

    pub fn load(self, mem: &dyn PhysMemory) -> Option<Pte> {
        mem.read_u32(self.0).map(Pte)
    }

    pub fn store(self, mem: &mut dyn PhysMemory, pte: Pte) -> Option<()> {
        mem.write_u32(self.0, pte.0)
    }
}

/// 仮想アドレス 1 つの変換結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    pub va: VirtAddr,
    pub pte: Pte,
    /// va に対応する物理アドレス（フレーム + ページ内オフセット）
    pub pa: PhysAddr,
}

/// 現在のアドレス空間のページディレクトリ
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageDirectory {
    root: PhysAddr,
}

impl PageDirectory {
    pub fn new(root: PhysAddr) -> Self {
        PageDirectory {
            root: root.align_down(),
        }
    }

    /// CR3 の生値から作る（下位 12bit の PWT/PCD は捨てる）
    pub fn from_cr3(cr3: u32) -> Self {
        Self::new(PhysAddr(cr3))
    }

    pub fn root(&self) -> PhysAddr {
        self.root
    }

    fn pde_slot(&self, va: VirtAddr) -> PteSlot {
        PteSlot(PhysAddr(self.root.0 + va.pdx() as u32 * ENTRY_SIZE))
    }

    fn pte_slot(table: PhysFrame, va: VirtAddr) -> PteSlot {
        PteSlot(PhysAddr(table.start_address().0 + va.ptx() as u32 * ENTRY_SIZE))
    }

    /// PDE を読み、PT が物理メモリ内に実在すればそのフレームを返す。
    fn table_of(&self, mem: &dyn PhysMemory, va: VirtAddr) -> Option<PhysFrame> {
        let pde = self.pde_slot(va).load(mem)?;
        if !pde.is_present() {
            return None;
        }
        let table = pde.frame();
        if !mem.contains_frame(table) {
            return None;
        }
        Some(table)
    }

    /// va の PTE の所在を返す。
    ///
    /// - `frames` が None: PDE が無ければ None（副作用なし）
    /// - `frames` が Some: PT を 1 枚確保して 0 埋めし、PDE に P|W|U で設置してから返す
    pub fn walk(
        &self,
        mem: &mut dyn PhysMemory,
        va: VirtAddr,
        frames: Option<&mut dyn FrameAllocator>,
    ) -> Option<PteSlot> {
        if let Some(table) = self.table_of(mem, va) {
            return Some(Self::pte_slot(table, va));
        }

        let frames = frames?;
        let table = frames.allocate_frame()?;
        if !mem.contains_frame(table) {
            log::warn!("pgdir: allocator returned {:?} outside physical memory", table);
            return None;
        }
        mem.zero_frame(table)?;
        self.pde_slot(va).store(mem, Pte::new(table, NEW_TABLE_FLAGS))?;
        log::debug!("pgdir: new page table {:?} for pdx={}", table, va.pdx());

        Some(Self::pte_slot(table, va))
    }

    /// 作成なしの walk。共有参照だけで辿れる。
    pub fn lookup(&self, mem: &dyn PhysMemory, va: VirtAddr) -> Option<PteSlot> {
        self.table_of(mem, va).map(|table| Self::pte_slot(table, va))
    }

    /// PRESENT な PTE を持つページだけ変換結果を返す。
    pub fn translate(&self, mem: &dyn PhysMemory, va: VirtAddr) -> Option<Translation> {
        let pte = self.lookup(mem, va)?.load(mem)?;
        if !pte.is_present() {
            return None;
        }
        Some(Translation {
            va,
            pte,
            pa: PhysAddr(pte.frame_addr().0 | va.page_offset()),
        })
    }

    /// ページテーブル越しに 1 語読む。
    ///
    /// ページ末尾をまたぐ語は、後半を次の仮想ページのフレームから取る。
    pub fn read_virt_u32(&self, mem: &dyn PhysMemory, va: VirtAddr) -> Option<u32> {
        if va.page_offset() <= PAGE_SIZE - ENTRY_SIZE {
            let t = self.translate(mem, va)?;
            return mem.read_u32(t.pa);
        }

        let mut bytes = [0u8; ENTRY_SIZE as usize];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.read_virt_u8(mem, va.checked_add(i as u32)?)?;
        }
        Some(u32::from_le_bytes(bytes))
    }

    fn read_virt_u8(&self, mem: &dyn PhysMemory, va: VirtAddr) -> Option<u8> {
        let t = self.translate(mem, va)?;
        let shift = (t.pa.0 % ENTRY_SIZE) * 8;
        let word = mem.read_u32(PhysAddr(t.pa.0 - t.pa.0 % ENTRY_SIZE))?;
        Some((word >> shift) as u8)
    }
}
