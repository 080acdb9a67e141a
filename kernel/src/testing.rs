// kernel/src/testing.rs
//
// ホストテスト用の偽物一式。
// - SimPhysMemory: 触ったフレームだけ持つ疎な物理メモリ
// - CountingAllocator: 連番でフレームを返し、呼ばれた回数を数える
// - FakeCpu / ScriptConsole: 固定レジスタと台本入力のコンソール
// - TestMachine: 上をまとめて 1 行ずつモニタに食わせる

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::arch::trapframe::Trapframe;
use crate::arch::Cpu;
use crate::console::{read_line_with, ByteIo, Console};
use crate::kdebug::StaticSymbols;
use crate::mem::addr::{PhysAddr, PhysFrame, VirtAddr};
use crate::mem::layout::{KernelLayout, KERNBASE};
use crate::mem::paging::{Pte, PteFlags};
use crate::mem::phys::{FrameAllocator, PhysMemory};
use crate::mm::pgdir::PageDirectory;
use crate::monitor::{dispatch, Flow, Monitor, MonitorCtx, MonitorExit, Registry};
use crate::types::PAGE_SIZE;

pub struct SimPhysMemory {
    max_frames: u32,
    frames: BTreeMap<u32, Vec<u8>>,
}

impl SimPhysMemory {
    pub fn new(max_frames: u32) -> Self {
        SimPhysMemory {
            max_frames,
            frames: BTreeMap::new(),
        }
    }

    /// 物理メモリの終端アドレス
    pub fn top(&self) -> u32 {
        self.max_frames * PAGE_SIZE
    }

    pub fn snapshot(&self) -> BTreeMap<u32, Vec<u8>> {
        self.frames.clone()
    }

    fn byte(&self, pa: u32) -> u8 {
        self.frames
            .get(&(pa / PAGE_SIZE))
            .map_or(0, |f| f[(pa % PAGE_SIZE) as usize])
    }

    fn set_byte(&mut self, pa: u32, b: u8) {
        let frame = self
            .frames
            .entry(pa / PAGE_SIZE)
            .or_insert_with(|| vec![0; PAGE_SIZE as usize]);
        frame[(pa % PAGE_SIZE) as usize] = b;
    }
}

impl PhysMemory for SimPhysMemory {
    fn max_frames(&self) -> u32 {
        self.max_frames
    }

    fn read_u32(&self, pa: PhysAddr) -> Option<u32> {
        if !self.contains(pa, 4) {
            return None;
        }
        let bytes = [0, 1, 2, 3].map(|i| self.byte(pa.0 + i));
        Some(u32::from_le_bytes(bytes))
    }

    fn write_u32(&mut self, pa: PhysAddr, value: u32) -> Option<()> {
        if !self.contains(pa, 4) {
            return None;
        }
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set_byte(pa.0 + i as u32, b);
        }
        Some(())
    }
}

pub struct CountingAllocator {
    next: u32,
    end: u32,
    calls: usize,
}

impl CountingAllocator {
    pub fn starting_at(frame: u32) -> Self {
        CountingAllocator {
            next: frame,
            end: u32::MAX,
            calls: 0,
        }
    }

    pub fn empty() -> Self {
        CountingAllocator {
            next: 0,
            end: 0,
            calls: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FrameAllocator for CountingAllocator {
    fn allocate_frame(&mut self) -> Option<PhysFrame> {
        self.calls += 1;
        if self.next >= self.end {
            return None;
        }
        let frame = PhysFrame::from_index(self.next);
        self.next += 1;
        Some(frame)
    }
}

pub struct FakeCpu {
    pub root: PhysAddr,
    pub ebp: u32,
}

impl Cpu for FakeCpu {
    fn page_directory_root(&self) -> PhysAddr {
        self.root
    }

    fn frame_pointer(&self) -> u32 {
        self.ebp
    }
}

/// 台本どおりに 1 行ずつ返し、出力を溜めるコンソール
#[derive(Default)]
pub struct ScriptConsole {
    input: VecDeque<u8>,
    lines: usize,
    output: String,
}

impl ScriptConsole {
    pub fn push_line(&mut self, line: &str) {
        self.input.extend(line.bytes());
        self.input.push_back(b'\n');
        self.lines += 1;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// まだ読まれていない行数
    pub fn pending(&self) -> usize {
        self.lines
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl ByteIo for ScriptConsole {
    fn getc(&mut self) -> Option<u8> {
        let b = self.input.pop_front()?;
        if b == b'\n' {
            self.lines -= 1;
        }
        Some(b)
    }

    fn putc(&mut self, b: u8) {
        self.output.push(b as char);
    }
}

impl fmt::Write for ScriptConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl Console for ScriptConsole {
    fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str> {
        read_line_with(self, prompt, buf)
    }
}

/// テスト用のカーネルイメージ配置
pub const TEST_LAYOUT: KernelLayout = KernelLayout {
    start: 0x0010_000c,
    entry: 0xf010_000c,
    etext: 0xf010_1a2b,
    edata: 0xf011_2300,
    end: 0xf011_2950,
};

const ROOT: PhysAddr = PhysAddr(0x1000);
/// map() が PT に使うフレーム（テストが触るアドレスと重ならない位置）
const SETUP_TABLE_FRAMES: u32 = 0x7000;

/// モニタ 1 台分の偽マシン
pub struct TestMachine {
    pub mem: SimPhysMemory,
    pub cpu: FakeCpu,
    pub console: ScriptConsole,
    pub symbols: StaticSymbols,
    pub registry: Registry<'static>,
    setup_frames: CountingAllocator,
}

impl TestMachine {
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }

    pub fn with_registry(registry: Registry<'static>) -> Self {
        TestMachine {
            mem: SimPhysMemory::new(0x8000),
            cpu: FakeCpu { root: ROOT, ebp: 0 },
            console: ScriptConsole::default(),
            symbols: StaticSymbols::empty(),
            registry,
            setup_frames: CountingAllocator::starting_at(SETUP_TABLE_FRAMES),
        }
    }

    fn pgdir(&self) -> PageDirectory {
        PageDirectory::new(self.cpu.root)
    }

    /// va のページを pa のフレームに flags で張る（PT が無ければ作る）
    pub fn map(&mut self, va: u32, pa: u32, flags: PteFlags) {
        let pgdir = self.pgdir();
        let slot = pgdir
            .walk(&mut self.mem, VirtAddr(va), Some(&mut self.setup_frames))
            .expect("page table for test mapping");
        slot.store(&mut self.mem, Pte::new(PhysAddr(pa).frame(), flags))
            .expect("store test mapping");
    }

    /// 物理 [pa, pa + pages * PAGE_SIZE) を KERNBASE 直マップに張る
    pub fn map_direct(&mut self, pa: u32, pages: u32) {
        for i in 0..pages {
            let p = pa + i * PAGE_SIZE;
            self.map(p + KERNBASE, p, PteFlags::PRESENT | PteFlags::WRITABLE);
        }
    }

    pub fn pte(&self, va: u32) -> Option<Pte> {
        self.pgdir().lookup(&self.mem, VirtAddr(va))?.load(&self.mem)
    }

    pub fn poke(&mut self, pa: PhysAddr, value: u32) {
        self.mem.write_u32(pa, value).expect("poke inside test memory");
    }

    fn ctx(&mut self) -> MonitorCtx<'_> {
        MonitorCtx {
            registry: &self.registry,
            console: &mut self.console,
            mem: &mut self.mem,
            cpu: &self.cpu,
            symbols: &self.symbols,
            layout: &TEST_LAYOUT,
        }
    }

    fn exec_inner(&mut self, line: &str, tf: Option<&mut Trapframe>) -> (Flow, String) {
        self.console.take_output();
        let flow = dispatch::runcmd(&mut self.ctx(), line, tf);
        (flow, self.console.take_output())
    }

    /// 1 行実行して、そのコマンドの出力だけを返す
    pub fn exec(&mut self, line: &str) -> (Flow, String) {
        self.exec_inner(line, None)
    }

    pub fn exec_tf(&mut self, line: &str, tf: &mut Trapframe) -> (Flow, String) {
        self.exec_inner(line, Some(tf))
    }

    /// console に積んだ行でモニタループを回す
    pub fn run(&mut self, tf: Option<&mut Trapframe>) -> MonitorExit {
        Monitor::new(self.ctx()).run(tf)
    }
}
