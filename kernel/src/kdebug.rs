// kernel/src/kdebug.rs
//
// 役割:
// - backtrace 用に「eip → 関数名 / ファイル / 行」を引く境界（SymbolTable）を定義する。
// - カーネルが静的に埋め込んだ関数表（StaticSymbols）による実装を提供する。
//
// やらないこと:
// - STABS / DWARF の解析（表はカーネル側がビルド時に作る前提）

/// eip の解決結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EipDebugInfo<'a> {
    pub file: &'a str,
    pub line: u32,
    pub fn_name: &'a str,
    /// 関数先頭アドレス
    pub fn_addr: u32,
}

impl EipDebugInfo<'_> {
    /// 関数先頭からのオフセット
    pub fn offset(&self, eip: u32) -> u32 {
        eip.wrapping_sub(self.fn_addr)
    }
}

pub trait SymbolTable {
    fn debuginfo_eip(&self, eip: u32) -> Option<EipDebugInfo<'_>>;
}

/// 関数内の行情報（addr 以降がその行）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineEntry {
    pub addr: u32,
    pub line: u32,
}

/// 関数 1 つ分のシンボル
#[derive(Clone, Copy, Debug)]
pub struct FnSymbol {
    pub name: &'static str,
    pub file: &'static str,
    pub addr: u32,
    pub size: u32,
    /// 宣言行
    pub line: u32,
    /// addr 昇順
    pub lines: &'static [LineEntry],
}

impl FnSymbol {
    fn contains(&self, eip: u32) -> bool {
        eip >= self.addr && eip - self.addr < self.size
    }

    fn line_of(&self, eip: u32) -> u32 {
        let idx = self.lines.partition_point(|l| l.addr <= eip);
        match idx {
            0 => self.line,
            n => self.lines[n - 1].line,
        }
    }
}

/// addr 昇順の関数表
pub struct StaticSymbols {
    functions: &'static [FnSymbol],
}

impl StaticSymbols {
    /// 表が addr 昇順でなければ None
    pub fn new(functions: &'static [FnSymbol]) -> Option<Self> {
        let sorted = functions.windows(2).all(|w| w[0].addr <= w[1].addr);
        if !sorted {
            return None;
        }
        Some(StaticSymbols { functions })
    }

    pub const fn empty() -> Self {
        StaticSymbols { functions: &[] }
    }
}

impl SymbolTable for StaticSymbols {
    fn debuginfo_eip(&self, eip: u32) -> Option<EipDebugInfo<'_>> {
        let idx = self.functions.partition_point(|f| f.addr <= eip);
        let f = self.functions.get(idx.checked_sub(1)?)?;
        if !f.contains(eip) {
            return None;
        }
        Some(EipDebugInfo {
            file: f.file,
            line: f.line_of(eip),
            fn_name: f.name,
            fn_addr: f.addr,
        })
    }
}
