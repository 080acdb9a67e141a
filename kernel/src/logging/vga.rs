// src/logging/vga.rs
//
// VGA テキストモード(物理 0xb8000)への最小限出力。
// - init(): Writer を KERNBASE 直マップ上のバッファで初期化
// - write_str(): 文字列（改行・バックスペース対応）
//
// 目的:
// - ログとモニタのエコーが「画面に出る」こと。
// - スクロールは最下行に書いて上に送るだけ。色付けはしない。

use core::fmt::{self, Write};
use spin::Mutex;
use volatile::Volatile;

use crate::mem::addr::PhysAddr;

const BUFFER_HEIGHT: usize = 25;
const BUFFER_WIDTH: usize = 80;

const VGA_TEXT_PHYS: PhysAddr = PhysAddr(0xb8000);

#[derive(Clone, Copy)]
#[repr(u8)]
enum Color {
    Black = 0x0,
    LightGray = 0x7,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct ScreenChar {
    ascii_character: u8,
    color_code: u8,
}

#[repr(transparent)]
struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

pub struct Writer {
    col: usize,
    color_code: u8,
    buffer: &'static mut Buffer,
}

impl Writer {
    fn blank(&self) -> ScreenChar {
        ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code,
        }
    }

    fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            b'\r' => self.col = 0,
            // backspace: 1 文字戻して消す
            0x08 => {
                if self.col > 0 {
                    self.col -= 1;
                    let blank = self.blank();
                    self.buffer.chars[BUFFER_HEIGHT - 1][self.col].write(blank);
                }
            }
            byte => {
                if self.col >= BUFFER_WIDTH {
                    self.new_line();
                }
                let row = BUFFER_HEIGHT - 1;
                let col = self.col;
                let printable = if (0x20..0x7f).contains(&byte) { byte } else { 0xfe };
                self.buffer.chars[row][col].write(ScreenChar {
                    ascii_character: printable,
                    color_code: self.color_code,
                });
                self.col += 1;
            }
        }
    }

    fn new_line(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let ch = self.buffer.chars[row][col].read();
                self.buffer.chars[row - 1][col].write(ch);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
        self.col = 0;
    }

    fn clear_row(&mut self, row: usize) {
        let blank = self.blank();
        for col in 0..BUFFER_WIDTH {
            self.buffer.chars[row][col].write(blank);
        }
    }
}

impl Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.write_byte(b);
        }
        Ok(())
    }
}

static WRITER: Mutex<Option<Writer>> = Mutex::new(None);

pub fn init() {
    let Some(va) = VGA_TEXT_PHYS.kernel_alias() else {
        return;
    };
    let writer = Writer {
        col: 0,
        color_code: (Color::LightGray as u8) | ((Color::Black as u8) << 4),
        // Safety: 直マップ上の VGA テキストバッファ。Writer はこの 1 つだけ。
        buffer: unsafe { &mut *(va.0 as usize as *mut Buffer) },
    };
    *WRITER.lock() = Some(writer);
}

/// 初期化済みなら Writer を貸す
pub fn with_writer(f: impl FnOnce(&mut Writer)) {
    if let Some(ref mut w) = *WRITER.lock() {
        f(w);
    }
}

pub fn write_str(s: &str) {
    with_writer(|w| {
        let _ = w.write_str(s);
    });
}
