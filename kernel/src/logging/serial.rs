// kernel/src/logging/serial.rs
//
// COM1 (0x3F8) への最小限のシリアル入出力。
// - init(): 115200bps, 8N1 に初期化
// - write_str(): 文字列を送信
// - read_byte(): 1 byte 受信（ポーリング, ブロッキング）

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::arch::port::Port;

const COM1: u16 = 0x3F8;

/// LSR: 受信データあり
const LSR_DATA_READY: u8 = 0x01;
/// LSR: 送信バッファ空き
const LSR_TX_EMPTY: u8 = 0x20;

static SERIAL_INITIALIZED: AtomicBool = AtomicBool::new(false);

pub fn init() {
    if SERIAL_INITIALIZED.swap(true, Ordering::AcqRel) {
        return;
    }

    unsafe {
        let mut port_int_en = Port::<u8>::new(COM1 + 1);
        let mut port_line_ctrl = Port::<u8>::new(COM1 + 3);
        let mut port_div_low = Port::<u8>::new(COM1);
        let mut port_div_high = Port::<u8>::new(COM1 + 1);
        let mut port_fifo_ctrl = Port::<u8>::new(COM1 + 2);
        let mut port_modem_ctrl = Port::<u8>::new(COM1 + 4);

        port_int_en.write(0x00);

        port_line_ctrl.write(0x80);
        port_div_low.write(0x01);
        port_div_high.write(0x00);

        port_line_ctrl.write(0x03);
        port_fifo_ctrl.write(0xC7);
        port_modem_ctrl.write(0x0B);
    }
}

fn line_status() -> u8 {
    unsafe { Port::<u8>::new(COM1 + 5).read() }
}

fn write_byte(byte: u8) {
    while line_status() & LSR_TX_EMPTY == 0 {}
    unsafe {
        Port::<u8>::new(COM1).write(byte);
    }
}

/// 1 byte 届くまで待つ
pub fn read_byte() -> u8 {
    while line_status() & LSR_DATA_READY == 0 {
        core::hint::spin_loop();
    }
    unsafe { Port::<u8>::new(COM1).read() }
}

pub fn write_str(s: &str) {
    for b in s.bytes() {
        if b == b'\n' {
            write_byte(b'\r');
        }
        write_byte(b);
    }
}

pub struct SerialWriter;

impl fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(s);
        Ok(())
    }
}
