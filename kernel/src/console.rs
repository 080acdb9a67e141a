// kernel/src/console.rs
//
// 役割:
// - モニタの入出力境界（Console）。出力は fmt::Write、入力は 1 行単位。
// - 1 byte 入出力（ByteIo）から行編集付きの read_line を組み立てる共通処理。
//
// やること:
// - プロンプト表示、エコー、バックスペース、CR/LF で確定
//
// やらないこと:
// - 履歴・カーソル移動などの本格的な行編集

use core::fmt;

/// モニタのコンソール
pub trait Console: fmt::Write {
    /// prompt を出して 1 行読む。入力が尽きたら None。
    fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str>;
}

/// 1 byte 単位の端末
pub trait ByteIo {
    /// 入力が尽きたら None
    fn getc(&mut self) -> Option<u8>;

    fn putc(&mut self, b: u8);
}

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

/// ByteIo の上で 1 行読む。
///
/// - 印字可能 ASCII だけを buf に溜める（buf.len() - 1 文字まで）
/// - BS / DEL で 1 文字消す
/// - CR / LF で確定し、改行をエコーする
pub fn read_line_with<'b, I: ByteIo + ?Sized>(
    io: &mut I,
    prompt: &str,
    buf: &'b mut [u8],
) -> Option<&'b str> {
    for b in prompt.bytes() {
        io.putc(b);
    }

    let limit = buf.len().saturating_sub(1);
    let mut len = 0;
    loop {
        match io.getc()? {
            BACKSPACE | DELETE if len > 0 => {
                io.putc(BACKSPACE);
                len -= 1;
            }
            b'\r' | b'\n' => {
                io.putc(b'\n');
                break;
            }
            c @ 0x20..=0x7e if len < limit => {
                io.putc(c);
                buf[len] = c;
                len += 1;
            }
            _ => {}
        }
    }

    core::str::from_utf8(&buf[..len]).ok()
}

#[cfg(target_os = "none")]
pub use self::serial_console::SerialConsole;

#[cfg(target_os = "none")]
mod serial_console {
    use core::fmt;

    use super::{read_line_with, ByteIo, Console};
    use crate::logging::serial;

    /// COM1 を使うコンソール。`vga_mirror` なら出力を VGA にも複写する。
    pub struct SerialConsole;

    impl SerialConsole {
        pub fn new() -> Self {
            serial::init();
            SerialConsole
        }
    }

    impl ByteIo for SerialConsole {
        fn getc(&mut self) -> Option<u8> {
            Some(serial::read_byte())
        }

        fn putc(&mut self, b: u8) {
            let mut tmp = [0u8; 4];
            let s = (b as char).encode_utf8(&mut tmp);
            let _ = fmt::Write::write_str(self, s);
        }
    }

    impl fmt::Write for SerialConsole {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            serial::write_str(s);
            #[cfg(feature = "vga_mirror")]
            crate::logging::vga::write_str(s);
            Ok(())
        }
    }

    impl Console for SerialConsole {
        fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str> {
            read_line_with(self, prompt, buf)
        }
    }
}
