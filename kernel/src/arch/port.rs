// kernel/src/arch/port.rs
//
// I/O ポート。
// - x86_64 では x86_64 crate の Port をそのまま使う。
// - 32bit x86 ではその crate の命令ラッパが使えないので、u8 だけの最小版を持つ。

#[cfg(target_arch = "x86_64")]
pub use x86_64::instructions::port::Port;

#[cfg(target_arch = "x86")]
pub use self::i386::Port;

#[cfg(target_arch = "x86")]
mod i386 {
    use core::marker::PhantomData;

    pub struct Port<T> {
        port: u16,
        _width: PhantomData<T>,
    }

    impl<T> Port<T> {
        pub const fn new(port: u16) -> Self {
            Port {
                port,
                _width: PhantomData,
            }
        }
    }

    impl Port<u8> {
        /// # Safety
        /// ポートの読み出しに副作用がありうる
        pub unsafe fn read(&mut self) -> u8 {
            let value: u8;
            core::arch::asm!("in al, dx", out("al") value, in("dx") self.port, options(nomem, nostack, preserves_flags));
            value
        }

        /// # Safety
        /// 書き込み先デバイスの状態を変える
        pub unsafe fn write(&mut self, value: u8) {
            core::arch::asm!("out dx, al", in("dx") self.port, in("al") value, options(nomem, nostack, preserves_flags));
        }
    }
}
