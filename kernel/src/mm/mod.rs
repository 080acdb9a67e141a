// src/mm/mod.rs
//
// ページテーブルまわりの入り口。
// - pgdir: モニタが使うページテーブル walker。
// - フレームの確保はカーネル側の責務。walk は mem::phys::FrameAllocator を借りるだけ。

pub mod pgdir;
