// kernel/src/monitor/parse.rs
//
// 引数の数値解釈。
// - parse_hex: strtol(s, NULL, 16) と同じ寛容さ（前置空白、符号、0x、最長一致、u32 で wrap）
// - 0 は「解釈できなかった」と区別できないので、範囲・アドレス引数では失敗扱いにする

use super::error::{MonitorError, Result};

pub fn parse_hex(s: &str) -> u32 {
    let mut bytes = s.trim_start_matches([' ', '\t']).as_bytes();

    let negative = match bytes.first() {
        Some(b'-') => {
            bytes = &bytes[1..];
            true
        }
        Some(b'+') => {
            bytes = &bytes[1..];
            false
        }
        _ => false,
    };

    if let [b'0', b'x' | b'X', rest @ ..] = bytes {
        // "0x" の後に桁が無ければ "0" だけを読んだことになる
        if rest.first().is_some_and(u8::is_ascii_hexdigit) {
            bytes = rest;
        }
    }

    let value = bytes
        .iter()
        .map_while(|&b| (b as char).to_digit(16))
        .fold(0u32, |acc, d| acc.wrapping_mul(16).wrapping_add(d));

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// 0 を失敗として扱う版
pub fn parse_nonzero_hex(s: &str) -> Option<u32> {
    match parse_hex(s) {
        0 => None,
        v => Some(v),
    }
}

/// [start, end) の 2 引数。どちらかが 0、または start > end なら Illegal range。
pub fn parse_range(start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_nonzero_hex(start).ok_or(MonitorError::IllegalRange)?;
    let end = parse_nonzero_hex(end).ok_or(MonitorError::IllegalRange)?;
    if start > end {
        return Err(MonitorError::IllegalRange);
    }
    Ok((start, end))
}
