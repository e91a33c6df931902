//! # Key Decoder
//!
//! Turns raw bytes read from the terminal into one logical key.
//!
//! Arrow keys are not standardized: the same "up" may arrive as
//! `ESC [ A`, `ESC O A`, the legacy console triple `00 E0 48`, or a bare
//! `[A` when the escape byte was delivered in an earlier read. Anything
//! that is not recognized decodes to [`KeyEvent::None`], never an error,
//! so the caller just reads again.
//!
//! Decoding order (first match wins):
//!
//! ```text
//! 1. ESC alone                    → Escape
//! 2. CR | LF | CRLF               → Enter
//! 3. ESC [ x | ESC O x            → x in A/B/C/D → Up/Down/Right/Left
//! 4. 00 E0 scan                   → 48/50/4D/4B → Up/Down/Right/Left
//! 5. printable residue [A..[D     → Up/Down/Right/Left
//! 6. q | Q | 0x03                 → Escape
//! 7. anything else                → None
//! ```

const ESC: u8 = 0x1B;
const CTRL_C: u8 = 0x03;
const LEGACY_PREFIX: [u8; 2] = [0x00, 0xE0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    /// Unrecognized input. No state change.
    None,
}

/// Decodes one key chunk. Pure; never fails.
pub fn decode(bytes: &[u8]) -> KeyEvent {
    if bytes == [ESC] {
        return KeyEvent::Escape;
    }

    if matches!(bytes, b"\r" | b"\n" | b"\r\n") {
        return KeyEvent::Enter;
    }

    if bytes.len() >= 3
        && bytes[0] == ESC
        && matches!(bytes[1], b'[' | b'O')
        && let Some(key) = arrow_from_letter(bytes[2])
    {
        return key;
    }

    if bytes.len() >= 3
        && bytes[..2] == LEGACY_PREFIX
        && let Some(key) = arrow_from_scan_code(bytes[2])
    {
        return key;
    }

    let cleaned = printable_residue(bytes);
    match cleaned.as_str() {
        "[A" => return KeyEvent::Up,
        "[B" => return KeyEvent::Down,
        "[C" => return KeyEvent::Right,
        "[D" => return KeyEvent::Left,
        _ => {}
    }

    match bytes {
        b"q" | b"Q" | [CTRL_C] => KeyEvent::Escape,
        _ => KeyEvent::None,
    }
}

fn arrow_from_letter(byte: u8) -> Option<KeyEvent> {
    match byte {
        b'A' => Some(KeyEvent::Up),
        b'B' => Some(KeyEvent::Down),
        b'C' => Some(KeyEvent::Right),
        b'D' => Some(KeyEvent::Left),
        _ => None,
    }
}

fn arrow_from_scan_code(byte: u8) -> Option<KeyEvent> {
    match byte {
        0x48 => Some(KeyEvent::Up),
        0x50 => Some(KeyEvent::Down),
        0x4D => Some(KeyEvent::Right),
        0x4B => Some(KeyEvent::Left),
        _ => None,
    }
}

/// Drops control characters and invalid UTF-8, keeping newlines.
fn printable_residue(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c == '\n' || (!c.is_control() && c != char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Length of the first key token in `bytes`.
///
/// A single read may hold several keystrokes (type-ahead, paste, or a
/// scripted stream). Splitting on token boundaries lets [`decode`] see one
/// key at a time. Returns 0 only for empty input.
pub fn key_len(bytes: &[u8]) -> usize {
    match bytes {
        [] => 0,
        [ESC, b'[', rest @ ..] => 2 + csi_body_len(rest),
        [ESC, b'O', _, ..] => 3,
        [ESC, b'O'] => 2,
        [0x00, 0xE0, _, ..] => 3,
        [0x00, 0xE0] => 2,
        [b'\r', b'\n', ..] => 2,
        [b'[', b'A'..=b'D', ..] => 2,
        [first, ..] => utf8_char_len(*first).min(bytes.len()),
    }
}

/// True when `bytes` is the start of a longer sequence: `ESC`, `ESC [`
/// with parameters but no final byte, `ESC O`, `00` or `00 E0`.
///
/// A read that filled its buffer may have cut a sequence there, so the
/// caller should look for the rest before decoding.
pub fn is_incomplete(bytes: &[u8]) -> bool {
    match bytes {
        [ESC] | [ESC, b'O'] | [0x00] | [0x00, 0xE0] => true,
        [ESC, b'[', rest @ ..] => rest.iter().all(|b| (0x20..=0x3F).contains(b)),
        _ => false,
    }
}

/// Parameter and intermediate bytes plus the final byte of a CSI sequence.
fn csi_body_len(rest: &[u8]) -> usize {
    let body = rest
        .iter()
        .take_while(|b| (0x20..=0x3F).contains(*b))
        .count();
    match rest.get(body) {
        Some(b) if (0x40..=0x7E).contains(b) => body + 1,
        _ => body,
    }
}

fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}
