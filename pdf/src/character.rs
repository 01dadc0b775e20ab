pub(crate) const NULL: u8 = 0;
pub(crate) const HORIZONTAL_TAB: u8 = 9;
pub(crate) const LINE_FEED: u8 = 10;
pub(crate) const FORM_FEED: u8 = 12;
pub(crate) const CARRIAGE_RETURN: u8 = 13;
pub(crate) const SPACE: u8 = 32;

pub(crate) const GREATER_THAN_SIGN: u8 = b'>';
pub(crate) const TILDE: u8 = b'~';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

pub(crate) fn is_white_space(ch: &u8) -> bool {
    matches!(
        ch,
        &NULL | &HORIZONTAL_TAB | &LINE_FEED | &FORM_FEED | &CARRIAGE_RETURN | &SPACE
    )
}

pub(crate) fn hex_value(ch: &u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn hex_digit(nibble: u8) -> u8 {
    HEX_DIGITS[(nibble & 0x0f) as usize]
}
