// crates/msbt_core/src/consts.rs

pub const MAGIC: &[u8; 8] = b"MsgStdBn";

/// Fixed header length; the section table starts right after it.
pub const HDR_SIZE: usize = 32;
/// tag[4] + size[4] + reserved[8]
pub const SECTION_HDR_SIZE: usize = 16;

pub const ALIGNMENT: usize = 16;
pub const PADDING_BYTE: u8 = 0xAB;

/// Byte offset of the file-size field inside the header.
pub const FILE_SIZE_OFFSET: usize = 0x12;

pub const ENCODING_UTF8: u8 = 0x00;
pub const ENCODING_UTF16: u8 = 0x01;

pub const TAG_LBL1: [u8; 4] = *b"LBL1";
pub const TAG_TXT2: [u8; 4] = *b"TXT2";
pub const TAG_NLI1: [u8; 4] = *b"NLI1";
pub const TAG_ATO1: [u8; 4] = *b"ATO1";
pub const TAG_ATR1: [u8; 4] = *b"ATR1";
pub const TAG_TSY1: [u8; 4] = *b"TSY1";

/// Opaque sections kept as raw payloads.
pub const OPAQUE_TAGS: [[u8; 4]; 4] = [TAG_NLI1, TAG_ATO1, TAG_ATR1, TAG_TSY1];

/// Label names carry a 1-byte length prefix.
pub const LABEL_MAX_LEN: usize = u8::MAX as usize;

const _: () = {
    assert!(HDR_SIZE % ALIGNMENT == 0);
    assert!(FILE_SIZE_OFFSET + 4 + 10 == HDR_SIZE);
};
