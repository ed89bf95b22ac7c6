//! HTTP/2 frame header, per spec.md §4.1 "HTTP/2 frame header" and RFC 9113
//! §4.1. Grounded on `original_source/include/nexus/quic/detail/frame.hpp`
//! and `include/http2/detail/frame.hpp`.
//!
//! 9 bytes: 24-bit big-endian length, 1-byte type, 1-byte flags, 32-bit
//! big-endian stream id whose high bit is reserved (must be zero on write;
//! masked off on read).

use super::network_order::{U24, U32, U8};
use super::{Decode, DecodeResult, Encode};
use crate::error::Http2Error;

pub const FRAME_HEADER_LEN: usize = 9;
const MAX_FRAME_LENGTH: u32 = (1 << 24) - 1;
const STREAM_ID_RESERVED_MASK: u32 = 0x7fff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u32,
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,
}

impl FrameHeader {
    /// Validates `length` against the 24-bit maximum (spec.md §4.1: "Frame
    /// payloads > 2^24-1 are rejected with `frame_size_error`").
    pub fn new(length: u32, frame_type: u8, flags: u8, stream_id: u32) -> Result<Self, Http2Error> {
        if length > MAX_FRAME_LENGTH {
            return Err(Http2Error::FrameSizeError);
        }
        Ok(FrameHeader {
            length,
            frame_type,
            flags,
            stream_id: stream_id & STREAM_ID_RESERVED_MASK,
        })
    }
}

impl Encode for FrameHeader {
    fn encoded_size(&self) -> usize {
        FRAME_HEADER_LEN
    }

    fn encode(&self, out: &mut Vec<u8>) {
        U24::new(u64::from(self.length)).expect("validated in new()").encode(out);
        U8::new(u64::from(self.frame_type)).unwrap().encode(out);
        U8::new(u64::from(self.flags)).unwrap().encode(out);
        U32::new(u64::from(self.stream_id & STREAM_ID_RESERVED_MASK))
            .unwrap()
            .encode(out);
    }
}

impl Decode for FrameHeader {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let length = U24::decode(input)?.get() as u32;
        let frame_type = U8::decode(input)?.get() as u8;
        let flags = U8::decode(input)?.get() as u8;
        let stream_id = U32::decode(input)?.get() as u32 & STREAM_ID_RESERVED_MASK;
        Ok(FrameHeader { length, frame_type, flags, stream_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;

    #[test]
    fn s3_encodes_and_round_trips() {
        let header = FrameHeader::new(0x0102_03, 4, 5, 0x0607_0809).unwrap();
        let bytes = encode_to_vec(&header);
        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);

        let mut input: &[u8] = &bytes;
        let decoded = FrameHeader::decode(&mut input).unwrap();
        assert_eq!(decoded, header);
        assert!(input.is_empty());
    }

    #[test]
    fn reserved_stream_id_bit_is_masked_on_decode() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x01];
        let decoded = FrameHeader::decode(&mut &bytes[..]).unwrap();
        assert_eq!(decoded.stream_id, 1);

        bytes[5] = 0x00;
        let decoded = FrameHeader::decode(&mut &bytes[..]).unwrap();
        assert_eq!(decoded.stream_id, 1);
    }

    #[test]
    fn reserved_stream_id_bit_is_cleared_on_write() {
        let header = FrameHeader::new(0, 0, 0, 0x8000_0001).unwrap();
        assert_eq!(header.stream_id, 1);
    }

    #[test]
    fn length_over_24_bits_is_rejected() {
        assert!(matches!(
            FrameHeader::new(1 << 24, 0, 0, 0),
            Err(Http2Error::FrameSizeError)
        ));
    }
}
