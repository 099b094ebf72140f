//! Length-prefixed binary framing shared by the world, auth, and time-sync
//! daemons.
//!
//! Wire format (big-endian):
//!
//! ```text
//! +----------+----------+-------------------+
//! | body_len | opcode   | body (len bytes)   |
//! | u16      | u16      |                    |
//! +----------+----------+-------------------+
//! ```

use std::io;

use byteorder::{BigEndian, ByteOrder};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Maximum permitted packet body length. Bodies larger than this are a
/// protocol violation and close the socket.
pub const MAX_BODY_LEN: usize = 8192;

const HEADER_LEN: usize = 4;

/// A fully decoded packet: an opcode and its opaque body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u16,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("packet body length {len} exceeds the maximum of {MAX_BODY_LEN}")]
    BodyTooLarge { len: usize },
    #[error("opcode {opcode} is out of range (expected < {num_opcodes})")]
    OpcodeOutOfRange { opcode: u16, num_opcodes: u16 },
    #[error("i/o error decoding frame: {0}")]
    Io(#[from] io::Error),
}

/// Appends `opcode` and `body` to `out` as one framed packet.
///
/// Returns [`DecodeError::BodyTooLarge`] without touching `out` if `body`
/// exceeds [`MAX_BODY_LEN`].
pub fn encode_frame(opcode: u16, body: &[u8], out: &mut BytesMut) -> Result<(), DecodeError> {
    if body.len() > MAX_BODY_LEN {
        return Err(DecodeError::BodyTooLarge { len: body.len() });
    }

    out.reserve(HEADER_LEN + body.len());
    out.put_u16(body.len() as u16);
    out.put_u16(opcode);
    out.extend_from_slice(body);
    Ok(())
}

/// Incremental frame decoder. Owns no socket; callers feed it bytes as they
/// arrive (from a `tokio::io::AsyncRead` or a test buffer) and pull complete
/// frames back out.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    num_opcodes: u16,
    header: Option<(u16, u16)>,
}

impl FrameDecoder {
    /// `num_opcodes` bounds the opcode space; a decoded opcode `>=
    /// num_opcodes` is a [`DecodeError::OpcodeOutOfRange`].
    pub fn new(num_opcodes: u16) -> Self {
        Self {
            num_opcodes,
            header: None,
        }
    }

    /// Attempts to decode one frame from `buf`, consuming the bytes it uses.
    /// Returns `Ok(None)` if `buf` doesn't yet contain a complete frame.
    pub fn try_decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, DecodeError> {
        if self.header.is_none() {
            if buf.len() < HEADER_LEN {
                return Ok(None);
            }

            let body_len = BigEndian::read_u16(&buf[0..2]);
            let opcode = BigEndian::read_u16(&buf[2..4]);

            if body_len as usize > MAX_BODY_LEN {
                return Err(DecodeError::BodyTooLarge {
                    len: body_len as usize,
                });
            }
            if opcode >= self.num_opcodes {
                return Err(DecodeError::OpcodeOutOfRange {
                    opcode,
                    num_opcodes: self.num_opcodes,
                });
            }

            buf.advance(HEADER_LEN);
            self.header = Some((body_len, opcode));
        }

        let (body_len, opcode) = self.header.expect("checked above");

        if buf.len() < body_len as usize {
            return Ok(None);
        }

        let body = buf.split_to(body_len as usize).freeze();
        self.header = None;

        Ok(Some(Frame { opcode, body }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUM_OPCODES: u16 = 64;

    #[test]
    fn roundtrip_within_bounds() {
        for len in [0usize, 1, 17, MAX_BODY_LEN] {
            let body = vec![0xABu8; len];
            let mut out = BytesMut::new();
            encode_frame(5, &body, &mut out).unwrap();

            let mut dec = FrameDecoder::new(NUM_OPCODES);
            let frame = dec.try_decode(&mut out).unwrap().expect("complete frame");
            assert_eq!(frame.opcode, 5);
            assert_eq!(frame.body.as_ref(), body.as_slice());
            assert!(out.is_empty());
        }
    }

    #[test]
    fn body_too_large_on_encode() {
        let body = vec![0u8; MAX_BODY_LEN + 1];
        let mut out = BytesMut::new();
        assert!(matches!(
            encode_frame(0, &body, &mut out),
            Err(DecodeError::BodyTooLarge { .. })
        ));
    }

    #[test]
    fn body_too_large_on_decode() {
        let mut buf = BytesMut::new();
        buf.put_u16((MAX_BODY_LEN + 1) as u16);
        buf.put_u16(0);

        let mut dec = FrameDecoder::new(NUM_OPCODES);
        assert!(matches!(
            dec.try_decode(&mut buf),
            Err(DecodeError::BodyTooLarge { .. })
        ));
    }

    #[test]
    fn opcode_out_of_range() {
        let mut buf = BytesMut::new();
        buf.put_u16(0);
        buf.put_u16(NUM_OPCODES);

        let mut dec = FrameDecoder::new(NUM_OPCODES);
        assert!(matches!(
            dec.try_decode(&mut buf),
            Err(DecodeError::OpcodeOutOfRange { .. })
        ));
    }

    #[test]
    fn incremental_feed() {
        let mut out = BytesMut::new();
        encode_frame(3, b"hello", &mut out).unwrap();

        // Feed one byte at a time; decoder must only complete once all bytes
        // have arrived.
        let mut dec = FrameDecoder::new(NUM_OPCODES);
        let mut fed = BytesMut::new();
        let mut result = None;
        while !out.is_empty() {
            fed.put_u8(out[0]);
            out.advance(1);
            result = dec.try_decode(&mut fed).unwrap();
            if !out.is_empty() {
                assert!(result.is_none());
            }
        }

        let frame = result.expect("frame complete once all bytes fed");
        assert_eq!(frame.opcode, 3);
        assert_eq!(frame.body.as_ref(), b"hello");
    }
}
