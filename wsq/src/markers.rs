use crate::{Result, WsqError};

pub const SOI: u16 = 0xFFA0;
pub const EOI: u16 = 0xFFA1;
pub const SOF: u16 = 0xFFA2;
pub const SOB: u16 = 0xFFA3;
pub const DTT: u16 = 0xFFA4;
pub const DQT: u16 = 0xFFA5;
pub const DHT: u16 = 0xFFA6;
pub const DRT: u16 = 0xFFA7;
pub const COM: u16 = 0xFFA8;

/// Largest payload a length-prefixed segment can carry.
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Big-endian cursor over a WSQ stream or over one segment payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(count).ok_or(WsqError::Truncated)?;
        let slice = self.data.get(self.pos..end).ok_or(WsqError::Truncated)?;
        self.pos = end;

        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn marker(&mut self) -> Result<u16> {
        let marker = self.u16()?;
        if marker >> 8 != 0xFF {
            return Err(WsqError::UnknownMarker(marker));
        }

        Ok(marker)
    }

    pub fn expect_marker(&mut self, expected: u16) -> Result<()> {
        let found = self.marker()?;
        if found != expected {
            return Err(WsqError::UnexpectedMarker(expected, found));
        }

        Ok(())
    }

    /// Reads a length field and returns the payload that follows it.
    pub fn segment(&mut self) -> Result<&'a [u8]> {
        let len = usize::from(self.u16()?);
        if len < 2 {
            return Err(WsqError::InvalidTable(
                "segment",
                format!("length field {} is too small", len),
            ));
        }

        self.bytes(len - 2)
    }
}

pub fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Writes `marker`, the length field and `payload`.
pub fn put_segment(out: &mut Vec<u8>, marker: u16, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_SEGMENT_PAYLOAD {
        return Err(WsqError::InvalidTable(
            "segment",
            format!("{} bytes do not fit in one segment", payload.len()),
        ));
    }

    put_u16(out, marker);
    put_u16(out, (payload.len() + 2) as u16);
    out.extend_from_slice(payload);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_length_includes_itself() {
        let mut out = Vec::new();
        put_segment(&mut out, COM, b"abc").unwrap();
        assert_eq!(out, vec![0xFF, 0xA8, 0x00, 0x05, b'a', b'b', b'c']);

        let mut reader = ByteReader::new(&out);
        assert_eq!(reader.marker().unwrap(), COM);
        assert_eq!(reader.segment().unwrap(), b"abc");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn rejects_non_marker_words() {
        let mut reader = ByteReader::new(&[0x12, 0x34]);
        assert!(reader.marker().is_err());
    }

    #[test]
    fn reports_wrong_marker() {
        let mut reader = ByteReader::new(&[0xFF, 0xA1]);
        match reader.expect_marker(SOI) {
            Err(WsqError::UnexpectedMarker(SOI, EOI)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn short_segment_is_truncated() {
        let mut reader = ByteReader::new(&[0x00, 0x08, 0x01]);
        assert!(reader.segment().is_err());
    }
}
