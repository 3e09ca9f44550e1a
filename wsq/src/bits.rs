use crate::{Result, WsqError};

/// MSB-first bit packer for entropy coded data. Every 0xFF byte is followed
/// by a stuffed 0x00 so the data never looks like a marker.
pub struct BitWriter<'a> {
    out: &'a mut Vec<u8>,
    acc: u8,
    filled: u8,
}

impl<'a> BitWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        BitWriter {
            out,
            acc: 0,
            filled: 0,
        }
    }

    pub fn put(&mut self, value: u32, count: u8) {
        for shift in (0..count).rev() {
            self.acc = (self.acc << 1) | ((value >> shift) & 1) as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.out.push(self.acc);
                if self.acc == 0xFF {
                    self.out.push(0x00);
                }
                self.acc = 0;
                self.filled = 0;
            }
        }
    }

    /// Pads the last partial byte with 1 bits.
    pub fn finish(mut self) {
        if self.filled > 0 {
            let pad = 8 - self.filled;
            self.put((1 << pad) - 1, pad);
        }
    }
}

/// Reads entropy coded data until the next marker.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    acc: u8,
    left: u8,
    at_marker: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        BitReader {
            data,
            pos,
            acc: 0,
            left: 0,
            at_marker: false,
        }
    }

    /// Offset of the marker that ended the data, or of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next bit, or `None` once a marker has been reached.
    pub fn bit(&mut self) -> Result<Option<u8>> {
        if self.left == 0 {
            if self.at_marker {
                return Ok(None);
            }

            let byte = *self.data.get(self.pos).ok_or(WsqError::Truncated)?;
            if byte == 0xFF {
                match self.data.get(self.pos + 1) {
                    Some(0x00) => self.pos += 2,
                    Some(_) => {
                        self.at_marker = true;
                        return Ok(None);
                    }
                    None => return Err(WsqError::Truncated),
                }
            } else {
                self.pos += 1;
            }

            self.acc = byte;
            self.left = 8;
        }

        self.left -= 1;
        Ok(Some((self.acc >> self.left) & 1))
    }

    /// Reads `count` bits as an unsigned value. Running into a marker here
    /// means the stream was cut in the middle of a symbol.
    pub fn bits(&mut self, count: u8) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            let bit = self.bit()?.ok_or(WsqError::Truncated)?;
            value = (value << 1) | u32::from(bit);
        }

        Ok(value)
    }
}
