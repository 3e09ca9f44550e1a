//! Marker segment payloads: transform, quantization and Huffman tables,
//! the frame header, block headers and comments.

use crate::huffman::{HuffmanTable, MAX_CODE_LEN};
use crate::markers::{self, put_segment, put_u16, put_u32, ByteReader};
use crate::quant::QuantTable;
use crate::transform::FilterBank;
use crate::tree::SUBBAND_TREE_LEN;
use crate::{Result, WsqError};

const U16_LIMIT: f64 = u16::MAX as f64;
const U32_LIMIT: f64 = u32::MAX as f64;
const MAX_SCALE: u8 = 30;
const MAX_FILTER_LEN: usize = 31;

/// Number of Huffman table slots a stream may define.
pub const HUFFMAN_SLOTS: usize = 8;

/// Header of every NIST comment.
pub const NISTCOM_TAG: &str = "NIST_COM";

/// A non-negative real stored as `raw / 10^scale`, with the largest scale
/// that keeps `raw` below `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaled {
    pub scale: u8,
    pub raw: u32,
}

impl Scaled {
    fn with_limit(value: f64, limit: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Scaled { scale: 0, raw: 0 };
        }

        let mut scale = 0;
        let mut value = value;
        while value * 10.0 < limit && scale < MAX_SCALE {
            value *= 10.0;
            scale += 1;
        }

        Scaled {
            scale,
            raw: value.round().min(limit) as u32,
        }
    }

    pub fn u16(value: f64) -> Self {
        Self::with_limit(value, U16_LIMIT)
    }

    pub fn u32(value: f64) -> Self {
        Self::with_limit(value, U32_LIMIT)
    }

    pub fn value(self) -> f64 {
        f64::from(self.raw) / 10f64.powi(i32::from(self.scale))
    }

    fn put16(self, out: &mut Vec<u8>) {
        out.push(self.scale);
        put_u16(out, self.raw as u16);
    }

    fn read16(reader: &mut ByteReader) -> Result<Self> {
        Ok(Scaled {
            scale: reader.u8()?,
            raw: u32::from(reader.u16()?),
        })
    }
}

/// Rounds `value` to what a 16-bit scaled field can carry.
pub fn representable(value: f64) -> f64 {
    Scaled::u16(value).value()
}

fn check_consumed(reader: &ByteReader, table: &'static str) -> Result<()> {
    if reader.remaining() != 0 {
        return Err(WsqError::InvalidTable(
            table,
            format!("{} unexpected trailing bytes", reader.remaining()),
        ));
    }

    Ok(())
}

/// DTT: the right half (centre tap included) of each symmetric analysis
/// filter, every tap as sign byte plus a 32-bit scaled magnitude.
pub fn write_transform_table(out: &mut Vec<u8>, bank: &FilterBank) -> Result<()> {
    let mut payload = vec![bank.lo.len() as u8, bank.hi.len() as u8];
    for filter in &[&bank.lo, &bank.hi] {
        for &tap in &filter[filter.len() / 2..] {
            payload.push(if tap < 0.0 { 1 } else { 0 });
            let scaled = Scaled::u32(f64::from(tap.abs()));
            payload.push(scaled.scale);
            put_u32(&mut payload, scaled.raw);
        }
    }

    put_segment(out, markers::DTT, &payload)
}

pub fn read_transform_table(payload: &[u8]) -> Result<FilterBank> {
    let mut reader = ByteReader::new(payload);
    let lo_len = usize::from(reader.u8()?);
    let hi_len = usize::from(reader.u8()?);

    let mut read_filter = |len: usize| -> Result<Vec<f32>> {
        if len % 2 == 0 || len > MAX_FILTER_LEN {
            return Err(WsqError::InvalidTable(
                "transform",
                format!("unsupported filter length {}", len),
            ));
        }

        let half = len / 2;
        let mut filter = vec![0.0f32; len];
        for i in 0..=half {
            let negative = reader.u8()? != 0;
            let scaled = Scaled {
                scale: reader.u8()?,
                raw: reader.u32()?,
            };
            let magnitude = scaled.value() as f32;
            let tap = if negative { -magnitude } else { magnitude };
            filter[half + i] = tap;
            filter[half - i] = tap;
        }

        Ok(filter)
    };

    let lo = read_filter(lo_len)?;
    let hi = read_filter(hi_len)?;
    check_consumed(&reader, "transform")?;

    Ok(FilterBank { lo, hi })
}

pub fn write_quant_table(out: &mut Vec<u8>, table: &QuantTable) -> Result<()> {
    let mut payload = Vec::with_capacity(3 + 6 * SUBBAND_TREE_LEN);
    Scaled::u16(f64::from(table.bin_center)).put16(&mut payload);
    for band in 0..SUBBAND_TREE_LEN {
        Scaled::u16(f64::from(table.bins[band])).put16(&mut payload);
        Scaled::u16(f64::from(table.zero_bins[band])).put16(&mut payload);
    }

    put_segment(out, markers::DQT, &payload)
}

pub fn read_quant_table(payload: &[u8]) -> Result<QuantTable> {
    let mut reader = ByteReader::new(payload);
    let bin_center = Scaled::read16(&mut reader)?.value() as f32;
    let mut bins = [0.0f32; SUBBAND_TREE_LEN];
    let mut zero_bins = [0.0f32; SUBBAND_TREE_LEN];
    for band in 0..SUBBAND_TREE_LEN {
        bins[band] = Scaled::read16(&mut reader)?.value() as f32;
        zero_bins[band] = Scaled::read16(&mut reader)?.value() as f32;
    }
    check_consumed(&reader, "quantization")?;

    Ok(QuantTable {
        bin_center,
        bins,
        zero_bins,
    })
}

pub fn write_huffman_table(out: &mut Vec<u8>, id: u8, table: &HuffmanTable) -> Result<()> {
    let mut payload = Vec::with_capacity(1 + MAX_CODE_LEN + table.values.len());
    payload.push(id);
    payload.extend_from_slice(&table.bits);
    payload.extend_from_slice(&table.values);

    put_segment(out, markers::DHT, &payload)
}

/// A DHT segment may define several tables back to back.
pub fn read_huffman_tables(payload: &[u8]) -> Result<Vec<(u8, HuffmanTable)>> {
    let mut reader = ByteReader::new(payload);
    let mut tables = Vec::new();

    while reader.remaining() > 0 {
        let id = reader.u8()?;
        if usize::from(id) >= HUFFMAN_SLOTS {
            return Err(WsqError::InvalidTable(
                "Huffman",
                format!("table id {} out of range", id),
            ));
        }

        let mut bits = [0u8; MAX_CODE_LEN];
        bits.copy_from_slice(reader.bytes(MAX_CODE_LEN)?);
        let count = bits.iter().map(|&b| usize::from(b)).sum();
        let values = reader.bytes(count)?.to_vec();

        tables.push((id, HuffmanTable { bits, values }));
    }

    Ok(tables)
}

/// Contents of the SOF segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHeader {
    pub black: u8,
    pub white: u8,
    pub width: u16,
    pub height: u16,
    /// Mean subtracted from every pixel before the transform.
    pub m_shift: f32,
    /// Divisor applied after the shift.
    pub r_scale: f32,
    pub encoder: u8,
    pub software: u16,
}

pub fn write_frame_header(out: &mut Vec<u8>, frame: &FrameHeader) -> Result<()> {
    let mut payload = Vec::with_capacity(15);
    payload.push(frame.black);
    payload.push(frame.white);
    put_u16(&mut payload, frame.height);
    put_u16(&mut payload, frame.width);
    Scaled::u16(f64::from(frame.m_shift)).put16(&mut payload);
    Scaled::u16(f64::from(frame.r_scale)).put16(&mut payload);
    payload.push(frame.encoder);
    put_u16(&mut payload, frame.software);

    put_segment(out, markers::SOF, &payload)
}

pub fn read_frame_header(payload: &[u8]) -> Result<FrameHeader> {
    let mut reader = ByteReader::new(payload);
    let black = reader.u8()?;
    let white = reader.u8()?;
    let height = reader.u16()?;
    let width = reader.u16()?;
    let m_shift = Scaled::read16(&mut reader)?.value() as f32;
    let r_scale = Scaled::read16(&mut reader)?.value() as f32;
    let encoder = reader.u8()?;
    let software = reader.u16()?;
    check_consumed(&reader, "frame header")?;

    if width == 0 || height == 0 {
        return Err(WsqError::InvalidDimensions(
            usize::from(width),
            usize::from(height),
        ));
    }
    if r_scale <= 0.0 {
        return Err(WsqError::InvalidTable(
            "frame header",
            "scale must be positive".to_string(),
        ));
    }

    Ok(FrameHeader {
        black,
        white,
        width,
        height,
        m_shift,
        r_scale,
        encoder,
        software,
    })
}

pub fn write_block_header(out: &mut Vec<u8>, table: u8) -> Result<()> {
    put_segment(out, markers::SOB, &[table])
}

pub fn read_block_header(payload: &[u8]) -> Result<u8> {
    match payload {
        &[table] => Ok(table),
        _ => Err(WsqError::InvalidTable(
            "block header",
            format!("expected 1 byte, got {}", payload.len()),
        )),
    }
}

pub fn write_comment(out: &mut Vec<u8>, text: &str) -> Result<()> {
    put_segment(out, markers::COM, text.as_bytes())
}

pub fn read_comment(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}

/// The NIST comment every encoder writes right after SOI.
pub fn nistcom(width: usize, height: usize, ppi: Option<u32>, bitrate: f32) -> String {
    let ppi = ppi.map_or_else(|| "-1".to_string(), |ppi| ppi.to_string());
    let lines = [
        format!("PIX_WIDTH {}", width),
        format!("PIX_HEIGHT {}", height),
        "PIX_DEPTH 8".to_string(),
        format!("PPI {}", ppi),
        "LOSSY 1".to_string(),
        "COLORSPACE GRAY".to_string(),
        "COMPRESSION WSQ".to_string(),
        format!("WSQ_BITRATE {:.6}", bitrate),
    ];

    let mut text = format!("{} {}", NISTCOM_TAG, lines.len() + 1);
    for line in lines.iter() {
        text.push('\n');
        text.push_str(line);
    }

    text
}

/// Value of `key` in a NIST comment, `None` for other comments.
pub fn nistcom_value<'a>(comment: &'a str, key: &str) -> Option<&'a str> {
    if !comment.starts_with(NISTCOM_TAG) {
        return None;
    }

    comment.lines().skip(1).find_map(|line| {
        let mut parts = line.splitn(2, ' ');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == key => Some(v.trim()),
            _ => None,
        }
    })
}
