use crate::bits::BitWriter;
use crate::huffman::{symbolize, HuffmanTable, Symbol};
use crate::markers::{self, put_u16};
use crate::quant::{self, QuantTable};
use crate::tables::{self, FrameHeader};
use crate::transform::{self, FilterBank};
use crate::tree::{Trees, BLOCK_STARTS, NUM_SUBBANDS};
use crate::{Result, WsqError};
use tracing::debug;

/// Smallest width or height the encoder accepts.
pub const MIN_DIMENSION: usize = 32;

pub const DEFAULT_BITRATE: f32 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    /// Target compressed size in bits per pixel; 0.75 gives roughly 15:1.
    pub bitrate: f32,
    /// Scan resolution recorded in the NIST comment.
    pub ppi: Option<u32>,
    /// Extra free-text comment stored after the NIST comment.
    pub comment: Option<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            bitrate: DEFAULT_BITRATE,
            ppi: None,
            comment: None,
        }
    }
}

/// Shifts pixels to zero mean and scales them into roughly [-128, 128].
fn normalize(pixels: &[u8]) -> (Vec<f32>, f32, f32) {
    let (min, max, sum) = pixels.iter().fold((u8::MAX, u8::MIN, 0u64), |(lo, hi, sum), &p| {
        (lo.min(p), hi.max(p), sum + u64::from(p))
    });
    let mean = sum as f64 / pixels.len() as f64;

    let m_shift = tables::representable(mean);
    let spread = (m_shift - f64::from(min)).max(f64::from(max) - m_shift) / 128.0;
    let r_scale = if spread > 0.0 {
        tables::representable(spread)
    } else {
        1.0
    };

    let data = pixels
        .iter()
        .map(|&p| ((f64::from(p) - m_shift) / r_scale) as f32)
        .collect();

    (data, m_shift as f32, r_scale as f32)
}

/// Bin widths as the decoder will read them back from the DQT segment.
fn snap_to_representable(table: &mut QuantTable) {
    for bin in table.bins.iter_mut().chain(table.zero_bins.iter_mut()) {
        *bin = tables::representable(f64::from(*bin)) as f32;
    }
}

fn entropy_code(out: &mut Vec<u8>, table: &HuffmanTable, symbols: &[Symbol]) -> Result<()> {
    let encoder = table.encoder()?;
    let mut writer = BitWriter::new(out);
    encoder.write(&mut writer, symbols)?;
    writer.finish();

    Ok(())
}

/// Compresses an 8-bit grayscale image, row-major, `width * height` bytes.
pub fn encode(pixels: &[u8], width: usize, height: usize, options: &EncodeOptions) -> Result<Vec<u8>> {
    let max = usize::from(u16::MAX);
    if width < MIN_DIMENSION || height < MIN_DIMENSION || width > max || height > max {
        return Err(WsqError::InvalidDimensions(width, height));
    }
    if pixels.len() != width * height {
        return Err(WsqError::PixelCountMismatch(width * height, pixels.len()));
    }
    if !options.bitrate.is_finite() || options.bitrate <= 0.0 {
        return Err(WsqError::InvalidBitrate(options.bitrate));
    }

    let (mut data, m_shift, r_scale) = normalize(pixels);
    let trees = Trees::new(width, height);
    let bank = FilterBank::default();
    transform::decompose(&mut data, width, &trees.transform, &bank);

    let mut table = quant::build_table(&data, width, &trees.subbands, options.bitrate);
    snap_to_representable(&mut table);
    let coefficients = quant::quantize(&data, width, &trees.subbands, &table);

    let mut blocks = Vec::with_capacity(BLOCK_STARTS.len());
    let mut start = 0;
    for block in 0..BLOCK_STARTS.len() {
        let len = table.coded_len(&trees.subbands, Trees::block_range(block));
        blocks.push(symbolize(&coefficients[start..start + len]));
        start += len;
    }
    debug!(
        width,
        height,
        coefficients = coefficients.len(),
        coded_subbands = (0..NUM_SUBBANDS).filter(|&b| table.is_coded(b)).count(),
        "quantized image"
    );

    let mut out = Vec::new();
    put_u16(&mut out, markers::SOI);
    tables::write_comment(
        &mut out,
        &tables::nistcom(width, height, options.ppi, options.bitrate),
    )?;
    if let Some(comment) = &options.comment {
        tables::write_comment(&mut out, comment)?;
    }
    tables::write_transform_table(&mut out, &bank)?;
    tables::write_quant_table(&mut out, &table)?;

    let first = HuffmanTable::from_symbols(&blocks[0]);
    if !blocks[0].is_empty() {
        tables::write_huffman_table(&mut out, 0, &first)?;
    }

    tables::write_frame_header(
        &mut out,
        &FrameHeader {
            black: 0,
            white: 255,
            width: width as u16,
            height: height as u16,
            m_shift,
            r_scale,
            encoder: 0,
            software: 0,
        },
    )?;

    if !blocks[0].is_empty() {
        tables::write_block_header(&mut out, 0)?;
        entropy_code(&mut out, &first, &blocks[0])?;
    }

    let rest: Vec<Symbol> = blocks[1..].iter().flatten().copied().collect();
    if !rest.is_empty() {
        let second = HuffmanTable::from_symbols(&rest);
        tables::write_huffman_table(&mut out, 1, &second)?;
        for symbols in blocks[1..].iter().filter(|symbols| !symbols.is_empty()) {
            tables::write_block_header(&mut out, 1)?;
            entropy_code(&mut out, &second, symbols)?;
        }
    }

    put_u16(&mut out, markers::EOI);
    debug!(bytes = out.len(), "encoded WSQ stream");

    Ok(out)
}
