use std::convert::TryFrom;

use crate::huffman::HuffmanDecoder;
use crate::markers::{self, ByteReader};
use crate::quant::{self, QuantTable};
use crate::tables::{self, FrameHeader, HUFFMAN_SLOTS};
use crate::transform::{self, FilterBank};
use crate::tree::{Trees, NUM_SUBBANDS};
use crate::{Result, WsqError};
use tracing::{debug, trace};

/// A decoded grayscale image.
#[derive(Debug, Clone, PartialEq)]
pub struct WsqImage {
    pub width: usize,
    pub height: usize,
    /// Resolution from the NIST comment, if the encoder recorded one.
    pub ppi: Option<u32>,
    /// Row-major 8-bit pixels.
    pub pixels: Vec<u8>,
    /// Every COM segment in stream order, the NIST comment included.
    pub comments: Vec<String>,
}

fn ppi_from_comments(comments: &[String]) -> Option<u32> {
    comments
        .iter()
        .filter_map(|comment| tables::nistcom_value(comment, "PPI"))
        .find_map(|value| value.parse::<i64>().ok())
        .filter(|&ppi| ppi > 0)
        .and_then(|ppi| u32::try_from(ppi).ok())
}

fn denormalize(data: &[f32], frame: &FrameHeader) -> Vec<u8> {
    data.iter()
        .map(|&v| (v * frame.r_scale + frame.m_shift + 0.5).max(0.0).min(255.0) as u8)
        .collect()
}

/// Decodes a complete WSQ stream.
pub fn decode(bytes: &[u8]) -> Result<WsqImage> {
    let mut reader = ByteReader::new(bytes);
    reader.expect_marker(markers::SOI)?;

    let mut filters: Option<FilterBank> = None;
    let mut quant: Option<QuantTable> = None;
    let mut frame: Option<(FrameHeader, Trees)> = None;
    let mut huffman: Vec<Option<HuffmanDecoder>> = vec![None; HUFFMAN_SLOTS];
    let mut comments = Vec::new();
    let mut coefficients = Vec::new();

    loop {
        let marker = reader.marker()?;
        trace!(marker = marker, offset = reader.position(), "segment");

        match marker {
            markers::EOI => break,
            markers::COM => comments.push(tables::read_comment(reader.segment()?)),
            markers::DTT => filters = Some(tables::read_transform_table(reader.segment()?)?),
            markers::DQT => quant = Some(tables::read_quant_table(reader.segment()?)?),
            markers::DHT => {
                for (id, table) in tables::read_huffman_tables(reader.segment()?)? {
                    huffman[usize::from(id)] = Some(table.decoder()?);
                }
            }
            markers::DRT => {
                reader.segment()?;
            }
            markers::SOF => {
                let header = tables::read_frame_header(reader.segment()?)?;
                let trees = Trees::new(usize::from(header.width), usize::from(header.height));
                frame = Some((header, trees));
            }
            markers::SOB => {
                let id = tables::read_block_header(reader.segment()?)?;
                let (_, trees) = frame.as_ref().ok_or(WsqError::MissingSegment("SOF"))?;
                let table = quant.as_ref().ok_or(WsqError::MissingSegment("DQT"))?;
                let decoder = huffman
                    .get(usize::from(id))
                    .and_then(Option::as_ref)
                    .ok_or(WsqError::MissingHuffmanTable(id))?;

                let limit = table.coded_len(&trees.subbands, 0..NUM_SUBBANDS);
                let end = decoder.decode_block(bytes, reader.position(), &mut coefficients, limit)?;
                reader.seek(end);
            }
            other => return Err(WsqError::UnknownMarker(other)),
        }
    }

    let (frame, trees) = frame.ok_or(WsqError::MissingSegment("SOF"))?;
    let table = quant.ok_or(WsqError::MissingSegment("DQT"))?;
    let bank = filters.ok_or(WsqError::MissingSegment("DTT"))?;
    let (width, height) = (usize::from(frame.width), usize::from(frame.height));
    debug!(width, height, coefficients = coefficients.len(), "decoded entropy data");

    let mut data = quant::dequantize(&coefficients, width, height, &trees.subbands, &table)?;
    transform::reconstruct(&mut data, width, &trees.transform, &bank);

    Ok(WsqImage {
        width,
        height,
        ppi: ppi_from_comments(&comments),
        pixels: denormalize(&data, &frame),
        comments,
    })
}

/// Reads the frame header without decoding any image data.
pub fn read_header(bytes: &[u8]) -> Result<FrameHeader> {
    let mut reader = ByteReader::new(bytes);
    reader.expect_marker(markers::SOI)?;

    loop {
        match reader.marker()? {
            markers::SOF => return tables::read_frame_header(reader.segment()?),
            markers::COM | markers::DTT | markers::DQT | markers::DHT | markers::DRT => {
                reader.segment()?;
            }
            markers::SOB | markers::EOI => return Err(WsqError::MissingSegment("SOF")),
            other => return Err(WsqError::UnknownMarker(other)),
        }
    }
}
