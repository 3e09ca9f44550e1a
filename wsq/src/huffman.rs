use crate::bits::{BitReader, BitWriter};
use crate::{Result, WsqError};

pub const MAX_CODE_LEN: usize = 16;
pub const NUM_SYMBOLS: usize = 256;

const MAX_ZERO_RUN: usize = 100;
const MIN_COEFF: i32 = -73;
const MAX_COEFF: i32 = 74;
const COEFF_OFFSET: i32 = 180;

const POS_ESCAPE_8: u8 = 101;
const NEG_ESCAPE_8: u8 = 102;
const POS_ESCAPE_16: u8 = 103;
const NEG_ESCAPE_16: u8 = 104;
const ZERO_RUN_8: u8 = 105;
const ZERO_RUN_16: u8 = 106;

/// One entropy coding symbol with its trailing raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub value: u8,
    pub extra_len: u8,
    pub extra: u16,
}

impl Symbol {
    fn plain(value: u8) -> Self {
        Symbol {
            value,
            extra_len: 0,
            extra: 0,
        }
    }

    fn with_extra(value: u8, extra_len: u8, extra: u16) -> Self {
        Symbol {
            value,
            extra_len,
            extra,
        }
    }
}

fn push_zero_run(symbols: &mut Vec<Symbol>, mut run: usize) {
    while run > 0 {
        let chunk = run.min(usize::from(u16::MAX));
        let symbol = if chunk <= MAX_ZERO_RUN {
            Symbol::plain(chunk as u8)
        } else if chunk <= usize::from(u8::MAX) {
            Symbol::with_extra(ZERO_RUN_8, 8, chunk as u16)
        } else {
            Symbol::with_extra(ZERO_RUN_16, 16, chunk as u16)
        };
        symbols.push(symbol);
        run -= chunk;
    }
}

/// Turns quantized coefficients into symbols: zero runs 1..=100, escapes
/// 101..=106 and in-range coefficients as `180 + c`.
pub fn symbolize(coefficients: &[i32]) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut run = 0;

    for &coefficient in coefficients {
        if coefficient == 0 {
            run += 1;
            continue;
        }
        push_zero_run(&mut symbols, run);
        run = 0;

        let magnitude = coefficient.unsigned_abs().min(u32::from(u16::MAX)) as u16;
        let symbol = if (MIN_COEFF..=MAX_COEFF).contains(&coefficient) {
            Symbol::plain((coefficient + COEFF_OFFSET) as u8)
        } else if coefficient > 0 {
            if magnitude <= u16::from(u8::MAX) {
                Symbol::with_extra(POS_ESCAPE_8, 8, magnitude)
            } else {
                Symbol::with_extra(POS_ESCAPE_16, 16, magnitude)
            }
        } else if magnitude <= u16::from(u8::MAX) {
            Symbol::with_extra(NEG_ESCAPE_8, 8, magnitude)
        } else {
            Symbol::with_extra(NEG_ESCAPE_16, 16, magnitude)
        };
        symbols.push(symbol);
    }
    push_zero_run(&mut symbols, run);

    symbols
}

/// A Huffman table in its DHT form: the number of codes of each length
/// 1..=16 followed by the symbols in code order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    pub bits: [u8; MAX_CODE_LEN],
    pub values: Vec<u8>,
}

fn least_frequent(freq: &[u64], exclude: Option<usize>) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (symbol, &count) in freq.iter().enumerate() {
        if count == 0 || Some(symbol) == exclude {
            continue;
        }
        match best {
            Some(b) if freq[b] < count => {}
            _ => best = Some(symbol),
        }
    }

    best
}

impl HuffmanTable {
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let mut freq = [0u32; NUM_SYMBOLS];
        for symbol in symbols {
            freq[usize::from(symbol.value)] += 1;
        }

        Self::from_frequencies(&freq)
    }

    /// Builds a length-limited code (JPEG Annex K). One extra symbol with
    /// count 1 reserves the all-ones code word.
    pub fn from_frequencies(frequencies: &[u32; NUM_SYMBOLS]) -> Self {
        let mut freq: Vec<u64> = frequencies.iter().map(|&f| u64::from(f)).collect();
        freq.push(1);

        let mut sizes = vec![0usize; NUM_SYMBOLS + 1];
        let mut others: Vec<Option<usize>> = vec![None; NUM_SYMBOLS + 1];

        loop {
            let v1 = match least_frequent(&freq, None) {
                Some(v) => v,
                None => break,
            };
            let v2 = match least_frequent(&freq, Some(v1)) {
                Some(v) => v,
                None => break,
            };

            freq[v1] += freq[v2];
            freq[v2] = 0;

            let mut v = v1;
            sizes[v] += 1;
            while let Some(next) = others[v] {
                v = next;
                sizes[v] += 1;
            }
            others[v] = Some(v2);

            let mut v = v2;
            sizes[v] += 1;
            while let Some(next) = others[v] {
                v = next;
                sizes[v] += 1;
            }
        }

        let longest = sizes.iter().copied().max().unwrap_or(0);
        if longest == 0 {
            return HuffmanTable {
                bits: [0; MAX_CODE_LEN],
                values: Vec::new(),
            };
        }

        let mut counts = vec![0usize; longest.max(MAX_CODE_LEN) + 1];
        for &size in sizes.iter().filter(|&&s| s > 0) {
            counts[size] += 1;
        }

        let mut len = counts.len() - 1;
        while len > MAX_CODE_LEN {
            if counts[len] > 0 {
                let mut j = len - 2;
                while counts[j] == 0 {
                    j -= 1;
                }
                counts[len] -= 2;
                counts[len - 1] += 1;
                counts[j + 1] += 2;
                counts[j] -= 1;
            } else {
                len -= 1;
            }
        }
        while counts[len] == 0 {
            len -= 1;
        }
        // drop the reserved code
        counts[len] -= 1;

        let mut bits = [0u8; MAX_CODE_LEN];
        for (i, slot) in bits.iter_mut().enumerate() {
            *slot = counts[i + 1] as u8;
        }

        let mut values = Vec::new();
        for size in 1..=longest {
            for (symbol, _) in sizes[..NUM_SYMBOLS]
                .iter()
                .enumerate()
                .filter(|&(_, &s)| s == size)
            {
                values.push(symbol as u8);
            }
        }

        HuffmanTable { bits, values }
    }

    /// Canonical (symbol, code, length) triples; fails on an over-full table.
    fn codes(&self) -> Result<Vec<(u8, u16, u8)>> {
        let total: usize = self.bits.iter().map(|&b| usize::from(b)).sum();
        if total > self.values.len() {
            return Err(WsqError::InvalidTable(
                "Huffman",
                format!("{} codes but {} symbols", total, self.values.len()),
            ));
        }

        let mut codes = Vec::with_capacity(total);
        let mut code = 0u32;
        let mut next = 0;
        for (i, &count) in self.bits.iter().enumerate() {
            let len = i + 1;
            for _ in 0..count {
                if code >= 1 << len {
                    return Err(WsqError::InvalidTable(
                        "Huffman",
                        "code space exhausted".to_string(),
                    ));
                }
                codes.push((self.values[next], code as u16, len as u8));
                code += 1;
                next += 1;
            }
            code <<= 1;
        }

        Ok(codes)
    }

    pub fn encoder(&self) -> Result<HuffmanEncoder> {
        let mut codes = vec![None; NUM_SYMBOLS];
        for (symbol, code, len) in self.codes()? {
            codes[usize::from(symbol)] = Some((code, len));
        }

        Ok(HuffmanEncoder { codes })
    }

    pub fn decoder(&self) -> Result<HuffmanDecoder> {
        self.codes()?;

        let mut min_code = [0i32; MAX_CODE_LEN + 1];
        let mut max_code = [-1i32; MAX_CODE_LEN + 1];
        let mut first_value = [0usize; MAX_CODE_LEN + 1];
        let mut code = 0i32;
        let mut next = 0usize;

        for len in 1..=MAX_CODE_LEN {
            let count = usize::from(self.bits[len - 1]);
            if count > 0 {
                first_value[len] = next;
                min_code[len] = code;
                code += count as i32;
                next += count;
                max_code[len] = code - 1;
            }
            code <<= 1;
        }

        Ok(HuffmanDecoder {
            min_code,
            max_code,
            first_value,
            values: self.values.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    codes: Vec<Option<(u16, u8)>>,
}

impl HuffmanEncoder {
    pub fn write(&self, writer: &mut BitWriter, symbols: &[Symbol]) -> Result<()> {
        for symbol in symbols {
            let (code, len) = self.codes[usize::from(symbol.value)].ok_or_else(|| {
                WsqError::InvalidTable("Huffman", format!("no code for symbol {}", symbol.value))
            })?;
            writer.put(u32::from(code), len);
            if symbol.extra_len > 0 {
                writer.put(u32::from(symbol.extra), symbol.extra_len);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    min_code: [i32; MAX_CODE_LEN + 1],
    max_code: [i32; MAX_CODE_LEN + 1],
    first_value: [usize; MAX_CODE_LEN + 1],
    values: Vec<u8>,
}

impl HuffmanDecoder {
    /// Next symbol, or `None` when the data ends at a marker.
    fn symbol(&self, reader: &mut BitReader) -> Result<Option<u8>> {
        let mut code = match reader.bit()? {
            Some(bit) => i32::from(bit),
            None => return Ok(None),
        };
        let mut len = 1;

        while code > self.max_code[len] {
            len += 1;
            if len > MAX_CODE_LEN {
                return Err(WsqError::InvalidHuffmanCode);
            }
            match reader.bit()? {
                Some(bit) => code = (code << 1) | i32::from(bit),
                None => return Ok(None),
            }
        }

        let index = self.first_value[len] + (code - self.min_code[len]) as usize;
        self.values
            .get(index)
            .copied()
            .map(Some)
            .ok_or(WsqError::InvalidHuffmanCode)
    }

    /// Decodes one block of coefficients into `out`, refusing to grow it
    /// past `limit`. Returns the offset of the marker that ends the block.
    pub fn decode_block(
        &self,
        data: &[u8],
        start: usize,
        out: &mut Vec<i32>,
        limit: usize,
    ) -> Result<usize> {
        let mut reader = BitReader::new(data, start);

        while let Some(symbol) = self.symbol(&mut reader)? {
            let (value, repeat) = match symbol {
                1..=100 => (0, usize::from(symbol)),
                POS_ESCAPE_8 => (reader.bits(8)? as i32, 1),
                NEG_ESCAPE_8 => (-(reader.bits(8)? as i32), 1),
                POS_ESCAPE_16 => (reader.bits(16)? as i32, 1),
                NEG_ESCAPE_16 => (-(reader.bits(16)? as i32), 1),
                ZERO_RUN_8 => (0, reader.bits(8)? as usize),
                ZERO_RUN_16 => (0, reader.bits(16)? as usize),
                107..=254 => (i32::from(symbol) - COEFF_OFFSET, 1),
                _ => return Err(WsqError::InvalidHuffmanCode),
            };

            if out.len() + repeat > limit {
                return Err(WsqError::CoefficientCount(out.len() + repeat, limit));
            }
            out.extend(std::iter::repeat(value).take(repeat));
        }

        Ok(reader.position())
    }
}
