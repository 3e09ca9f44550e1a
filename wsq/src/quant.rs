use crate::tree::{Region, NUM_SUBBANDS, SIZE_REGION_2, SIZE_REGION_3, SUBBAND_TREE_LEN};
use crate::{Result, WsqError};

/// Dequantization bin center used by every known WSQ encoder.
pub const BIN_CENTER: f32 = 0.44;

/// Subbands whose variance is below this threshold are not coded.
const VARIANCE_THRESHOLD: f64 = 1.01;

/// Above this summed variance of the lowest four subbands, every variance is
/// measured on a central window only.
const CROPPED_VARIANCE_SUM: f64 = 20000.0;

/// Largest quantized magnitude produced by the encoder; keeps every index
/// inside the 16-bit escape codes.
const MAX_QUANTIZED: f64 = 32000.0;

/// Quantization parameters as carried by the DQT segment.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantTable {
    pub bin_center: f32,
    /// Bin width per subband, 0 for subbands that are not coded.
    pub bins: [f32; SUBBAND_TREE_LEN],
    /// Zero bin width per subband.
    pub zero_bins: [f32; SUBBAND_TREE_LEN],
}

impl QuantTable {
    pub fn is_coded(&self, subband: usize) -> bool {
        subband < NUM_SUBBANDS && self.bins[subband] != 0.0
    }

    /// Number of coefficients the subbands in `range` contribute.
    pub fn coded_len(&self, subbands: &[Region], range: std::ops::Range<usize>) -> usize {
        range
            .filter(|&band| self.is_coded(band))
            .map(|band| subbands[band].area())
            .sum()
    }
}

fn region_variance(data: &[f32], width: usize, region: Region, cropped: bool) -> f64 {
    let mut window = region;
    if cropped {
        let inner = Region {
            x: region.x + region.lenx / 8,
            y: region.y + (9 * region.leny) / 32,
            lenx: (3 * region.lenx) / 4,
            leny: (7 * region.leny) / 16,
        };
        if inner.area() >= 2 {
            window = inner;
        }
    }

    let count = window.area();
    if count < 2 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for row in window.y..window.y + window.leny {
        let start = row * width + window.x;
        for &value in &data[start..start + window.lenx] {
            let value = f64::from(value);
            sum += value;
            sum_sq += value * value;
        }
    }

    let count = count as f64;
    ((sum_sq - sum * sum / count) / (count - 1.0)).max(0.0)
}

pub fn subband_variances(data: &[f32], width: usize, subbands: &[Region]) -> Vec<f64> {
    let mut variances: Vec<f64> = subbands[..SIZE_REGION_2]
        .iter()
        .map(|&band| region_variance(data, width, band, true))
        .collect();
    let cropped = variances.iter().sum::<f64>() >= CROPPED_VARIANCE_SUM;

    variances.extend(
        subbands[SIZE_REGION_2..NUM_SUBBANDS]
            .iter()
            .map(|&band| region_variance(data, width, band, cropped)),
    );

    variances
}

fn subband_weight(subband: usize) -> f64 {
    match subband {
        52 | 56 => 1.32,
        53 | 58 => 1.08,
        54 | 57 => 1.42,
        _ => 1.0,
    }
}

fn reciprocal_area(subband: usize) -> f64 {
    if subband < SIZE_REGION_2 {
        1.0 / 1024.0
    } else if subband < SIZE_REGION_3 {
        1.0 / 256.0
    } else {
        1.0 / 16.0
    }
}

fn max_magnitude(data: &[f32], width: usize, region: Region) -> f64 {
    (region.y..region.y + region.leny)
        .flat_map(|row| {
            let start = row * width + region.x;
            data[start..start + region.lenx].iter()
        })
        .fold(0.0f64, |max, &value| max.max(f64::from(value).abs()))
}

/// Solves the bin widths that spend roughly `bitrate` bits per pixel.
pub fn build_table(data: &[f32], width: usize, subbands: &[Region], bitrate: f32) -> QuantTable {
    let variances = subband_variances(data, width, subbands);
    let sigma: Vec<f64> = variances.iter().map(|v| v.sqrt()).collect();

    let mut relative = [0.0f64; NUM_SUBBANDS];
    for (band, &variance) in variances.iter().enumerate() {
        relative[band] = if variance < VARIANCE_THRESHOLD {
            0.0
        } else if band < SIZE_REGION_2 {
            1.0
        } else {
            10.0 / (subband_weight(band) * variance.ln())
        };
    }

    let mut active: Vec<usize> = (0..NUM_SUBBANDS).filter(|&b| relative[b] != 0.0).collect();
    let mut scale = 1.0f64;
    let rate = f64::from(bitrate);

    while !active.is_empty() {
        let area: f64 = active.iter().map(|&b| reciprocal_area(b)).sum();
        let product: f64 = active
            .iter()
            .map(|&b| (sigma[b] / relative[b]).powf(reciprocal_area(b)))
            .product();
        scale = (2f64.powf(rate / area - 1.0) / 2.5) / product.powf(1.0 / area);

        let before = active.len();
        active.retain(|&b| relative[b] / scale < 5.0 * sigma[b]);
        if active.len() == before {
            break;
        }
    }

    let mut bins = [0.0f32; SUBBAND_TREE_LEN];
    let mut zero_bins = [0.0f32; SUBBAND_TREE_LEN];
    for &band in &active {
        let floor = max_magnitude(data, width, subbands[band]) / MAX_QUANTIZED;
        let bin = (relative[band] / scale).max(floor);
        if bin.is_finite() && bin > 0.0 {
            bins[band] = bin as f32;
            zero_bins[band] = (1.2 * bin) as f32;
        }
    }

    QuantTable {
        bin_center: BIN_CENTER,
        bins,
        zero_bins,
    }
}

/// Quantizes every coded subband, in subband order and row-major within a
/// subband.
pub fn quantize(data: &[f32], width: usize, subbands: &[Region], table: &QuantTable) -> Vec<i32> {
    let mut coefficients = Vec::new();

    for (band, region) in subbands.iter().enumerate().take(NUM_SUBBANDS) {
        if !table.is_coded(band) {
            continue;
        }
        let bin = table.bins[band];
        let half_zero = table.zero_bins[band] / 2.0;

        for row in region.y..region.y + region.leny {
            let start = row * width + region.x;
            for &value in &data[start..start + region.lenx] {
                let index = if -half_zero <= value && value <= half_zero {
                    0
                } else if value > 0.0 {
                    ((value - half_zero) / bin + 1.0) as i32
                } else {
                    ((value + half_zero) / bin - 1.0) as i32
                };
                coefficients.push(index);
            }
        }
    }

    coefficients
}

/// Places dequantized coefficients back into a `width` x `height` plane.
pub fn dequantize(
    coefficients: &[i32],
    width: usize,
    height: usize,
    subbands: &[Region],
    table: &QuantTable,
) -> Result<Vec<f32>> {
    let expected = table.coded_len(subbands, 0..NUM_SUBBANDS);
    if coefficients.len() != expected {
        return Err(WsqError::CoefficientCount(coefficients.len(), expected));
    }

    let mut data = vec![0.0f32; width * height];
    let mut next = coefficients.iter();

    for (band, region) in subbands.iter().enumerate().take(NUM_SUBBANDS) {
        if !table.is_coded(band) {
            continue;
        }
        let bin = table.bins[band];
        let half_zero = table.zero_bins[band] / 2.0;

        for row in region.y..region.y + region.leny {
            let start = row * width + region.x;
            for (slot, &index) in data[start..start + region.lenx].iter_mut().zip(&mut next) {
                *slot = match index {
                    0 => 0.0,
                    i if i > 0 => bin * (i as f32 - table.bin_center) + half_zero,
                    i => bin * (i as f32 + table.bin_center) - half_zero,
                };
            }
        }
    }

    Ok(data)
}
