use crate::tree::TransformNode;

/// Analysis low-pass filter (9 taps) of the FBI WSQ standard.
pub const LO_FILTER: [f32; 9] = [
    0.037_828_455_507_26,
    -0.023_849_465_019_56,
    -0.110_624_404_418_44,
    0.377_402_855_612_83,
    0.852_698_679_008_89,
    0.377_402_855_612_83,
    -0.110_624_404_418_44,
    -0.023_849_465_019_56,
    0.037_828_455_507_26,
];

/// Analysis high-pass filter (7 taps) of the FBI WSQ standard.
pub const HI_FILTER: [f32; 7] = [
    0.064_538_882_628_69,
    -0.040_689_417_609_16,
    -0.418_092_273_221_62,
    0.788_485_616_405_58,
    -0.418_092_273_221_62,
    -0.040_689_417_609_16,
    0.064_538_882_628_69,
];

/// Pair of odd-length, symmetric analysis filters. Low-pass outputs are
/// centred on even samples, high-pass outputs on odd samples, and lines are
/// extended by whole-sample mirroring at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    pub lo: Vec<f32>,
    pub hi: Vec<f32>,
}

impl Default for FilterBank {
    fn default() -> Self {
        FilterBank {
            lo: LO_FILTER.to_vec(),
            hi: HI_FILTER.to_vec(),
        }
    }
}

impl FilterBank {
    /// Synthesis filters: the low-pass one is the modulated analysis
    /// high-pass and vice versa.
    fn synthesis(&self) -> (Vec<f32>, Vec<f32>) {
        (modulate(&self.hi), modulate(&self.lo))
    }
}

fn modulate(filter: &[f32]) -> Vec<f32> {
    let half = filter.len() / 2;

    filter
        .iter()
        .enumerate()
        .map(|(i, &c)| if (i + half) % 2 == 0 { c } else { -c })
        .collect()
}

/// Maps any integer position onto `0..len` by whole-sample symmetric
/// extension.
fn reflect(position: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }

    let len = len as isize;
    let period = 2 * (len - 1);
    let position = position.rem_euclid(period);

    if position >= len {
        (period - position) as usize
    } else {
        position as usize
    }
}

fn filter_at(line: &[f32], filter: &[f32], centre: isize) -> f32 {
    let half = (filter.len() / 2) as isize;

    filter
        .iter()
        .enumerate()
        .map(|(i, &c)| c * line[reflect(centre - half + i as isize, line.len())])
        .sum()
}

fn analyze(input: &[f32], output: &mut [f32], bank: &FilterBank, inverted: bool) {
    let len = input.len();
    if len == 0 {
        return;
    }

    let low_len = (len + 1) / 2;
    let high_len = len / 2;
    let (low_at, high_at) = if inverted {
        (high_len, 0)
    } else {
        (0, low_len)
    };

    for k in 0..low_len {
        output[low_at + k] = filter_at(input, &bank.lo, 2 * k as isize);
    }
    for k in 0..high_len {
        output[high_at + k] = filter_at(input, &bank.hi, 2 * k as isize + 1);
    }
}

fn synthesize(input: &[f32], output: &mut [f32], lo: &[f32], hi: &[f32], inverted: bool) {
    let len = input.len();
    if len == 0 {
        return;
    }

    let low_len = (len + 1) / 2;
    let high_len = len / 2;
    let (low, high) = if inverted {
        (&input[high_len..], &input[..high_len])
    } else {
        (&input[..low_len], &input[low_len..])
    };
    let lo_half = (lo.len() / 2) as isize;
    let hi_half = (hi.len() / 2) as isize;

    for (n, out) in output.iter_mut().enumerate().take(len) {
        let n = n as isize;
        let mut acc = 0.0;

        for m in -lo_half..=lo_half {
            if (n - m).rem_euclid(2) == 0 {
                let k = (n - m).div_euclid(2);
                acc += low[reflect(2 * k, len) / 2] * lo[(m + lo_half) as usize];
            }
        }
        if high_len > 0 {
            for m in -hi_half..=hi_half {
                if (n - 1 - m).rem_euclid(2) == 0 {
                    let k = (n - 1 - m).div_euclid(2);
                    acc += high[(reflect(2 * k + 1, len) - 1) / 2] * hi[(m + hi_half) as usize];
                }
            }
        }

        *out = acc;
    }
}

/// In-place forward transform of a `width`-wide image through every node of
/// the tree, rows first.
pub fn decompose(data: &mut [f32], width: usize, nodes: &[TransformNode], bank: &FilterBank) {
    let mut scratch = vec![0.0f32; data.len()];
    let mut column = Vec::new();
    let mut filtered = Vec::new();

    for node in nodes {
        let r = node.region;

        for row in r.y..r.y + r.leny {
            let start = row * width + r.x;
            let end = start + r.lenx;
            analyze(
                &data[start..end],
                &mut scratch[start..end],
                bank,
                node.invert_rows,
            );
        }

        for col in r.x..r.x + r.lenx {
            column.clear();
            column.extend((r.y..r.y + r.leny).map(|row| scratch[row * width + col]));
            filtered.resize(column.len(), 0.0);
            analyze(&column, &mut filtered, bank, node.invert_columns);
            for (i, row) in (r.y..r.y + r.leny).enumerate() {
                data[row * width + col] = filtered[i];
            }
        }
    }
}

/// Exact inverse of [`decompose`]: walks the tree backwards, columns first.
pub fn reconstruct(data: &mut [f32], width: usize, nodes: &[TransformNode], bank: &FilterBank) {
    let (lo, hi) = bank.synthesis();
    let mut scratch = vec![0.0f32; data.len()];
    let mut column = Vec::new();
    let mut joined = Vec::new();

    for node in nodes.iter().rev() {
        let r = node.region;

        for col in r.x..r.x + r.lenx {
            column.clear();
            column.extend((r.y..r.y + r.leny).map(|row| data[row * width + col]));
            joined.resize(column.len(), 0.0);
            synthesize(&column, &mut joined, &lo, &hi, node.invert_columns);
            for (i, row) in (r.y..r.y + r.leny).enumerate() {
                scratch[row * width + col] = joined[i];
            }
        }

        for row in r.y..r.y + r.leny {
            let start = row * width + r.x;
            let end = start + r.lenx;
            synthesize(
                &scratch[start..end],
                &mut data[start..end],
                &lo,
                &hi,
                node.invert_rows,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Trees;

    fn line(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| ((i * 37 + 11) % 101) as f32 - 50.0)
            .collect()
    }

    #[test]
    fn reflect_mirrors_on_whole_samples() {
        let mapped: Vec<usize> = (-4..9).map(|i| reflect(i, 5)).collect();
        assert_eq!(mapped, vec![4, 3, 2, 1, 0, 1, 2, 3, 4, 3, 2, 1, 0]);
        assert_eq!(reflect(-3, 1), 0);
    }

    #[test]
    fn filters_have_expected_dc_gain() {
        let lo: f32 = LO_FILTER.iter().sum();
        let hi: f32 = HI_FILTER.iter().sum();
        assert!((lo - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(hi.abs() < 1e-5);
    }

    #[test]
    fn one_dimensional_round_trip_is_exact() {
        let bank = FilterBank::default();
        let (lo, hi) = bank.synthesis();

        for len in 1..40 {
            for &inverted in &[false, true] {
                let input = line(len);
                let mut bands = vec![0.0; len];
                let mut output = vec![0.0; len];
                analyze(&input, &mut bands, &bank, inverted);
                synthesize(&bands, &mut output, &lo, &hi, inverted);

                for (a, b) in input.iter().zip(output.iter()) {
                    assert!((a - b).abs() < 1e-3, "len {} inverted {}", len, inverted);
                }
            }
        }
    }

    #[test]
    fn low_pass_of_constant_line_is_scaled_constant() {
        let bank = FilterBank::default();
        let input = vec![3.0f32; 12];
        let mut output = vec![0.0; 12];
        analyze(&input, &mut output, &bank, false);

        for low in &output[..6] {
            assert!((low - 3.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
        }
        for high in &output[6..] {
            assert!(high.abs() < 1e-4);
        }
    }

    #[test]
    fn image_round_trip_is_exact() {
        let (width, height) = (97, 75);
        let trees = Trees::new(width, height);
        let bank = FilterBank::default();
        let original: Vec<f32> = (0..width * height)
            .map(|i| ((i * 7919) % 255) as f32 / 2.0 - 60.0)
            .collect();

        let mut data = original.clone();
        decompose(&mut data, width, &trees.transform, &bank);
        assert!(data.iter().zip(original.iter()).any(|(a, b)| (a - b).abs() > 1.0));

        reconstruct(&mut data, width, &trees.transform, &bank);
        for (a, b) in data.iter().zip(original.iter()) {
            assert!((a - b).abs() < 0.05);
        }
    }
}
