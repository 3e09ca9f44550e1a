//! Geometry of the WSQ wavelet decomposition.
//!
//! The transform tree has 20 nodes, each of which is split once into four
//! quadrants by a row pass and a column pass. The quantization tree describes
//! the 64 resulting subbands, of which the first 60 are coded.

pub const TRANSFORM_TREE_LEN: usize = 20;
pub const SUBBAND_TREE_LEN: usize = 64;
pub const NUM_SUBBANDS: usize = 60;

/// First subband of the second and third Huffman blocks.
pub const BLOCK_STARTS: [usize; 3] = [0, 19, 52];

/// First subband of the second and third size regions (used for the
/// reciprocal subband areas in the bit allocation).
pub const SIZE_REGION_2: usize = 4;
pub const SIZE_REGION_3: usize = 51;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub lenx: usize,
    pub leny: usize,
}

impl Region {
    pub fn area(&self) -> usize {
        self.lenx * self.leny
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformNode {
    pub region: Region,
    /// Store the high-pass half first when filtering rows.
    pub invert_rows: bool,
    /// Store the high-pass half first when filtering columns.
    pub invert_columns: bool,
}

#[derive(Debug, Clone)]
pub struct Trees {
    pub transform: [TransformNode; TRANSFORM_TREE_LEN],
    pub subbands: [Region; SUBBAND_TREE_LEN],
}

impl Trees {
    pub fn new(width: usize, height: usize) -> Self {
        let transform = build_transform_tree(width, height);
        let subbands = build_subband_tree(&transform);

        Trees {
            transform,
            subbands,
        }
    }

    /// Subband indices (into `subbands`) belonging to Huffman block `block`.
    pub fn block_range(block: usize) -> std::ops::Range<usize> {
        let end = BLOCK_STARTS.get(block + 1).copied().unwrap_or(NUM_SUBBANDS);

        BLOCK_STARTS[block]..end
    }
}

fn halves(len: usize, low_first_larger: bool) -> (usize, usize) {
    if len % 2 == 0 {
        (len / 2, len / 2)
    } else if low_first_larger {
        ((len + 1) / 2, (len - 1) / 2)
    } else {
        ((len - 1) / 2, (len + 1) / 2)
    }
}

fn build_transform_tree(width: usize, height: usize) -> [TransformNode; TRANSFORM_TREE_LEN] {
    let mut nodes = [TransformNode::default(); TRANSFORM_TREE_LEN];

    for &node in &[2, 4, 7, 9, 11, 13, 16, 18] {
        nodes[node].invert_rows = true;
    }
    for &node in &[3, 5, 8, 9, 12, 13, 17, 18] {
        nodes[node].invert_columns = true;
    }

    split_node(&mut nodes, 0, 1, width, height, 0, 0, true);

    let (lenx, lenx2) = halves(nodes[1].region.lenx, true);
    let (leny, leny2) = halves(nodes[1].region.leny, true);

    split_node(&mut nodes, 4, 6, lenx2, leny, lenx, 0, false);
    split_node(&mut nodes, 5, 10, lenx, leny2, 0, leny, false);
    split_node(&mut nodes, 14, 15, lenx, leny, 0, 0, false);

    let parent = nodes[15].region;
    nodes[19].region = Region {
        x: 0,
        y: 0,
        lenx: (parent.lenx + 1) / 2,
        leny: (parent.leny + 1) / 2,
    };

    nodes
}

/// Places node `parent` at the given rectangle and lays out its children
/// starting at `child`. When `skip_last` is set the fourth child is not a
/// transform node.
#[allow(clippy::too_many_arguments)]
fn split_node(
    nodes: &mut [TransformNode; TRANSFORM_TREE_LEN],
    parent: usize,
    child: usize,
    lenx: usize,
    leny: usize,
    x: usize,
    y: usize,
    skip_last: bool,
) {
    nodes[parent].region = Region { x, y, lenx, leny };

    let (left, right) = halves(lenx, parent != 4);
    let (top, bottom) = halves(leny, parent != 5);

    nodes[child].region = Region {
        x,
        y,
        lenx: left,
        leny: top,
    };
    nodes[child + 1].region = Region {
        x: x + left,
        y,
        lenx: right,
        leny: top,
    };
    nodes[child + 2].region = Region {
        x,
        y: y + top,
        lenx: left,
        leny: bottom,
    };
    if !skip_last {
        nodes[child + 3].region = Region {
            x: x + left,
            y: y + top,
            lenx: right,
            leny: bottom,
        };
    }
}

fn build_subband_tree(nodes: &[TransformNode; TRANSFORM_TREE_LEN]) -> [Region; SUBBAND_TREE_LEN] {
    let mut subbands = [Region::default(); SUBBAND_TREE_LEN];

    // The order matters: later calls overwrite subbands 3 and 48..=50.
    split16(&mut subbands, 3, nodes[14].region, false, false);
    split16(&mut subbands, 19, nodes[4].region, false, true);
    split16(&mut subbands, 48, nodes[0].region, false, false);
    split16(&mut subbands, 35, nodes[5].region, true, false);
    split4(&mut subbands, 0, nodes[19].region);

    subbands
}

fn split4(subbands: &mut [Region; SUBBAND_TREE_LEN], start: usize, parent: Region) {
    let (left, right) = halves(parent.lenx, true);
    let (top, bottom) = halves(parent.leny, true);
    let Region { x, y, .. } = parent;

    subbands[start] = Region {
        x,
        y,
        lenx: left,
        leny: top,
    };
    subbands[start + 1] = Region {
        x: x + left,
        y,
        lenx: right,
        leny: top,
    };
    subbands[start + 2] = Region {
        x,
        y: y + top,
        lenx: left,
        leny: bottom,
    };
    subbands[start + 3] = Region {
        x: x + left,
        y: y + top,
        lenx: right,
        leny: bottom,
    };
}

/// Splits `parent` twice in each direction. `invert_rows`/`invert_columns`
/// describe the first split; the second-level quadrants follow the fixed
/// (none, rows, columns, both) inversion pattern of the transform tree.
fn split16(
    subbands: &mut [Region; SUBBAND_TREE_LEN],
    start: usize,
    parent: Region,
    invert_columns: bool,
    invert_rows: bool,
) {
    let (tempx, temp2x) = halves(parent.lenx, !invert_rows);
    let (tempy, temp2y) = halves(parent.leny, !invert_columns);
    let Region { x, y, .. } = parent;

    // top left quadrant: no inversion
    split4(
        subbands,
        start,
        Region {
            x,
            y,
            lenx: tempx,
            leny: tempy,
        },
    );
    let top_left = subbands[start];
    let top_right = subbands[start + 1];
    let bottom_left = subbands[start + 2];

    // top right quadrant: rows inverted
    let (narrow, wide) = halves(temp2x, false);
    let qx = x + tempx;
    for (offset, &(dx, lenx)) in [(0, narrow), (narrow, wide)].iter().enumerate() {
        subbands[start + 4 + offset] = Region {
            x: qx + dx,
            y,
            lenx,
            leny: top_left.leny,
        };
        subbands[start + 6 + offset] = Region {
            x: qx + dx,
            y: bottom_left.y,
            lenx,
            leny: bottom_left.leny,
        };
    }

    // bottom left quadrant: columns inverted
    let (short, tall) = halves(temp2y, false);
    let qy = y + tempy;
    for (offset, &(dy, leny)) in [(0, short), (short, tall)].iter().enumerate() {
        subbands[start + 8 + 2 * offset] = Region {
            x,
            y: qy + dy,
            lenx: top_left.lenx,
            leny,
        };
        subbands[start + 9 + 2 * offset] = Region {
            x: top_right.x,
            y: qy + dy,
            lenx: top_right.lenx,
            leny,
        };
    }

    // bottom right quadrant: both inverted
    for &(dst, col, row) in &[(12, 4, 8), (13, 5, 8), (14, 4, 10), (15, 5, 10)] {
        let column = subbands[start + col];
        let row = subbands[start + row];
        subbands[start + dst] = Region {
            x: column.x,
            y: row.y,
            lenx: column.lenx,
            leny: row.leny,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(trees: &Trees, width: usize, height: usize) -> Vec<u8> {
        let mut hits = vec![0u8; width * height];
        for band in trees.subbands.iter() {
            for row in band.y..band.y + band.leny {
                for col in band.x..band.x + band.lenx {
                    hits[row * width + col] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn subbands_tile_the_image() {
        for &(width, height) in &[(64, 64), (97, 75), (288, 375), (545, 622), (100, 131)] {
            let trees = Trees::new(width, height);
            assert!(
                coverage(&trees, width, height).iter().all(|&hits| hits == 1),
                "{}x{}",
                width,
                height
            );
        }
    }

    #[test]
    fn first_level_splits_the_whole_image() {
        let trees = Trees::new(288, 375);
        assert_eq!(
            trees.transform[0].region,
            Region {
                x: 0,
                y: 0,
                lenx: 288,
                leny: 375
            }
        );
        assert_eq!(trees.transform[1].region.lenx, 144);
        assert_eq!(trees.transform[1].region.leny, 188);
        assert_eq!(trees.transform[2].region.x, 144);
        assert_eq!(trees.transform[3].region.y, 188);
    }

    #[test]
    fn subband_layout_matches_transform_splits() {
        // Every leaf produced by splitting a transform node must either be a
        // transform node itself or one of the coded subbands; the only other
        // leaf is the discarded high-high quadrant of the first level.
        let trees = Trees::new(97, 75);
        let nodes: Vec<Region> = trees.transform.iter().map(|n| n.region).collect();
        let coded = &trees.subbands[..NUM_SUBBANDS];
        let mut uncoded = 0;

        for node in trees.transform.iter() {
            let r = node.region;
            let (lx, hx) = ((r.lenx + 1) / 2, r.lenx / 2);
            let (ly, hy) = ((r.leny + 1) / 2, r.leny / 2);
            let xs = if node.invert_rows {
                [(r.x, hx), (r.x + hx, lx)]
            } else {
                [(r.x, lx), (r.x + lx, hx)]
            };
            let ys = if node.invert_columns {
                [(r.y, hy), (r.y + hy, ly)]
            } else {
                [(r.y, ly), (r.y + ly, hy)]
            };
            for &(x, lenx) in &xs {
                for &(y, leny) in &ys {
                    let leaf = Region { x, y, lenx, leny };
                    if !nodes.contains(&leaf) && !coded.contains(&leaf) {
                        uncoded += 1;
                    }
                }
            }
        }

        assert_eq!(uncoded, 1);
    }

    #[test]
    fn block_ranges_cover_all_coded_subbands() {
        assert_eq!(Trees::block_range(0), 0..19);
        assert_eq!(Trees::block_range(1), 19..52);
        assert_eq!(Trees::block_range(2), 52..60);
    }
}
