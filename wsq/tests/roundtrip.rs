use wsq::{decode, encode, is_wsq, read_header, EncodeOptions, WsqError};

fn ridges(width: usize, height: usize) -> Vec<u8> {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let sigma = width as f64 / 2.5;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (xf, yf) = (x as f64, y as f64);
            let envelope = (-((xf - cx).powi(2) + (yf - cy).powi(2)) / (2.0 * sigma * sigma)).exp();
            let value = 128.0 + 90.0 * ((xf * 0.9 + yf * 0.5) / 2.2).sin() * envelope;
            pixels.push(value.max(0.0).min(255.0) as u8);
        }
    }
    pixels
}

fn gradient(width: usize, height: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x * 127 / (width - 1) + y * 127 / (height - 1)) as u8))
        .collect()
}

fn mean_abs_error(a: &[u8], b: &[u8]) -> f64 {
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| u64::from((i16::from(x) - i16::from(y)).unsigned_abs()))
        .sum();
    total as f64 / a.len() as f64
}

fn segment_markers(bytes: &[u8]) -> Vec<u16> {
    let mut markers = Vec::new();
    let mut pos = 0;
    while pos + 1 < bytes.len() {
        if bytes[pos] == 0xFF && bytes[pos + 1] >= 0xA0 && bytes[pos + 1] <= 0xA8 {
            let marker = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]);
            markers.push(marker);
            pos += 2;
            if marker != 0xFFA0 && marker != 0xFFA1 {
                let len = usize::from(u16::from_be_bytes([bytes[pos], bytes[pos + 1]]));
                pos += len;
            }
        } else {
            pos += 1;
        }
    }
    markers
}

#[test]
fn ridge_pattern_survives_compression() {
    for &(width, height) in &[(96, 80), (288, 375)] {
        let pixels = ridges(width, height);
        let bytes = encode(&pixels, width, height, &EncodeOptions::default()).unwrap();
        assert!(bytes.len() < pixels.len());

        let image = decode(&bytes).unwrap();
        assert_eq!((image.width, image.height), (width, height));
        assert_eq!(image.pixels.len(), pixels.len());

        let error = mean_abs_error(&pixels, &image.pixels);
        assert!(error < 2.0, "{}x{}: mean error {}", width, height, error);
    }
}

#[test]
fn gradient_survives_compression() {
    let pixels = gradient(96, 80);
    let bytes = encode(&pixels, 96, 80, &EncodeOptions::default()).unwrap();
    let image = decode(&bytes).unwrap();

    let error = mean_abs_error(&pixels, &image.pixels);
    assert!(error < 5.0, "mean error {}", error);
}

#[test]
fn constant_image_is_exact() {
    let pixels = vec![77u8; 64 * 48];
    let bytes = encode(&pixels, 64, 48, &EncodeOptions::default()).unwrap();
    let image = decode(&bytes).unwrap();

    assert_eq!(image.pixels, pixels);
    // nothing to entropy code
    assert!(!segment_markers(&bytes).contains(&0xFFA3));
}

#[test]
fn odd_dimensions_are_preserved() {
    let pixels = ridges(101, 67);
    let bytes = encode(&pixels, 101, 67, &EncodeOptions::default()).unwrap();
    let image = decode(&bytes).unwrap();

    assert_eq!((image.width, image.height), (101, 67));
}

#[test]
fn stream_follows_marker_order() {
    let pixels = ridges(288, 375);
    let options = EncodeOptions {
        comment: Some("captured by test".to_string()),
        ..EncodeOptions::default()
    };
    let bytes = encode(&pixels, 288, 375, &options).unwrap();

    let markers = segment_markers(&bytes);
    assert_eq!(
        &markers[..7],
        &[0xFFA0, 0xFFA8, 0xFFA8, 0xFFA4, 0xFFA5, 0xFFA6, 0xFFA2]
    );
    assert_eq!(markers[7], 0xFFA3);
    assert_eq!(*markers.last().unwrap(), 0xFFA1);
    assert_eq!(markers.iter().filter(|&&m| m == 0xFFA6).count(), 2);
}

#[test]
fn header_and_comments_are_readable() {
    let pixels = ridges(96, 80);
    let options = EncodeOptions {
        ppi: Some(500),
        comment: Some("left index".to_string()),
        ..EncodeOptions::default()
    };
    let bytes = encode(&pixels, 96, 80, &options).unwrap();

    let header = read_header(&bytes).unwrap();
    assert_eq!((header.width, header.height), (96, 80));
    assert_eq!((header.black, header.white), (0, 255));
    assert!(header.r_scale > 0.0);

    let image = decode(&bytes).unwrap();
    assert_eq!(image.ppi, Some(500));
    assert_eq!(image.comments.len(), 2);
    assert!(image.comments[0].starts_with("NIST_COM"));
    assert_eq!(image.comments[1], "left index");
}

#[test]
fn lower_bitrate_gives_smaller_stream() {
    let pixels = ridges(288, 375);
    let high = encode(&pixels, 288, 375, &EncodeOptions::default()).unwrap();
    let low = encode(
        &pixels,
        288,
        375,
        &EncodeOptions {
            bitrate: 0.25,
            ..EncodeOptions::default()
        },
    )
    .unwrap();

    assert!(low.len() < high.len());
}

#[test]
fn sniffs_soi_marker() {
    let bytes = encode(&ridges(64, 64), 64, 64, &EncodeOptions::default()).unwrap();
    assert!(is_wsq(&bytes));
    assert!(!is_wsq(b"\x89PNG\r\n\x1a\n"));
    assert!(!is_wsq(&[0xFF]));
}

#[test]
fn truncated_stream_is_an_error() {
    let bytes = encode(&ridges(96, 80), 96, 80, &EncodeOptions::default()).unwrap();

    for &cut in &[bytes.len() - 2, bytes.len() / 2, 40] {
        assert!(decode(&bytes[..cut]).is_err(), "cut at {}", cut);
    }
}

#[test]
fn missing_frame_header_is_reported() {
    let bytes = [0xFF, 0xA0, 0xFF, 0xA1];
    match read_header(&bytes) {
        Err(WsqError::MissingSegment(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
