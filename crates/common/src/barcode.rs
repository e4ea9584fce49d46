//! Code 39 barcode rendering for booking receipts.
//!
//! Booking codes are uppercase alphanumerics, which Code 39 covers natively.
//! The rendered PNG is embedded in receipt emails as a base64 data URI so the
//! ticket desk can scan it straight from the customer's phone.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{codecs::png::PngEncoder, ExtendedColorType, GrayImage, ImageEncoder, Luma};
use std::io::Cursor;

use crate::{AppError, AppResult};

/// Width of a narrow element in pixels.
const NARROW: u32 = 2;
/// Width of a wide element in pixels (standard 3:1 ratio).
const WIDE: u32 = 6;
/// Barcode height in pixels.
const HEIGHT: u32 = 60;
/// Quiet zone on each side, in narrow-element units.
const QUIET_ZONE: u32 = 10;

/// Code 39 element patterns: 9 elements per symbol, alternating bar/space
/// starting with a bar; `1` = wide, `0` = narrow.
const fn pattern(c: char) -> Option<&'static [u8; 9]> {
    Some(match c {
        '0' => b"000110100",
        '1' => b"100100001",
        '2' => b"001100001",
        '3' => b"101100000",
        '4' => b"000110001",
        '5' => b"100110000",
        '6' => b"001110000",
        '7' => b"000100101",
        '8' => b"100100100",
        '9' => b"001100100",
        'A' => b"100001001",
        'B' => b"001001001",
        'C' => b"101001000",
        'D' => b"000011001",
        'E' => b"100011000",
        'F' => b"001011000",
        'G' => b"000001101",
        'H' => b"100001100",
        'I' => b"001001100",
        'J' => b"000011100",
        'K' => b"100000011",
        'L' => b"001000011",
        'M' => b"101000010",
        'N' => b"000010011",
        'O' => b"100010010",
        'P' => b"001010010",
        'Q' => b"000000111",
        'R' => b"100000110",
        'S' => b"001000110",
        'T' => b"000010110",
        'U' => b"110000001",
        'V' => b"011000001",
        'W' => b"111000000",
        'X' => b"010010001",
        'Y' => b"110010000",
        'Z' => b"011010000",
        '-' => b"010000101",
        '.' => b"110000100",
        ' ' => b"011000100",
        '*' => b"010010100",
        _ => return None,
    })
}

/// Expand a payload into per-element widths (bar, space, bar, ...),
/// wrapped in the `*` start/stop symbols with narrow inter-character gaps.
fn element_widths(payload: &str) -> AppResult<Vec<u32>> {
    let mut widths = Vec::new();

    let mut push_symbol = |c: char| -> AppResult<()> {
        let pat = pattern(c)
            .ok_or_else(|| AppError::Validation(format!("Character not encodable in Code 39: {c:?}")))?;
        for &w in pat {
            widths.push(if w == b'1' { WIDE } else { NARROW });
        }
        // Inter-character gap (a narrow space)
        widths.push(NARROW);
        Ok(())
    };

    push_symbol('*')?;
    for c in payload.chars() {
        push_symbol(c)?;
    }
    push_symbol('*')?;

    // Drop the trailing gap after the stop symbol
    widths.pop();
    Ok(widths)
}

/// Render `payload` as a Code 39 barcode PNG.
pub fn render_code39_png(payload: &str) -> AppResult<Vec<u8>> {
    if payload.is_empty() {
        return Err(AppError::Validation("Barcode payload is empty".to_string()));
    }

    let widths = element_widths(payload)?;
    let bars_width: u32 = widths.iter().sum();
    let total_width = bars_width + 2 * QUIET_ZONE * NARROW;

    let mut img = GrayImage::from_pixel(total_width, HEIGHT, Luma([255u8]));

    let mut x = QUIET_ZONE * NARROW;
    for (i, &w) in widths.iter().enumerate() {
        // Even indices are bars, odd are spaces
        if i % 2 == 0 {
            for dx in 0..w {
                for y in 0..HEIGHT {
                    img.put_pixel(x + dx, y, Luma([0u8]));
                }
            }
        }
        x += w;
    }

    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), total_width, HEIGHT, ExtendedColorType::L8)
        .map_err(|e| AppError::Internal(format!("Failed to encode barcode PNG: {e}")))?;

    Ok(out.into_inner())
}

/// Render `payload` as a `data:image/png;base64,...` URI for embedding in HTML.
pub fn render_code39_data_uri(payload: &str) -> AppResult<String> {
    let png = render_code39_png(payload)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_booking_code_chars_encodable() {
        for c in ('A'..='Z').chain('0'..='9') {
            assert!(pattern(c).is_some(), "missing pattern for {c}");
        }
    }

    #[test]
    fn test_patterns_have_three_wide_elements() {
        // Code 39: every symbol has exactly 3 wide elements out of 9.
        for c in ('A'..='Z').chain('0'..='9').chain(['-', '.', ' ', '*']) {
            let pat = pattern(c).unwrap();
            let wide = pat.iter().filter(|&&w| w == b'1').count();
            assert_eq!(wide, 3, "symbol {c} has {wide} wide elements");
        }
    }

    #[test]
    fn test_render_png_magic_bytes() {
        let png = render_code39_png("CW1A2B3C4D").unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_render_data_uri_prefix() {
        let uri = render_code39_data_uri("CWABCD1234").unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_unencodable_character_rejected() {
        let result = render_code39_png("lowercase");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(render_code39_png("").is_err());
    }

    #[test]
    fn test_element_count() {
        // "*A*": 3 symbols of 9 elements each, plus 2 inter-character gaps.
        let widths = element_widths("A").unwrap();
        assert_eq!(widths.len(), 3 * 9 + 2);
    }
}
