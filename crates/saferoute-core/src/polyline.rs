//! Encoded polyline codec (five decimal digits of precision).
//!
//! Each coordinate is stored as a signed delta from the previous point,
//! zig-zag encoded and split into 5-bit groups. Every group except the last
//! carries the 0x20 continuation bit and the result is offset by 63 into the
//! printable ASCII range.

use thiserror::Error;

use crate::models::Coordinate;

pub const POLYLINE_PRECISION: f64 = 1e5;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;
const MAX_LAT: f64 = 90.0;
const MAX_LNG: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },
    #[error("polyline ended inside a value at offset {offset}")]
    Truncated { offset: usize },
    #[error("polyline value starting at offset {offset} overflows 64 bits")]
    Overflow { offset: usize },
}

pub fn encode_polyline(points: &[Coordinate]) -> String {
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        let lat = fixed_point(point.lat, MAX_LAT);
        let lng = fixed_point(point.lng, MAX_LNG);
        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

/// Out-of-range degrees are clamped so every delta fits comfortably in `i64`.
fn fixed_point(degrees: f64, limit: f64) -> i64 {
    (degrees.clamp(-limit, limit) * POLYLINE_PRECISION).round() as i64
}

fn encode_value(value: i64, out: &mut String) {
    let mut bits = if value < 0 {
        !(value << 1) as u64
    } else {
        (value << 1) as u64
    };
    while bits >= CONTINUATION_BIT {
        out.push(((CONTINUATION_BIT | (bits & CHUNK_MASK)) as u8 + CHAR_OFFSET) as char);
        bits >>= 5;
    }
    out.push((bits as u8 + CHAR_OFFSET) as char);
}

pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while offset < bytes.len() {
        lat = accumulate(lat, bytes, &mut offset)?;
        if offset >= bytes.len() {
            return Err(PolylineError::Truncated { offset });
        }
        lng = accumulate(lng, bytes, &mut offset)?;
        points.push(Coordinate::new(
            lat as f64 / POLYLINE_PRECISION,
            lng as f64 / POLYLINE_PRECISION,
        ));
    }

    Ok(points)
}

fn accumulate(total: i64, bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let delta = decode_value(bytes, offset)?;
    total
        .checked_add(delta)
        .ok_or(PolylineError::Overflow { offset: start })
}

fn decode_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*offset) else {
            return Err(PolylineError::Truncated { offset: *offset });
        };
        if !(CHAR_OFFSET..=b'~').contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                offset: *offset,
            });
        }
        if shift >= 64 {
            return Err(PolylineError::Overflow { offset: start });
        }
        let chunk = u64::from(byte - CHAR_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        *offset += 1;
        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[Coordinate], expected: &[Coordinate]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (a.lat - e.lat).abs() <= 1e-5 && (a.lng - e.lng).abs() <= 1e-5,
                "{a:?} differs from {e:?}"
            );
        }
    }

    #[test]
    fn encodes_reference_polyline() {
        // Reference vector from the published encoding algorithm description.
        let points = [
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ];
        assert_eq!(encode_polyline(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn decodes_reference_polyline() {
        let decoded = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("decode");
        assert_close(
            &decoded,
            &[
                Coordinate::new(38.5, -120.2),
                Coordinate::new(40.7, -120.95),
                Coordinate::new(43.252, -126.453),
            ],
        );
    }

    #[test]
    fn round_trip_preserves_points_within_precision() {
        let points = [
            Coordinate::new(37.0, -120.5),
            Coordinate::new(37.0011, -120.4991),
        ];
        let decoded = decode_polyline(&encode_polyline(&points)).expect("decode");
        assert_close(&decoded, &points);
    }

    #[test]
    fn empty_input_round_trips() {
        assert_eq!(encode_polyline(&[]), "");
        assert_eq!(decode_polyline("").expect("decode"), Vec::new());
    }

    #[test]
    fn rejects_bytes_outside_alphabet() {
        let err = decode_polyline("_p~iF ps|U").unwrap_err();
        assert_eq!(err, PolylineError::InvalidByte { byte: b' ', offset: 5 });
    }

    #[test]
    fn rejects_truncated_input() {
        // Latitude only.
        assert!(matches!(
            decode_polyline("_p~iF"),
            Err(PolylineError::Truncated { .. })
        ));
        // Continuation bit set on the final byte.
        assert!(matches!(
            decode_polyline("_p~iF~ps"),
            Err(PolylineError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_running_sum_overflow() {
        let mut encoded = String::new();
        encode_value(1 << 62, &mut encoded);
        encode_value(0, &mut encoded);
        let second_lat_offset = encoded.len();
        encode_value(1 << 62, &mut encoded);
        encode_value(0, &mut encoded);

        assert_eq!(
            decode_polyline(&encoded),
            Err(PolylineError::Overflow {
                offset: second_lat_offset
            })
        );
    }

    #[test]
    fn encoding_clamps_out_of_range_degrees() {
        let encoded = encode_polyline(&[
            Coordinate::new(1e300, 0.0),
            Coordinate::new(-1e300, 500.0),
        ]);
        let decoded = decode_polyline(&encoded).expect("decode");
        assert_close(
            &decoded,
            &[Coordinate::new(90.0, 0.0), Coordinate::new(-90.0, 180.0)],
        );
    }

    #[test]
    fn rejects_overlong_values() {
        let endless = "~".repeat(20);
        assert!(matches!(
            decode_polyline(&endless),
            Err(PolylineError::Overflow { offset: 0 })
        ));
    }
}
