//! Sample metadata table and sample payloads
//!
//! Metadata for all 31 samples sits right after the title; the PCM payloads
//! follow the pattern block, back to back in sample order.

use super::{read_string, SAMPLE_TABLE_OFFSET};
use crate::module::sample::nibble_to_signed;
use crate::module::{Sample, SAMPLE_SLOTS};
use crate::FormatError;

/// Size of one sample metadata record
pub const SAMPLE_RECORD_SIZE: usize = 30;

/// Length of the sample name field
pub const SAMPLE_NAME_LEN: usize = 22;

/// Sample metadata as stored in the header (lengths already in bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleHeader {
    /// Sample number (1..=31)
    pub number: u8,
    /// Sample name
    pub title: String,
    /// Length in bytes
    pub length: usize,
    /// Signed finetune
    pub finetune: i8,
    /// Default volume
    pub volume: u8,
    /// Loop start in bytes
    pub repeat_start: usize,
    /// Loop length in bytes
    pub repeat_length: usize,
}

fn word_bytes(hi: u8, lo: u8) -> usize {
    2 * u16::from_be_bytes([hi, lo]) as usize
}

/// Decode one 30-byte metadata record
pub fn parse_sample_header(number: u8, record: &[u8]) -> SampleHeader {
    SampleHeader {
        number,
        title: read_string(&record[..SAMPLE_NAME_LEN]),
        length: word_bytes(record[22], record[23]),
        finetune: nibble_to_signed(record[24]),
        volume: record[25].min(64),
        repeat_start: word_bytes(record[26], record[27]),
        repeat_length: word_bytes(record[28], record[29]),
    }
}

/// Decode all 31 metadata records (the caller guarantees the header is present)
pub fn parse_sample_headers(data: &[u8]) -> Vec<SampleHeader> {
    (0..SAMPLE_SLOTS)
        .map(|i| {
            let start = SAMPLE_TABLE_OFFSET + i * SAMPLE_RECORD_SIZE;
            parse_sample_header(
                (i + 1) as u8,
                &data[start..start + SAMPLE_RECORD_SIZE],
            )
        })
        .collect()
}

/// Attach PCM payloads to the metadata, starting at `payload_start`.
///
/// The payload cursor advances by each sample's byte length in file order.
/// Fails if any sample would read past the end of the input.
pub fn load_sample_payloads(
    data: &[u8],
    headers: Vec<SampleHeader>,
    payload_start: usize,
) -> Result<Vec<Sample>, FormatError> {
    let mut cursor = payload_start;
    let mut samples = Vec::with_capacity(headers.len());

    for header in headers {
        let available = data.len().saturating_sub(cursor);
        if header.length > available {
            return Err(FormatError::SampleDataTruncated {
                sample: header.number,
                needed: header.length,
                available,
            });
        }

        let audio = data[cursor..cursor + header.length]
            .iter()
            .map(|&b| Sample::byte_to_float(b))
            .collect();
        cursor += header.length;

        samples.push(Sample {
            number: header.number,
            title: header.title,
            length: header.length,
            finetune: header.finetune,
            volume: header.volume,
            repeat_start: header.repeat_start,
            repeat_length: header.repeat_length,
            audio,
        });
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &[u8], words: u16, finetune: u8, volume: u8, rs: u16, rl: u16) -> Vec<u8> {
        let mut rec = vec![0u8; SAMPLE_RECORD_SIZE];
        rec[..name.len()].copy_from_slice(name);
        rec[22..24].copy_from_slice(&words.to_be_bytes());
        rec[24] = finetune;
        rec[25] = volume;
        rec[26..28].copy_from_slice(&rs.to_be_bytes());
        rec[28..30].copy_from_slice(&rl.to_be_bytes());
        rec
    }

    #[test]
    fn test_parse_sample_header() {
        let rec = record(b"bassdrum", 100, 0x0E, 48, 10, 20);
        let header = parse_sample_header(3, &rec);
        assert_eq!(header.number, 3);
        assert_eq!(header.title, "bassdrum");
        assert_eq!(header.length, 200);
        assert_eq!(header.finetune, -2);
        assert_eq!(header.volume, 48);
        assert_eq!(header.repeat_start, 20);
        assert_eq!(header.repeat_length, 40);
    }

    #[test]
    fn test_volume_clamped_to_64() {
        let rec = record(b"loud", 1, 0, 0x7F, 0, 1);
        assert_eq!(parse_sample_header(1, &rec).volume, 64);
    }

    #[test]
    fn test_payload_cursor_advances_in_order() {
        let data = [0x00u8, 0x40, 0x80, 0x7F, 0xC0];
        let headers = vec![
            parse_sample_header(1, &record(b"a", 1, 0, 64, 0, 0)),
            parse_sample_header(2, &record(b"b", 0, 0, 64, 0, 0)),
            parse_sample_header(3, &record(b"c", 1, 0, 64, 0, 0)),
        ];
        let samples = load_sample_payloads(&data, headers, 1).unwrap();
        assert_eq!(samples[0].audio, vec![0.5, -1.0]);
        assert!(samples[1].audio.is_empty());
        assert_eq!(samples[2].audio, vec![127.0 / 128.0, -0.5]);
    }

    #[test]
    fn test_payload_truncated() {
        let data = [0u8; 4];
        let headers = vec![parse_sample_header(1, &record(b"a", 4, 0, 64, 0, 0))];
        let result = load_sample_payloads(&data, headers, 0);
        assert_eq!(
            result,
            Err(FormatError::SampleDataTruncated {
                sample: 1,
                needed: 8,
                available: 4
            })
        );
    }
}
