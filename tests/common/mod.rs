//! Byte-level MOD builder shared by the integration tests

#![allow(dead_code)]

pub const HEADER_SIZE: usize = 1084;
pub const ROWS: usize = 64;

/// One sample slot as written to the header
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub name: String,
    pub finetune: u8,
    pub volume: u8,
    pub repeat_start: usize,
    pub repeat_length: usize,
    pub data: Vec<u8>,
}

impl SampleSpec {
    /// Looping square wave, `len` bytes (must be even)
    pub fn square(name: &str, len: usize) -> Self {
        let data = (0..len)
            .map(|i| if i < len / 2 { 0x40u8 } else { 0xC0u8 })
            .collect();
        SampleSpec {
            name: name.to_string(),
            finetune: 0,
            volume: 64,
            repeat_start: 0,
            repeat_length: len,
            data,
        }
    }
}

/// Builds a complete module image in memory
#[derive(Debug, Clone)]
pub struct ModBuilder {
    title: String,
    tag: [u8; 4],
    channels: usize,
    song_length: u8,
    pattern_table: [u8; 128],
    patterns: Vec<Vec<u8>>,
    samples: Vec<Option<SampleSpec>>,
}

impl ModBuilder {
    /// Four-channel `M.K.` module with one empty pattern
    pub fn new(title: &str) -> Self {
        Self::with_tag(title, *b"M.K.", 4)
    }

    pub fn with_tag(title: &str, tag: [u8; 4], channels: usize) -> Self {
        ModBuilder {
            title: title.to_string(),
            tag,
            channels,
            song_length: 1,
            pattern_table: [0; 128],
            patterns: vec![vec![0; 256 * channels]],
            samples: vec![None; 31],
        }
    }

    pub fn sample(mut self, number: usize, spec: SampleSpec) -> Self {
        self.samples[number - 1] = Some(spec);
        self
    }

    /// Set the played order; patterns are added as needed
    pub fn order(mut self, positions: &[u8]) -> Self {
        self.song_length = positions.len() as u8;
        self.pattern_table = [0; 128];
        self.pattern_table[..positions.len()].copy_from_slice(positions);
        let needed = positions.iter().copied().max().unwrap_or(0) as usize + 1;
        while self.patterns.len() < needed {
            self.patterns.push(vec![0; 256 * self.channels]);
        }
        self
    }

    /// Raw song length byte, for malformed inputs
    pub fn song_length(mut self, length: u8) -> Self {
        self.song_length = length;
        self
    }

    pub fn cell(
        mut self,
        pattern: usize,
        row: usize,
        channel: usize,
        sample: u8,
        period: u16,
        effect: u16,
    ) -> Self {
        let pos = (row * self.channels + channel) * 4;
        let bytes = &mut self.patterns[pattern][pos..pos + 4];
        bytes[0] = (sample & 0xF0) | ((period >> 8) as u8 & 0x0F);
        bytes[1] = (period & 0xFF) as u8;
        bytes[2] = ((sample & 0x0F) << 4) | ((effect >> 8) as u8 & 0x0F);
        bytes[3] = (effect & 0xFF) as u8;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        let title = self.title.as_bytes();
        let n = title.len().min(20);
        out[..n].copy_from_slice(&title[..n]);

        for (i, slot) in self.samples.iter().enumerate() {
            let Some(spec) = slot else { continue };
            let base = 20 + i * 30;
            let name = spec.name.as_bytes();
            let n = name.len().min(22);
            out[base..base + n].copy_from_slice(&name[..n]);
            out[base + 22..base + 24].copy_from_slice(&((spec.data.len() / 2) as u16).to_be_bytes());
            out[base + 24] = spec.finetune & 0x0F;
            out[base + 25] = spec.volume;
            out[base + 26..base + 28].copy_from_slice(&((spec.repeat_start / 2) as u16).to_be_bytes());
            out[base + 28..base + 30]
                .copy_from_slice(&((spec.repeat_length / 2) as u16).to_be_bytes());
        }

        out[950] = self.song_length;
        out[951] = 0x7F;
        out[952..1080].copy_from_slice(&self.pattern_table);
        out[1080..1084].copy_from_slice(&self.tag);

        for pattern in &self.patterns {
            out.extend_from_slice(pattern);
        }
        for spec in self.samples.iter().flatten() {
            out.extend_from_slice(&spec.data);
        }
        out
    }
}

/// Frames in one tick at 125 BPM and 44.1 kHz
pub const FRAMES_PER_TICK: usize = 882;

/// The usual test song: one pattern, a C-2 on channel 0 row 0
pub fn single_note_song() -> Vec<u8> {
    ModBuilder::new("single note")
        .sample(1, SampleSpec::square("square", 64))
        .cell(0, 0, 0, 1, 428, 0)
        .build()
}
