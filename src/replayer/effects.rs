//! ProTracker Effect Decoder
//!
//! Decodes the 12-bit effect word of a pattern cell into an [`Effect`] once,
//! so that the sequencer and the channel engine can match on it instead of
//! re-testing nibbles every tick.
//!
//! ```text
//! word: cccc xxxx yyyy
//!       |    \______/
//!       |     param (xy)
//!       command (0-F; E takes x as a sub-command)
//! ```

/// Volume slide parameters (`Axy`, and the slide half of `5xy`/`6xy`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeSlide {
    /// Amount added per tick (x)
    pub up: u8,
    /// Amount subtracted per tick (y)
    pub down: u8,
}

impl VolumeSlide {
    fn from_param(param: u8) -> Self {
        VolumeSlide {
            up: param >> 4,
            down: param & 0x0F,
        }
    }
}

/// Effects the classic replay engine recognizes but does not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedEffect {
    /// `8xx` set panning
    Panning(u8),
    /// `E0x` Amiga LED filter toggle
    Filter(u8),
    /// `E8x` 16-position panning
    FinePanning(u8),
    /// `EFx` invert loop
    InvertLoop(u8),
}

/// Effect command decoded from a pattern cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// `0xy` arpeggio (`000` is "no effect")
    Arpeggio {
        /// Semitone offset on ticks 1, 4, 7, ...
        x: u8,
        /// Semitone offset on ticks 2, 5, 8, ...
        y: u8,
    },
    /// `1xx` portamento up
    PortaUp(u8),
    /// `2xx` portamento down
    PortaDown(u8),
    /// `3xx` tone portamento (0 keeps the previous speed)
    TonePortamento(u8),
    /// `4xy` vibrato
    Vibrato {
        /// Position step per tick (0 keeps previous)
        speed: u8,
        /// Depth (0 keeps previous)
        depth: u8,
    },
    /// `5xy` tone portamento + volume slide
    TonePortaVolumeSlide(VolumeSlide),
    /// `6xy` vibrato + volume slide
    VibratoVolumeSlide(VolumeSlide),
    /// `7xy` tremolo
    Tremolo {
        /// Position step per tick (0 keeps previous)
        speed: u8,
        /// Depth (0 keeps previous)
        depth: u8,
    },
    /// `9xx` sample offset in units of 256 samples
    SampleOffset(u8),
    /// `Axy` volume slide
    VolumeSlide(VolumeSlide),
    /// `Bxx` jump to pattern table position
    PositionJump(u8),
    /// `Cxx` set volume
    SetVolume(u8),
    /// `Dxy` pattern break; the row is already converted from its decimal nibbles
    PatternBreak(u8),
    /// `E1x` fine portamento up
    FinePortaUp(u8),
    /// `E2x` fine portamento down
    FinePortaDown(u8),
    /// `E3x` glissando control
    GlissandoControl(u8),
    /// `E4x` vibrato waveform
    VibratoWaveform(u8),
    /// `E5x` set finetune
    SetFinetune(u8),
    /// `E6x` pattern loop (0 sets the loop start)
    PatternLoop(u8),
    /// `E7x` tremolo waveform
    TremoloWaveform(u8),
    /// `E9x` retrigger every x ticks
    Retrigger(u8),
    /// `EAx` fine volume slide up
    FineVolumeUp(u8),
    /// `EBx` fine volume slide down
    FineVolumeDown(u8),
    /// `ECx` cut note at tick x
    NoteCut(u8),
    /// `EDx` delay note until tick x
    NoteDelay(u8),
    /// `EEx` delay pattern by x rows
    PatternDelay(u8),
    /// `Fxx` set speed (<= 32) or tempo (> 32)
    SetSpeed(u8),
    /// Recognized but ignored
    Unsupported(UnsupportedEffect),
}

impl Default for Effect {
    fn default() -> Self {
        Effect::Arpeggio { x: 0, y: 0 }
    }
}

impl Effect {
    /// Decode a 12-bit effect word
    pub fn decode(word: u16) -> Self {
        let command = ((word >> 8) & 0x0F) as u8;
        let param = (word & 0xFF) as u8;
        let x = param >> 4;
        let y = param & 0x0F;

        match command {
            0x0 => Effect::Arpeggio { x, y },
            0x1 => Effect::PortaUp(param),
            0x2 => Effect::PortaDown(param),
            0x3 => Effect::TonePortamento(param),
            0x4 => Effect::Vibrato { speed: x, depth: y },
            0x5 => Effect::TonePortaVolumeSlide(VolumeSlide::from_param(param)),
            0x6 => Effect::VibratoVolumeSlide(VolumeSlide::from_param(param)),
            0x7 => Effect::Tremolo { speed: x, depth: y },
            0x8 => Effect::Unsupported(UnsupportedEffect::Panning(param)),
            0x9 => Effect::SampleOffset(param),
            0xA => Effect::VolumeSlide(VolumeSlide::from_param(param)),
            0xB => Effect::PositionJump(param),
            0xC => Effect::SetVolume(param),
            0xD => Effect::PatternBreak(x * 10 + y),
            0xE => Self::decode_extended(x, y),
            _ => Effect::SetSpeed(param),
        }
    }

    fn decode_extended(sub: u8, y: u8) -> Self {
        match sub {
            0x0 => Effect::Unsupported(UnsupportedEffect::Filter(y)),
            0x1 => Effect::FinePortaUp(y),
            0x2 => Effect::FinePortaDown(y),
            0x3 => Effect::GlissandoControl(y),
            0x4 => Effect::VibratoWaveform(y),
            0x5 => Effect::SetFinetune(y),
            0x6 => Effect::PatternLoop(y),
            0x7 => Effect::TremoloWaveform(y),
            0x8 => Effect::Unsupported(UnsupportedEffect::FinePanning(y)),
            0x9 => Effect::Retrigger(y),
            0xA => Effect::FineVolumeUp(y),
            0xB => Effect::FineVolumeDown(y),
            0xC => Effect::NoteCut(y),
            0xD => Effect::NoteDelay(y),
            0xE => Effect::PatternDelay(y),
            _ => Effect::Unsupported(UnsupportedEffect::InvertLoop(y)),
        }
    }

    /// True for `3xx` and `5xy`: a note on the row becomes the slide target
    pub fn is_tone_portamento(&self) -> bool {
        matches!(
            self,
            Effect::TonePortamento(_) | Effect::TonePortaVolumeSlide(_)
        )
    }

    /// True for `EDx`: a note on the row is held back
    pub fn is_note_delay(&self) -> bool {
        matches!(self, Effect::NoteDelay(_))
    }

    /// True for effects handled by the sequencer rather than the channel
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            Effect::PositionJump(_)
                | Effect::PatternBreak(_)
                | Effect::PatternLoop(_)
                | Effect::PatternDelay(_)
                | Effect::SetSpeed(_)
        )
    }
}
