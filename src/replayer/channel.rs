//! Per-Channel Effect Engine
//!
//! Holds everything one voice needs between ticks: the playing sample, the
//! current period and volume, the latched effect and the vibrato, tremolo and
//! portamento state. [`ChannelState::set_tone`] runs once per row and
//! [`ChannelState::update_effects`] once per tick, right before the mixer
//! renders the tick.

use super::effects::{Effect, VolumeSlide};
use super::waveforms::{is_continuous, Waveform};
use crate::module::sample::nibble_to_signed;
use crate::module::Sample;
use std::sync::Arc;

/// Highest pitch reachable by portamento up
pub const PERIOD_MIN: f64 = 113.0;
/// Lowest pitch reachable by portamento down
pub const PERIOD_MAX: f64 = 856.0;
/// Maximum channel volume
pub const VOLUME_MAX: i32 = 64;

/// Oscillator state shared by vibrato and tremolo
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Oscillator {
    /// Position step per tick
    pub speed: u8,
    /// Amplitude
    pub depth: u8,
    /// Table position (0..64)
    pub position: usize,
    /// Waveform selector as written by `E4x`/`E7x`
    pub waveform: u8,
}

impl Oscillator {
    fn latch(&mut self, speed: u8, depth: u8) {
        if speed > 0 {
            self.speed = speed;
        }
        if depth > 0 {
            self.depth = depth;
        }
    }

    /// Current value scaled by `divisor`, then advance the position
    fn step(&mut self, divisor: f64) -> f64 {
        let value = Waveform::from_selector(self.waveform).value(self.position);
        let out = self.depth as f64 * value as f64 / divisor;
        self.position = (self.position + self.speed as usize) % 64;
        out
    }

    fn retrigger(&mut self) {
        if !is_continuous(self.waveform) {
            self.position = 0;
        }
    }
}

/// Dynamic state of one playback channel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelState {
    pub(crate) sample: Option<Arc<Sample>>,
    pub(crate) finetune: i8,
    pub(crate) period: f64,
    pub(crate) volume: i32,
    pub(crate) effect: Effect,
    pub(crate) tick: u32,
    pub(crate) arpeggio: u8,
    pub(crate) vibrato: f64,
    pub(crate) tremolo: f64,
    pub(crate) vibrato_osc: Oscillator,
    pub(crate) tremolo_osc: Oscillator,
    pub(crate) porta_speed: u8,
    pub(crate) porta_from: f64,
    pub(crate) porta_to: f64,
    pub(crate) porta_hidden: f64,
    pub(crate) glissando: bool,
    pub(crate) delayed_period: Option<f64>,
    /// Fractional read cursor into the sample, in sample frames
    pub(crate) index: f64,
}

impl ChannelState {
    /// Fresh silent channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the power-on state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Latch a new row for this channel.
    ///
    /// A zero period keeps the current note, sample 0 keeps the current
    /// instrument. The effect is always replaced.
    pub fn set_tone(&mut self, period: u16, sample: Option<Arc<Sample>>, effect: Effect) {
        self.tick = 0;
        self.arpeggio = 0;
        self.delayed_period = None;

        if period != 0 {
            let period = period as f64;
            if effect.is_note_delay() {
                self.period = 0.0;
                self.delayed_period = Some(period);
            } else if effect.is_tone_portamento() {
                self.porta_from = self.period;
                self.porta_hidden = 0.0;
                self.porta_to = period;
            } else {
                self.index = 0.0;
                self.period = period;
            }
            self.vibrato_osc.retrigger();
            self.tremolo_osc.retrigger();
        }

        if let Some(sample) = sample {
            self.volume = sample.volume as i32;
            self.finetune = sample.finetune;
            self.sample = Some(sample);
        }

        self.effect = effect;
    }

    /// Advance the latched effect by one tick
    pub fn update_effects(&mut self) {
        let tick = self.tick;
        let first = tick == 0;
        let mut vibrato_active = false;
        let mut tremolo_active = false;

        match self.effect {
            Effect::Arpeggio { x, y } => {
                if !first {
                    self.arpeggio = match tick % 3 {
                        1 => x,
                        2 => y,
                        _ => 0,
                    };
                }
            }
            Effect::PortaUp(speed) => {
                if first {
                    self.porta_speed = speed;
                } else {
                    self.period = (self.period - self.porta_speed as f64).max(PERIOD_MIN);
                }
            }
            Effect::PortaDown(speed) => {
                if first {
                    self.porta_speed = speed;
                } else {
                    self.period = (self.period + self.porta_speed as f64).min(PERIOD_MAX);
                }
            }
            Effect::TonePortamento(speed) => {
                if first {
                    if speed != 0 {
                        self.porta_speed = speed;
                    }
                } else {
                    self.tone_portamento();
                }
            }
            Effect::TonePortaVolumeSlide(slide) => {
                if !first {
                    self.tone_portamento();
                    self.volume_slide(slide);
                }
            }
            Effect::Vibrato { speed, depth } => {
                if first {
                    self.vibrato_osc.latch(speed, depth);
                }
                vibrato_active = !first || (speed == 0 && depth == 0);
            }
            Effect::VibratoVolumeSlide(slide) => {
                if !first {
                    vibrato_active = true;
                    self.volume_slide(slide);
                }
            }
            Effect::Tremolo { speed, depth } => {
                if first {
                    self.tremolo_osc.latch(speed, depth);
                }
                tremolo_active = !first || (speed == 0 && depth == 0);
            }
            Effect::SampleOffset(offset) => {
                if first {
                    self.index = offset as f64 * 256.0;
                }
            }
            Effect::VolumeSlide(slide) => {
                if !first {
                    self.volume_slide(slide);
                }
            }
            Effect::SetVolume(volume) => {
                if first {
                    self.volume = (volume as i32).min(VOLUME_MAX);
                }
            }
            Effect::FinePortaUp(y) => {
                if first {
                    self.period -= y as f64;
                }
            }
            Effect::FinePortaDown(y) => {
                if first {
                    self.period += y as f64;
                }
            }
            Effect::GlissandoControl(y) => {
                if first {
                    self.glissando = y == 1;
                }
            }
            Effect::VibratoWaveform(y) => {
                if first {
                    self.vibrato_osc.waveform = y;
                }
            }
            Effect::SetFinetune(y) => {
                if first {
                    self.finetune = nibble_to_signed(y);
                }
            }
            Effect::TremoloWaveform(y) => {
                if first {
                    self.tremolo_osc.waveform = y;
                }
            }
            Effect::Retrigger(y) => {
                if !first && y > 0 && tick % y as u32 == 0 {
                    self.index = 0.0;
                }
            }
            Effect::FineVolumeUp(y) => {
                if first {
                    self.volume = (self.volume + y as i32).min(VOLUME_MAX);
                }
            }
            Effect::FineVolumeDown(y) => {
                if first {
                    self.volume = (self.volume - y as i32).max(0);
                }
            }
            Effect::NoteCut(y) => {
                if tick == y as u32 {
                    self.volume = 0;
                }
            }
            Effect::NoteDelay(y) => {
                if tick == y as u32 {
                    if let Some(period) = self.delayed_period.take() {
                        self.index = 0.0;
                        self.period = period;
                    }
                }
            }
            // Row-level effects are applied by the sequencer
            Effect::PositionJump(_)
            | Effect::PatternBreak(_)
            | Effect::PatternLoop(_)
            | Effect::PatternDelay(_)
            | Effect::SetSpeed(_)
            | Effect::Unsupported(_) => {}
        }

        self.vibrato = if vibrato_active {
            self.vibrato_osc.step(128.0)
        } else {
            0.0
        };
        self.tremolo = if tremolo_active {
            self.tremolo_osc.step(64.0)
        } else {
            0.0
        };

        self.tick += 1;
    }

    /// Only one direction is applied; `A00` and `Axy` with both nibbles set do nothing
    fn volume_slide(&mut self, slide: VolumeSlide) {
        if slide.up > 0 && slide.down == 0 {
            self.volume = (self.volume + slide.up as i32).min(VOLUME_MAX);
        } else if slide.up == 0 && slide.down > 0 {
            self.volume = (self.volume - slide.down as i32).max(0);
        }
    }

    fn tone_portamento(&mut self) {
        let speed = self.porta_speed as f64;
        let target = self.porta_to;

        if self.glissando {
            if self.period > target {
                self.porta_hidden -= speed;
                self.period = match self.glissando_semitone(f64::ceil) {
                    Some(period) => period.max(target),
                    None => target,
                };
            } else if self.period < target {
                self.porta_hidden += speed;
                self.period = match self.glissando_semitone(f64::floor) {
                    Some(period) => period.min(target),
                    None => target,
                };
            }
        } else if self.period > target {
            self.period = (self.period - speed).max(target);
        } else if self.period < target {
            self.period = (self.period + speed).min(target);
        }
    }

    /// Period of the whole semitone nearest to the hidden linear slide,
    /// or `None` when the start period gives no usable ratio
    fn glissando_semitone(&self, round: fn(f64) -> f64) -> Option<f64> {
        if self.porta_from <= 0.0 {
            return None;
        }
        let ratio = 1.0 + self.porta_hidden / self.porta_from;
        if ratio <= 0.0 {
            return None;
        }
        let semitones = round(ratio.log2() * 12.0);
        Some(self.porta_from * 2f64.powf(semitones / 12.0))
    }

    /// Current period (0 when silent)
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Current volume (0..=64)
    pub fn volume(&self) -> i32 {
        self.volume
    }

    /// Effective finetune
    pub fn finetune(&self) -> i8 {
        self.finetune
    }

    /// Latched effect
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Sample currently assigned to the channel
    pub fn sample(&self) -> Option<&Arc<Sample>> {
        self.sample.as_ref()
    }

    /// Read cursor in sample frames
    pub fn position(&self) -> f64 {
        self.index
    }

    /// Ticks elapsed since the row started
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Current arpeggio offset in semitones
    pub fn arpeggio(&self) -> u8 {
        self.arpeggio
    }

    /// Current vibrato offset in source samples per tick
    pub fn vibrato(&self) -> f64 {
        self.vibrato
    }

    /// Current tremolo offset in volume units
    pub fn tremolo(&self) -> f64 {
        self.tremolo
    }
}
