//! Row/Tick Sequencer
//!
//! Walks the pattern table one tick at a time. A new row is processed once
//! `delay * speed` ticks have elapsed since the previous one; every tick,
//! including the row tick itself, renders one mixer burst of `2500 / bpm` ms.
//!
//! Row-level effects (`Bxx`, `Dxy`, `E6x`, `EEx`, `Fxx`) are resolved here
//! after each channel has latched its cell. When several channels write the
//! same global value on one row, the highest channel index wins.

use super::effects::Effect;
use crate::mixer::Mixer;
use crate::module::{Module, ROWS_PER_PATTERN};

/// Speed (ticks per row) at song start
pub const DEFAULT_SPEED: u32 = 6;
/// Tempo at song start
pub const DEFAULT_BPM: u32 = 125;
/// `Fxx` values above this set the tempo instead of the speed
pub const SPEED_TEMPO_SPLIT: u8 = 32;

const LAST_ROW: isize = ROWS_PER_PATTERN as isize - 1;

/// Row reached by the sequencer on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInfo {
    /// Pattern table position
    pub position: usize,
    /// Pattern index played at that position
    pub pattern: usize,
    /// Row within the pattern
    pub row: usize,
}

/// Result of advancing the sequencer by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A burst was rendered into the mixer
    Rendered {
        /// Frames available in the mixer's left/right buffers
        frames: usize,
        /// Set when this tick started a new row
        row: Option<RowInfo>,
    },
    /// The song has run past its last position; nothing was rendered
    Finished,
}

/// Song position and timing state
#[derive(Debug, Clone, PartialEq)]
pub struct Sequencer {
    speed: u32,
    bpm: u32,
    position: isize,
    row: isize,
    current_row: Option<RowInfo>,
    next_start_row: usize,
    loop_start: isize,
    loop_count: i32,
    delay: u32,
    repeat: u32,
    done: bool,
    sample_rate: u32,
    crossmix: f32,
}

impl Sequencer {
    /// Create a sequencer rendering at `sample_rate` with the given cross-mix
    pub fn new(sample_rate: u32, crossmix: f32) -> Self {
        let mut sequencer = Sequencer {
            speed: DEFAULT_SPEED,
            bpm: DEFAULT_BPM,
            position: -1,
            row: -1,
            current_row: None,
            next_start_row: 0,
            loop_start: 0,
            loop_count: 0,
            delay: 0,
            repeat: 1,
            done: false,
            sample_rate,
            crossmix,
        };
        sequencer.reset();
        sequencer
    }

    /// Return to the start of the song with default speed and tempo
    pub fn reset(&mut self) {
        self.speed = DEFAULT_SPEED;
        self.bpm = DEFAULT_BPM;
        self.position = -1;
        self.row = -1;
        self.current_row = None;
        self.next_start_row = 0;
        self.loop_start = 0;
        self.loop_count = 0;
        self.delay = 0;
        self.repeat = 1;
        self.done = false;
    }

    /// Length of one tick in milliseconds
    pub fn tick_duration_ms(&self) -> f64 {
        2500.0 / self.bpm as f64
    }

    /// Ticks per row
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Tempo
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// True once the song has run past its last position
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Last row processed, if any
    pub fn current_row(&self) -> Option<RowInfo> {
        self.current_row
    }

    /// Advance by one tick, processing a new row when due, and render the
    /// tick into `mixer`.
    pub fn advance(&mut self, module: &Module, mixer: &mut Mixer) -> TickOutcome {
        if self.done {
            return TickOutcome::Finished;
        }

        let mut started = None;
        if self.repeat >= self.delay * self.speed {
            if self.row < 0 || self.row > LAST_ROW {
                self.position += 1;
                if self.position >= module.song_length as isize {
                    self.done = true;
                    tracing::debug!(position = self.position, "song finished");
                    return TickOutcome::Finished;
                }
                tracing::debug!(
                    position = self.position,
                    pattern = module.pattern_index_at(self.position as usize).unwrap_or(0),
                    "order position"
                );
                self.row = self.next_start_row as isize;
                self.next_start_row = 0;
                self.loop_start = 0;
                self.loop_count = -1;
                self.repeat = 0;
            }
            started = Some(self.process_row(module, mixer));
        }

        let frames = mixer.render_stereo(self.tick_duration_ms(), self.crossmix, self.sample_rate);
        self.repeat += 1;

        TickOutcome::Rendered {
            frames,
            row: started,
        }
    }

    fn process_row(&mut self, module: &Module, mixer: &mut Mixer) -> RowInfo {
        let position = self.position as usize;
        let row = self.row as usize;
        let pattern = module.pattern_at(position);
        let info = RowInfo {
            position,
            pattern: module.pattern_index_at(position).unwrap_or(0),
            row,
        };

        let mut set_row = self.row;
        self.delay = 1;

        for index in 0..module.channel_count {
            let cell = pattern.map(|p| p.cell(index, row)).unwrap_or_default();
            let effect = Effect::decode(cell.effect);
            if let Some(channel) = mixer.channel_mut(index) {
                channel.set_tone(cell.period, module.sample(cell.sample).cloned(), effect);
            }

            if effect.is_global() {
                self.apply_global(effect, &mut set_row);
            } else if let Effect::Unsupported(kind) = effect {
                tracing::trace!(channel = index, ?kind, "unsupported effect ignored");
            }
        }

        self.row = set_row + 1;
        self.repeat = 0;
        self.current_row = Some(info);

        tracing::trace!(
            position = info.position,
            pattern = info.pattern,
            row = info.row,
            speed = self.speed,
            bpm = self.bpm,
            "row"
        );

        info
    }

    /// Apply a row-level effect; later channels override earlier ones
    fn apply_global(&mut self, effect: Effect, set_row: &mut isize) {
        match effect {
            Effect::PositionJump(target) => {
                *set_row = LAST_ROW;
                self.position = target as isize - 1;
            }
            Effect::PatternBreak(target) => {
                *set_row = LAST_ROW;
                self.next_start_row = if (target as usize) < ROWS_PER_PATTERN {
                    target as usize
                } else {
                    0
                };
            }
            Effect::PatternLoop(0) => {
                self.loop_start = self.row;
            }
            Effect::PatternLoop(count) => {
                if self.loop_count == -1 {
                    self.loop_count = count as i32;
                }
                self.loop_count -= 1;
                if self.loop_count > -1 {
                    *set_row = self.loop_start - 1;
                }
            }
            Effect::PatternDelay(rows) => {
                self.delay = rows as u32 + 1;
            }
            Effect::SetSpeed(0) => {
                self.speed = 1;
            }
            Effect::SetSpeed(value) if value <= SPEED_TEMPO_SPLIT => {
                self.speed = value as u32;
            }
            Effect::SetSpeed(value) => {
                self.bpm = value as u32;
            }
            _ => {}
        }
    }
}
