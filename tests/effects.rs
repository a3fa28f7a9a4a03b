mod common;

use common::{ModBuilder, SampleSpec};
use protracker::mixer::Mixer;
use protracker::replayer::channel::{PERIOD_MAX, PERIOD_MIN};
use protracker::replayer::{Effect, Sequencer, TickOutcome, PAL_CLOCK};
use protracker::{parse_module, Module};

struct Rig {
    module: Module,
    sequencer: Sequencer,
    mixer: Mixer,
}

impl Rig {
    fn new(data: &[u8]) -> Self {
        let module = parse_module(data).unwrap();
        let mixer = Mixer::new(module.channel_count, PAL_CLOCK);
        Rig {
            module,
            sequencer: Sequencer::new(44100, 0.35),
            mixer,
        }
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            let outcome = self.sequencer.advance(&self.module, &mut self.mixer);
            assert!(matches!(outcome, TickOutcome::Rendered { .. }));
        }
    }

    fn period(&self, channel: usize) -> f64 {
        self.mixer.channel(channel).map_or(0.0, |c| c.period())
    }

    fn volume(&self, channel: usize) -> i32 {
        self.mixer.channel(channel).map_or(0, |c| c.volume())
    }
}

fn song() -> ModBuilder {
    ModBuilder::new("fx").sample(1, SampleSpec::square("square", 64))
}

#[test]
fn tone_portamento_stops_at_the_target() {
    let mut rig = Rig::new(
        &song()
            .cell(0, 0, 0, 1, 428, 0)
            .cell(0, 1, 0, 0, 214, 0x3FF)
            .build(),
    );
    rig.ticks(6);
    assert_eq!(rig.period(0), 428.0);

    // tick 0 of the row only latches the speed
    rig.ticks(1);
    assert_eq!(rig.period(0), 428.0);
    rig.ticks(1);
    assert_eq!(rig.period(0), 214.0);
    rig.ticks(4);
    assert_eq!(rig.period(0), 214.0);
}

#[test]
fn tone_portamento_memory_continues_the_slide() {
    let mut rig = Rig::new(
        &song()
            .cell(0, 0, 0, 1, 428, 0)
            .cell(0, 1, 0, 0, 404, 0x304)
            .cell(0, 2, 0, 0, 0, 0x300)
            .build(),
    );
    rig.ticks(12);
    assert_eq!(rig.period(0), 428.0 - 5.0 * 4.0);
    rig.ticks(6);
    assert_eq!(rig.period(0), 404.0);
}

#[test]
fn portamento_up_and_down_clamp_to_the_amiga_range() {
    let mut rig = Rig::new(
        &song()
            .cell(0, 0, 0, 1, 214, 0x1FF)
            .cell(0, 1, 0, 0, 0, 0x2FF)
            .build(),
    );
    rig.ticks(6);
    assert_eq!(rig.period(0), PERIOD_MIN);
    rig.ticks(6);
    assert_eq!(rig.period(0), PERIOD_MAX);
}

#[test]
fn volume_slide_and_set_volume() {
    let mut rig = Rig::new(
        &song()
            .cell(0, 0, 0, 1, 428, 0xC20)
            .cell(0, 1, 0, 0, 0, 0xA04)
            .cell(0, 2, 0, 0, 0, 0xAF0)
            .build(),
    );
    rig.ticks(6);
    assert_eq!(rig.volume(0), 0x20);
    rig.ticks(6);
    assert_eq!(rig.volume(0), 0x20 - 5 * 4);
    rig.ticks(6);
    assert_eq!(rig.volume(0), 64);
}

#[test]
fn sample_sets_default_volume_and_finetune() {
    let mut spec = SampleSpec::square("tuned", 64);
    spec.volume = 40;
    spec.finetune = 0x0F;
    let mut rig = Rig::new(
        &ModBuilder::new("fx")
            .sample(2, spec)
            .cell(0, 0, 3, 2, 428, 0)
            .build(),
    );
    rig.ticks(1);
    let channel = rig.mixer.channel(3).unwrap();
    assert_eq!(channel.volume(), 40);
    assert_eq!(channel.finetune(), -1);
    assert_eq!(channel.sample().map(|s| s.number), Some(2));
}

#[test]
fn note_delay_starts_the_note_late() {
    let mut rig = Rig::new(&song().cell(0, 0, 0, 1, 428, 0xED3).build());
    rig.ticks(3);
    assert_eq!(rig.period(0), 0.0);
    rig.ticks(1);
    assert_eq!(rig.period(0), 428.0);
}

#[test]
fn note_cut_silences_the_channel() {
    let mut rig = Rig::new(&song().cell(0, 0, 0, 1, 428, 0xEC2).build());
    rig.ticks(2);
    assert_eq!(rig.volume(0), 64);
    rig.ticks(1);
    assert_eq!(rig.volume(0), 0);
}

#[test]
fn latched_effect_is_decoded_from_the_cell() {
    let mut rig = Rig::new(&song().cell(0, 0, 1, 1, 428, 0x4A3).build());
    rig.ticks(1);
    assert_eq!(
        rig.mixer.channel(1).map(|c| c.effect()),
        Some(Effect::Vibrato { speed: 0xA, depth: 3 })
    );
}

#[test]
fn finished_sequencer_renders_nothing() {
    let mut rig = Rig::new(&song().build());
    rig.ticks(64 * 6);
    assert_eq!(
        rig.sequencer.advance(&rig.module, &mut rig.mixer),
        TickOutcome::Finished
    );
    assert!(rig.sequencer.is_done());
    assert_eq!(
        rig.sequencer.advance(&rig.module, &mut rig.mixer),
        TickOutcome::Finished
    );
}
