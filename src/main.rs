#[cfg(not(all(feature = "replayer", feature = "visualization")))]
fn main() {
    eprintln!(
        "The protracker CLI requires the \"replayer\" and \"visualization\" features. Rebuild with default features enabled."
    );
}

#[cfg(all(feature = "replayer", feature = "visualization"))]
mod cli {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{bail, Context, Result};
    use protracker::replayer::{load_song, AmigaClock, ModPlayer, PlayerConfig};
    use protracker::visualization::{format_row, sample_list};
    use tracing_subscriber::EnvFilter;

    const USAGE: &str = "Usage:\n  protracker [options] <file.mod>\n\nOptions:\n  --ntsc               Use the NTSC Paula clock (default PAL)\n  --crossmix <f>       Stereo cross-mix 0.0..=1.0 (default 0.35)\n  --rate <hz>          Output sample rate (default 44100)\n  --config <file>      Load player settings from JSON\n  --wav <out.wav>      Render the song to a WAV file instead of playing\n  --dump               Print every pattern of the song and exit\n  -h, --help           Show this help\n";

    #[derive(Debug, Default)]
    struct Options {
        file: Option<PathBuf>,
        config: Option<PathBuf>,
        wav: Option<PathBuf>,
        rate: Option<u32>,
        crossmix: Option<f32>,
        ntsc: bool,
        dump: bool,
        help: bool,
    }

    fn parse_args() -> Result<Options> {
        let mut options = Options::default();
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => options.help = true,
                "--ntsc" => options.ntsc = true,
                "--dump" => options.dump = true,
                "--config" => {
                    let value = args.next().context("--config requires a path")?;
                    options.config = Some(PathBuf::from(value));
                }
                "--wav" => {
                    let value = args.next().context("--wav requires an output path")?;
                    options.wav = Some(PathBuf::from(value));
                }
                "--rate" => {
                    let value = args.next().context("--rate requires a value")?;
                    let rate = value
                        .parse()
                        .with_context(|| format!("invalid sample rate '{}'", value))?;
                    options.rate = Some(rate);
                }
                "--crossmix" => {
                    let value = args.next().context("--crossmix requires a value")?;
                    let crossmix = value
                        .parse()
                        .with_context(|| format!("invalid crossmix '{}'", value))?;
                    options.crossmix = Some(crossmix);
                }
                _ if arg.starts_with('-') => bail!("unknown flag: {}\n\n{}", arg, USAGE),
                _ => options.file = Some(PathBuf::from(arg)),
            }
        }
        Ok(options)
    }

    fn build_config(options: &Options) -> Result<PlayerConfig> {
        let mut config = match &options.config {
            Some(path) => PlayerConfig::from_json_file(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => PlayerConfig::default(),
        };
        if let Some(rate) = options.rate {
            config.stream.sample_rate = rate;
        }
        if let Some(crossmix) = options.crossmix {
            config = config.with_crossmix(crossmix);
        }
        if options.ntsc {
            config = config.with_clock(AmigaClock::Ntsc);
        }
        config.validate()?;
        Ok(config)
    }

    fn dump_patterns(player: &ModPlayer) {
        let module = player.module();
        for (position, &index) in module.song_positions().iter().enumerate() {
            let Some(pattern) = module.patterns.get(index as usize) else {
                continue;
            };
            println!("Position {:>3} - pattern {}", position, index);
            for row in 0..protracker::module::ROWS_PER_PATTERN {
                println!("{}", format_row(pattern, row));
            }
            println!();
        }
    }

    #[cfg(feature = "export-wav")]
    fn render_wav(player: &mut ModPlayer, path: &std::path::Path) -> Result<()> {
        let frames = protracker::export::export_to_wav(player, path)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        let seconds = frames as f64 / player.config().sample_rate() as f64;
        println!("Wrote {} ({} frames, {:.1}s)", path.display(), frames, seconds);
        Ok(())
    }

    #[cfg(not(feature = "export-wav"))]
    fn render_wav(_player: &mut ModPlayer, _path: &std::path::Path) -> Result<()> {
        bail!("WAV export requires the \"export-wav\" feature")
    }

    #[cfg(feature = "streaming")]
    mod live {
        use std::io::{self, Read, Write};
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::{Duration, Instant};

        use anyhow::Result;
        use parking_lot::Mutex;
        use protracker::replayer::{ModPlayer, PlaybackController, PlaybackState};
        use protracker::visualization::channel_status;
        use protracker::AudioDevice;

        const VISUALIZATION_UPDATE_MS: u64 = 50;
        const BAR_WIDTH: usize = 10;

        #[cfg(unix)]
        fn set_raw_terminal(raw: bool) {
            let args: &[&str] = if raw { &["-echo", "raw"] } else { &["echo", "-raw"] };
            let _ = std::process::Command::new("stty").args(args).status();
        }

        #[cfg(not(unix))]
        fn set_raw_terminal(_raw: bool) {}

        pub fn play(player: ModPlayer) -> Result<()> {
            let channel_count = player.module().channel_count;
            let player = Arc::new(Mutex::new(player));
            player.lock().play()?;

            let device = AudioDevice::new(Arc::clone(&player))?;
            println!("Playback running - keys: [1-9]=mute channel, [space]=pause/resume, [q]=quit\n");

            let (tx, rx) = std::sync::mpsc::channel::<u8>();
            let input_running = Arc::new(AtomicBool::new(true));
            let input_flag = Arc::clone(&input_running);
            std::thread::spawn(move || {
                set_raw_terminal(true);
                let mut stdin = io::stdin();
                let mut buf = [0u8; 1];
                while input_flag.load(Ordering::Relaxed) {
                    if stdin.read_exact(&mut buf).is_ok() {
                        let _ = tx.send(buf[0]);
                        if buf[0] == b'\x03' {
                            break;
                        }
                    }
                }
                set_raw_terminal(false);
            });

            let started = Instant::now();
            print!("\x1B[?25l");
            for _ in 0..=channel_count {
                println!();
            }

            let mut quit = false;
            while !quit {
                std::thread::sleep(Duration::from_millis(VISUALIZATION_UPDATE_MS));

                while let Ok(key) = rx.try_recv() {
                    match key {
                        b'1'..=b'9' => {
                            let ch = (key - b'1') as usize;
                            let mut guard = player.lock();
                            let muted = guard.is_channel_muted(ch);
                            guard.set_channel_mute(ch, !muted);
                        }
                        b' ' => {
                            let mut guard = player.lock();
                            match guard.state() {
                                PlaybackState::Playing => guard.pause()?,
                                _ => guard.play()?,
                            }
                        }
                        b'q' | b'Q' | b'\x03' => quit = true,
                        _ => {}
                    }
                }

                let (snapshot, lines) = {
                    let guard = player.lock();
                    let lines: Vec<String> = guard
                        .mixer()
                        .channels()
                        .iter()
                        .enumerate()
                        .map(|(i, channel)| {
                            format!(
                                "{:>2}{} {}",
                                i + 1,
                                if guard.is_channel_muted(i) { "(M)" } else { "   " },
                                channel_status(channel, BAR_WIDTH)
                            )
                        })
                        .collect();
                    (guard.snapshot(), lines)
                };

                print!("\x1B[{}A", lines.len() + 1);
                println!(
                    "\x1B[2K\r[{:.1}s] {:?} | pos {:>3}/{} pat {:>3} row {:>2} | speed {} bpm {}",
                    started.elapsed().as_secs_f32(),
                    snapshot.state,
                    snapshot.position,
                    snapshot.song_length,
                    snapshot.pattern,
                    snapshot.row,
                    snapshot.speed,
                    snapshot.bpm,
                );
                for line in &lines {
                    println!("\x1B[2K\r{}", line);
                }
                io::stdout().flush().ok();

                if snapshot.state == PlaybackState::Finished || device.is_finished() {
                    quit = true;
                }
            }

            input_running.store(false, Ordering::Relaxed);
            set_raw_terminal(false);
            println!("\x1B[?25h");
            device.finish();

            println!("Played {:.2} seconds", started.elapsed().as_secs_f32());
            Ok(())
        }
    }

    pub fn run() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let options = parse_args()?;
        let Some(file) = options.file.clone().filter(|_| !options.help) else {
            eprint!("{}", USAGE);
            return Ok(());
        };

        let config = build_config(&options)?;
        let data =
            fs::read(&file).with_context(|| format!("failed to read '{}'", file.display()))?;
        let (mut player, summary) = load_song(&data, config)
            .with_context(|| format!("failed to load '{}'", file.display()))?;

        println!("ProTracker MOD Replayer");
        println!("=======================\n");
        println!("File: {} ({})", file.display(), summary.format.as_string());
        println!("{}\n", player.module().format_info());
        println!("Samples:\n{}", sample_list(player.module()));
        println!(
            "Output: {} Hz, {:?} clock, crossmix {:.2}, {:.1}ms per chunk\n",
            config.sample_rate(),
            config.clock,
            config.crossmix,
            config.stream.latency_ms()
        );

        if options.dump {
            dump_patterns(&player);
            return Ok(());
        }

        if let Some(path) = &options.wav {
            return render_wav(&mut player, path);
        }

        #[cfg(feature = "streaming")]
        {
            live::play(player)
        }

        #[cfg(not(feature = "streaming"))]
        {
            let _ = player;
            eprintln!(
                "Live playback requires the \"streaming\" feature. Rebuild with `--features streaming`, or use --wav."
            );
            Ok(())
        }
    }
}

#[cfg(all(feature = "replayer", feature = "visualization"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}
