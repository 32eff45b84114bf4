//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::PlayerConfig;
use crate::engine::{ClockSink, PlaybackClock, ThreadedEngine, WavDecoder};
use crate::player::{PlayerView, TransportController};

/// Options for [`play`]
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub pitch: Option<i32>,
    pub tempo: Option<f64>,
    pub seek: Option<f64>,
    pub seconds: f64,
    pub json: bool,
}

/// Expand files and directories into the WAV files to import, in order.
///
/// Directory contents are sorted by path. Explicit file arguments are kept
/// whatever their extension, so the decoder can report unsupported formats.
pub fn collect_audio_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_wav(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }

    Ok(files)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
        .unwrap_or(false)
}

/// Import every file, apply the options and play for a while.
pub fn play(paths: &[PathBuf], options: &PlayOptions, config: &PlayerConfig) -> anyhow::Result<()> {
    let files = collect_audio_files(paths)?;
    if files.is_empty() {
        bail!("No WAV files found");
    }

    let clock = PlaybackClock::new();
    let mut player = TransportController::new(
        Box::new(ThreadedEngine::new(clock.clone(), config.report_interval())),
        Box::new(ClockSink::new(clock)),
        Box::new(WavDecoder::new()),
        config,
    );

    for file in &files {
        let bytes =
            std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        if let Err(e) = player.import_bytes(&name, &bytes) {
            if !e.is_recoverable() {
                return Err(e).with_context(|| format!("Failed to play {}", file.display()));
            }
            warn!("Skipped {}: {}", file.display(), e);
        }
    }

    if player.is_idle() {
        bail!("None of the {} file(s) could be played", files.len());
    }

    if let Some(pitch) = options.pitch {
        player.set_pitch(pitch)?;
    }
    if let Some(tempo) = options.tempo {
        player.set_tempo(tempo)?;
    }
    if let Some(fraction) = options.seek {
        player.scrub(fraction)?;
    }

    info!("Playing for {:.1}s", options.seconds);
    let deadline = Instant::now() + Duration::from_secs_f64(options.seconds.max(0.0));
    let interval = config.report_interval();

    print_view(&player.view(), options.json)?;
    while Instant::now() < deadline {
        thread::sleep(interval.min(deadline.saturating_duration_since(Instant::now())));
        if player.pump_engine_reports() > 0 {
            print_view(&player.view(), options.json)?;
        }
    }

    player.shutdown();
    debug!("Player shut down");
    Ok(())
}

fn print_view(view: &PlayerView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
    } else {
        println!("{}", view.status_line());
    }
    Ok(())
}

/// Print format details of an audio file.
pub fn inspect(path: &Path) -> anyhow::Result<()> {
    info!("Inspecting: {}", path.display());

    let buffer = WavDecoder::new()
        .decode_file(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    println!("File: {}", path.display());
    println!("{:-<40}", "");
    println!("Channels:    {}", buffer.num_channels());
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Frames:      {}", buffer.frames());
    println!(
        "Duration:    {} ({:.3}s)",
        crate::player::format_time(buffer.duration_secs()),
        buffer.duration_secs()
    );

    Ok(())
}
