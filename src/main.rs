//! sfxsynth - Procedural sound effects from waveform synthesis

use anyhow::{anyhow, Context, Result};
use sfxsynth::config::{self, EffectConfig, SfxConfig};
use sfxsynth::engine::{self, Backend, Player};
use sfxsynth::{effect, synth};
use std::time::Duration;
use tracing::info;

mod cli;

use clap::Parser;
use cli::{Cli, Commands};

fn find_effect<'a>(cfg: &'a SfxConfig, name: &str) -> Result<&'a EffectConfig> {
    cfg.effect(name).ok_or_else(|| {
        let known: Vec<&str> = cfg.effects.iter().map(|e| e.name.as_str()).collect();
        anyhow!("No effect named '{}' (known: {})", name, known.join(", "))
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config: config_path, effect: name } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;
            let effect_cfg = find_effect(&cfg, &name)?;

            let player = Player::open(cfg.audio.device.as_deref(), cfg.audio.buffer_size, cfg.gain)?;
            let rate = synth::configure(player.sample_rate().hz())?;
            println!("Output: {} ({} Hz, {} ch)", player.device_name(), rate.hz(), player.channels());

            let sound = effect::render(effect_cfg, rate)
                .with_context(|| format!("failed to render effect '{}'", name))?;
            println!("Playing '{}' ({:.2}s)...", name, sound.duration());

            let handle = player.play(sound, effect_cfg.group)?;
            let stopper = handle.clone();
            ctrlc::set_handler(move || stopper.stop()).context("failed to install Ctrl-C handler")?;

            while handle.is_busy() {
                std::thread::sleep(Duration::from_millis(10));
            }
            info!(effect = %name, "playback finished");
        }

        Commands::Render {
            config: config_path,
            effect: name,
            output,
        } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;
            let effect_cfg = find_effect(&cfg, &name)?;

            let rate = synth::configure(cfg.audio.sample_rate)?;
            let sound = effect::render(effect_cfg, rate)
                .with_context(|| format!("failed to render effect '{}'", name))?;

            println!("Rendering '{}' to {:?}...", name, output);
            engine::write_wav(&output, &sound)?;
            println!(
                "Wrote {:.2}s, {} channel(s) at {} Hz",
                sound.duration(),
                sound.channels(),
                rate.hz()
            );
        }

        Commands::List { config: config_path } => {
            let cfg = config::load_config(&config_path)?;
            for effect in &cfg.effects {
                let total: f64 = effect.notes.iter().map(|n| n.sec).sum();
                println!(
                    "  - {} ({:?}, {} notes, {:.2}s) [{}]",
                    effect.name,
                    effect.group,
                    effect.notes.len(),
                    total,
                    if effect.stereo.is_some() { "stereo" } else { "mono" }
                );
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some(name) = engine::default_device_name() {
                println!("Default output: {}\n", name);
            }

            println!("Output devices:");
            for (name, config) in engine::list_output_devices() {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let rate = synth::SampleRate::new(cfg.audio.sample_rate)?;
                    let mut failed = false;

                    println!("  Sample rate: {} Hz", rate.hz());
                    println!("  Effects gain: {:.0}%", cfg.gain.effects * 100.0);
                    println!("  Music gain: {:.0}%", cfg.gain.music * 100.0);
                    println!("  Effects: {}", cfg.effects.len());
                    for effect_cfg in &cfg.effects {
                        match effect::render(effect_cfg, rate) {
                            Ok(sound) => println!(
                                "    - {} ok ({:.2}s, {} ch)",
                                effect_cfg.name,
                                sound.duration(),
                                sound.channels()
                            ),
                            Err(e) => {
                                failed = true;
                                println!("    - {} invalid: {}", effect_cfg.name, e);
                            }
                        }
                    }

                    if failed {
                        std::process::exit(1);
                    }
                    println!("Configuration is valid!");
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../sfx.example.yaml");

            let path = "sfx.yaml";
            if std::path::Path::new(path).exists() {
                println!("sfx.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created sfx.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
