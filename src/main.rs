// Copyright 2020 TwoCookingMice

use pathscatter::core::interaction::SurfaceIntersection;
use pathscatter::core::material::Material;
use pathscatter::core::material_loader::load_materials;
use pathscatter::core::path_segment::PathSegment;
use pathscatter::core::rng::LcgRng;
use pathscatter::core::scatter::{ScatterEngine, ScatterEvent};
use pathscatter::math::constants::{Float, Vector3f, PI};
use pathscatter::math::ray::Ray3f;
use pathscatter::math::spectrum::RGBSpectrum;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

const BLOCK_SIZE: usize = 4096;

#[derive(Default)]
struct TrialStats {
    trials: usize,
    events: [usize; 4],
    throughput: [f64; 3],
}

impl TrialStats {
    fn merge(&mut self, other: &TrialStats) {
        self.trials += other.trials;
        for i in 0..4 {
            self.events[i] += other.events[i];
        }
        for c in 0..3 {
            self.throughput[c] += other.throughput[c];
        }
    }
}

struct TrialSetup {
    samples: usize,
    seed: u32,
    angle_deg: Float,
    outside: bool,
    thread_count: usize,
}

fn run_trials(engine: &ScatterEngine, material: &Material, setup: &TrialSetup, progress: &ProgressBar) -> TrialStats {
    let theta = setup.angle_deg * PI / 180.0;
    let normal = Vector3f::new(0.0, 0.0, 1.0);
    let dir = Vector3f::new(theta.sin(), 0.0, -theta.cos());
    let origin = -dir;
    let intersection = SurfaceIntersection::new(1.0, normal, setup.outside, 0);

    let total_blocks = (setup.samples + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let next_block = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel::<TrialStats>();
    let mut stats = TrialStats::default();

    thread::scope(|scope| {
        for _ in 0..setup.thread_count {
            let next_block = Arc::clone(&next_block);
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }
                    let begin = block_index * BLOCK_SIZE;
                    let end = (begin + BLOCK_SIZE).min(setup.samples);

                    let mut block = TrialStats::default();
                    for index in begin..end {
                        let mut rng = LcgRng::for_segment(setup.seed, index as u32, 0);
                        let mut segment = PathSegment::new(Ray3f::new(origin, dir), index as u32, 1);
                        let event = engine.scatter_with_event(&mut segment, &intersection, material, &mut rng);
                        block.trials += 1;
                        block.events[event.index()] += 1;
                        for c in 0..3 {
                            block.throughput[c] += segment.color[c] as f64;
                        }
                    }
                    if tx.send(block).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for _ in 0..total_blocks {
            if let Ok(block) = rx.recv() {
                stats.merge(&block);
                progress.inc(1);
            }
        }
    });

    stats
}

fn format_rgb(rgb: &RGBSpectrum) -> String {
    format!("({:.4}, {:.4}, {:.4})", rgb[0], rgb[1], rgb[2])
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <materials.xml> [--samples N] [--seed N] [--angle DEG] [--inside] [--threads N]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut setup = TrialSetup {
        samples: 100000,
        seed: 0,
        angle_deg: 30.0,
        outside: true,
        thread_count: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                setup.samples = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(setup.samples);
            }
            "--seed" => {
                i += 1;
                setup.seed = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(setup.seed);
            }
            "--angle" => {
                i += 1;
                setup.angle_deg = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(setup.angle_deg);
            }
            "--inside" => {
                setup.outside = false;
            }
            "--threads" => {
                i += 1;
                setup.thread_count = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(setup.thread_count).max(1);
            }
            other => {
                log::warn!("Ignoring unknown argument: {}.", other);
            }
        }
        i += 1;
    }

    if !(0.0..90.0).contains(&setup.angle_deg) {
        eprintln!("--angle must be in [0, 90), got {}", setup.angle_deg);
        std::process::exit(1);
    }

    let load_result = match load_materials(input_path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("failed to load materials: {}", e);
            std::process::exit(2);
        }
    };
    let engine = ScatterEngine::new(load_result.settings);
    log::info!("Hemisphere sampler: {}, energy split: {}, offset: {}, max depth: {}.",
               engine.settings().hemisphere.name(),
               engine.settings().split.name(),
               engine.settings().ray_offset,
               engine.settings().max_depth);

    let materials = &load_result.materials;
    if materials.is_empty() {
        eprintln!("no <bsdf> entries in {}", input_path);
        std::process::exit(2);
    }
    let total_blocks = (setup.samples + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let progress = ProgressBar::new((total_blocks * materials.len()) as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut report = Vec::new();
    for entry in materials.iter() {
        if entry.is_emissive() {
            progress.inc(total_blocks as u64);
            report.push(format!("{} {} emits {} x {}",
                                style(&entry.id).bold(),
                                style("[emitter]").yellow(),
                                format_rgb(&entry.material.color()),
                                entry.emittance));
            continue;
        }

        let stats = run_trials(&engine, &entry.material, &setup, &progress);
        let n = stats.trials.max(1) as f64;
        let mean = RGBSpectrum::new((stats.throughput[0] / n) as Float,
                                    (stats.throughput[1] / n) as Float,
                                    (stats.throughput[2] / n) as Float);
        let mut line = format!("{} {} mean throughput {}",
                               style(&entry.id).bold(),
                               style(format!("[{}]", entry.material.kind_name())).cyan(),
                               format_rgb(&mean));
        for event in ScatterEvent::ALL.iter() {
            let count = stats.events[event.index()];
            if count > 0 {
                line.push_str(&format!("  {} {:.2}%", event.name(), 100.0 * count as f64 / n));
            }
        }
        report.push(line);
    }
    progress.finish_and_clear();

    println!("{}", style(format!("{} trials per material at {} degrees ({})",
                                 setup.samples,
                                 setup.angle_deg,
                                 if setup.outside { "entering" } else { "exiting" })).underlined());
    for line in report {
        println!("{}", line);
    }
}
