use pathscatter::core::rng::{LcgRng, RandomSource};
use pathscatter::io::exr_utils;
use pathscatter::materials::hemisphere::HemisphereSampler;
use pathscatter::math::bitmap::Bitmap;
use pathscatter::math::constants::{Float, Vector3f, PI};
use pathscatter::math::frame::Frame;
use pathscatter::math::warp::sample_cosine_hemisphere_pdf;
use std::env;

// Splats samples onto the unit disk seen from above the normal. A
// cosine-weighted sampler gives a flat image: the projected density equals
// the pdf at the pole everywhere.
fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <output.exr> [--strategy naive|stratified] [--samples N] [--size N] [--seed N] [--tilt DEG]", args[0]);
        std::process::exit(1);
    }

    let output_path = &args[1];
    let mut sampler = HemisphereSampler::default();
    let mut samples: usize = 1_000_000;
    let mut size: usize = 256;
    let mut seed: u64 = 0;
    let mut tilt_deg: Float = 0.0;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--strategy" => {
                i += 1;
                match args.get(i).and_then(|v| HemisphereSampler::from_name(v)) {
                    Some(s) => sampler = s,
                    None => {
                        eprintln!("unknown strategy, expected naive or stratified");
                        std::process::exit(1);
                    }
                }
            }
            "--samples" => {
                i += 1;
                samples = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(samples);
            }
            "--size" => {
                i += 1;
                size = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(size).max(1);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            "--tilt" => {
                i += 1;
                tilt_deg = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(tilt_deg);
            }
            _ => {}
        }
        i += 1;
    }

    let tilt = tilt_deg * PI / 180.0;
    let normal = Vector3f::new(tilt.sin(), 0.0, tilt.cos());
    let frame = Frame::from_normal(&normal);
    let mut rng = LcgRng::new(seed);
    let mut bitmap = Bitmap::new(size, size);
    let mut cos_sum = 0.0f64;

    for _ in 0..samples {
        let u = rng.next_f32();
        let v = rng.next_f32();
        let local = frame.to_local(sampler.sample(&normal, u, v));
        cos_sum += local.z as f64;

        let px = (((local.x + 1.0) * 0.5 * size as Float) as usize).min(size - 1);
        let py = (((local.y + 1.0) * 0.5 * size as Float) as usize).min(size - 1);
        bitmap[(px, py)] += Vector3f::new(1.0, 1.0, 1.0);
    }

    // Normalise so a pixel fully inside the disk reads one.
    let pixel_area = (2.0 / size as Float) * (2.0 / size as Float);
    let expected_per_pixel = samples as Float * sample_cosine_hemisphere_pdf(1.0) * pixel_area;
    if expected_per_pixel > 0.0 {
        bitmap.scale(1.0 / expected_per_pixel);
    }

    log::info!("Strategy: {}, samples: {}, mean cosine: {:.5} (expected 0.66667), peak: {:.3}.",
               sampler.name(),
               samples,
               cos_sum / samples.max(1) as f64,
               bitmap.max_value());

    if let Err(e) = exr_utils::write_bitmap(&bitmap, output_path) {
        eprintln!("failed to write {}: {}", output_path, e);
        std::process::exit(2);
    }
}
