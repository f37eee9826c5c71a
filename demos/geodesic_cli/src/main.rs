use std::time::Instant;

use argh::FromArgs;

use geodis::imgproc::{self, ExecutionStrategy, GeodesicParams, Spacing3, SymmetricFilterParams};
use geodis::tensor::Tensor;

#[derive(FromArgs, Debug)]
/// Run a geodesic distance transform on a synthetic disc image.
struct Args {
    /// side length of the square grid
    #[argh(option, short = 's', default = "256")]
    size: usize,

    /// number of slices; runs the 3D transform when set
    #[argh(option, short = 'd')]
    depth: Option<usize>,

    /// number of sweep cycles
    #[argh(option, short = 'i', default = "2")]
    iterations: usize,

    /// weight of the image gradient term
    #[argh(option, short = 'l', default = "1.0")]
    lambda: f32,

    /// number of worker threads, 0 runs serially
    #[argh(option, short = 'n')]
    threads: Option<usize>,

    /// also run geodesic symmetric filtering with this threshold
    #[argh(option)]
    theta: Option<f32>,
}

fn print_stats(name: &str, values: &[f32]) {
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len().max(1) as f64;
    println!("{name}: min {min:.3} max {max:.3} mean {mean:.3}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let strategy = match args.threads {
        None => ExecutionStrategy::ParallelElements,
        Some(0) => ExecutionStrategy::Serial,
        Some(n) => ExecutionStrategy::Fixed(n),
    };
    let params = GeodesicParams::default()
        .with_lambda_grad(args.lambda)
        .with_iterations(args.iterations)
        .with_strategy(strategy);

    let size = args.size;
    let radius = size as f32 / 4.0;
    let centre = size as f32 / 2.0;
    let inside = |h: usize, w: usize| {
        let (dy, dx) = (h as f32 - centre, w as f32 - centre);
        (dy * dy + dx * dx).sqrt() < radius
    };

    let now = Instant::now();
    match args.depth {
        None => {
            let image = Tensor::<f32, 3>::from_shape_fn([1, size, size], |[_, h, w]| {
                if inside(h, w) {
                    1.0
                } else {
                    0.0
                }
            });
            let mask = Tensor::<f32, 3>::from_shape_fn([1, size, size], |[_, h, w]| {
                if h == size / 2 && w == size / 2 {
                    0.0
                } else {
                    1.0
                }
            });
            log::info!("running geodesic 2d on {:?}", image.shape);
            let distance = imgproc::generalised_geodesic2d(&image, &mask, &params)?;
            print_stats("distance", distance.as_slice());

            if let Some(theta) = args.theta {
                let filter = SymmetricFilterParams {
                    theta,
                    iterations: args.iterations,
                    strategy,
                    ..Default::default()
                };
                let filtered = imgproc::geodesic_symmetric_filter2d(&image, &image, &filter)?;
                print_stats("filtered", filtered.as_slice());
            }
        }
        Some(depth) => {
            let image = Tensor::<f32, 4>::from_shape_fn([1, depth, size, size], |[_, _, h, w]| {
                if inside(h, w) {
                    1.0
                } else {
                    0.0
                }
            });
            let mask = Tensor::<f32, 4>::from_shape_fn([1, depth, size, size], |[_, d, h, w]| {
                if d == depth / 2 && h == size / 2 && w == size / 2 {
                    0.0
                } else {
                    1.0
                }
            });
            let spacing = Spacing3::new(2.0, 1.0, 1.0);
            log::info!("running geodesic 3d on {:?}", image.shape);
            let distance = imgproc::generalised_geodesic3d(&image, &mask, spacing, &params)?;
            print_stats("distance", distance.as_slice());

            if let Some(theta) = args.theta {
                let filter = SymmetricFilterParams {
                    theta,
                    iterations: args.iterations,
                    strategy,
                    ..Default::default()
                };
                let filtered =
                    imgproc::geodesic_symmetric_filter3d(&image, &image, spacing, &filter)?;
                print_stats("filtered", filtered.as_slice());
            }
        }
    }
    println!("done in {:?}", now.elapsed());

    Ok(())
}
