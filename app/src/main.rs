// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use anyhow::Context;
use bigblur::{
    gaussian_blur, BlurImageMut, ParallelFor, StackBlur, StackBlurKernel, ThreadingPolicy,
    WindowFill,
};
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use image::RgbaImage;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Times every stack blur kernel on one image and checks them against the
/// scalar reference.
#[derive(Parser, Debug)]
#[command(name = "bigblur", version, about, long_about = None)]
struct Cli {
    /// Image to blur, a generated gradient is used when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where the last blurred image is written
    #[arg(short, long, default_value = "blurred.png")]
    output: PathBuf,

    #[arg(short, long, default_value_t = 25, allow_negative_numbers = true)]
    radius: i32,

    /// Worker threads in the pool, 0 uses every core
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Partitions per pass for each call, 0 uses the pool size
    #[arg(long, default_value_t = 0)]
    thread_override: usize,

    #[arg(short, long, value_enum, default_value = "all")]
    kernel: KernelArg,

    #[arg(long, value_enum, default_value = "closed-form")]
    fill: FillArg,

    #[arg(short, long, default_value_t = 10)]
    iterations: usize,

    /// Also time the naive gaussian blur
    #[arg(long)]
    gaussian: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KernelArg {
    All,
    Reference,
    Portable,
    Sse2,
    Sse41,
    Neon,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FillArg {
    Sequential,
    ClosedForm,
}

impl KernelArg {
    fn kernels(self) -> Vec<StackBlurKernel> {
        match self {
            KernelArg::All => StackBlurKernel::supported(),
            KernelArg::Reference => vec![StackBlurKernel::Reference],
            KernelArg::Portable => vec![StackBlurKernel::Portable],
            KernelArg::Sse2 => vec![StackBlurKernel::Sse2],
            KernelArg::Sse41 => vec![StackBlurKernel::Sse41],
            KernelArg::Neon => vec![StackBlurKernel::Neon],
        }
    }
}

struct Timings {
    min: Duration,
    total: Duration,
    runs: u32,
}

impl Timings {
    fn measure<F: FnMut() -> anyhow::Result<()>>(iterations: usize, mut f: F) -> anyhow::Result<Timings> {
        let mut timings = Timings {
            min: Duration::MAX,
            total: Duration::ZERO,
            runs: 0,
        };
        for _ in 0..iterations.max(1) {
            let start = Instant::now();
            f()?;
            let elapsed = start.elapsed();
            timings.min = timings.min.min(elapsed);
            timings.total += elapsed;
            timings.runs += 1;
        }
        Ok(timings)
    }

    fn average(&self) -> Duration {
        self.total / self.runs.max(1)
    }
}

fn load_source(input: &Option<PathBuf>) -> anyhow::Result<RgbaImage> {
    match input {
        Some(path) => Ok(image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .to_rgba8()),
        None => Ok(RgbaImage::from_fn(1920, 1080, |x, y| {
            let checker = if (x / 64 + y / 64) % 2 == 0 { 255 } else { 0 };
            image::Rgba([(x % 256) as u8, (y % 256) as u8, checker, 255])
        })),
    }
}

fn main() -> anyhow::Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?
        .log_to_stdout()
        .start()?;
    let cli = Cli::parse();

    let policy = match NonZeroUsize::new(cli.threads) {
        Some(threads) => ThreadingPolicy::Fixed(threads),
        None => ThreadingPolicy::Adaptive,
    };
    let pool = ParallelFor::new(policy)?;

    let source = load_source(&cli.input)?;
    let (width, height) = source.dimensions();
    log::info!(
        "{width}x{height}, radius {}, {} threads, override {}",
        cli.radius,
        pool.num_threads(),
        cli.thread_override
    );

    let mut expected = source.as_raw().to_vec();
    StackBlur::new(StackBlurKernel::Reference)?.blur(
        &mut BlurImageMut::borrow(&mut expected, width, height),
        cli.radius,
        &pool,
        cli.thread_override,
    )?;

    let fill = match cli.fill {
        FillArg::Sequential => WindowFill::Sequential,
        FillArg::ClosedForm => WindowFill::ClosedForm,
    };

    let mut output = source.as_raw().to_vec();
    for kernel in cli.kernel.kernels() {
        let blur = match StackBlur::new(kernel) {
            Ok(blur) => blur.with_window_fill(fill),
            Err(err) => {
                log::warn!("Skipping {kernel}: {err}");
                continue;
            }
        };
        let timings = Timings::measure(cli.iterations, || {
            output.copy_from_slice(source.as_raw());
            let mut image = BlurImageMut::borrow(&mut output, width, height);
            blur.blur(&mut image, cli.radius, &pool, cli.thread_override)?;
            Ok(())
        })?;
        log::info!(
            "{:<10} min {:?}, avg {:?}",
            kernel.name(),
            timings.min,
            timings.average()
        );

        let mismatched = output
            .iter()
            .zip(expected.iter())
            .filter(|(a, b)| a != b)
            .count();
        if mismatched != 0 {
            log::error!("{kernel} differs from reference in {mismatched} bytes");
        }
    }

    if cli.gaussian {
        let mut gaussian = source.as_raw().to_vec();
        let timings = Timings::measure(cli.iterations, || {
            gaussian.copy_from_slice(source.as_raw());
            let mut image = BlurImageMut::borrow(&mut gaussian, width, height);
            gaussian_blur(&mut image, cli.radius, &pool, cli.thread_override)?;
            Ok(())
        })?;
        log::info!(
            "{:<10} min {:?}, avg {:?}",
            "gaussian",
            timings.min,
            timings.average()
        );
    }

    let blurred = RgbaImage::from_raw(width, height, output)
        .context("Blurred buffer does not match image size")?;
    blurred
        .save(&cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;
    log::info!("Saved {}", cli.output.display());
    Ok(())
}
