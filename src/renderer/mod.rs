mod diagnostics;
mod lighting;
mod machinery;
mod tracer;
mod worker;

use std::{collections::TryReserveError, num::NonZeroUsize};

use bon::Builder;
use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{Color, ScreenPoint, ScreenSize};

pub use diagnostics::{FrameStats, FrameTimer};
pub use lighting::{AMBIENT, LightingResult, phong};
pub use machinery::FrameRenderer;
pub use tracer::{TraceStats, Tracer};
pub use worker::color_to_image;

/// Primary rays are depth 0, secondary rays are only spawned below this depth.
pub const DEFAULT_MAX_BOUNCES: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per logical CPU.
    Auto,
    Manual(NonZeroUsize),
}

impl WorkerCount {
    pub fn get(self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get(),
            WorkerCount::Manual(num) => num.get(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticsSettings {
    /// Log the average frame time once a second.
    pub frame_time: bool,

    /// Log intersection test counts after every frame.
    pub intersection_stats: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        DiagnosticsSettings {
            frame_time: true,
            intersection_stats: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Builder)]
pub struct RenderSettings {
    #[builder(default = DEFAULT_MAX_BOUNCES)]
    pub max_bounces: u32,

    #[builder(default = WorkerCount::Auto)]
    pub worker_count: WorkerCount,

    /// Pin each worker thread to a CPU core.
    #[builder(default)]
    pub pin_workers: bool,

    /// Color of rays that don't hit anything.
    #[builder(default = Color::zeros())]
    pub background: Color,

    #[builder(default)]
    pub diagnostics: DiagnosticsSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings::builder().build()
    }
}

/// Rendered colors, one per pixel in raster order (row 0 at the top).
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub resolution: ScreenSize,
    pub pixels: Vec<Color>,
}

impl Frame {
    /// Color of a pixel, None if the point lies outside of the frame.
    pub fn pixel(&self, point: &ScreenPoint) -> Option<Color> {
        if point.x >= self.resolution.x || point.y >= self.resolution.y {
            return None;
        }
        let index = point.y as usize * self.resolution.x as usize + point.x as usize;
        self.pixels.get(index).copied()
    }

    /// Screen cells with their colors, in raster order.
    pub fn cells(&self) -> impl Iterator<Item = (ScreenPoint, Color)> + '_ {
        let width = self.resolution.x;
        self.pixels.iter().enumerate().map(move |(i, color)| {
            let i = i as u32;
            (ScreenPoint::new(i % width, i / width), *color)
        })
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.resolution.x, self.resolution.y, |x, y| {
            let color = self.pixel(&ScreenPoint::new(x, y)).unwrap_or_default();
            color_to_image(&color)
        })
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unable to allocate memory for a frame of {pixels} pixels")]
    FrameAllocation {
        pixels: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Unable to allocate memory for {pixels} pixels of batch {batch}")]
    BatchAllocation {
        batch: usize,
        pixels: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Worker thread exited while rendering")]
    WorkerLost,
}
