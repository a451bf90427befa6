use std::{
    collections::TryReserveError,
    ops::Range,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use itertools::Itertools as _;

use crate::{
    camera::Camera,
    geometry::Color,
    renderer::{
        Frame, FrameStats, FrameTimer, RenderError, RenderSettings, TraceStats, worker::Worker,
    },
    scene::Scene,
};

/// One contiguous range of pixels for a worker to trace.
struct Job {
    batch: usize,
    pixels: Range<usize>,
    buffer: Vec<Color>,

    scene: Arc<Scene>,
    camera: Camera,

    results: Sender<BatchResult>,
}

struct BatchResult {
    batch: usize,
    pixels: Vec<Color>,
    stats: TraceStats,
}

struct WorkerHandle {
    jobs: Sender<Job>,
    thread: JoinHandle<()>,
}

/// Persistent pool of worker threads rendering whole frames.
/// Each frame is split into one contiguous batch of pixels per worker.
pub struct FrameRenderer {
    scene: Arc<Scene>,
    settings: RenderSettings,
    workers: Vec<WorkerHandle>,
    timer: FrameTimer,
}

impl FrameRenderer {
    pub fn new(scene: impl Into<Arc<Scene>>, settings: RenderSettings) -> Result<Self, RenderError> {
        let worker_count = settings.worker_count.get();

        let cores = if settings.pin_workers {
            let cores = core_affinity::get_core_ids();
            if cores.is_none() {
                log::warn!("Unable to get the CPU list, worker threads will not be pinned");
            }
            cores.unwrap_or_default()
        } else {
            Vec::new()
        };

        let workers = (0..worker_count)
            .map(|worker_id| {
                let core = cores.iter().cycle().nth(worker_id).cloned();
                spawn_worker(worker_id, core, settings)
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Started {} worker threads", workers.len());

        Ok(FrameRenderer {
            scene: scene.into(),
            settings,
            workers,
            timer: FrameTimer::new(),
        })
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// Replace the scene for the following frames.
    pub fn set_scene(&mut self, scene: impl Into<Arc<Scene>>) {
        self.scene = scene.into();
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Render one frame, blocking until every batch is done.
    pub fn render_frame(&mut self, camera: &Camera) -> Result<(Frame, TraceStats), RenderError> {
        let pixel_count = camera.pixel_count();
        let batches = batch_ranges(pixel_count, self.workers.len());

        // Every buffer is reserved before any work is sent out, a failure drops the ones
        // already allocated.
        let frame_pixels = reserve_pixels(pixel_count)
            .map_err(|source| RenderError::FrameAllocation {
                pixels: pixel_count,
                source,
            })?;
        let buffers = batches
            .iter()
            .enumerate()
            .map(|(batch, pixels)| {
                reserve_pixels(pixels.len()).map_err(|source| RenderError::BatchAllocation {
                    batch,
                    pixels: pixels.len(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let batch_count = batches.len();
        let (results_sender, results) = mpsc::channel();
        for ((batch, (pixels, buffer)), worker) in batches
            .into_iter()
            .zip(buffers)
            .enumerate()
            .zip(&self.workers)
        {
            let job = Job {
                batch,
                pixels,
                buffer,
                scene: Arc::clone(&self.scene),
                camera: *camera,
                results: results_sender.clone(),
            };
            worker
                .jobs
                .send(job)
                .map_err(|_| RenderError::WorkerLost)?;
        }
        drop(results_sender);

        let (pixels, stats) = collect_batches(&results, batch_count, frame_pixels)?;

        if self.settings.diagnostics.frame_time {
            self.timer.frame_finished();
        }
        if self.settings.diagnostics.intersection_stats {
            FrameStats::from(&stats).log();
        }

        Ok((
            Frame {
                resolution: camera.resolution(),
                pixels,
            },
            stats,
        ))
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        for WorkerHandle { jobs, thread } in self.workers.drain(..) {
            // Closing the channel ends the worker's loop
            drop(jobs);
            let name = thread.thread().name().unwrap_or("worker").to_owned();
            if thread.join().is_err() {
                log::error!("Thread {name} panicked");
            }
        }
    }
}

fn spawn_worker(
    worker_id: usize,
    core: Option<core_affinity::CoreId>,
    settings: RenderSettings,
) -> Result<WorkerHandle, RenderError> {
    let (jobs, job_receiver) = mpsc::channel::<Job>();

    let thread = thread::Builder::new()
        .name(format!("worker{worker_id}"))
        .spawn(move || {
            if let Some(core) = core {
                if !core_affinity::set_for_current(core) {
                    log::warn!("Unable to pin worker {worker_id} to core {}", core.id);
                }
            }

            let mut worker = Worker::new(worker_id);
            for job in job_receiver {
                let mut buffer = job.buffer;
                let stats = worker.render_batch(
                    &job.scene,
                    &job.camera,
                    &settings,
                    job.pixels,
                    &mut buffer,
                );

                // The frame may have been abandoned already
                let _ = job.results.send(BatchResult {
                    batch: job.batch,
                    pixels: buffer,
                    stats,
                });
            }
        })
        .map_err(RenderError::WorkerSpawn)?;

    Ok(WorkerHandle { jobs, thread })
}

/// Split `pixel_count` pixels into at most `worker_count` contiguous batches of
/// `ceil(pixel_count / worker_count)` pixels, the last one possibly shorter.
fn batch_ranges(pixel_count: usize, worker_count: usize) -> Vec<Range<usize>> {
    let batch_size = pixel_count.div_ceil(worker_count.max(1)).max(1);
    (0..pixel_count)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(pixel_count))
        .collect()
}

fn reserve_pixels(count: usize) -> Result<Vec<Color>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(count)?;
    Ok(buffer)
}

/// Wait for all batches of a frame and stitch them together in batch order into `pixels`,
/// which must have room for the whole frame.
fn collect_batches(
    results: &Receiver<BatchResult>,
    batch_count: usize,
    mut pixels: Vec<Color>,
) -> Result<(Vec<Color>, TraceStats), RenderError> {
    // Ends once every job (and with it every sender) is gone
    let finished: Vec<BatchResult> = results.iter().collect();
    if finished.len() != batch_count {
        return Err(RenderError::WorkerLost);
    }

    let mut stats = TraceStats::default();
    for result in finished.into_iter().sorted_by_key(|result| result.batch) {
        pixels.extend(result.pixels);
        stats = stats.merge(&result.stats);
    }

    Ok((pixels, stats))
}
