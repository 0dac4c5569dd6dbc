// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Output driver: walks the job outputs video by video, composites
//! skeleton overlays onto sampled frames, and writes numbered JPEGs.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use image::RgbImage;

use crate::annotate;
use crate::error::{OverlayError, Result};
use crate::job::{Database, VideoOutput};
use crate::loader::{Decoded, LoaderRegistry};
use crate::pose::{self, PersonCenter, Pose};
use crate::source::{self, FrameSource};
use crate::{verbose, warn};

/// Job name holding the person-center outputs.
const CENTERS_JOB: &str = "person";
/// Job name holding the joint heat-map outputs.
const POSE_JOB: &str = "pose";

/// Render work for one video: sampled frame indices with the centers and
/// poses for each sampled frame.
#[derive(Debug)]
pub struct RenderPlan {
    /// Video index within the dataset.
    pub video: usize,
    /// Sampled frame indices, ascending.
    pub frames: Vec<usize>,
    /// Person centers per sampled frame.
    pub centers: Vec<Vec<PersonCenter>>,
    /// Assembled poses per sampled frame.
    pub poses: Vec<Vec<Pose>>,
}

impl RenderPlan {
    /// Number of renderable frame slots: frames, centers, and poses are
    /// zipped, so the shortest list bounds the work.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.frames
            .len()
            .min(self.centers.len())
            .min(self.poses.len())
    }
}

/// Group the centers-job and joints-job outputs into per-video render
/// plans, assembling one pose per person.
///
/// Joint-map buffers are consumed with a single running index that does not
/// reset between videos; when a frame's person count would overrun the
/// remaining buffers of the current video, the rest of that video's frames
/// get no poses. This truncation mirrors the upstream pipeline and is
/// deliberate.
#[must_use]
pub fn plan_videos(centers_job: &[VideoOutput], joints_job: &[VideoOutput]) -> Vec<RenderPlan> {
    #[derive(Default)]
    struct Acc {
        frames: Vec<usize>,
        centers: Vec<Vec<PersonCenter>>,
    }

    let mut by_video: BTreeMap<usize, Acc> = BTreeMap::new();
    for out in centers_job {
        let acc = by_video.entry(out.video).or_default();
        acc.frames.extend_from_slice(&out.frames);
        for buffer in &out.buffers {
            let points = match buffer {
                Decoded::Points(points) => {
                    points.iter().map(|&p| PersonCenter::from(p)).collect()
                }
                _ => Vec::new(),
            };
            acc.centers.push(points);
        }
    }

    let mut buffer_index = 0usize;
    let mut poses_by_video: BTreeMap<usize, Vec<Vec<Pose>>> = BTreeMap::new();
    for out in joints_job {
        let Some(acc) = by_video.get(&out.video) else {
            continue;
        };
        let slots = poses_by_video.entry(out.video).or_default();
        for centers in &acc.centers {
            if centers.len() + buffer_index > out.buffers.len() {
                break;
            }
            let mut poses = Vec::with_capacity(centers.len());
            for &center in centers {
                if let Decoded::JointMaps(maps) = &out.buffers[buffer_index] {
                    poses.push(pose::assemble(center, maps.view()));
                }
                buffer_index += 1;
            }
            slots.push(poses);
        }
    }

    by_video
        .into_iter()
        .map(|(video, acc)| RenderPlan {
            video,
            frames: acc.frames,
            centers: acc.centers,
            poses: poses_by_video.remove(&video).unwrap_or_default(),
        })
        .collect()
}

/// Drives the whole overlay run for one dataset.
pub struct Driver<'a> {
    db: &'a Database,
    registry: &'a LoaderRegistry,
    out_dir: PathBuf,
}

impl<'a> Driver<'a> {
    /// Create a driver writing into the default `imgs/` directory.
    #[must_use]
    pub fn new(db: &'a Database, registry: &'a LoaderRegistry) -> Self {
        Self {
            db,
            registry,
            out_dir: PathBuf::from("imgs"),
        }
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_out_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Run the overlay pipeline for `dataset`.
    ///
    /// The centers and joint maps are read from the fixed `person` and
    /// `pose` job outputs. An unopenable or short video skips the rest of
    /// that video only; job-load failures are fatal.
    ///
    /// # Errors
    ///
    /// Returns a `JobError`/`DecodeError` if the job outputs cannot be
    /// loaded, or an IO error if the output directory cannot be created.
    pub fn run(&self, dataset: &str) -> Result<()> {
        let meta = self.db.dataset_meta(dataset)?;
        let centers_job = self
            .db
            .load_outputs(self.registry, dataset, CENTERS_JOB, "centers")?;
        let joints_job = self
            .db
            .load_outputs(self.registry, dataset, POSE_JOB, "joint_maps")?;
        let plans = plan_videos(&centers_job, &joints_job);

        fs::create_dir_all(&self.out_dir)?;
        for plan in &plans {
            let Some(path) = meta.video_paths.get(plan.video) else {
                warn!("no dataset path for video {}, skipping", plan.video);
                continue;
            };
            verbose!(
                "Generating {} frames for video {}",
                plan.frames.len(),
                plan.video
            );
            // The frame source lives exactly as long as this video's loop.
            match source::open_video(path) {
                Ok(src) => self.render_video(src, plan)?,
                Err(e) => {
                    warn!("skipping video {}: {e}", plan.video);
                }
            }
        }
        Ok(())
    }

    /// Render one video's sampled frames through `src`, which is consumed
    /// strictly forward.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing an output image fails; source
    /// read failures and end-of-stream end the loop silently.
    pub fn render_video(&self, mut src: Box<dyn FrameSource>, plan: &RenderPlan) -> Result<()> {
        let mut current = 0usize;
        'frames: for slot in 0..plan.slots() {
            let frame_index = plan.frames[slot];
            // Forward-only seek: read and discard up to the sampled index.
            let mut frame = loop {
                match src.next_frame() {
                    Some(Ok(frame)) => {
                        current += 1;
                        if current - 1 == frame_index {
                            break frame;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("read failure at frame {current}: {e}");
                        break 'frames;
                    }
                    None => break 'frames,
                }
            };

            #[allow(clippy::cast_precision_loss)]
            let scale = frame.height() as f32 / pose::INPUT_SIZE;
            annotate::draw_overlays(&mut frame, scale, &plan.centers[slot], &plan.poses[slot]);
            if frame_index % 100 == 0 {
                verbose!("At frame {frame_index}...");
            }
            self.save_frame(frame_index, &frame)?;
        }
        Ok(())
    }

    fn save_frame(&self, frame_index: usize, frame: &RgbImage) -> Result<()> {
        let path = self.out_dir.join(format!("frames{frame_index:04}.jpg"));
        frame.save(&path).map_err(|e| {
            OverlayError::ImageError(format!("failed to save {}: {e}", path.display()))
        })
    }
}
