use argh::FromArgs;

use flowarp::{
    image::{Image, ImageSize},
    tracking::{SessionConfig, SessionState, TrackingSession},
};

#[derive(FromArgs)]
/// Track feature points on a synthetic panning video
struct Args {
    /// the number of frames to process (default: 120)
    #[argh(option, short = 'n', default = "120")]
    num_frames: usize,

    /// the horizontal motion per frame in pixels (default: 1.5)
    #[argh(option, default = "1.5")]
    vx: f32,

    /// the vertical motion per frame in pixels (default: 0.5)
    #[argh(option, default = "0.5")]
    vy: f32,

    /// reset the session every this many frames, never when zero (default: 0)
    #[argh(option, short = 'r', default = "0")]
    reset_every: usize,

    /// the maximum number of tracked points (default: 100)
    #[argh(option, short = 'm', default = "100")]
    max_corners: usize,
}

/// Where the frames of the video come from.
trait FrameSource {
    /// The next frame, `None` at the end of the video.
    fn next_frame(&mut self) -> Option<Image<u8, 3>>;
}

/// A smooth texture panning at a constant velocity.
struct PanningTexture {
    size: ImageSize,
    velocity: [f32; 2],
    frame: usize,
    num_frames: usize,
}

impl PanningTexture {
    fn intensity(x: f32, y: f32) -> u8 {
        let v = 128.0 + 60.0 * (x / 5.0).sin() * (y / 7.0).cos() + 40.0 * ((x + y) / 9.0).sin();
        v.round().clamp(0.0, 255.0) as u8
    }
}

impl FrameSource for PanningTexture {
    fn next_frame(&mut self) -> Option<Image<u8, 3>> {
        if self.frame >= self.num_frames {
            return None;
        }

        let shift = [
            self.velocity[0] * self.frame as f32,
            self.velocity[1] * self.frame as f32,
        ];
        let mut data = Vec::with_capacity(self.size.width * self.size.height * 3);
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let v = Self::intensity(x as f32 - shift[0], y as f32 - shift[1]);
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        self.frame += 1;

        Image::new(self.size, data).ok()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut source = PanningTexture {
        size: ImageSize {
            width: 320,
            height: 240,
        },
        velocity: [args.vx, args.vy],
        frame: 0,
        num_frames: args.num_frames,
    };

    let mut config = SessionConfig::default();
    config.features.max_corners = args.max_corners;
    let mut session = TrackingSession::new(config);

    let mut frame_idx = 0;
    while let Some(frame) = source.next_frame() {
        if args.reset_every > 0 && frame_idx > 0 && frame_idx % args.reset_every == 0 {
            session.reset();
        }

        let display = session.process_frame(&frame)?;

        log::info!(
            "frame {frame_idx:4}: {:?} with {} points, display {}",
            session.state(),
            session.tracks().len(),
            display.size()
        );

        if session.state() == SessionState::Lost && args.reset_every == 0 {
            log::warn!("every point was lost, stopping");
            break;
        }

        frame_idx += 1;
    }

    Ok(())
}
