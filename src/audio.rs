use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use cpal::{FromSample, SizedSample};
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

use crate::console::console_log;

const MAX_CHANNELS: usize = 8;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode wav: {0}")]
    Decode(#[from] hound::Error),
    #[error("no default output device")]
    NoDevice,
    #[error("no usable output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(String),
    #[error("failed to build stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Something the greeting can play and observe, like an HTML audio element.
pub trait AudioSource {
    /// Starts playback if paused. Restarts from the beginning once ended.
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn rewind(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_paused(&self) -> bool;
    fn has_ended(&self) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
}

/// Decoded PCM, interleaved, normalized to [-1, 1].
#[derive(Clone, Debug)]
pub struct Track {
    samples: Arc<[f32]>,
    channels: usize,
    sample_rate: u32,
}

impl Track {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels: usize::from(channels.max(1)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn decode_wav(bytes: &[u8]) -> Result<Track, AudioError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(Track::new(samples, spec.channels, spec.sample_rate))
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Shared between the UI thread and the output callback.
#[derive(Clone, Debug)]
struct PlaybackState {
    /// Read position in source frames.
    cursor: f64,
    playing: bool,
    ended: bool,
    looping: bool,
    muted: bool,
    volume: f32,
}

impl PlaybackState {
    fn new(volume: f32, looping: bool) -> Self {
        Self {
            cursor: 0.0,
            playing: false,
            ended: false,
            looping,
            muted: false,
            volume,
        }
    }

    fn render_frame(&mut self, track: &Track, out_rate: u32, frame: &mut [f32]) {
        frame.fill(0.0);
        if !self.playing {
            return;
        }

        let frames = track.frames();
        if self.cursor >= frames as f64 {
            if self.looping && frames > 0 {
                self.cursor %= frames as f64;
            } else {
                self.playing = false;
                self.ended = true;
                return;
            }
        }

        let gain = if self.muted { 0.0 } else { self.volume };
        let base = self.cursor as usize * track.channels;
        for (ch, out) in frame.iter_mut().enumerate() {
            let src = ch.min(track.channels - 1);
            *out = track.samples[base + src] * gain;
        }
        self.cursor += track.sample_rate as f64 / out_rate.max(1) as f64;
    }
}

fn lock(state: &Mutex<PlaybackState>) -> MutexGuard<'_, PlaybackState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plays a [`Track`] on the default output device. The stream is opened on the
/// first `play` so browsers see it after a user gesture.
pub struct Player {
    name: String,
    track: Track,
    state: Arc<Mutex<PlaybackState>>,
    stream: Option<Stream>,
}

impl Player {
    pub fn new(name: impl Into<String>, track: Track, volume: f32, looping: bool) -> Self {
        Self {
            name: name.into(),
            track,
            state: Arc::new(Mutex::new(PlaybackState::new(volume, looping))),
            stream: None,
        }
    }

    fn open(&mut self) -> Result<&Stream, AudioError> {
        if self.stream.is_none() {
            let stream = open_stream(self.track.clone(), self.state.clone())?;
            console_log!("audio: opened output stream for {}", self.name);
            self.stream = Some(stream);
        }
        self.stream.as_ref().ok_or(AudioError::NoDevice)
    }
}

impl AudioSource for Player {
    fn play(&mut self) -> Result<(), AudioError> {
        {
            let mut state = lock(&self.state);
            if state.playing {
                return Ok(());
            }
            if state.ended {
                state.cursor = 0.0;
                state.ended = false;
            }
            state.playing = true;
        }
        let result = self.open().and_then(|stream| Ok(stream.play()?));
        if result.is_err() {
            lock(&self.state).playing = false;
        }
        result
    }

    fn pause(&mut self) {
        lock(&self.state).playing = false;
        if let Some(stream) = &self.stream {
            if let Err(err) = stream.pause() {
                console_log!("audio: failed to pause {}: {}", self.name, err);
            }
        }
    }

    fn rewind(&mut self) {
        let mut state = lock(&self.state);
        state.cursor = 0.0;
        state.ended = false;
    }

    fn set_muted(&mut self, muted: bool) {
        lock(&self.state).muted = muted;
    }

    fn is_paused(&self) -> bool {
        !lock(&self.state).playing
    }

    fn has_ended(&self) -> bool {
        lock(&self.state).ended
    }

    fn position(&self) -> Duration {
        let cursor = lock(&self.state).cursor;
        Duration::from_secs_f64(cursor / self.track.sample_rate as f64)
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.track.duration())
    }
}

fn open_stream(track: Track, state: Arc<Mutex<PlaybackState>>) -> Result<Stream, AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let config = device.default_output_config()?;

    match config.sample_format() {
        cpal::SampleFormat::F32 => run::<f32>(&device, &config.into(), track, state),
        cpal::SampleFormat::I16 => run::<i16>(&device, &config.into(), track, state),
        cpal::SampleFormat::U16 => run::<u16>(&device, &config.into(), track, state),
        other => Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
    }
}

fn run<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    track: Track,
    state: Arc<Mutex<PlaybackState>>,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let sample_rate = config.sample_rate.0;
    let channels = usize::from(config.channels);

    let err_fn = |err| console_log!("an error occurred on stream: {}", err);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut state = lock(&state);
            write_data(data, channels, &mut |frame: &mut [f32]| {
                state.render_frame(&track, sample_rate, frame)
            });
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

fn write_data<T>(output: &mut [T], channels: usize, next_frame: &mut dyn FnMut(&mut [f32]))
where
    T: SizedSample + FromSample<f32>,
{
    let mut frame = [0.0f32; MAX_CHANNELS];
    let used = channels.clamp(1, MAX_CHANNELS);
    for out in output.chunks_mut(channels.max(1)) {
        next_frame(&mut frame[..used]);
        for (ch, sample) in out.iter_mut().enumerate() {
            *sample = T::from_sample(frame[ch.min(used - 1)]);
        }
    }
}

/// Scriptable stand-in for [`Player`] used by the scene tests.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Handle to a [`FakeAudio`] that stays inspectable after being boxed.
    #[derive(Clone, Debug, Default)]
    pub struct Shared(pub Rc<RefCell<FakeAudio>>);

    impl AudioSource for Shared {
        fn play(&mut self) -> Result<(), AudioError> {
            self.0.borrow_mut().play()
        }

        fn pause(&mut self) {
            self.0.borrow_mut().pause()
        }

        fn rewind(&mut self) {
            self.0.borrow_mut().rewind()
        }

        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().set_muted(muted)
        }

        fn is_paused(&self) -> bool {
            self.0.borrow().is_paused()
        }

        fn has_ended(&self) -> bool {
            self.0.borrow().has_ended()
        }

        fn position(&self) -> Duration {
            self.0.borrow().position()
        }

        fn duration(&self) -> Option<Duration> {
            self.0.borrow().duration()
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeAudio {
        pub position: Duration,
        pub duration: Option<Duration>,
        pub playing: bool,
        pub ended: bool,
        pub muted: bool,
        pub plays: u32,
        pub rewinds: u32,
        pub fail: bool,
    }

    impl AudioSource for FakeAudio {
        fn play(&mut self) -> Result<(), AudioError> {
            self.plays += 1;
            if self.fail {
                return Err(AudioError::NoDevice);
            }
            self.playing = true;
            self.ended = false;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn rewind(&mut self) {
            self.rewinds += 1;
            self.position = Duration::ZERO;
            self.ended = false;
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn is_paused(&self) -> bool {
            !self.playing
        }

        fn has_ended(&self) -> bool {
            self.ended
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            self.duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;

    fn mono(samples: &[f32]) -> Track {
        Track::new(samples.to_vec(), 1, 4)
    }

    fn render(state: &mut PlaybackState, track: &Track, out_rate: u32, frames: usize) -> Vec<f32> {
        let mut out = Vec::new();
        for _ in 0..frames {
            let mut frame = [0.0; 2];
            state.render_frame(track, out_rate, &mut frame);
            out.push(frame[0]);
        }
        out
    }

    #[test]
    fn decodes_int_wav() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut bytes, spec).unwrap();
            for _ in 0..8000 {
                writer.write_sample(i16::MAX).unwrap();
                writer.write_sample(i16::MIN).unwrap();
            }
            writer.finalize().unwrap();
        }
        let track = Track::decode_wav(bytes.get_ref()).unwrap();
        assert_eq!(track.frames(), 8000);
        assert_eq!(track.duration(), Duration::from_secs(1));
        assert_approx_eq!(track.samples[0], 1.0, 1e-3);
        assert_approx_eq!(track.samples[1], -1.0, 1e-6);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Track::decode_wav(b"not a wav"), Err(AudioError::Decode(_))));
    }

    #[test]
    fn paused_state_outputs_silence() {
        let track = mono(&[1.0, 1.0]);
        let mut state = PlaybackState::new(1.0, false);
        assert_eq!(render(&mut state, &track, 4, 2), vec![0.0, 0.0]);
        assert_eq!(state.cursor, 0.0);
    }

    #[test]
    fn plays_to_end_then_reports_ended() {
        let track = mono(&[0.2, 0.4, 0.6]);
        let mut state = PlaybackState::new(0.5, false);
        state.playing = true;
        assert_eq!(render(&mut state, &track, 4, 4), vec![0.1, 0.2, 0.3, 0.0]);
        assert!(state.ended);
        assert!(!state.playing);
    }

    #[test]
    fn looping_wraps_instead_of_ending() {
        let track = mono(&[0.2, 0.4]);
        let mut state = PlaybackState::new(1.0, true);
        state.playing = true;
        assert_eq!(render(&mut state, &track, 4, 5), vec![0.2, 0.4, 0.2, 0.4, 0.2]);
        assert!(!state.ended);
    }

    #[test]
    fn resamples_by_rate_ratio() {
        let track = mono(&[0.1, 0.2, 0.3, 0.4]);
        let mut state = PlaybackState::new(1.0, false);
        state.playing = true;
        assert_eq!(render(&mut state, &track, 2, 2), vec![0.1, 0.3]);
        assert_eq!(state.cursor, 4.0);
    }

    #[test]
    fn muted_still_advances() {
        let track = mono(&[0.5, 0.5]);
        let mut state = PlaybackState::new(1.0, false);
        state.playing = true;
        state.muted = true;
        assert_eq!(render(&mut state, &track, 4, 1), vec![0.0]);
        assert_eq!(state.cursor, 1.0);
    }

    #[test]
    fn mono_source_fills_every_output_channel() {
        let mut out = [0.0f32; 6];
        let mut n = 0.0;
        write_data(&mut out, 2, &mut |frame: &mut [f32]| {
            n += 1.0;
            frame[0] = n;
        });
        assert_eq!(out, [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }
}
