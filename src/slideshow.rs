use rand::Rng;
use std::time::Duration;

use crate::audio::AudioSource;
use crate::config::SlideshowConfig;
use crate::lanterns::Lanterns;
use crate::lyrics::{Lyric, LyricTable};
use crate::timer::Interval;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayEvent {
    /// The overlay wants to be dismissed: the song ended or the user closed it.
    Close,
}

/// Full-screen photo slideshow with lyrics following the song.
#[derive(Clone, Debug)]
pub struct Slideshow {
    config: SlideshowConfig,
    lyrics: LyricTable,
    playing: bool,
    image_index: usize,
    elapsed_ms: u64,
    duration_ms: Option<u64>,
    lyric_index: usize,
    image_timer: Interval,
    clock_timer: Interval,
    lanterns: Lanterns,
    lanterns_spawned: bool,
}

impl Slideshow {
    pub fn new(config: SlideshowConfig, lyrics: LyricTable, width: f32, height: f32) -> Self {
        Self {
            image_timer: Interval::from_millis(config.image_period_ms),
            clock_timer: Interval::from_millis(config.clock_step_ms),
            lanterns: Lanterns::new(width, height, config.lantern_padding),
            lyrics,
            playing: false,
            image_index: 0,
            elapsed_ms: 0,
            duration_ms: None,
            lyric_index: 0,
            lanterns_spawned: false,
            config,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn activate(&mut self) {
        self.playing = true;
    }

    /// Stops the timers and puts everything back to its initial value.
    pub fn deactivate(&mut self) {
        self.playing = false;
        self.image_index = 0;
        self.elapsed_ms = 0;
        self.duration_ms = None;
        self.lyric_index = 0;
        self.image_timer.reset();
        self.clock_timer.reset();
        self.lanterns.clear();
        self.lanterns_spawned = false;
    }

    pub fn close(&self) -> OverlayEvent {
        OverlayEvent::Close
    }

    pub fn tick(
        &mut self,
        dt: Duration,
        music: Option<&dyn AudioSource>,
        rng: &mut impl Rng,
    ) -> Option<OverlayEvent> {
        if !self.playing {
            return None;
        }

        let advanced = self.image_timer.tick(dt) as usize;
        self.image_index = (self.image_index + advanced) % self.config.image_count;

        let mut event = None;
        let steps = self.clock_timer.tick(dt);
        if steps > 0 {
            match music {
                Some(music) => {
                    self.elapsed_ms = music.position().as_millis() as u64;
                    self.duration_ms = music.duration().map(|d| d.as_millis() as u64);
                    if music.has_ended() {
                        event = Some(OverlayEvent::Close);
                    }
                }
                None => self.elapsed_ms += self.config.clock_step_ms * u64::from(steps),
            }
            self.lyric_index = self.lyrics.active_index(self.elapsed_ms);
        }

        if !self.lanterns_spawned && self.elapsed_ms >= self.config.lantern_threshold_ms {
            self.lanterns.spawn(self.config.lantern_count, rng);
            self.lanterns_spawned = true;
        }
        self.lanterns.tick(dt);

        event
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.lanterns.resize(width, height);
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn image_count(&self) -> usize {
        self.config.image_count
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn lyric_index(&self) -> usize {
        self.lyric_index
    }

    pub fn lyrics(&self) -> &LyricTable {
        &self.lyrics
    }

    /// The page of lines around the active one, with the active line's offset
    /// into that page.
    pub fn lyric_group(&self) -> (&[Lyric], usize) {
        let size = self.config.lyric_group_size;
        (
            self.lyrics.group(self.lyric_index, size),
            self.lyric_index % size.max(1),
        )
    }

    pub fn lanterns(&self) -> &Lanterns {
        &self.lanterns
    }

    pub fn progress(&self) -> f32 {
        let total = self
            .duration_ms
            .unwrap_or_else(|| self.lyrics.last_start_ms() + self.config.fallback_tail_ms);
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f32 / total as f32).clamp(0.0, 1.0)
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.elapsed_ms)
    }

    pub fn duration_label(&self) -> String {
        self.duration_ms
            .map(format_time)
            .unwrap_or_else(|| "--:--".to_string())
    }
}

/// `m:ss`
pub fn format_time(ms: u64) -> String {
    let duration = chrono::Duration::milliseconds(ms as i64);
    format!("{}:{:02}", duration.num_minutes(), duration.num_seconds() % 60)
}
