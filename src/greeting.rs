use rand::rngs::SmallRng;
use std::time::Duration;

use crate::audio::AudioSource;
use crate::confetti::Confetti;
use crate::config::Config;
use crate::console::console_log;
use crate::lock::{Lock, LockEvent};
use crate::lyrics::LyricTable;
use crate::pos::Pos;
use crate::slideshow::{OverlayEvent, Slideshow};

/// The whole greeting: key and lock first, then the slideshow once unlocked.
pub struct Greeting {
    config: Config,
    lock: Lock,
    slideshow: Slideshow,
    confetti: Confetti,
    unlock_sound: Option<Box<dyn AudioSource>>,
    music: Option<Box<dyn AudioSource>>,
    rng: SmallRng,
    height: f32,
}

impl Greeting {
    pub fn new(
        config: Config,
        lyrics: LyricTable,
        mut unlock_sound: Option<Box<dyn AudioSource>>,
        mut music: Option<Box<dyn AudioSource>>,
        width: f32,
        height: f32,
        rng: SmallRng,
    ) -> Self {
        // Silent until the first gesture, like autoplay-restricted media.
        for source in [&mut unlock_sound, &mut music].into_iter().flatten() {
            source.set_muted(true);
        }
        Self {
            lock: Lock::new(config.lock.clone()),
            slideshow: Slideshow::new(config.slideshow.clone(), lyrics, width, height),
            confetti: Confetti::default(),
            unlock_sound,
            music,
            rng,
            height,
            config,
        }
    }

    pub fn lock(&self) -> &Lock {
        &self.lock
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn confetti(&self) -> &Confetti {
        &self.confetti
    }

    pub fn music(&self) -> Option<&dyn AudioSource> {
        self.music.as_deref()
    }

    /// The reset button is hidden while the slideshow covers the screen.
    pub fn shows_reset(&self) -> bool {
        self.lock.has_interacted() && !self.slideshow.is_playing()
    }

    pub fn pointer_pressed(&mut self, pointer: Pos) {
        // The first tap only dismisses the intro card.
        if self.lock.interact() {
            self.on_first_gesture();
            return;
        }
        if self.slideshow.is_playing() {
            return;
        }
        self.lock.begin_drag(pointer);
    }

    pub fn pointer_moved(&mut self, pointer: Pos) {
        if let Some(event) = self.lock.drag_to(pointer) {
            self.apply_lock_event(event);
        }
    }

    pub fn pointer_released(&mut self) {
        self.lock.end_drag();
    }

    pub fn update(&mut self, dt: Duration) {
        let revealed = match self.lock.tick(dt) {
            Some(event) => {
                self.apply_lock_event(event);
                event == LockEvent::Reveal
            }
            None => false,
        };
        self.confetti.tick(dt);
        // The overlay's timers start from zero on the frame it appears.
        if revealed {
            return;
        }

        let music = self.music.as_deref();
        if let Some(event) = self.slideshow.tick(dt, music, &mut self.rng) {
            self.apply_overlay_event(event);
        }
    }

    /// The overlay's close button.
    pub fn close_slideshow(&mut self) {
        let event = self.slideshow.close();
        self.apply_overlay_event(event);
    }

    pub fn reset(&mut self) {
        self.lock.reset();
        self.slideshow.deactivate();
        self.confetti.clear();
        if let Some(music) = self.music.as_mut() {
            music.pause();
            music.rewind();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.height = height;
        self.slideshow.resize(width, height);
    }

    fn on_first_gesture(&mut self) {
        let muted = self.config.audio.muted;
        for source in [&mut self.unlock_sound, &mut self.music].into_iter().flatten() {
            source.set_muted(muted);
        }
        console_log!("first interaction, audio {}", if muted { "stays muted" } else { "enabled" });
    }

    fn apply_lock_event(&mut self, event: LockEvent) {
        match event {
            LockEvent::Unlocked => {
                console_log!("unlocked");
                if let Some(sound) = self.unlock_sound.as_deref_mut() {
                    play_best_effort(sound, "unlock sound");
                }
                if let Some(music) = self.music.as_deref_mut() {
                    play_best_effort(music, "music");
                }
            }
            LockEvent::Reveal => {
                self.slideshow.activate();
                self.confetti
                    .burst(&self.config.confetti, self.height, &mut self.rng);
            }
        }
    }

    fn apply_overlay_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::Close => {
                console_log!("slideshow closed");
                self.reset();
            }
        }
    }
}

fn play_best_effort(source: &mut dyn AudioSource, name: &str) {
    if !source.is_paused() {
        return;
    }
    if let Err(err) = source.play() {
        console_log!("audio playback failed for {}: {}", name, err);
    }
}
