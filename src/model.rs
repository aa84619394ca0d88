use nannou::image::DynamicImage;
use nannou::prelude::*;
use nannou_egui::Egui;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::assets::Assets;
use crate::audio::{AudioSource, Player};
use crate::config::Config;
use crate::console::console_warn;
use crate::greeting::Greeting;
use crate::lyrics::LyricTable;

pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 768;

pub struct Model {
    pub window: Option<WindowId>,
    pub egui: Option<Egui>,
    pub greeting: Greeting,
    /// Decoded images waiting for a GPU device.
    pending_images: Vec<Option<DynamicImage>>,
    textures: Vec<Option<wgpu::Texture>>,
}

impl Model {
    pub fn new(config: Config, assets: Assets) -> Self {
        let lyrics = LyricTable::embedded().unwrap_or_else(|err| {
            console_warn!("{}; showing no lyrics", err);
            LyricTable::blank()
        });

        let volume = config.audio.volume;
        let unlock_sound = assets.unlock_sound.map(|track| {
            Box::new(Player::new("unlock sound", track, volume, false)) as Box<dyn AudioSource>
        });
        let music = assets.music.map(|track| {
            Box::new(Player::new("music", track, volume, config.audio.loop_music))
                as Box<dyn AudioSource>
        });
        let rng = SmallRng::seed_from_u64(chrono::Utc::now().timestamp_millis() as u64);

        Model {
            window: None,
            egui: None,
            greeting: Greeting::new(
                config,
                lyrics,
                unlock_sound,
                music,
                WINDOW_WIDTH as f32,
                WINDOW_HEIGHT as f32,
                rng,
            ),
            pending_images: assets.images,
            textures: Vec::new(),
        }
    }

    /// Uploads decoded images once the app has a device.
    pub fn upload_textures(&mut self, app: &App) {
        if self.pending_images.is_empty() {
            return;
        }
        self.textures = self
            .pending_images
            .drain(..)
            .map(|image| image.map(|image| wgpu::Texture::from_image(app, &image)))
            .collect();
    }

    pub fn texture(&self, index: usize) -> Option<&wgpu::Texture> {
        self.textures.get(index).and_then(Option::as_ref)
    }
}
