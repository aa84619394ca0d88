#![cfg_attr(target_family = "wasm", no_main)]
#![allow(dead_code)]
use nannou::prelude::*;
use nannou_egui::Egui;
use std::cell::RefCell;

#[cfg(target_family = "wasm")]
use nannou::{
    app,
    wgpu::{Backends, DeviceDescriptor, Limits},
};
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::*;

pub mod assets;
pub mod audio;
pub mod cli;
pub mod confetti;
pub mod config;
pub mod console;
pub mod greeting;
pub mod input;
pub mod lanterns;
pub mod lock;
pub mod lyrics;
pub mod model;
pub mod pos;
pub mod render;
pub mod slideshow;
pub mod spring;
pub mod timer;

use crate::console::console_log;
use crate::model::{Model, WINDOW_HEIGHT, WINDOW_WIDTH};

const TITLE: &str = "For you";

// nannou takes plain fn pointers, so the model built before the app starts is
// parked here until the app asks for it.
thread_local!(static MODEL: RefCell<Option<Model>> = RefCell::new(None));

fn take_model() -> Model {
    MODEL
        .with(|m| m.borrow_mut().take())
        .expect("model is built before the app starts")
}

#[cfg(target_family = "wasm")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let config = cli::Args::from_location().apply(config::Config::embedded());
    let assets = assets::load(&config.assets, config.slideshow.image_count).await;
    MODEL.with(|m| m.borrow_mut().replace(Model::new(config, assets)));

    app::Builder::new_async(|app| {
        Box::new(async move {
            let window = create_window(app).await;
            let mut model = take_model();
            model.window = window;
            model
        })
    })
    .backends(Backends::PRIMARY | Backends::GL)
    .update(update)
    .run_async()
    .await;

    Ok(())
}

#[cfg(target_family = "wasm")]
async fn create_window(app: &App) -> Option<WindowId> {
    let device_desc = DeviceDescriptor {
        limits: Limits {
            max_texture_dimension_2d: 8192,
            ..Limits::downlevel_webgl2_defaults()
        },
        ..Default::default()
    };

    app.new_window()
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .device_descriptor(device_desc)
        .title(TITLE)
        .view(render::view)
        .event(input::event)
        .raw_event(input::raw_window_event)
        .build_async()
        .await
        .map_err(|err| console_log!("failed to create window: {:?}", err))
        .ok()
}

#[cfg(not(target_family = "wasm"))]
fn main() {
    use clap::Parser;

    let args = cli::Args::parse();
    let config = args.resolve();
    let assets = async_std::task::block_on(assets::load(
        &config.assets,
        config.slideshow.image_count,
    ));
    MODEL.with(|m| m.borrow_mut().replace(Model::new(config, assets)));

    nannou::app(native_model).update(update).run();
}

#[cfg(not(target_family = "wasm"))]
fn native_model(app: &App) -> Model {
    let mut model = take_model();
    model.window = app
        .new_window()
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .title(TITLE)
        .view(render::view)
        .event(input::event)
        .raw_event(input::raw_window_event)
        .build()
        .map_err(|err| console_log!("failed to create window: {:?}", err))
        .ok();
    model
}

fn update(app: &App, model: &mut Model, update: Update) {
    if model.egui.is_none() {
        if let Some(window) = model.window.and_then(|id| app.window(id)) {
            model.egui = Some(Egui::from_window(&window));
        }
    }
    model.upload_textures(app);
    model.greeting.update(update.since_last);
    render::ui(model, &update);
}
