use nannou::prelude::*;
use nannou_egui::egui;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::console::console_log;
use crate::greeting::Greeting;
use crate::lock::Lock;
use crate::model::Model;

const ICON_PINK: (f32, f32, f32) = (0.925, 0.282, 0.6);

fn icon_color(unlocked: bool) -> Rgba {
    if unlocked {
        rgba(ICON_PINK.0, ICON_PINK.1, ICON_PINK.2, 1.0)
    } else {
        rgba(1.0, 1.0, 1.0, 0.7)
    }
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(rgb8(0x0a, 0x0a, 0x0a));

    let greeting = &model.greeting;
    if greeting.slideshow().is_playing() {
        draw_slideshow(&draw, app, model);
    } else if greeting.lock().has_interacted() {
        draw_lock(&draw, greeting.lock());
        draw_key(&draw, greeting.lock());
    }
    draw_confetti(&draw, greeting);

    if let Err(err) = draw.to_frame(app, &frame) {
        console_log!("failed to draw frame: {:?}", err);
    }
    if let Some(egui) = model.egui.as_ref() {
        if let Err(err) = egui.draw_to_frame(&frame) {
            console_log!("failed to draw ui: {:?}", err);
        }
    }
}

fn draw_lock(draw: &Draw, lock: &Lock) {
    draw.ellipse()
        .x_y(0.0, 0.0)
        .w_h(128.0, 128.0)
        .color(rgba(1.0, 1.0, 1.0, 0.05));

    let color = icon_color(lock.is_unlocked());
    let draw = draw.rotate(-lock.rotation().to_radians());

    // Shackle, lifted a little once open.
    let lift = if lock.is_unlocked() { 8.0 } else { 0.0 };
    let shackle = (0..=24).map(|i| {
        let a = PI * i as f32 / 24.0;
        pt2(a.cos() * 14.0, 6.0 + lift + a.sin() * 16.0)
    });
    draw.polyline().weight(5.0).points(shackle).color(color);
    draw.line()
        .start(pt2(-14.0, 6.0 + lift))
        .end(pt2(-14.0, 0.0))
        .weight(5.0)
        .color(color);
    draw.line()
        .start(pt2(14.0, 6.0 + lift))
        .end(pt2(14.0, 0.0))
        .weight(5.0)
        .color(color);

    draw.rect().x_y(0.0, -14.0).w_h(44.0, 32.0).color(color);
    draw.ellipse()
        .x_y(0.0, -12.0)
        .w_h(6.0, 6.0)
        .color(rgb8(0x0a, 0x0a, 0x0a));
}

fn draw_key(draw: &Draw, lock: &Lock) {
    let key = lock.key();
    let color = icon_color(lock.is_unlocked());
    let draw = draw.x_y(key.x, key.y).rotate(-FRAC_PI_2);

    draw.ellipse()
        .x_y(-14.0, 0.0)
        .radius(9.0)
        .no_fill()
        .stroke(color)
        .stroke_weight(4.0);
    draw.line()
        .start(pt2(-5.0, 0.0))
        .end(pt2(20.0, 0.0))
        .weight(4.0)
        .color(color);
    for x in [12.0, 19.0] {
        draw.line()
            .start(pt2(x, 0.0))
            .end(pt2(x, -7.0))
            .weight(4.0)
            .color(color);
    }
}

fn draw_slideshow(draw: &Draw, app: &App, model: &Model) {
    let win = app.window_rect();
    let show = model.greeting.slideshow();
    let wide = win.w() >= 1280.0;

    // Photo and progress on the left (or top), lyrics on the right (or bottom).
    let (photo_area, lyrics_area) = if wide {
        (
            Rect::from_x_y_w_h(win.left() + win.w() / 4.0, win.y(), win.w() / 2.0, win.h()),
            Rect::from_x_y_w_h(win.right() - win.w() / 4.0, win.y(), win.w() / 2.0, win.h()),
        )
    } else {
        (
            Rect::from_x_y_w_h(win.x(), win.top() - win.h() * 0.3, win.w(), win.h() * 0.6),
            Rect::from_x_y_w_h(win.x(), win.bottom() + win.h() * 0.2, win.w(), win.h() * 0.4),
        )
    };

    let side = (photo_area.w().min(photo_area.h()) - 96.0).max(64.0);
    let photo = Rect::from_x_y_w_h(photo_area.x(), photo_area.y() + 24.0, side, side);
    draw.rect()
        .xy(photo.xy())
        .wh(photo.wh() + vec2(24.0, 24.0))
        .color(rgba(0.98, 0.75, 0.45, 0.1));
    match model.texture(show.image_index()) {
        Some(texture) => {
            draw.texture(texture).xy(photo.xy()).wh(photo.wh());
        }
        None => {
            draw.rect()
                .xy(photo.xy())
                .wh(photo.wh())
                .color(rgba(1.0, 1.0, 1.0, 0.05));
            draw.text(&format!("{}", show.image_index() + 1))
                .xy(photo.xy())
                .font_size(48)
                .color(rgba(1.0, 1.0, 1.0, 0.3));
        }
    }

    let bar_w = side.min(480.0);
    let bar_y = photo.bottom() - 24.0;
    draw.rect()
        .x_y(photo.x(), bar_y)
        .w_h(bar_w, 4.0)
        .color(rgba(1.0, 1.0, 1.0, 0.05));
    let filled = bar_w * show.progress();
    draw.rect()
        .x_y(photo.x() - bar_w / 2.0 + filled / 2.0, bar_y)
        .w_h(filled, 4.0)
        .color(rgba(1.0, 1.0, 1.0, 0.5));
    draw.text(&show.elapsed_label())
        .x_y(photo.x() - bar_w / 2.0 + 20.0, bar_y - 18.0)
        .font_size(14)
        .color(rgba(1.0, 1.0, 1.0, 0.6));
    draw.text(&show.duration_label())
        .x_y(photo.x() + bar_w / 2.0 - 20.0, bar_y - 18.0)
        .font_size(14)
        .color(rgba(1.0, 1.0, 1.0, 0.6));

    let (lines, active) = show.lyric_group();
    let line_h = 56.0;
    let top = lyrics_area.y() + line_h * (lines.len() as f32 - 1.0) / 2.0;
    for (i, line) in lines.iter().enumerate() {
        let (size, color, shift) = if i == active {
            (28, rgba(1.0, 1.0, 1.0, 1.0), 16.0)
        } else {
            (22, rgba(1.0, 1.0, 1.0, 0.3), 0.0)
        };
        draw.text(&line.text)
            .x_y(lyrics_area.x() + shift, top - i as f32 * line_h)
            .w(lyrics_area.w() * 0.8)
            .font_size(size)
            .color(color);
    }

    let t = app.time;
    for lantern in show.lanterns().iter() {
        let alpha = lantern.opacity();
        if alpha <= 0.0 {
            continue;
        }
        let pulse = 1.0 + 0.1 * (t * PI + lantern.glow_phase).sin();
        draw.ellipse()
            .xy(vec2(lantern.pos.x, lantern.pos.y))
            .radius(24.0 * pulse)
            .color(rgba(1.0, 0.88, 0.4, 0.15 * alpha));
        draw.ellipse()
            .xy(vec2(lantern.pos.x, lantern.pos.y))
            .w_h(16.0, 20.0)
            .color(rgba(0.98, 0.57, 0.24, 0.8 * alpha));
    }
}

fn draw_confetti(draw: &Draw, greeting: &Greeting) {
    for p in greeting.confetti().particles() {
        let [r, g, b] = p.color;
        draw.rect()
            .x_y(p.pos.x, p.pos.y)
            .w_h(8.0, 5.0)
            .rotate(p.wobble)
            .color(rgba8(r, g, b, (p.opacity() * 255.0) as u8));
    }
}

/// Intro card, reset button and close button.
pub fn ui(model: &mut Model, update: &Update) {
    let Model { egui, greeting, .. } = model;
    let egui = match egui.as_mut() {
        Some(egui) => egui,
        None => return,
    };
    egui.set_elapsed_time(update.since_start);
    let ctx = egui.begin_frame();

    if !greeting.lock().has_interacted() {
        egui::Window::new("Tap the Key to Begin")
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(&ctx, |ui| {
                ui.label("Tap the key first to enable audio, then drag it to the lock.");
            });
    } else if greeting.slideshow().is_playing() {
        egui::Window::new("close")
            .title_bar(false)
            .anchor(egui::Align2::RIGHT_TOP, [-24.0, 24.0])
            .resizable(false)
            .show(&ctx, |ui| {
                if ui.button("✕").clicked() {
                    greeting.close_slideshow();
                }
            });
    } else if greeting.shows_reset() {
        egui::Window::new("reset")
            .title_bar(false)
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -32.0])
            .resizable(false)
            .show(&ctx, |ui| {
                if ui.button("Reset Lock").clicked() {
                    greeting.reset();
                }
            });
    }
}
