use nannou::event::TouchPhase;
use nannou::prelude::*;

use crate::model::Model;
use crate::pos::Pos;

pub fn event(app: &App, model: &mut Model, event: WindowEvent) {
    let greeting = &mut model.greeting;
    match event {
        WindowEvent::MousePressed(MouseButton::Left) => {
            greeting.pointer_pressed(Pos::new(app.mouse.x, app.mouse.y));
        }
        WindowEvent::MouseMoved(pos) => greeting.pointer_moved(Pos::new(pos.x, pos.y)),
        WindowEvent::MouseReleased(MouseButton::Left) => greeting.pointer_released(),
        WindowEvent::Touch(touch) => {
            let pos = Pos::new(touch.position.x, touch.position.y);
            match touch.phase {
                TouchPhase::Started => greeting.pointer_pressed(pos),
                TouchPhase::Moved => greeting.pointer_moved(pos),
                TouchPhase::Ended | TouchPhase::Cancelled => greeting.pointer_released(),
            }
        }
        WindowEvent::Resized(size) => greeting.resize(size.x, size.y),
        _ => (),
    }
}

pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    // Let egui handle things like keyboard and mouse input.
    if let Some(egui) = model.egui.as_mut() {
        egui.handle_raw_event(event);
    }
}
