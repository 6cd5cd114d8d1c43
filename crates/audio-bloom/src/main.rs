mod audio;
mod renderer;
mod ui;
mod utils;

use audio::{CaptureFeed, SourcePipe};
use audio_bloom_engine::{Canvas, FadeState, Visualizer};
use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use std::env;
use std::rc::Rc;
use ui::bindings::{parse_key, Action};
use utils::Config;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // List all devices at startup
    SourcePipe::list_devices();

    nannou::app(model).update(update).run();
}

struct Model {
    /// Owned here; the visualizer only holds a weak reference
    feed: Rc<CaptureFeed>,
    visualizer: Visualizer<Canvas>,
    shift_held: bool,
}

fn model(app: &App) -> Model {
    let args: Vec<String> = env::args().collect();
    let fullscreen = args.contains(&"--fullscreen".to_string()) || args.contains(&"-f".to_string());
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("audio-bloom")
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_event)
        .resized(resized)
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .min_size(400, 300);

    if fullscreen {
        win = win.fullscreen();
    }
    win.build().unwrap();

    let config = Config::load();
    let engine_config = config.engine();
    let transform_size = config.transform_size();

    let pipe = SourcePipe::new(&config, transform_size);
    let feed = Rc::new(CaptureFeed::new(pipe, transform_size, config.smoothing()));

    let bounds = app.window_rect();
    let mut visualizer = Visualizer::new(Canvas::new(bounds.w(), bounds.h()), &engine_config);
    visualizer.attach_feed(&feed);

    if args.contains(&"--autostart".to_string()) {
        if let Err(e) = visualizer.start() {
            log::error!("Could not start visualizer: {}", e);
        }
    }

    Model {
        feed,
        visualizer,
        shift_held: false,
    }
}

fn update(_app: &App, model: &mut Model, _update: Update) {
    model.visualizer.on_refresh();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);
    renderer::draw_canvas(&draw, app.window_rect(), model.visualizer.surface());
    draw.to_frame(app, &frame).unwrap();
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.visualizer.surface_mut().resize(size.x, size.y);
}

fn raw_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    if let WindowEvent::ModifiersChanged(mods) = event {
        model.shift_held = mods.shift();
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    match parse_key(key, model.shift_held) {
        Some(Action::Quit) => app.quit(),
        Some(Action::TogglePlayback) => {
            let live = model.visualizer.is_running()
                && model.visualizer.fade_state() == FadeState::Idle;
            if live {
                model.visualizer.stop();
            } else if let Err(e) = model.visualizer.start() {
                log::error!("Could not start visualizer: {}", e);
            }
        }
        Some(Action::SelectDevice(idx)) => match model.feed.select_device(idx) {
            Some((name, true)) => log::info!("[{}] {}", idx, name),
            Some((name, false)) => log::warn!("[{}] {} - FAILED", idx, name),
            None => log::warn!("[{}] INVALID", idx),
        },
        None => {} // Unhandled key
    }
}
