use std::{thread, time::Duration, time::Instant};

use papercalc_core::{
    display::{HEIGHT, WIDTH},
    runtime::{Supervisor, TickOutcome},
};

use crate::display::MinifbDisplay;

mod config;
mod display;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("PaperCalc desktop simulator started");
    log::info!("Mouse = touch, P = power button, Esc = quit");

    let config = config::load();

    let window = minifb::Window::new(
        "PaperCalc Desktop",
        WIDTH,
        HEIGHT,
        minifb::WindowOptions::default(),
    )
    .unwrap_or_else(|e| {
        panic!("Unable to open window: {}", e);
    });

    let started = Instant::now();
    let now_ms = || started.elapsed().as_millis() as u64;

    let mut display = Box::new(MinifbDisplay::new(window));
    let mut supervisor = Supervisor::new(config, &mut *display, now_ms());
    match supervisor.boot(&mut *display) {
        Ok(splash_ms) => thread::sleep(Duration::from_millis(splash_ms.into())),
        Err(err) => {
            log::error!("Startup failed: {}", err);
            thread::sleep(Duration::from_millis(config.restart_delay_ms.into()));
        }
    }

    while display.is_open() {
        let outcome = supervisor.tick(&mut *display, now_ms());
        if let TickOutcome::Restart { .. } = outcome {
            log::warn!("Too many consecutive errors; restarting");
        }
        thread::sleep(Duration::from_millis(outcome.delay_ms().into()));
    }
}
