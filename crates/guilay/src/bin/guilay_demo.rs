//! Headless demo: builds the sample scene and runs a few frames.
//!
//! Usage: `guilay_demo [config.toml]`

use std::process::ExitCode;

use guilay::backend::{HeadlessPlatform, RecordingRenderer};
use guilay::{Guilay, GuilayConfig, GuilayResult, PlatformEvent};
use guilay_core::{Color, Extent, Point, Rect};
use guilay_ui::{Button, Element, ParentRef, Text};
use tracing::{error, info};

const FRAMES: usize = 5;

fn run() -> GuilayResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => GuilayConfig::from_file(path)?,
        None => GuilayConfig::default(),
    };

    let platform = HeadlessPlatform::new();
    let input = platform.handle();
    let renderer = RecordingRenderer::new();
    let output = renderer.handle();

    let mut gui = Guilay::init(platform, renderer, config)?;
    let mut window = gui.create_window(Extent::new(800, 600), "Guilay Demo")?;

    window.add_element(ParentRef::Root, Element::text("Hello", 2.0, Color::WHITE))?;
    let panel = window.add_element(
        ParentRef::Root,
        Element::section(Rect::new(100.0, 100.0, 300.0, 200.0), Color::rgb(40, 40, 48)),
    )?;
    window.add_element(
        ParentRef::Section(panel),
        Button::new(
            Rect::new(150.0, 150.0, 120.0, 40.0),
            Color::rgb(200, 60, 60),
            Text::new("Press", 1.0, Color::WHITE),
        )
        .on_activate(|| info!("button pressed")),
    )?;

    // Scripted input: click the button, then resize, then close
    let surface = window.surface();
    input.push_event(surface, PlatformEvent::PointerPressed(Point::new(200.0, 170.0)));

    for frame in 0..FRAMES {
        if frame == 2 {
            input.push_event(surface, PlatformEvent::Resized(Extent::new(1024, 768)));
        }
        if frame == FRAMES - 1 {
            input.push_event(surface, PlatformEvent::CloseRequested);
        }

        let stats = gui.update_window(&mut window)?;
        println!(
            "frame {:>2}: {} elements, {} batches, {} triangles, {} events, {} activated",
            stats.frame, stats.elements, stats.batches, stats.triangles, stats.events, stats.activated
        );

        if gui.should_close(&window) {
            break;
        }
    }

    println!(
        "{} frames recorded, {} presented, final size {:?}",
        output.frame_count(),
        input.frames_presented(surface),
        window.size()
    );

    gui.close_window(window)?;
    gui.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, fatal = err.is_fatal(), "demo failed");
            ExitCode::FAILURE
        }
    }
}
