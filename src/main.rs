//! wplace touch-up clicker
//!
//! Interactive console tool: calibrate the canvas, run a detection test,
//! edit parameters, and start the clicker.

use anyhow::{Context, Result};
use std::io::{self, Write};

use wplace_touchup::automation::{
    StopReason, StopSignal, SystemClock, countdown, load_config, run_clicker,
    run_detection_test,
};
use wplace_touchup::calibration::calibrate_canvas;
use wplace_touchup::capture::ScreenCapture;
use wplace_touchup::input::NativeInput;
use wplace_touchup::menu::{MenuChoice, edit_parameters, print_menu, prompt};
use wplace_touchup::{logging, paths};

/// Exit code for a process ended by Ctrl+C outside a session.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> Result<()> {
    logging::install_panic_hook();

    // Ensure output directories exist
    paths::ensure_directories().context("Failed to create output directories")?;
    logging::init_logger();

    let mut config = load_config();
    log::info!(
        "Pixel size: {:.4} px, {} clicks/sec, stop key {}",
        config.cell_size,
        config.clicks_per_second,
        config.stop_key.to_uppercase()
    );

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        if handler_stop.is_armed() {
            log::warn!("Interrupt received, stopping after the current click");
            handler_stop.request();
        } else {
            log::info!("Interrupted. Goodbye!");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut capture = ScreenCapture::new();
    let mut input = NativeInput::new()?;
    let clock = SystemClock;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    loop {
        print_menu(&mut stdout)?;
        let Some(line) = prompt(&mut reader, &mut stdout, "\nYour choice: ")? else {
            break;
        };
        let Some(choice) = MenuChoice::parse(&line) else {
            log::warn!("Invalid choice: '{}'", line);
            continue;
        };

        if choice.needs_canvas() && config.needs_calibration() {
            log::warn!("Please configure the canvas area first (option 1)");
            continue;
        }

        match choice {
            MenuChoice::Calibrate => {
                if let Err(e) = calibrate_canvas(&mut config, &mut input, &clock) {
                    log::error!("Calibration failed: {:#}", e);
                }
            }
            MenuChoice::TestDetection => {
                countdown(config.start_delay_secs, "Capturing", &clock);
                if let Err(e) =
                    run_detection_test(&config, &mut capture, &paths::get_diagnostics_dir())
                {
                    log::error!("Detection test failed: {:#}", e);
                }
            }
            MenuChoice::Start => {
                log::info!("Clicker at {} CPS", config.clicks_per_second);
                countdown(config.start_delay_secs, "Starting", &clock);
                let report = run_clicker(&mut config, &mut capture, &mut input, &clock, &stop);
                if report.reason == StopReason::Interrupted {
                    break;
                }
            }
            MenuChoice::EditParameters => {
                edit_parameters(&mut config, &mut reader, &mut stdout)?;
            }
            MenuChoice::Quit => break,
        }
    }

    stdout.flush()?;
    log::info!("Goodbye!");
    Ok(())
}
