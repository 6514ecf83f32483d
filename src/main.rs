use moving_dots::dots::{monitor, overlay, platform, DotsOverlay, ParticleField};
use moving_dots::hotkey::{install_exit_hotkey, RdevListener};
use moving_dots::logging;
use moving_dots::settings::OverlaySettings;
use std::sync::mpsc::channel;

fn main() -> anyhow::Result<()> {
    let settings = match OverlaySettings::load_default() {
        Ok(settings) => settings,
        Err(err) => {
            logging::init(false, None);
            tracing::error!("failed to load settings: {err:#}");
            return Err(err);
        }
    };
    logging::init(settings.debug_logging, settings.log_file.as_deref());

    let bounds = monitor::resolve_desktop_bounds()?;
    let viewport = bounds.viewport();
    let ranges = settings.spawn_ranges();
    let field = match settings.seed {
        Some(seed) => ParticleField::from_seed(settings.dot_count, viewport, ranges, seed),
        None => ParticleField::from_entropy(settings.dot_count, viewport, ranges),
    };

    let (commands_tx, commands_rx) = channel();
    let hotkey = settings.exit_hotkey();
    let _exit_hotkey = install_exit_hotkey(RdevListener, hotkey, commands_tx);

    tracing::info!("Overlay started; press {hotkey} to exit (if the hotkey was registered).");
    tracing::info!("The moving dots simulate motion on screen to help prevent motion sickness.");

    let app = DotsOverlay::new(field, settings.tick_interval(), commands_rx, platform::native());
    eframe::run_native(
        overlay::WINDOW_TITLE,
        overlay::native_options(&bounds),
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("overlay window failed: {e}"))?;
    Ok(())
}
