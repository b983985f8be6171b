//! formfill TUI: edit stored form answers and import CSV files.
//!
//! Two screens, built with `ratatui` + `crossterm`: an editable key/value
//! table and a CSV import form. Logs go to `~/.formfill/formfill-tui.log`
//! so they do not draw over the terminal UI.

mod app;
mod screens;
mod session;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    let config = formfill_shared::load_config()?;
    init_tracing()?;
    let session = session::Session::open(config)?;
    app::run(session)
}

/// Log to a file under the config directory.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = formfill_shared::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("formfill-tui.log"))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formfill=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}
