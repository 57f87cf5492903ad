use narikiri::{
    app::App,
    logging,
    oracle::OpenAIOracle,
    settings::{self, Settings},
};

use color_eyre::{Section, eyre::Result};
use crossterm::{event::DisableBracketedPaste, execute};
use std::panic;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // No credential, no terminal: fail before entering the alternate screen.
    let api_key = Settings::api_key_from_env()
        .suggestion("Export OPENAI_API_KEY and start narikiri again")?;

    let settings_result = Settings::load();
    let settings = settings_result.as_ref().cloned().unwrap_or_default();

    match settings::data_dir() {
        Ok(data_dir) => {
            if let Err(e) = logging::init(&data_dir, settings.debug_mode) {
                eprintln!("Logging disabled: {e}");
            }
        }
        Err(e) => eprintln!("Logging disabled: {e}"),
    }
    if let Err(e) = &settings_result {
        log::warn!("Using default settings: {e}");
    }

    // Restore the terminal before the panic message is printed.
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        log::error!("Panic: {panic_info}");
        default_hook(panic_info);
    }));

    let oracle = OpenAIOracle::new(api_key, &settings);
    log::info!("Using model {}", oracle.model());

    let mut app = App::new(settings, oracle);
    app.run().await?;

    Ok(())
}
