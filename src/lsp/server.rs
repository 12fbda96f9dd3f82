use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::lsp::backend::Backend;
use crate::settings::SettingsResolver;
use crate::Config;

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // Logs go to stderr; stdout carries the protocol
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .try_init();

    let resolver = SettingsResolver::from_config(&config);
    match resolver.base_rules().source_path() {
        Some(path) => log::info!("Using base rules from {}", path.display()),
        None => log::info!(
            "Using {} built-in base rule(s)",
            resolver.base_rules().rules().len()
        ),
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config, resolver)).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
