use anyhow::Context;
use tokio::io::BufReader;

use onboard_form::config::ClientConfig;
use onboard_form::wizard::{CatalogClient, Outcome, TerminalWizard, WizardState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let client = CatalogClient::from_config(&config);
    eprintln!("   Catalog: {}", client.catalog_url());

    let mut state = WizardState::load(&client).await;

    let mut wizard = TerminalWizard::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let outcome = wizard
        .run(&mut state)
        .await
        .context("terminal wizard I/O failed")?;

    match outcome {
        Outcome::Finished(redirect) => {
            let nav_state = serde_json::to_string(&redirect.state)?;
            println!("{} {}", redirect.target, nav_state);
        }
        Outcome::Quit => eprintln!("Onboarding abandoned."),
        Outcome::NoData => {}
    }
    Ok(())
}
