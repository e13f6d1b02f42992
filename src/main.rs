use anyhow::Context;
use axum_reservations::{
    configuration::get_configuration, startup::Application,
    telemetry::setup_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing("axum_reservations", "info", std::io::stdout);
    let configuration =
        get_configuration().context("Could not read configuration file")?;

    let app = Application::build(configuration).await?;
    app.run_until_stopped().await?;
    Ok(())
}
