use anyhow::Context;
use payroll_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load payroll settings")?;
    payroll_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        "payroll-app bootstrap starting"
    );

    let app = payroll_app::app::Application::bootstrap(settings).await?;
    app.serve().await
}
