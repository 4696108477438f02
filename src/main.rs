use cx_log_shipper::{app, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::process_start();
    app::main().await
}
