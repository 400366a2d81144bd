#[tokio::main]
async fn main() {
    if let Err(err) = si_api::run().await {
        tracing::error!(error = %err, "si-api failed");
        std::process::exit(1);
    }
}
