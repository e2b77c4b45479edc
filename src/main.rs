//! Cam-scan binary: run one scan session against a camera and print the
//! first decoded symbol.

use cam_scan::{
    acquire, CameraRequest, RxingDecoder, ScanConfig, ScanError, ScanLoop, V4l2Backend,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => {}
        Err(ScanError::DeviceUnavailable(message)) => {
            eprintln!("Cannot open the camera");
            eprintln!("{message}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run() -> cam_scan::Result<()> {
    let mut backend = V4l2Backend::open(0)?;
    tracing::info!(card = backend.card(), "opened camera");

    let session = acquire(&mut backend, &CameraRequest::default()).await?;
    let decoder = RxingDecoder::new(ScanConfig::default());

    let cancel = CancellationToken::new();
    let close = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            close.cancel();
        }
    });

    println!("Scanning... (Ctrl+C to stop)");
    let outcome = ScanLoop::new(session, decoder, cancel)
        .run(|result| async move {
            println!("{}: {}", result.kind, result.value);
        })
        .await;

    tracing::info!(?outcome, "scan session finished");
    Ok(())
}
