#[tokio::main]
async fn main() {
    cg_cli::cli::run().await;
}
