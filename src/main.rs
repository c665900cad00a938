#[tokio::main]
async fn main() -> anyhow::Result<()> {
    readtrack_lib::run().await
}
