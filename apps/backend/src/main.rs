#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flashcard_api::run().await
}
