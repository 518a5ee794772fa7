#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env in the working directory, real environment wins
    dotenvy::dotenv().ok();

    goapi_gateway_lib::run().await?;
    Ok(())
}
