use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    glucoplan::run().await
}
