use eyre::Report;

#[tokio::main]
async fn main() -> Result<(), Report> {
    walletgate::run().await
}
