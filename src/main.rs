#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    du_campus_api::run().await
}
