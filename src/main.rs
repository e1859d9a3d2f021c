#[tokio::main]
async fn main() {
    pad_checker::start_server().await;
}
