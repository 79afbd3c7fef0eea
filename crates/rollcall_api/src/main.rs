#[tokio::main]
async fn main() {
    rollcall_api::start_server().await;
}
