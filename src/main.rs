#[actix_web::main]
async fn main() -> std::io::Result<()> {
    decision_query_lib::run().await
}
