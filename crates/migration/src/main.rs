#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = migration::db::load_config_from_env();
    std::env::set_var("DATABASE_URL", config.build_connection_string());
    sea_orm_migration::cli::run_cli(migration::Migrator).await;
}
