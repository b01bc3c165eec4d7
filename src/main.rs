use nitondb::{cli, config, system};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    config::init_config();

    // guard 必须存活到程序结束，否则日志丢失
    let _guard = system::init_logging(config::get_config());

    cli::run_cli().await;
}
