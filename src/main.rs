use smarttube_lib::Cli;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse_args();
    if let Err(e) = smarttube_lib::run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
