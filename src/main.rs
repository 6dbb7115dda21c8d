use std::path::Path;
use std::process;

use log::{error, info};
use tmibot::backend::config::{load_settings, SessionConfig};
use tmibot::backend::twitch::{Session, SERVER};
use tokio::net::TcpStream;

fn app_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

fn print_usage(app_name: &str) {
    println!("Hi, I am tmibot, a small Twitch chat robot!");
    println!();
    println!("Usage: {} <your_username> <OAuth_token> <channel>", app_name);
    println!("e.g.: {} robin oauth:012345678901234567890123456789 xbox", app_name);
    println!();
    println!("Get an OAuth token for your bot account from Twitch before running.");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 3 {
        print_usage(&app_name());
        return;
    }

    println!("tmibot {}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings();
    let config = SessionConfig::new(&args[0], &args[1], &args[2]);
    let mut session: Session<TcpStream> = Session::new(config, &settings);

    if let Err(e) = session.connect().await {
        error!("Could not reach {}: {}", SERVER, e);
        process::exit(1);
    }

    info!("Joining {}", session.config().channel);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = session.run_until(shutdown).await {
        error!("Session error: {}", e);
        process::exit(1);
    }
}
