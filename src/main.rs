mod cli;
mod core;
mod interfaces;
mod logging;

use crate::core::terminal;

#[tokio::main]
async fn main() {
    match cli::run_main().await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let err_msg = e.to_string();
            if err_msg.contains("canceled") || err_msg.contains("interrupted") {
                terminal::print_goodbye();
            } else {
                terminal::print_error(&format!("{}", e));
                std::process::exit(1);
            }
        }
    }
}
