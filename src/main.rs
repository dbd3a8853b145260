use log::error;

use mnist_idx::cli::{self, Parsed};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli::parse(std::env::args_os()) {
        Parsed::Usage(usage) => println!("{}", usage.message()),
        Parsed::Info(e) => {
            // help and version only fail when stdout is gone
            let _ = e.print();
        }
        Parsed::Run(cli, action) => {
            if let Err(e) = cli::run(&cli, action) {
                error!("{e}");
                std::process::exit(1);
            }
        }
    }
}
