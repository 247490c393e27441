use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod command;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    // reports go to stdout, so logs stay on stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    command::run()
}
