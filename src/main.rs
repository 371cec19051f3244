use clap::Parser;
use std::path::PathBuf;

use lan_share::config::{self, Config};
use lan_share::logger::{self, EventSink};
use lan_share::server::{self, Server, ServerSettings};

/// Share a directory with other devices on the local network
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file, without extension
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Directory to share
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Extension streamed as media (repeatable, replaces the configured list)
    #[arg(long = "media-ext", value_name = "EXT")]
    media_ext: Vec<String>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, cfg: &mut Config) {
        if let Some(root) = self.root {
            cfg.server.root = root;
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(host) = self.host {
            cfg.server.host = host;
        }
        if !self.media_ext.is_empty() {
            cfg.media.extensions = self.media_ext;
        }
        if let Some(level) = self.log_level {
            cfg.logging.level = level;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);

    logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "using configured worker threads");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = ServerSettings::from_config(&cfg)?;

    // The terminal is the control surface: event lines go to stdout
    let (events, mut event_rx) = EventSink::channel(cfg.logging.event_buffer);
    let printer = tokio::spawn(async move {
        while let Some(line) = event_rx.recv().await {
            println!("{line}");
        }
    });

    let mut server = Server::new(settings).with_events(events.clone());
    let addr = match server.start(&cfg.server.root, cfg.server.port).await {
        Ok(addr) => addr,
        Err(e) => {
            logger::log_error(&e.to_string());
            return Err(e.into());
        }
    };
    logger::log_access_url(&events, server::access_url(&addr).as_deref());

    server::wait_for_shutdown_signal().await;
    server.stop().await?;

    // Close the channel so the printer drains and exits
    drop(server);
    drop(events);
    if let Err(e) = printer.await {
        logger::log_error(&format!("Event printer failed: {e}"));
    }

    Ok(())
}
