use incident_intake::adapters::config::{AppConfig, LogFormat};
use incident_intake::adapters::http::router;
use incident_intake::prettyprint::PrettyFormatter;
use incident_intake::service_factory::ServiceFactory;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

fn init_tracing(level: &str, format: LogFormat) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let targets = Targets::new().with_target("incident_intake", level);

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .event_format(PrettyFormatter::new(true))
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    Registry::default().with(targets).with(fmt_layer).init();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            init_tracing("info", LogFormat::Pretty);
            tracing::error!("[CONFIG ERROR] {:?}", report);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level, config.log_format());
    tracing::debug!(?config, "configuration loaded");

    let state = match ServiceFactory::create(&config) {
        Ok(state) => state,
        Err(report) => {
            tracing::error!("failed to build services: {:?}", report);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(config.bind_address.trim()).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("cannot bind {}: {}", config.bind_address, err);
            std::process::exit(1);
        }
    };
    tracing::info!("listening on http://{}", config.bind_address.trim());

    if let Err(err) = axum::serve(listener, router(state)).await {
        tracing::error!("server stopped: {}", err);
        std::process::exit(1);
    }
}
