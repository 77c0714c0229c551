use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use list_sync::{
    load_options, ActionStore, HttpListAction, MemoryRouter, RoutePagination, Router,
};
use shared::domain::{ParamValue, RouteLocation};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the list backend, e.g. http://127.0.0.1:8080/api
    #[arg(long)]
    base_url: String,
    /// Endpoint path under the base URL serving the list action.
    #[arg(long, default_value = "list")]
    path: String,
    #[arg(long, default_value = "pagination.toml")]
    config: PathBuf,
    #[arg(long, default_value = "list")]
    route_name: String,
    /// Initial route query parameter, `key=value`. Repeatable.
    #[arg(long = "query", value_parser = parse_pair)]
    query: Vec<(String, String)>,
    /// Filter to commit after the first page loads, `key=value`. Repeatable.
    #[arg(long = "filter", value_parser = parse_pair)]
    filters: Vec<(String, String)>,
    /// Number of "load more" pages to append.
    #[arg(long, default_value_t = 0)]
    load_more: u32,
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{raw}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let options = load_options(&args.config)
        .with_context(|| format!("failed to load options from {}", args.config.display()))?;
    let action = HttpListAction::new(&args.base_url, &args.path)?;
    info!(endpoint = %action.endpoint(), action = options.action_name.as_str(), "cli: list backend configured");
    let store = ActionStore::new().with_action(options.action_name.clone(), Arc::new(action));

    let initial = args
        .query
        .iter()
        .fold(RouteLocation::new(args.route_name.clone()), |location, (key, value)| {
            location.with_param(key.clone(), value.clone())
        });
    let router = Arc::new(MemoryRouter::new(initial));
    let controller = RoutePagination::new(Arc::new(store), router.clone(), &options);

    controller.fetch_items().await?;

    if !args.filters.is_empty() {
        for (key, value) in &args.filters {
            controller
                .set_filter(key, Some(ParamValue::from(value.as_str())))
                .await?;
        }
        controller.apply_filters().await?;
    }

    for _ in 0..args.load_more {
        if !controller.view().await.can_show_load_more {
            info!("cli: no more pages to load");
            break;
        }
        controller.load_more().await?;
    }

    for item in controller.items().await {
        println!("{}", serde_json::to_string(&item)?);
    }

    let view = controller.view().await;
    let route = router.current();
    info!(
        route = %route.name,
        query = ?route.query,
        page = view.page,
        per_page = view.per_page,
        total_rows = view.total_rows,
        from = view.data_meta.from,
        to = view.data_meta.to,
        can_show_load_more = view.can_show_load_more,
        "cli: done"
    );

    Ok(())
}
