mod args;
mod config;
mod dirs;
mod submit;

use std::io;
use std::net::SocketAddr;
use std::process::Command;

use app_api::AppContext;
use gather_app::{AppPaths, AppState, ensure_app_data_dir};
use http_api::{HttpState, generate_internal_token};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    init_tracing();

    match command {
        args::Command::Serve(serve_args) => serve(serve_args).await,
        args::Command::Submit(submit_args) => submit::run(submit_args).await,
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(args: args::ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        println!(
            "Created config at {} (default port {}).",
            config.paths.file.display(),
            config.config.port
        );
    }

    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    if data_dir.matched_existing {
        println!("Using existing data dir: {}", data_dir.dir.display());
    } else {
        println!("Using data dir: {}", data_dir.dir.display());
    }

    let port = args.port.unwrap_or(config.config.port);

    let paths = AppPaths::new(data_dir.dir.clone());
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;

    let app_state = AppState::new(paths.db_path);
    if let Err(err) = app_state.setup_db() {
        return Err(io::Error::other(format!("failed to initialize database: {}", err)).into());
    }

    let context = AppContext {
        app_state,
        app_data_dir: data_dir.dir,
    };

    let internal_token = generate_internal_token();
    println!("Internal API token for this run: {internal_token}");

    let state = HttpState::new(context, internal_token);
    let router = http_api::router(state);

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    let url = format!("http://127.0.0.1:{actual_port}");

    if used_fallback {
        eprintln!("Configured port {port} was unavailable; using {actual_port} for this run.");
    }

    println!("CCgather is running at {url}");
    println!("Press Ctrl+C to stop.");

    if !args.no_open {
        if let Err(err) = open_url(&url) {
            eprintln!("failed to open browser: {}", err);
        }
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

fn open_url(url: &str) -> Result<(), io::Error> {
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(not(target_os = "macos"))]
    let program = "xdg-open";

    let status = Command::new(program).arg(url).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other("open command failed"))
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
