//! Development server with live reload
//!
//! Serves the generated site and reloads connected browsers when content
//! changes. Content lives in the CMS, not on disk, so besides watching
//! `_config.yml` the server can poll the CMS on an interval; the generation
//! cache keeps those polls cheap and reloads only on real changes.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate::{self, GenerateOptions};
use crate::Astra;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(
    astra: &Astra,
    ip: &str,
    port: u16,
    live_reload: bool,
    open: bool,
    poll_secs: Option<u64>,
) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: astra.public_dir.clone(),
        reload_tx: reload_tx.clone(),
        live_reload,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // "localhost" is not a bindable address
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if let Some(secs) = poll_secs {
        println!("Polling the CMS every {}s for content changes.", secs);
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if live_reload {
        spawn_regenerator(astra, reload_tx, poll_secs);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Why a regeneration was requested
#[derive(Debug, Clone, Copy)]
enum RegenTrigger {
    ConfigChanged,
    Poll,
}

/// Wire up the config watcher and the CMS poll loop.
///
/// Both funnel into one worker so regenerations never overlap; the cache
/// decides whether anything actually needs rewriting.
fn spawn_regenerator(astra: &Astra, reload_tx: broadcast::Sender<()>, poll_secs: Option<u64>) {
    let (regen_tx, mut regen_rx) = mpsc::unbounded_channel::<RegenTrigger>();

    let config_path = astra.base_dir.join("_config.yml");
    if config_path.exists() {
        let tx = regen_tx.clone();
        std::thread::spawn(move || {
            if let Err(e) = watch_config(config_path, tx) {
                tracing::error!("Config watcher error: {}", e);
            }
        });
    }

    if let Some(secs) = poll_secs {
        let tx = regen_tx;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(secs.max(5)));
            interval.tick().await; // the first tick completes immediately
            loop {
                interval.tick().await;
                if tx.send(RegenTrigger::Poll).is_err() {
                    break;
                }
            }
        });
    }

    let base_dir = astra.base_dir.clone();
    tokio::spawn(async move {
        while let Some(trigger) = regen_rx.recv().await {
            if matches!(trigger, RegenTrigger::ConfigChanged) {
                println!("\n📝 Config changed, regenerating...");
            }

            // reload the config so edits to _config.yml take effect
            let astra = match Astra::new(&base_dir) {
                Ok(astra) => astra,
                Err(e) => {
                    tracing::error!("Failed to reload config: {}", e);
                    continue;
                }
            };

            match generate::run(&astra, &GenerateOptions::default()).await {
                Ok(true) => {
                    println!("✅ Regenerated, reloading browsers");
                    let _ = reload_tx.send(());
                }
                Ok(false) => {
                    tracing::debug!("No content changes");
                }
                Err(e) => {
                    println!("❌ Generation failed: {}", e);
                }
            }
        }
    });
}

/// Watch _config.yml and request a regeneration on change
fn watch_config(
    config_path: PathBuf,
    regen_tx: mpsc::UnboundedSender<RegenTrigger>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&config_path, RecursiveMode::NonRecursive)?;
    tracing::debug!("Watching: {:?}", config_path);

    while let Ok(result) = rx.recv() {
        match result {
            Ok(_events) => {
                if regen_tx.send(RegenTrigger::ConfigChanged).is_err() {
                    break;
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle a WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve files from the public dir, injecting the live reload script into HTML
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path();

    let file_path = if path == "/" {
        state.public_dir.join("index.html")
    } else {
        let clean_path = path.trim_start_matches('/');
        let candidate = state.public_dir.join(clean_path);
        if candidate.is_dir() {
            candidate.join("index.html")
        } else {
            candidate
        }
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// Inject the live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
