use crate::{error::GasWindowError, handlers::gas::run_analysis, handlers::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval, Duration};
use uuid::Uuid;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, GasWindowError> {
    // Fail the upgrade for unknown sessions.
    state.sessions.get(id).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    let mut interval = interval(Duration::from_secs(state.config.dashboard_refresh_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = match run_analysis(&state, id).await {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::warn!("Dashboard refresh for session {} stopped: {}", id, e);
                        break;
                    }
                };

                if let Ok(msg) = serde_json::to_string(&report) {
                    if sender.send(Message::Text(msg)).await.is_err() {
                        break;
                    }
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!("WebSocket connection closed for session {}", id);
}
