use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use sea_orm::EntityTrait;
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::time::Duration;
use uuid::Uuid;

use crate::{
    entity::orders::Entity as Orders,
    error::{AppError, AppResult},
    middleware::auth::decode_user,
    notify::Room,
    state::AppState,
};

const PING_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Browsers cannot set headers on WS upgrades, so the token rides in
    /// the query string.
    token: String,
    /// Order room to join. Staff may omit it to join their role room.
    order: Option<Uuid>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(subscribe_ws))
}

#[utoipa::path(
    get,
    path = "/api/ws",
    params(
        ("token" = String, Query, description = "Bearer token"),
        ("order" = Option<Uuid>, Query, description = "Order room to join"),
    ),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 403, description = "Not allowed into the requested room"),
    ),
    tag = "Live"
)]
pub async fn subscribe_ws(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let user = decode_user(&query.token)?;

    let room = match query.order {
        Some(order_id) => {
            let order = Orders::find_by_id(order_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            if order.customer_id != user.user_id && !user.role.is_staff() {
                return Err(AppError::Authorization(
                    "Not allowed into this order room".into(),
                ));
            }
            Room::Order(order_id)
        }
        None => {
            if !user.role.is_staff() {
                return Err(AppError::Authorization(
                    "Customers must name an order room".into(),
                ));
            }
            Room::Staff(user.role)
        }
    };

    let rx = state.hub.subscribe(&room);
    tracing::info!(user_id = %user.user_id, room = %room.key(), "ws subscriber joined");

    Ok(ws.on_upgrade(move |socket| ws_session(socket, rx, room)))
}

async fn ws_session(socket: WebSocket, mut rx: broadcast::Receiver<crate::notify::OrderEvent>, room: Room) {
    let (mut sink, mut stream) = socket.split();

    let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
    ping_interval.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::warn!(error = %err, "event serialization failed");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Best-effort channel: clients reconcile over REST.
                        tracing::warn!(room = %room.key(), missed, "ws subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    tracing::debug!(room = %room.key(), "ws subscriber left");
}
