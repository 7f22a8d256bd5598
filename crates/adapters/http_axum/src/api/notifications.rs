//! Server-Sent Events stream of user-visible notifications.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use bmshub_app::ports::{PlatformConfigRepository, PlatformProbe, RemoteGateway};

use crate::state::AppState;

/// `GET /api/notifications/stream`
///
/// Sends every notification emitted after the client connected as a JSON
/// `data:` frame. Lagging clients skip what they missed.
pub async fn stream<P, R, G>(
    State(state): State<AppState<P, R, G>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    P: PlatformProbe + Send + Sync + 'static,
    R: PlatformConfigRepository + Send + Sync + 'static,
    G: RemoteGateway + Send + Sync + 'static,
{
    let receiver = state.notifications.subscribe();
    let frames = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(notification) => match serde_json::to_string(&notification) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize notification");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "notification subscriber lagged");
            None
        }
    });

    Sse::new(frames).keep_alive(KeepAlive::default())
}
