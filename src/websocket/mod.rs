pub mod message;

use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;

use crate::error::Error;
use message::{WsMessageIn, WsMessageOut};

pub fn parse_message(message: &str) -> Result<WsMessageIn, Error> {
    serde_json::from_str(message).map_err(|error| {
        log::debug!("Unprocessable message. Message: '{message}', Error: '{error}'.");
        Error::UnprocessableMessage(error.to_string(), message.to_string())
    })
}

pub async fn send_message<T>(websocket: &mut WebSocket, value: &T) -> Result<(), Error>
where
    T: ?Sized + Serialize,
{
    let message = serde_json::to_string(value).map_err(|error| {
        Error::log_and_create_internal(&format!(
            "Could not serialize the message. Error: '{error}'."
        ))
    })?;

    send_message_string(websocket, &message).await
}

pub async fn send_message_string(websocket: &mut WebSocket, message: &str) -> Result<(), Error> {
    websocket
        .send(Message::Text(message.to_string()))
        .await
        .map_err(|error| Error::WebsocketClosed(error.to_string()))
}

pub async fn send_error(websocket: &mut WebSocket, error: &Error) {
    if let Err(error) = send_message(websocket, &error_to_ws_error(error)).await {
        log::debug!("Could not send the error to the player. Error: '{error}'.");
    }
}

pub async fn close(websocket: WebSocket) {
    if let Err(error) = websocket.close().await {
        log::debug!("Could not close the websocket. Error: '{error}'.")
    }
}

/// Only unprocessable frames and internal failures are reported. Guard violations stay
/// silent and a closed socket has nobody left to read the frame.
pub fn error_to_ws_error(error: &Error) -> WsMessageOut {
    match error {
        Error::UnprocessableMessage(_, _) => WsMessageOut::Error {
            r#type: "UNPROCESSABLE_WEBSOCKET_MESSAGE".to_string(),
            title: "Unprocessable websocket message".to_string(),
            detail: error.to_string(),
        },
        _ => WsMessageOut::Error {
            r#type: "INTERNAL_SERVER".to_string(),
            title: "Internal Server error".to_string(),
            detail: error.to_string(),
        },
    }
}
