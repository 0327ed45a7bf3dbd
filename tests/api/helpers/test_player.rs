use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::test_room::{WsMessageIn, WsMessageOut};

pub struct TestPlayer {
    pub id: String,
    pub name: String,
    pub tx: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    pub rx: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl TestPlayer {
    const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(name: &str, websocket: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        let (tx, rx) = websocket.split();
        TestPlayer {
            id: String::default(),
            name: name.to_string(),
            tx,
            rx,
        }
    }

    pub async fn receive_text(&mut self) -> Result<String, String> {
        loop {
            match time::timeout(TestPlayer::RECEIVE_TIMEOUT, self.rx.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => return Ok(text),
                Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => continue,
                Ok(Some(Ok(Message::Close(_)))) => return Err("Websocket closed.".to_string()),
                Ok(Some(Ok(message))) => return Err(format!("Unexpected frame {message:?}")),
                Ok(Some(Err(error))) => return Err(format!("Websocket returned an error {error}")),
                Ok(None) => return Err("Websocket closed.".to_string()),
                Err(_) => return Err("Timed out waiting for a message.".to_string()),
            }
        }
    }

    pub async fn receive(&mut self) -> Result<WsMessageIn, String> {
        let text = self.receive_text().await?;
        serde_json::from_str(&text)
            .map_err(|error| format!("Could not parse the message '{text}'. Error: '{error}'."))
    }

    /// Skips messages until one matches.
    pub async fn receive_until<F>(&mut self, predicate: F) -> WsMessageIn
    where
        F: Fn(&WsMessageIn) -> bool,
    {
        loop {
            let message = self.receive().await.unwrap();
            if predicate(&message) {
                return message;
            }
        }
    }

    pub async fn join_room(&mut self, room_id: &str) {
        self.send_text_message(WsMessageOut::JoinRoom {
            room_id: room_id.to_string(),
            name: self.name.clone(),
        })
        .await;
    }

    pub async fn start_round(&mut self, room_id: &str) {
        self.send_text_message(WsMessageOut::StartRound {
            room_id: room_id.to_string(),
        })
        .await;
    }

    pub async fn start_vote(&mut self, room_id: &str) {
        self.send_text_message(WsMessageOut::StartVote {
            room_id: room_id.to_string(),
        })
        .await;
    }

    pub async fn cast_vote(&mut self, room_id: &str, target_id: &str) {
        self.send_text_message(WsMessageOut::CastVote {
            room_id: room_id.to_string(),
            target_id: target_id.to_string(),
        })
        .await;
    }

    pub async fn next_round(&mut self, room_id: &str) {
        self.send_text_message(WsMessageOut::NextRound {
            room_id: room_id.to_string(),
        })
        .await;
    }

    /// Anything the server already wrote to this socket is read before the pong.
    pub async fn assert_nothing_pending(&mut self) {
        self.send_message(Message::Text("ping".to_string())).await;
        assert_eq!(self.receive_text().await.unwrap(), "pong");
    }

    pub async fn send_message(&mut self, message: Message) {
        self.tx.send(message).await.expect("Could not send message");
    }

    async fn send_text_message(&mut self, message: WsMessageOut) {
        self.send_message(Message::Text(
            serde_json::to_string(&message).expect("Could not serialize message"),
        ))
        .await;
    }
}
