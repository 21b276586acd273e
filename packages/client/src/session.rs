//! Streaming client session management.

use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

/// Splits body chunks into complete lines.
///
/// Chunk boundaries follow neither line nor UTF-8 character boundaries, so an
/// incomplete tail is kept as bytes until the rest of it arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed, newline included
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// Map a non-success response onto a client error
async fn reject(response: reqwest::Response, room_id: &str) -> ClientError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return ClientError::RoomNotFound(room_id.to_string());
    }
    let message = response.text().await.unwrap_or_default();
    ClientError::Rejected {
        status: status.as_u16(),
        message: message.trim_end().to_string(),
    }
}

/// Run one streaming session until the user quits or the stream ends
///
/// # Returns
///
/// * `Ok(())` - ユーザーが終了した（Ctrl+C / Ctrl+D）
/// * `Err(ClientError::ConnectionError)` - ストリームが切断された（再接続対象）
/// * `Err(ClientError::RoomNotFound)` - ルームが存在しない
pub async fn run_client_session(
    base_url: &str,
    room_id: &str,
    nickname: &str,
) -> Result<(), ClientError> {
    let client = Client::new();
    let base_url = base_url.trim_end_matches('/').to_string();

    let response = client
        .get(format!("{}/chat", base_url))
        .query(&[("roomID", room_id), ("nickname", nickname)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(reject(response, room_id).await);
    }

    tracing::info!("Connected to room '{}'!", room_id);
    println!(
        "\nYou are '{}' in '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        nickname, room_id
    );

    // Spawn a task to print incoming lines
    let nickname_for_read = nickname.to_string();
    let mut read_task = tokio::spawn(async move {
        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::default();

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    for line in lines.push(&chunk) {
                        if let Some(formatted) = MessageFormatter::format_line(&line) {
                            print!("{}", formatted);
                            redisplay_prompt(&nickname_for_read);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Stream read error: {}", e);
                    break;
                }
            }
        }
        tracing::info!("Server closed the stream");
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", nickname);
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to post stdin lines to the room
    let say_url = format!("{}/chat/say", base_url);
    let room_for_write = room_id.to_string();
    let nickname_for_write = nickname.to_string();
    let write_client = client.clone();
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let result = write_client
                .post(&say_url)
                .query(&[
                    ("roomID", room_for_write.as_str()),
                    ("nickname", nickname_for_write.as_str()),
                    ("msg", line.as_str()),
                ])
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    let error = reject(response, &room_for_write).await;
                    tracing::warn!("Message not sent: {}", error);
                    if matches!(error, ClientError::RoomNotFound(_)) {
                        return Err(error);
                    }
                }
                Err(e) => return Err(ClientError::from(e)),
            }
        }
        Ok(())
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            Err(ClientError::ConnectionError("Connection lost".to_string()))
        }
        write_result = &mut write_task => {
            read_task.abort();
            match write_result {
                Ok(Err(e)) => Err(e),
                _ => {
                    leave(&client, &base_url, room_id, nickname).await;
                    Ok(())
                }
            }
        }
    }
}

/// Tell the server we are gone instead of waiting for it to notice
async fn leave(client: &Client, base_url: &str, room_id: &str, nickname: &str) {
    let result = client
        .post(format!("{}/chat/leave", base_url))
        .query(&[("roomID", room_id), ("nickname", nickname)])
        .send()
        .await;
    if let Err(e) = result {
        tracing::debug!("Leave request failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_joins_split_chunks() {
        // テスト項目: チャンク境界をまたぐ行が 1 行として取り出される
        // given (前提条件):
        let mut buffer = LineBuffer::default();

        // when (操作):
        let first = buffer.push(b"alice has jo");
        let second = buffer.push(b"ined\nbob has joined\nmess");

        // then (期待する結果):
        assert!(first.is_empty());
        assert_eq!(second, vec!["alice has joined\n", "bob has joined\n"]);
        assert_eq!(buffer.push(b"age\n"), vec!["message\n"]);
    }

    #[test]
    fn test_line_buffer_handles_multibyte_text() {
        // テスト項目: 文字の途中で分割された UTF-8 の本文も正しく取り出される
        // given (前提条件):
        let mut buffer = LineBuffer::default();

        // when (操作):
        let bytes = "こんにちは\n".as_bytes();
        let first = buffer.push(&bytes[..4]);
        let second = buffer.push(&bytes[4..]);

        // then (期待する結果):
        assert!(first.is_empty());
        assert_eq!(second, vec!["こんにちは\n"]);
    }
}
