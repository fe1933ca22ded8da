//! Newline-delimited event streams: `GET {base}/events/{channel}`.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::net::{endpoint, parse_base, InvokeError};

type Chunk = Result<Vec<u8>, String>;

#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    base: Url,
}

impl HttpEventSource {
    pub fn new(client: Client, base_url: &str) -> Result<Self, InvokeError> {
        Ok(Self {
            client,
            base: parse_base(base_url)?,
        })
    }

    /// Opens `channel` and yields one payload per non-empty line.
    /// The stream ends when the executor closes the response.
    pub async fn subscribe(&self, channel: &str) -> Result<BoxStream<'static, String>, InvokeError> {
        let url = endpoint(&self.base, "events", channel)?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InvokeError::Rejected {
                command: format!("subscribe {channel}"),
                message: if message.trim().is_empty() {
                    status.to_string()
                } else {
                    message.trim().to_string()
                },
            });
        }

        debug!("subscribed to {}", channel);
        let chunks = Box::pin(resp.bytes_stream())
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(|e| e.to_string()));
        Ok(split_lines(chunks).boxed())
    }
}

struct LineState<S> {
    chunks: S,
    buf: Vec<u8>,
    done: bool,
}

impl<S> LineState<S> {
    fn next_line(&mut self) -> Option<String> {
        loop {
            let pos = self.buf.iter().position(|b| *b == b'\n')?;
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
    }

    fn flush(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

/// Reassembles lines split across chunk boundaries. A transport error ends the stream.
pub(crate) fn split_lines<S>(chunks: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Chunk> + Unpin,
{
    let state = LineState {
        chunks,
        buf: Vec::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.next_line() {
                return Some((line, state));
            }
            if state.done {
                return None;
            }
            match state.chunks.next().await {
                Some(Ok(bytes)) => state.buf.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    warn!("event stream interrupted: {}", e);
                    state.done = true;
                    return state.flush().map(|line| (line, state));
                }
                None => {
                    state.done = true;
                    return state.flush().map(|line| (line, state));
                }
            }
        }
    })
}
