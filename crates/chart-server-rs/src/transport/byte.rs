use async_trait::async_trait;
use chart_core_rs::{protocol::message::JsonRpcMessage, utils::parse_json_rpc_message};
use chart_error_rs::{Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::transport::traits::ServerTransport;

const READ_BUFFER_CAPACITY: usize = 2 * 1024 * 1024;

/// A transport that reads and writes newline-delimited JSON-RPC messages over
/// byte streams.
pub struct ByteTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
    buf: Vec<u8>,
}

impl<R, W> ByteTransport<R, W>
where
    R: AsyncRead,
    W: AsyncWrite,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_CAPACITY, reader),
            writer,
            buf: Vec::with_capacity(READ_BUFFER_CAPACITY),
        }
    }
}

impl ByteTransport<Stdin, Stdout> {
    /// Transport over the process's stdin/stdout, the framing the host
    /// process speaks by default.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> ServerTransport for ByteTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn read_message(&mut self) -> Option<Result<JsonRpcMessage>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => {
                tracing::info!("Client closed connection (read 0 bytes)");
                None
            }
            Ok(_) => {
                let line = match String::from_utf8(std::mem::take(&mut self.buf)) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(?e, "Invalid UTF-8 line");
                        return Some(Err(Error::Utf8(e)));
                    }
                };
                Some(parse_json_rpc_message(&line))
            }
            Err(e) => Some(Err(Error::Io(e))),
        }
    }

    async fn write_message(&mut self, msg: JsonRpcMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
