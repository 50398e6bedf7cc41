//! DNS message framing on a DoQ stream.
//!
//! RFC 9250 §4.2 prefixes every message with a 2-octet length, the same
//! framing DNS-over-TCP uses. Early drafts sent the bare message and relied on
//! the STREAM FIN alone; `MessageFraming::StreamDelimited` keeps those servers
//! reachable.

use doq_client_domain::MessageFraming;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message a 2-octet length prefix can announce.
pub const MAX_DNS_MESSAGE_SIZE: usize = u16::MAX as usize;

pub async fn write_message<S>(
    stream: &mut S,
    message_bytes: &[u8],
    framing: MessageFraming,
) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    match framing {
        MessageFraming::LengthPrefixed => {
            let length = u16::try_from(message_bytes.len()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "DNS message too large: {} bytes (max {})",
                        message_bytes.len(),
                        MAX_DNS_MESSAGE_SIZE
                    ),
                )
            })?;

            // Single buffer so prefix and message leave in the same STREAM frame.
            let mut frame = Vec::with_capacity(2 + message_bytes.len());
            frame.extend_from_slice(&length.to_be_bytes());
            frame.extend_from_slice(message_bytes);
            stream.write_all(&frame).await?;
        }
        MessageFraming::StreamDelimited => {
            stream.write_all(message_bytes).await?;
        }
    }

    stream.flush().await
}

pub async fn read_message<S>(stream: &mut S, framing: MessageFraming) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    match framing {
        MessageFraming::LengthPrefixed => read_with_length_prefix(stream).await,
        MessageFraming::StreamDelimited => read_to_fin(stream).await,
    }
}

async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to read response length: {}", e))
    })?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(|e| {
        io::Error::new(
            e.kind(),
            format!(
                "Failed to read response body ({} bytes announced): {}",
                response_len, e
            ),
        )
    })?;

    Ok(response)
}

async fn read_to_fin<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut response = Vec::with_capacity(512);
    stream
        .take(MAX_DNS_MESSAGE_SIZE as u64 + 1)
        .read_to_end(&mut response)
        .await?;

    if response.len() > MAX_DNS_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeds {} bytes", MAX_DNS_MESSAGE_SIZE),
        ));
    }

    Ok(response)
}
