//! Wire format: a 4-byte big-endian length prefix followed by a bincode
//! body. Only `(target, id, kind)` crosses the wire — no `ActorRef`,
//! which only makes sense inside the `ActorSystem` that created it.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::errors::TransportError;
use crate::message::MessageKind;
use crate::util::{ActorId, MessageId};

/// Frames above this size are rejected before the body buffer is allocated.
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub target: ActorId,
    pub id: MessageId,
    pub kind: MessageKind,
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &Frame,
) -> Result<(), TransportError> {
    let body = bincode::serialize(frame)?;
    if body.len() as u64 > MAX_FRAME_BYTES as u64 {
        return Err(TransportError::FrameTooLarge(body.len()));
    }
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. Returns `Ok(None)` on a clean EOF before any bytes of
/// the next frame arrive (the peer closed the connection between frames).
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Frame>, TransportError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(TransportError::FrameTooLarge(len as usize));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    let frame = bincode::deserialize(&body)?;
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_round_trips_over_an_in_memory_buffer() {
        let frame = Frame {
            target: ActorId::from("worker-1"),
            id: MessageId::new(),
            kind: MessageKind::HealthPing,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        write_frame(&mut cursor, &frame).await.expect("write");

        let mut read_cursor = std::io::Cursor::new(cursor.into_inner());
        let decoded = read_frame(&mut read_cursor)
            .await
            .expect("read")
            .expect("some frame");
        assert_eq!(decoded.target, frame.target);
        assert_eq!(decoded.id, frame.id);
    }

    #[tokio::test]
    async fn test_read_frame_returns_none_on_clean_eof() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        let result = read_frame(&mut cursor).await.expect("read");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected_before_read() {
        let mut len_buf = Vec::new();
        len_buf.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_be_bytes());
        let mut cursor = std::io::Cursor::new(len_buf);
        let result = read_frame(&mut cursor).await;
        assert!(matches!(result, Err(TransportError::FrameTooLarge(_))));
    }
}
