//! Native messaging framing: a 4-byte native-endian length, then that many
//! bytes of UTF-8 JSON.

use crate::error::TransportError;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame a native host may send back (1 MiB).
pub const MAX_INBOUND_FRAME: usize = 1024 * 1024;

/// Largest frame we hand to a native host (64 MiB).
pub const MAX_OUTBOUND_FRAME: usize = 64 * 1024 * 1024;

pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(value)?;
    if payload.len() > MAX_OUTBOUND_FRAME {
        return Err(TransportError::FrameTooLarge {
            size: payload.len(),
            limit: MAX_OUTBOUND_FRAME,
        });
    }

    writer.write_all(&(payload.len() as u32).to_ne_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame. `Ok(None)` if the stream ends before a length prefix arrives.
pub async fn read_frame<R>(reader: &mut R, limit: usize) -> Result<Option<Value>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > limit {
        return Err(TransportError::FrameTooLarge { size: len, limit });
    }

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TransportError::TruncatedFrame { expected: len });
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Some(serde_json::from_slice(&payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_frame_layout() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &json!({"type": "ping"})).await.unwrap();

        let body = br#"{"type":"ping"}"#;
        assert_eq!(&buf[..4], &(body.len() as u32).to_ne_bytes());
        assert_eq!(&buf[4..], body);
    }

    #[tokio::test]
    async fn test_read_through_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);

        tokio::spawn(async move {
            write_frame(&mut server, &json!({"success": true})).await.unwrap();
        });

        let frame = read_frame(&mut client, MAX_INBOUND_FRAME).await.unwrap();
        assert_eq!(frame, Some(json!({"success": true})));
    }

    #[tokio::test]
    async fn test_empty_stream_is_no_frame() {
        let mut empty: &[u8] = &[];
        assert!(read_frame(&mut empty, MAX_INBOUND_FRAME).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_length_rejected_before_reading_body() {
        let mut bytes = ((MAX_INBOUND_FRAME + 1) as u32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let mut reader: &[u8] = &bytes;

        let err = read_frame(&mut reader, MAX_INBOUND_FRAME).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::FrameTooLarge { size, .. } if size == MAX_INBOUND_FRAME + 1
        ));
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let mut bytes = 10u32.to_ne_bytes().to_vec();
        bytes.extend_from_slice(b"{\"a\"");
        let mut reader: &[u8] = &bytes;

        let err = read_frame(&mut reader, MAX_INBOUND_FRAME).await.unwrap_err();
        assert!(matches!(err, TransportError::TruncatedFrame { expected: 10 }));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let mut bytes = 3u32.to_ne_bytes().to_vec();
        bytes.extend_from_slice(b"no!");
        let mut reader: &[u8] = &bytes;

        let err = read_frame(&mut reader, MAX_INBOUND_FRAME).await.unwrap_err();
        assert!(matches!(err, TransportError::Codec(_)));
    }
}
