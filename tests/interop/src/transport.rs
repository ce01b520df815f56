//! Transport wrappers used by the end-to-end scenarios.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

/// Delivers at most one byte per read, exercising record reassembly across
/// maximally fragmented transport reads.
pub struct Trickle<S> {
    inner: S,
}

impl<S> Trickle<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for Trickle<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let mut byte = [0u8; 1];
        let mut one = ReadBuf::new(&mut byte);
        match Pin::new(&mut this.inner).poll_read(cx, &mut one) {
            Poll::Ready(Ok(())) => {
                buf.put_slice(one.filled());
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Trickle<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Read exactly one record frame (5-byte header + body) from `src`.
/// Returns `None` on clean EOF at a frame boundary.
pub async fn read_frame<S: AsyncRead + Unpin>(src: &mut S) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 5];
    let mut filled = 0;
    while filled < header.len() {
        let n = src.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "eof inside frame header",
            ));
        }
        filled += n;
    }
    let len = u16::from_be_bytes([header[3], header[4]]) as usize;
    let mut frame = header.to_vec();
    frame.resize(5 + len, 0);
    src.read_exact(&mut frame[5..]).await?;
    Ok(Some(frame))
}

/// Relay that forwards frames in both directions but flips one body byte of
/// the first application-data record travelling from `b` to `a`.
///
/// Returns when both directions reach EOF or fail.
pub async fn tamper_relay<A, B>(a: A, b: B)
where
    A: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut a_rd, mut a_wr) = tokio::io::split(a);
    let (mut b_rd, mut b_wr) = tokio::io::split(b);

    let forward = tokio::spawn(async move {
        while let Ok(Some(frame)) = read_frame(&mut a_rd).await {
            if b_wr.write_all(&frame).await.is_err() {
                break;
            }
        }
        let _ = b_wr.shutdown().await;
    });

    let backward = tokio::spawn(async move {
        let mut flipped = false;
        while let Ok(Some(mut frame)) = read_frame(&mut b_rd).await {
            if !flipped && frame[0] == 23 && frame.len() > 5 {
                frame[5] ^= 0x01;
                flipped = true;
            }
            if a_wr.write_all(&frame).await.is_err() {
                break;
            }
        }
        let _ = a_wr.shutdown().await;
    });

    let _ = forward.await;
    let _ = backward.await;
}
