//! Message channel traits and an in-memory duplex.

use std::{
    future::Future,
    io,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{channel::mpsc, ready, Sink, Stream, StreamExt};

/// A sink of messages which fails with an IO error.
pub trait IoSink<T>: Sink<T, Error = io::Error> {}

impl<T, U: Sink<T, Error = io::Error>> IoSink<T> for U {}

/// A stream of messages which fails with an IO error.
pub trait IoStream<T>: Stream<Item = Result<T, io::Error>> {}

impl<T, U: Stream<Item = Result<T, io::Error>>> IoStream<T> for U {}

/// A bidirectional message channel to the peer.
pub trait Duplex<T>: IoSink<T> + IoStream<T> + Send + Unpin {}

impl<T, U: IoSink<T> + IoStream<T> + Send + Unpin> Duplex<T> for U {}

/// Extension trait for [`IoStream`].
pub trait ExpectStreamExt<T>: IoStream<T> + Unpin {
    /// Returns the next message, or an [`io::ErrorKind::UnexpectedEof`] error if the
    /// stream ended.
    fn expect_next(&mut self) -> ExpectNext<'_, Self, T> {
        ExpectNext {
            stream: self,
            _pd: PhantomData,
        }
    }
}

impl<T, U: IoStream<T> + Unpin + ?Sized> ExpectStreamExt<T> for U {}

/// Future returned by [`ExpectStreamExt::expect_next`].
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct ExpectNext<'a, U: ?Sized, T> {
    stream: &'a mut U,
    _pd: PhantomData<fn() -> T>,
}

impl<'a, T, U: IoStream<T> + Unpin + ?Sized> Future for ExpectNext<'a, U, T> {
    type Output = Result<T, io::Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.stream.poll_next_unpin(cx)) {
            Some(item) => Poll::Ready(item),
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended before the expected message",
            ))),
        }
    }
}

/// One end of an in-memory duplex channel.
#[derive(Debug)]
pub struct MemoryDuplex<T> {
    sink: mpsc::Sender<T>,
    stream: mpsc::Receiver<T>,
}

/// Creates a connected pair of in-memory duplex channels, each direction buffering
/// up to `buffer` messages.
pub fn duplex<T>(buffer: usize) -> (MemoryDuplex<T>, MemoryDuplex<T>) {
    let (a_sink, b_stream) = mpsc::channel(buffer);
    let (b_sink, a_stream) = mpsc::channel(buffer);

    (
        MemoryDuplex {
            sink: a_sink,
            stream: a_stream,
        },
        MemoryDuplex {
            sink: b_sink,
            stream: b_stream,
        },
    )
}

fn broken_pipe(err: mpsc::SendError) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, err)
}

impl<T> Sink<T> for MemoryDuplex<T> {
    type Error = io::Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_ready(cx).map_err(broken_pipe)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        Pin::new(&mut self.sink).start_send(item).map_err(broken_pipe)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_flush(cx).map_err(broken_pipe)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.sink).poll_close(cx).map_err(broken_pipe)
    }
}

impl<T> Stream for MemoryDuplex<T> {
    type Item = Result<T, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx).map(|item| item.map(Ok))
    }
}
