/// Starting the decoder and controlling the running process.
///
/// Provides [`launch`](launch::launch) and the [`DecoderHandle`](launch::DecoderHandle)
/// capability (suspend, resume, terminate, reap) implemented by
/// [`DecoderProcess`](launch::DecoderProcess).
pub mod launch;

/// The reader loop that moves decoder output into a shared buffer.
///
/// Provides [`Session`](session::Session) and [`run_with`](session::run_with).
pub mod session;
