mod capture_feed;
mod source_pipe;

pub use capture_feed::CaptureFeed;
pub use source_pipe::SourcePipe;
