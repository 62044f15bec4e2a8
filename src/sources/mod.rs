//! External inputs fetched on demand.

pub mod headers;

pub use headers::{
    retriever_for, ArchiveRetriever, HeaderBundle, HeaderFetcher, HeaderSource, HttpRetriever,
    ShellRetriever,
};
