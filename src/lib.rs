pub mod accession;
pub mod config;
pub mod domain;
pub mod ena;
pub mod error;
pub mod executor;
pub mod output;
pub mod pipeline;
pub mod resolver;
pub mod rewriter;
#[cfg(feature = "server")]
pub mod server;
pub mod stats;
pub mod tokenizer;
pub mod validator;
