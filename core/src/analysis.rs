mod analyzer;
mod token_stream;

pub use {analyzer::*, token_stream::*};
