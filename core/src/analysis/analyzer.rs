use crate::analysis::token_stream::{TokenStream, WhitespaceTokenizer};

/// An Analyzer builds [TokenStream]s, which analyze text. It thus represents a policy for
/// extracting index terms from text.
///
/// The writer borrows the index's analyzer while it is open; swapping the analyzer on the
/// index rebinds it on the open writer before the next document is added.
pub trait Analyzer: Send + Sync {
    /// Creates a token stream over one value of the named field.
    fn token_stream(&self, field: &str, text: &str) -> Box<dyn TokenStream>;
}

/// An analyzer that splits field values at whitespace and keeps tokens verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceAnalyzer;

impl Analyzer for WhitespaceAnalyzer {
    fn token_stream(&self, _field: &str, text: &str) -> Box<dyn TokenStream> {
        Box::new(WhitespaceTokenizer::new(text))
    }
}
