/// A single token produced by analysis.
///
/// `pos_inc` is the position increment relative to the previous token. The common value is 1;
/// a value of 0 stacks this token at the same position as the previous one (synonyms,
/// case-doubled tokens), and values greater than 1 leave gaps (removed stop words).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub pos_inc: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, pos_inc: u32) -> Self {
        Token {
            text: text.into(),
            pos_inc,
        }
    }
}

/// A `TokenStream` enumerates the sequence of tokens extracted from one field value.
///
/// The writer drives the stream to exhaustion with [TokenStream::next], accumulating term
/// positions from the position increments.
pub trait TokenStream {
    /// Returns the next token, or `None` at the end of the stream.
    fn next(&mut self) -> Option<Token>;
}

/// Splits the input at whitespace. Token text is kept verbatim; every token has a position
/// increment of 1.
pub struct WhitespaceTokenizer {
    tokens: Vec<String>,
    index: usize,
}

impl WhitespaceTokenizer {
    pub fn new(text: &str) -> Self {
        WhitespaceTokenizer {
            tokens: text.split_whitespace().map(str::to_owned).collect(),
            index: 0,
        }
    }
}

impl TokenStream for WhitespaceTokenizer {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(Token::new(token.clone(), 1))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_whitespace_tokenizer() {
        let mut ts = WhitespaceTokenizer::new("the quick  brown\tfox");
        let mut tokens = Vec::new();
        while let Some(token) = ts.next() {
            tokens.push(token.text);
        }
        assert_eq!(tokens, vec!["the", "quick", "brown", "fox"]);
    }

    #[test]
    fn test_whitespace_tokenizer_empty() {
        let mut ts = WhitespaceTokenizer::new("   ");
        assert_eq!(ts.next(), None);
    }
}
