use {
    crate::{
        index::IndexReader,
        search::{multi_term_query::MultiTermQuery, query::Query},
        util::fmt_float,
        Result,
    },
    std::hash::{Hash, Hasher},
};

/// Whole-string glob match: `*` matches any run of characters (including none), `?`
/// matches exactly one character, anything else matches itself. The empty pattern matches
/// nothing.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob(&pattern, &text)
}

fn glob(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            if glob(&pattern[1..], text) {
                true
            } else {
                !text.is_empty() && glob(pattern, &text[1..])
            }
        }
        Some('?') => !text.is_empty() && glob(&pattern[1..], &text[1..]),
        Some(c) => text.first() == Some(c) && glob(&pattern[1..], &text[1..]),
    }
}

/// Matches every term in a field satisfying a glob pattern. Rewrites to a
/// [MultiTermQuery] over the reader's term dictionary at search time; the literal run
/// before the first wildcard character narrows the dictionary scan.
#[derive(Clone, Debug, PartialEq)]
pub struct WildcardQuery {
    pub(crate) field: String,
    pub(crate) pattern: String,
    pub boost: f32,
}

impl WildcardQuery {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        WildcardQuery {
            field: field.into(),
            pattern: pattern.into(),
            boost: 1.0,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn fixed_prefix(&self) -> &str {
        let end = self
            .pattern
            .find(|c| c == '*' || c == '?')
            .unwrap_or(self.pattern.len());
        &self.pattern[..end]
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut s = if self.field == default_field {
            self.pattern.clone()
        } else {
            format!("{}:{}", self.field, self.pattern)
        };
        if self.boost != 1.0 {
            s.push('^');
            s.push_str(&fmt_float(self.boost));
        }
        s
    }

    pub(crate) fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        let prefix = self.fixed_prefix();
        let mut multi = MultiTermQuery::new(&self.field);
        for term in reader
            .terms_from(&self.field, prefix)
            .take_while(|term| term.starts_with(prefix))
        {
            if wildcard_match(&self.pattern, term) {
                multi.add_term(term);
            }
        }
        multi.boost = self.boost;
        Ok(Query::MultiTerm(multi))
    }
}

impl Hash for WildcardQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.pattern.hash(state);
        self.boost.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_log::test};

    #[test]
    fn test_wildcard_match() {
        assert!(!wildcard_match("", "abc"));
        assert!(wildcard_match("*", "asdasdg"));
        assert!(wildcard_match("asd*", "asdasdg"));
        assert!(wildcard_match("*dg", "asdasdg"));
        assert!(wildcard_match("a?d*", "asdasdg"));
        assert!(wildcard_match("?sd*", "asdasdg"));
        assert!(wildcard_match("asd?", "asdg"));
        assert!(wildcard_match("asdg", "asdg"));
        assert!(!wildcard_match("asdf", "asdi"));
        assert!(!wildcard_match("asd??", "asdg"));
        assert!(wildcard_match("as?g", "asdg"));
        assert!(!wildcard_match("as??g", "asdg"));
        assert!(wildcard_match("a*?f", "asdf"));
        assert!(wildcard_match("a?*f", "asdf"));
        assert!(wildcard_match("a*?df", "asdf"));
        assert!(wildcard_match("a?*df", "asdf"));
        assert!(!wildcard_match("as*?df", "asdf"));
        assert!(!wildcard_match("as?*df", "asdf"));
        assert!(wildcard_match("asdf*", "asdf"));
        assert!(wildcard_match("asd*f", "asdf"));
        assert!(wildcard_match("*asdf*", "asdf"));
        assert!(wildcard_match("asd?*****", "asdf"));
        assert!(wildcard_match("as?*****g", "asdg"));
        assert!(!wildcard_match("*asdf", "asdi"));
        assert!(!wildcard_match("asdf*", "asdi"));
        assert!(!wildcard_match("*asdf*", "asdi"));
        assert!(!wildcard_match("cat1*", "cat2/sub1"));
    }
}
