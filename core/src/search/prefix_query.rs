use {
    crate::{
        index::IndexReader,
        search::{multi_term_query::MultiTermQuery, query::Query},
        util::fmt_float,
        Result,
    },
    std::hash::{Hash, Hasher},
};

/// Matches every term in a field that starts with a byte prefix. Rewrites to a
/// [MultiTermQuery] over the reader's term dictionary at search time.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixQuery {
    pub(crate) field: String,
    pub(crate) prefix: String,
    pub boost: f32,
}

impl PrefixQuery {
    pub fn new(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        PrefixQuery {
            field: field.into(),
            prefix: prefix.into(),
            boost: 1.0,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        let mut s = if self.field == default_field {
            format!("{}*", self.prefix)
        } else {
            format!("{}:{}*", self.field, self.prefix)
        };
        if self.boost != 1.0 {
            s.push('^');
            s.push_str(&fmt_float(self.boost));
        }
        s
    }

    pub(crate) fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        let mut multi = MultiTermQuery::new(&self.field);
        for term in reader
            .terms_from(&self.field, &self.prefix)
            .take_while(|term| term.starts_with(&self.prefix))
        {
            multi.add_term(term);
        }
        multi.boost = self.boost;
        Ok(Query::MultiTerm(multi))
    }
}

impl Hash for PrefixQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.prefix.hash(state);
        self.boost.to_bits().hash(state);
    }
}
