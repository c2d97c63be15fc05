use {
    crate::{
        index::IndexReader,
        search::{multi_term_query::MultiTermQuery, query::Query},
        util::fmt_float,
        LodestoneError, Result,
    },
    std::{
        cmp::Ordering,
        hash::{Hash, Hasher},
    },
};

fn validate_bounds(
    field: &str,
    lower: Option<&str>,
    upper: Option<&str>,
    include_lower: bool,
    include_upper: bool,
) -> Result<()> {
    if field.is_empty() {
        return Err(LodestoneError::Argument(
            "range query field name must not be empty".to_string(),
        ));
    }
    if lower.is_none() && upper.is_none() {
        return Err(LodestoneError::Argument(
            "range query needs at least one bound".to_string(),
        ));
    }
    if lower.is_none() && include_lower {
        return Err(LodestoneError::Argument(
            "an open lower bound cannot be inclusive".to_string(),
        ));
    }
    if upper.is_none() && include_upper {
        return Err(LodestoneError::Argument(
            "an open upper bound cannot be inclusive".to_string(),
        ));
    }
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower > upper {
            return Err(LodestoneError::Argument(format!(
                "lower bound {lower:?} is above upper bound {upper:?}"
            )));
        }
    }
    Ok(())
}

fn bounds_to_query_string(
    field: &str,
    default_field: &str,
    lower: Option<&str>,
    upper: Option<&str>,
    include_lower: bool,
    include_upper: bool,
    boost: f32,
) -> String {
    let body = match (lower, upper) {
        (Some(lower), Some(upper)) => format!(
            "{}{} {}{}",
            if include_lower { '[' } else { '{' },
            lower,
            upper,
            if include_upper { ']' } else { '}' },
        ),
        (Some(lower), None) => format!("{}{lower}", if include_lower { ">=" } else { ">" }),
        (None, Some(upper)) => format!("{}{upper}", if include_upper { "<=" } else { "<" }),
        (None, None) => String::new(),
    };
    let mut s = if field == default_field {
        body
    } else {
        format!("{field}:{body}")
    };
    if boost != 1.0 {
        s.push('^');
        s.push_str(&fmt_float(boost));
    }
    s
}

/// Matches the terms of a field between two byte bounds, compared lexicographically.
/// Rewrites to a [MultiTermQuery] over the reader's term dictionary at search time.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeQuery {
    pub(crate) field: String,
    pub(crate) lower: Option<String>,
    pub(crate) upper: Option<String>,
    pub(crate) include_lower: bool,
    pub(crate) include_upper: bool,
    pub boost: f32,
}

impl RangeQuery {
    pub fn new(
        field: impl Into<String>,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<Self> {
        let field = field.into();
        validate_bounds(&field, lower, upper, include_lower, include_upper)?;
        Ok(RangeQuery {
            field,
            lower: lower.map(str::to_owned),
            upper: upper.map(str::to_owned),
            include_lower,
            include_upper,
            boost: 1.0,
        })
    }

    /// `field < upper` or `field <= upper`.
    pub fn new_less(field: impl Into<String>, upper: &str, include_upper: bool) -> Result<Self> {
        Self::new(field, None, Some(upper), false, include_upper)
    }

    /// `field > lower` or `field >= lower`.
    pub fn new_more(field: impl Into<String>, lower: &str, include_lower: bool) -> Result<Self> {
        Self::new(field, Some(lower), None, include_lower, false)
    }

    fn matches_term(&self, term: &str) -> bool {
        if let Some(lower) = &self.lower {
            match term.cmp(lower.as_str()) {
                Ordering::Less => return false,
                Ordering::Equal if !self.include_lower => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match term.cmp(upper.as_str()) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.include_upper => return false,
                _ => {}
            }
        }
        true
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        bounds_to_query_string(
            &self.field,
            default_field,
            self.lower.as_deref(),
            self.upper.as_deref(),
            self.include_lower,
            self.include_upper,
            self.boost,
        )
    }

    pub(crate) fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        let mut multi = MultiTermQuery::new(&self.field);
        match &self.lower {
            Some(lower) => {
                for term in reader
                    .terms_from(&self.field, lower)
                    .take_while(|term| self.upper.as_deref().map_or(true, |u| *term <= u))
                {
                    if self.matches_term(term) {
                        multi.add_term(term);
                    }
                }
            }
            None => {
                for term in self
                    .reader_terms(reader)
                    .take_while(|term| self.upper.as_deref().map_or(true, |u| *term <= u))
                {
                    if self.matches_term(term) {
                        multi.add_term(term);
                    }
                }
            }
        }
        multi.boost = self.boost;
        Ok(Query::MultiTerm(multi))
    }

    fn reader_terms<'a>(&self, reader: &'a IndexReader) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        reader.terms_for(&self.field)
    }
}

impl Hash for RangeQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.lower.hash(state);
        self.upper.hash(state);
        self.include_lower.hash(state);
        self.include_upper.hash(state);
        self.boost.to_bits().hash(state);
    }
}

/// A parsed numeric term: integers compare exactly, everything else through f64.
#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i64),
    Float(f64),
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(value) = text.parse::<i64>() {
        return Some(Number::Int(value));
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite()).map(Number::Float)
}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a.cmp(&b),
        (a, b) => {
            let (a, b) = (number_as_f64(a), number_as_f64(b));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

fn number_as_f64(n: Number) -> f64 {
    match n {
        Number::Int(i) => i as f64,
        Number::Float(f) => f,
    }
}

/// Like [RangeQuery], but bounds and terms that parse as numbers compare numerically,
/// locale-independent, tolerating leading `+`, a bare leading `.` and scientific forms.
/// Terms that do not parse fall back to lexicographic comparison, so a typed range over a
/// string field behaves as a plain range. Open bounds treat the missing side as infinite.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedRangeQuery {
    pub(crate) field: String,
    pub(crate) lower: Option<String>,
    pub(crate) upper: Option<String>,
    pub(crate) include_lower: bool,
    pub(crate) include_upper: bool,
    pub boost: f32,
}

impl TypedRangeQuery {
    pub fn new(
        field: impl Into<String>,
        lower: Option<&str>,
        upper: Option<&str>,
        include_lower: bool,
        include_upper: bool,
    ) -> Result<Self> {
        let field = field.into();
        if field.is_empty() {
            return Err(LodestoneError::Argument(
                "range query field name must not be empty".to_string(),
            ));
        }
        if lower.is_none() && upper.is_none() {
            return Err(LodestoneError::Argument(
                "range query needs at least one bound".to_string(),
            ));
        }
        if lower.is_none() && include_lower {
            return Err(LodestoneError::Argument(
                "an open lower bound cannot be inclusive".to_string(),
            ));
        }
        if upper.is_none() && include_upper {
            return Err(LodestoneError::Argument(
                "an open upper bound cannot be inclusive".to_string(),
            ));
        }
        if let (Some(lower), Some(upper)) = (lower, upper) {
            let ordered = match (parse_number(lower), parse_number(upper)) {
                (Some(lower), Some(upper)) => compare_numbers(lower, upper) != Ordering::Greater,
                (None, None) => lower <= upper,
                _ => {
                    return Err(LodestoneError::Argument(format!(
                        "typed range bounds {lower:?} and {upper:?} do not share a type"
                    )))
                }
            };
            if !ordered {
                return Err(LodestoneError::Argument(format!(
                    "lower bound {lower:?} is above upper bound {upper:?}"
                )));
            }
        }
        Ok(TypedRangeQuery {
            field,
            lower: lower.map(str::to_owned),
            upper: upper.map(str::to_owned),
            include_lower,
            include_upper,
            boost: 1.0,
        })
    }

    pub fn new_less(field: impl Into<String>, upper: &str, include_upper: bool) -> Result<Self> {
        Self::new(field, None, Some(upper), false, include_upper)
    }

    pub fn new_more(field: impl Into<String>, lower: &str, include_lower: bool) -> Result<Self> {
        Self::new(field, Some(lower), None, include_lower, false)
    }

    fn compare(term: &str, bound: &str) -> Ordering {
        match (parse_number(term), parse_number(bound)) {
            (Some(term), Some(bound)) => compare_numbers(term, bound),
            _ => term.cmp(bound),
        }
    }

    fn matches_term(&self, term: &str) -> bool {
        if let Some(lower) = &self.lower {
            match Self::compare(term, lower) {
                Ordering::Less => return false,
                Ordering::Equal if !self.include_lower => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match Self::compare(term, upper) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.include_upper => return false,
                _ => {}
            }
        }
        true
    }

    pub(crate) fn to_query_string(&self, default_field: &str) -> String {
        bounds_to_query_string(
            &self.field,
            default_field,
            self.lower.as_deref(),
            self.upper.as_deref(),
            self.include_lower,
            self.include_upper,
            self.boost,
        )
    }

    /// Typed comparison cannot use the dictionary order of the terms, so the whole
    /// dictionary is scanned.
    pub(crate) fn rewrite(&self, reader: &IndexReader) -> Result<Query> {
        let mut multi = MultiTermQuery::new(&self.field);
        for term in reader.terms_for(&self.field) {
            if self.matches_term(term) {
                multi.add_term(term);
            }
        }
        multi.boost = self.boost;
        Ok(Query::MultiTerm(multi))
    }
}

impl Hash for TypedRangeQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
        self.lower.hash(state);
        self.upper.hash(state);
        self.include_lower.hash(state);
        self.include_upper.hash(state);
        self.boost.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_bound_validation() {
        assert!(RangeQuery::new("", Some("a"), None, true, false).is_err());
        assert!(RangeQuery::new("date", None, None, false, false).is_err());
        assert!(RangeQuery::new("date", None, Some("b"), true, true).is_err());
        assert!(RangeQuery::new("date", Some("b"), Some("a"), true, true).is_err());
        assert!(RangeQuery::new("date", Some("a"), Some("b"), true, true).is_ok());
        assert!(TypedRangeQuery::new("number", Some("1.0"), Some("cat"), true, true).is_err());
        assert!(TypedRangeQuery::new("number", Some("-1.0"), Some("1.0"), true, true).is_ok());
    }

    #[test]
    fn test_lexical_bounds() {
        let query = RangeQuery::new("date", Some("20051006"), Some("20051010"), true, false).unwrap();
        assert!(query.matches_term("20051006"));
        assert!(query.matches_term("20051009"));
        assert!(!query.matches_term("20051010"));
        assert!(!query.matches_term("20051005"));
    }

    #[test]
    fn test_numeric_parsing_tolerance() {
        assert!(matches!(parse_number("3999"), Some(Number::Int(3999))));
        assert!(matches!(parse_number("+8"), Some(Number::Int(8))));
        assert!(parse_number(".123").is_some());
        assert!(parse_number("+.3413").is_some());
        assert!(parse_number("-.89321").is_some());
        assert!(parse_number("9e2").is_some());
        assert!(parse_number("cat1/sub1").is_none());
    }

    #[test]
    fn test_typed_comparison() {
        let query = TypedRangeQuery::new("number", Some("-1.0"), Some("1.0"), true, true).unwrap();
        assert!(query.matches_term(".123"));
        assert!(query.matches_term("+.3413"));
        assert!(query.matches_term("1"));
        assert!(query.matches_term("-1.0"));
        assert!(!query.matches_term("2"));
        assert!(!query.matches_term("-1.1298"));

        let exclusive =
            TypedRangeQuery::new("number", Some("-1.0"), Some("1.0"), false, false).unwrap();
        assert!(!exclusive.matches_term("1"));
        assert!(!exclusive.matches_term("-1.0"));
        assert!(exclusive.matches_term("0.954"));
    }

    #[test]
    fn test_typed_falls_back_to_lexical() {
        let query = TypedRangeQuery::new("cat", Some("cat2"), None, true, false).unwrap();
        assert!(query.matches_term("cat2/sub1"));
        assert!(query.matches_term("cat3/sub1"));
        assert!(!query.matches_term("cat1/sub1"));
    }

    #[test]
    fn test_to_query_string_forms() {
        let both = RangeQuery::new("date", Some("a"), Some("b"), true, false).unwrap();
        assert_eq!(both.to_query_string(""), "date:[a b}");
        let less = RangeQuery::new_less("date", "b", true).unwrap();
        assert_eq!(less.to_query_string(""), "date:<=b");
        let more = RangeQuery::new_more("date", "a", false).unwrap();
        assert_eq!(more.to_query_string("date"), ">a");
    }
}
