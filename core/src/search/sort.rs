use {
    crate::{
        index::IndexReader,
        search::{top_docs::Hit, DocId},
        Result,
    },
    std::cmp::Ordering,
};

#[derive(Clone, Debug, PartialEq)]
enum SortKind {
    Score,
    Doc,
    String(String),
    Numeric(String),
}

/// One sort criterion. Score sorts descending by default, everything else ascending;
/// `reverse` flips the direction.
#[derive(Clone, Debug, PartialEq)]
pub struct SortField {
    kind: SortKind,
    reverse: bool,
}

impl SortField {
    pub fn score() -> Self {
        SortField {
            kind: SortKind::Score,
            reverse: false,
        }
    }

    pub fn doc() -> Self {
        SortField {
            kind: SortKind::Doc,
            reverse: false,
        }
    }

    /// Sorts on the stored first value of `field`, byte order.
    pub fn string(field: impl Into<String>) -> Self {
        SortField {
            kind: SortKind::String(field.into()),
            reverse: false,
        }
    }

    /// Sorts on the stored first value of `field`, parsed as a number; unparsable or
    /// missing values sort last.
    pub fn numeric(field: impl Into<String>) -> Self {
        SortField {
            kind: SortKind::Numeric(field.into()),
            reverse: false,
        }
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }
}

#[derive(Clone, Debug)]
pub(crate) enum SortValue {
    Score(f32),
    Doc(DocId),
    Str(Option<String>),
    Num(Option<f64>),
}

/// Replaces relevance ordering in a search with an ordered list of criteria. Ties after
/// every criterion fall back to ascending document id.
#[derive(Clone, Debug, PartialEq)]
pub struct Sort {
    fields: Vec<SortField>,
}

impl Sort {
    pub fn new(fields: Vec<SortField>) -> Self {
        Sort { fields }
    }

    /// The relevance order: score, then document id.
    pub fn relevance() -> Self {
        Sort::new(vec![SortField::score(), SortField::doc()])
    }

    pub(crate) fn keys(&self, reader: &IndexReader, hit: &Hit) -> Result<Vec<SortValue>> {
        let mut keys = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            keys.push(match &field.kind {
                SortKind::Score => SortValue::Score(hit.score),
                SortKind::Doc => SortValue::Doc(hit.doc),
                SortKind::String(name) => {
                    let doc = reader.get_doc(hit.doc)?;
                    SortValue::Str(doc.get(name).map(str::to_owned))
                }
                SortKind::Numeric(name) => {
                    let doc = reader.get_doc(hit.doc)?;
                    SortValue::Num(doc.get(name).and_then(|v| v.parse::<f64>().ok()))
                }
            });
        }
        Ok(keys)
    }

    pub(crate) fn compare(&self, a: &[SortValue], b: &[SortValue]) -> Ordering {
        for (field, (a, b)) in self.fields.iter().zip(a.iter().zip(b.iter())) {
            let ordering = match (a, b) {
                // higher scores rank earlier
                (SortValue::Score(a), SortValue::Score(b)) => {
                    b.partial_cmp(a).unwrap_or(Ordering::Equal)
                }
                (SortValue::Doc(a), SortValue::Doc(b)) => a.cmp(b),
                (SortValue::Str(a), SortValue::Str(b)) => match (a, b) {
                    (Some(a), Some(b)) => a.cmp(b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
                (SortValue::Num(a), SortValue::Num(b)) => match (a, b) {
                    (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
                _ => Ordering::Equal,
            };
            let ordering = if field.reverse {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
