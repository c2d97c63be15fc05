/// One named field of a [Document].
///
/// A field holds one or more textual values; multiple values are treated as appended for the
/// purposes of search. The field boost is folded into the stored norm at index time.
#[derive(Clone, Debug, PartialEq)]
pub struct DocField {
    pub name: String,
    pub boost: f32,
    pub values: Vec<String>,
}

impl DocField {
    pub fn new(name: impl Into<String>) -> Self {
        DocField {
            name: name.into(),
            boost: 1.0,
            values: Vec::new(),
        }
    }

    /// Appends a value to this field, builder style.
    pub fn add_data(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Documents are the unit of indexing and search.
///
/// A Document is a set of fields. Each field has a name and one or more textual values.
/// Stored fields are returned with search hits on the document. The document boost is
/// folded into the stored norm of every field at index time.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub boost: f32,
    fields: Vec<DocField>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            boost: 1.0,
            fields: Vec::new(),
        }
    }

    /// Adds a field to the document. Several fields may be added with the same name; their
    /// values are treated as appended for the purposes of search.
    pub fn add_field(&mut self, field: DocField) {
        self.fields.push(field);
    }

    /// Returns the first field added with the given name.
    pub fn field(&self, name: &str) -> Option<&DocField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the first value of the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(|f| f.values.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> &[DocField] {
        &self.fields
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_document_fields() {
        let mut doc = Document::new();
        doc.add_field(DocField::new("title").add_data("hello"));
        doc.add_field(DocField::new("body").add_data("one").add_data("two"));

        assert_eq!(doc.get("title"), Some("hello"));
        assert_eq!(doc.field("body").unwrap().values.len(), 2);
        assert_eq!(doc.get("missing"), None);
    }
}
