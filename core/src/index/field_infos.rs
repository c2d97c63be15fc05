/// Per-field index metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    /// Whether the field's values are analyzed into the inverted index. Unindexed fields are
    /// stored with the document but produce no postings.
    pub indexed: bool,
    /// Whether term positions are recorded. Phrase queries require positions.
    pub store_positions: bool,
    pub boost: f32,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        FieldInfo {
            name: name.into(),
            indexed: true,
            store_positions: true,
            boost: 1.0,
        }
    }
}

/// The set of fields known to an index, in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldInfos {
    infos: Vec<FieldInfo>,
}

impl FieldInfos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldInfo> {
        self.infos.iter().find(|info| info.name == name)
    }

    /// Registers a field explicitly, replacing any existing entry with the same name.
    pub fn add(&mut self, info: FieldInfo) {
        if let Some(existing) = self.infos.iter_mut().find(|i| i.name == info.name) {
            *existing = info;
        } else {
            self.infos.push(info);
        }
    }

    /// Returns the metadata for `name`, registering it with default settings on first sight.
    pub fn get_or_add(&mut self, name: &str) -> &FieldInfo {
        if let Some(index) = self.infos.iter().position(|info| info.name == name) {
            &self.infos[index]
        } else {
            self.infos.push(FieldInfo::new(name));
            self.infos.last().unwrap()
        }
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldInfo> {
        self.infos.iter()
    }
}
