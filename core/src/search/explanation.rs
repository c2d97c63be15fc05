use {
    crate::util::fmt_float,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// A tree describing how a hit's score was computed. The root value equals the score the
/// scorer produced for the document, within float tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct Explanation {
    value: f32,
    description: String,
    details: Vec<Explanation>,
}

impl Explanation {
    pub fn new(value: f32, description: impl Into<String>) -> Self {
        Explanation {
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    pub fn add_detail(&mut self, detail: Explanation) {
        self.details.push(detail);
    }

    fn fmt_depth(&self, f: &mut Formatter, depth: usize) -> FmtResult {
        for _ in 0..depth {
            write!(f, "  ")?;
        }
        writeln!(f, "{} = {}", fmt_float(self.value), self.description)?;
        for detail in &self.details {
            detail.fmt_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl Display for Explanation {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        self.fmt_depth(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_render_single_node() {
        let expl = Explanation::new(1.6, "short description");
        assert_eq!(expl.to_string(), "1.6 = short description\n");
    }

    #[test]
    fn test_render_tree() {
        let mut expl = Explanation::new(1.6, "short description");
        expl.add_detail(Explanation::new(0.8, "half the score"));
        expl.add_detail(Explanation::new(2.0, "to make the difference"));
        expl.details[1].add_detail(Explanation::new(0.5, "sub-sub"));
        expl.details[1].add_detail(Explanation::new(4.0, "another sub-sub"));
        expl.details[0].add_detail(Explanation::new(0.8, "and sub-sub for 1st sub"));

        assert_eq!(
            expl.to_string(),
            "1.6 = short description\n\
             \x20 0.8 = half the score\n\
             \x20   0.8 = and sub-sub for 1st sub\n\
             \x20 2.0 = to make the difference\n\
             \x20   0.5 = sub-sub\n\
             \x20   4.0 = another sub-sub\n"
        );
    }
}
