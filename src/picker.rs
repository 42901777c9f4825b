#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Region,
    Language,
}

impl PickerKind {
    pub fn title(self) -> &'static str {
        match self {
            PickerKind::Region => "Select region",
            PickerKind::Language => "Select language",
        }
    }
}

const MAX_QUERY_LEN: usize = 32;

/// Popup list over a set of option labels, narrowed by a fuzzy query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picker {
    pub kind: PickerKind,
    pub query: String,
    pub selected: usize,
}

impl Picker {
    pub fn new(kind: PickerKind) -> Self {
        Self {
            kind,
            query: String::new(),
            selected: 0,
        }
    }

    pub fn push(&mut self, ch: char) {
        if !ch.is_control() && self.query.chars().count() < MAX_QUERY_LEN {
            self.query.push(ch);
            self.selected = 0;
        }
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self, options: &[String]) {
        let matches = filtered_indices(options, &self.query).len();
        if self.selected + 1 < matches {
            self.selected += 1;
        }
    }

    /// The option under the cursor, if the query matches anything.
    pub fn current<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        filtered_indices(options, &self.query)
            .get(self.selected)
            .map(|&index| options[index].as_str())
    }
}

/// Indices of `options` matching `query`, best match first. An empty query
/// keeps every option in its original order.
pub fn filtered_indices(options: &[String], query: &str) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..options.len()).collect();
    }
    let mut matches: Vec<(usize, usize)> = Vec::new();
    for (index, option) in options.iter().enumerate() {
        if let Some(score) = fuzzy_score(query, &option.to_lowercase()) {
            matches.push((score, index));
        }
    }
    matches.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| options[a.1].cmp(&options[b.1]))
    });
    matches.into_iter().map(|(_, index)| index).collect()
}

/// Sum of the gaps between consecutive query characters in `candidate`;
/// `None` unless every query character appears in order.
fn fuzzy_score(query: &str, candidate: &str) -> Option<usize> {
    let mut score = 0usize;
    let mut rest = candidate;
    for needle in query.to_lowercase().chars() {
        let found = rest.find(needle)?;
        score += found;
        rest = &rest[found + needle.len_utf8()..];
    }
    Some(score)
}
