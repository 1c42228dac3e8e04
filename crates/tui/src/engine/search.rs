use lazyaz_core::Record;

/// A (row, column) position in the rendered table.
pub type MatchCoord = (usize, usize);

/// In-memory search over the rendered cells of the current record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    previous_query: String,
    matches: Vec<MatchCoord>,
    current: Option<usize>,
}

impl SearchState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Empty clears everything. Repeating the previous query steps to the
    /// next match (wrapping). A new query rescans every row.
    pub fn submit<R: Record>(&mut self, query: &str, records: &[R]) {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return;
        }

        if query == self.previous_query {
            self.query = query.to_string();
            if !self.matches.is_empty() {
                let next = self.current.map_or(0, |idx| (idx + 1) % self.matches.len());
                self.current = Some(next);
            }
            return;
        }

        self.query = query.to_string();
        self.previous_query = query.to_string();
        self.rescan(records);
    }

    /// Recompute matches for the active query against new rows, keeping
    /// the current position when it still exists.
    pub fn refresh<R: Record>(&mut self, records: &[R]) {
        if self.query.is_empty() {
            return;
        }
        let previous = self.current;
        self.rescan(records);
        if let (Some(prev), false) = (previous, self.matches.is_empty()) {
            self.current = Some(prev.min(self.matches.len() - 1));
        }
    }

    fn rescan<R: Record>(&mut self, records: &[R]) {
        let needle = self.query.to_lowercase();
        self.matches = records
            .iter()
            .enumerate()
            .filter_map(|(row, record)| {
                record
                    .cells()
                    .iter()
                    .position(|cell| cell.to_lowercase().contains(&needle))
                    .map(|col| (row, col))
            })
            .collect();
        self.current = if self.matches.is_empty() { None } else { Some(0) };
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn matches(&self) -> &[MatchCoord] {
        &self.matches
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_match(&self) -> Option<MatchCoord> {
        self.current.and_then(|idx| self.matches.get(idx).copied())
    }

    /// `Match i/N`, or `No matches!`.
    pub fn status(&self) -> String {
        match self.current {
            Some(idx) => format!("Match {}/{}", idx + 1, self.matches.len()),
            None => "No matches!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyaz_core::testing::{Ticket, tickets};

    fn rows() -> Vec<Ticket> {
        tickets(&["Alpha", "Beta", "Gamma", "alphabet soup"])
    }

    #[test]
    fn new_query_finds_each_matching_row_once() {
        let mut search = SearchState::default();
        search.submit("alpha", &rows());
        assert_eq!(search.matches(), &[(0, 0), (3, 0)]);
        assert_eq!(search.current_index(), Some(0));
        assert_eq!(search.status(), "Match 1/2");
    }

    #[test]
    fn repeated_query_cycles_and_wraps() {
        let rows = rows();
        let mut search = SearchState::default();
        search.submit("ALPHA", &rows);
        let first = search.matches().to_vec();

        search.submit("ALPHA", &rows);
        assert_eq!(search.matches(), first.as_slice());
        assert_eq!(search.current_index(), Some(1));

        search.submit("ALPHA", &rows);
        assert_eq!(search.current_index(), Some(0));
    }

    #[test]
    fn no_matches_stays_on_sentinel() {
        let rows = rows();
        let mut search = SearchState::default();
        search.submit("zeta", &rows);
        assert_eq!(search.current_index(), None);
        search.submit("zeta", &rows);
        assert_eq!(search.current_index(), None);
        assert_eq!(search.status(), "No matches!");
    }

    #[test]
    fn empty_query_clears_state() {
        let mut search = SearchState::default();
        search.submit("beta", &rows());
        search.submit("   ", &rows());
        assert_eq!(search, SearchState::default());
        assert!(!search.is_active());
    }

    #[test]
    fn refresh_clamps_position_to_new_matches() {
        let mut search = SearchState::default();
        let rows = rows();
        search.submit("a", &rows);
        search.submit("a", &rows);
        search.submit("a", &rows);
        assert_eq!(search.current_index(), Some(2));

        search.refresh(&tickets(&["Alpha"]));
        assert_eq!(search.matches(), &[(0, 0)]);
        assert_eq!(search.current_index(), Some(0));
    }
}
