//! Ancestor navigation history for the element awaiting confirmation.
//!
//! Index 0 is the element the user clicked. Each ascent appends that element's
//! parent, so `entries[i]` strictly contains `entries[i - 1]`. Descending only
//! unwinds earlier ascents: there is no single "child" to pick among many, so
//! moving down means undoing a move up.

/// Lazily built chain of ancestors with a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationHistory<N> {
	entries: Vec<N>,
	index: usize,
}

impl<N: Clone + PartialEq> NavigationHistory<N> {
	/// Starts a history at the originally selected element.
	pub fn seed(origin: N) -> Self {
		Self {
			entries: vec![origin],
			index: 0,
		}
	}

	/// Element under the cursor; always `entries[index]`.
	pub fn current(&self) -> &N {
		&self.entries[self.index]
	}

	pub fn origin(&self) -> &N {
		&self.entries[0]
	}

	pub fn index(&self) -> usize {
		self.index
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn is_at_end(&self) -> bool {
		self.index + 1 == self.entries.len()
	}

	pub fn can_move_down(&self) -> bool {
		self.index > 0
	}

	pub fn as_slice(&self) -> &[N] {
		&self.entries
	}

	/// Moves the cursor to `parent`, the parent of the current element.
	///
	/// At the end of the chain the parent is appended. Otherwise the recorded
	/// ancestor is reused, so alternating up/down never rebuilds the chain. If
	/// the page has re-parented the current element since it was recorded, the
	/// stale tail is dropped and replaced with the live parent.
	pub fn ascend(&mut self, parent: N) {
		if !self.is_at_end() && self.entries[self.index + 1] != parent {
			self.entries.truncate(self.index + 1);
		}
		if self.is_at_end() {
			self.entries.push(parent);
		}
		self.index += 1;
	}

	/// Moves the cursor one step back toward the origin.
	///
	/// Returns `false`, leaving the history untouched, at index 0.
	pub fn descend(&mut self) -> bool {
		if self.index == 0 {
			return false;
		}
		self.index -= 1;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seed_starts_at_origin() {
		let history = NavigationHistory::seed("span");
		assert_eq!(history.current(), &"span");
		assert_eq!(history.index(), 0);
		assert_eq!(history.len(), 1);
		assert!(!history.can_move_down());
	}

	#[test]
	fn ascend_appends_then_reuses() {
		let mut history = NavigationHistory::seed("span");
		history.ascend("p");
		history.ascend("section");
		assert_eq!(history.as_slice(), &["span", "p", "section"]);
		assert_eq!(history.index(), 2);

		assert!(history.descend());
		assert!(history.descend());
		assert_eq!(history.current(), &"span");

		history.ascend("p");
		assert_eq!(history.as_slice(), &["span", "p", "section"]);
		assert_eq!(history.index(), 1);
		assert_eq!(history.current(), &"p");
	}

	#[test]
	fn ascend_replaces_stale_tail() {
		let mut history = NavigationHistory::seed("span");
		history.ascend("p");
		history.ascend("section");
		history.descend();
		history.descend();

		history.ascend("li");
		assert_eq!(history.as_slice(), &["span", "li"]);
		assert_eq!(history.current(), &"li");
	}

	#[test]
	fn descend_stops_at_origin() {
		let mut history = NavigationHistory::seed("span");
		assert!(!history.descend());
		assert_eq!(history.index(), 0);
		assert_eq!(history.current(), &"span");
	}
}
