//! Per-page interaction state read by the reducers.

use std::collections::HashSet;

use crate::graph::filter::SearchOutcome;

/// Current hover, drag and search status of one page session.
///
/// Mutated only by the interaction handlers; reducers treat it as read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	/// Current search field value.
	pub search_query: String,
	/// Nodes matching the query, when the query does not select a single node.
	pub suggestions: Option<HashSet<String>>,
	/// Set only on a unique exact label match.
	pub selected_node: Option<String>,
	/// Node under the pointer, or the dragged node while dragging.
	pub hovered_node: Option<String>,
	/// Neighbors of `hovered_node`.
	pub hovered_neighbors: Option<HashSet<String>>,
	/// Edge under the pointer.
	pub hovered_edge: Option<String>,
	/// Gate for every hover-driven effect.
	pub hovering: bool,
	/// A node drag is in progress.
	pub dragging: bool,
	/// Node being dragged.
	pub dragged_node: Option<String>,
}

impl InteractionState {
	/// Record a search result, keeping selection and suggestions exclusive.
	pub fn apply_search(&mut self, query: &str, outcome: SearchOutcome) {
		self.search_query = query.to_string();
		match outcome {
			SearchOutcome::Cleared => {
				self.selected_node = None;
				self.suggestions = None;
			}
			SearchOutcome::Selected(node) => {
				self.selected_node = Some(node);
				self.suggestions = None;
			}
			SearchOutcome::Suggested(nodes) => {
				self.selected_node = None;
				self.suggestions = Some(nodes);
			}
		}
	}

	/// Whether `node` is a neighbor of the hovered node.
	pub fn is_neighbor_of_hovered(&self, node: &str) -> bool {
		self.hovered_neighbors
			.as_ref()
			.is_some_and(|neighbors| neighbors.contains(node))
	}

	/// Whether `node` is among the search suggestions.
	pub fn is_suggested(&self, node: &str) -> bool {
		self.suggestions
			.as_ref()
			.is_some_and(|suggestions| suggestions.contains(node))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selection_and_suggestions_are_exclusive() {
		let mut state = InteractionState::default();

		state.apply_search("a", SearchOutcome::Suggested(["1".to_string()].into()));
		assert!(state.selected_node.is_none());
		assert!(state.is_suggested("1"));

		state.apply_search("alpha", SearchOutcome::Selected("1".into()));
		assert_eq!(state.selected_node.as_deref(), Some("1"));
		assert!(state.suggestions.is_none());

		state.apply_search("", SearchOutcome::Cleared);
		assert_eq!(state, InteractionState::default());
	}
}
