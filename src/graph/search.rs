//! Typeahead matching for the node search box.

use super::Node;

/// Queries shorter than this never match.
pub const MIN_QUERY_CHARS: usize = 3;

/// Nodes whose id contains `query`, ignoring case, in graph order.
/// Whitespace in the query counts toward the minimum and must match.
pub fn match_nodes<'a>(nodes: &'a [Node], query: &str, limit: usize) -> Vec<&'a Node> {
	if query.chars().count() < MIN_QUERY_CHARS {
		return Vec::new();
	}
	let term = query.to_uppercase();
	nodes
		.iter()
		.filter(|n| n.id.to_uppercase().contains(&term))
		.take(limit)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes(ids: &[&str]) -> Vec<Node> {
		ids.iter()
			.map(|id| Node {
				id: id.to_string(),
				total_links: 1,
				input_links: 1,
				output_links: 0,
				color: String::new(),
			})
			.collect()
	}

	#[test]
	fn test_short_queries_do_not_match() {
		let nodes = nodes(&["alpha", "beta"]);
		assert!(match_nodes(&nodes, "al", 10).is_empty());
		assert!(match_nodes(&nodes, "", 10).is_empty());
	}

	#[test]
	fn test_spaces_count_toward_minimum() {
		let nodes = nodes(&["svc al", "alpha"]);
		let found: Vec<_> = match_nodes(&nodes, " al", 10)
			.into_iter()
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(found, ["svc al"]);
		assert!(match_nodes(&nodes, "al ", 10).is_empty());
	}

	#[test]
	fn test_substring_match_ignores_case() {
		let nodes = nodes(&["Alphabet", "BETA", "gamma", "alphanumeric"]);
		let found: Vec<_> = match_nodes(&nodes, "ALP", 10)
			.into_iter()
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(found, ["Alphabet", "alphanumeric"]);

		let found: Vec<_> = match_nodes(&nodes, "eta", 10)
			.into_iter()
			.map(|n| n.id.as_str())
			.collect();
		assert_eq!(found, ["BETA"]);
	}

	#[test]
	fn test_limit() {
		let nodes = nodes(&["node-1", "node-2", "node-3"]);
		assert_eq!(match_nodes(&nodes, "node", 2).len(), 2);
	}
}
