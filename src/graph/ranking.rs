use super::Node;

/// Top `count` nodes by total degree, ties kept in insertion order.
pub fn rank<'a, I>(nodes: I, count: usize) -> Vec<&'a Node>
where
	I: IntoIterator<Item = &'a Node>,
{
	let mut ranked: Vec<&Node> = nodes.into_iter().collect();
	// sort_by is stable
	ranked.sort_by(|a, b| b.total_links.cmp(&a.total_links));
	ranked.truncate(count);
	ranked
}
