use std::collections::HashSet;

use crag_domain::{
	document::Document,
	quality::{RoundFilter, RoundRejectReason},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
	Accepted,
	Duplicate,
	Rejected(RoundRejectReason),
}

/// Unique, filter-passing documents gathered across rounds, in arrival order.
#[derive(Debug)]
pub struct AcceptedSet {
	filter: RoundFilter,
	seen: HashSet<String>,
	docs: Vec<Document>,
}
impl AcceptedSet {
	pub fn new(filter: RoundFilter) -> Self {
		Self { filter, seen: HashSet::new(), docs: Vec::new() }
	}

	pub fn from_config(cfg: &crag_config::SearchFilter) -> Self {
		Self::new(RoundFilter {
			min_title_chars: cfg.min_title_chars as usize,
			min_abstract_chars: cfg.min_abstract_chars as usize,
			blocked_title_terms: cfg.blocked_title_terms.clone(),
		})
	}

	/// Adds an already-vetted document without running the filter.
	pub fn seed(&mut self, doc: Document) {
		if self.seen.insert(doc.id.clone()) {
			self.docs.push(doc);
		}
	}

	/// Marks an id as taken without contributing a document.
	pub fn exclude(&mut self, id: &str) {
		self.seen.insert(id.to_string());
	}

	pub fn offer(&mut self, doc: Document) -> Offer {
		if self.seen.contains(&doc.id) {
			return Offer::Duplicate;
		}
		if let Err(reason) = self.filter.check(&doc) {
			return Offer::Rejected(reason);
		}

		self.seen.insert(doc.id.clone());
		self.docs.push(doc);

		Offer::Accepted
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	pub fn docs(&self) -> &[Document] {
		&self.docs
	}

	pub fn into_docs(self) -> Vec<Document> {
		self.docs
	}
}
