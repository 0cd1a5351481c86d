//! Mutation tokens and read-your-own-writes consistency state.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Identifies the state of a vbucket after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationToken {
    bucket_name: String,
    vbucket_id: u16,
    vbucket_uuid: u64,
    sequence_number: u64,
}

impl MutationToken {
    /// Creates a new mutation token.
    pub fn new(
        bucket_name: impl Into<String>,
        vbucket_id: u16,
        vbucket_uuid: u64,
        sequence_number: u64,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            vbucket_id,
            vbucket_uuid,
            sequence_number,
        }
    }

    /// Returns the bucket the mutation happened in.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Returns the vbucket identifier.
    pub fn vbucket_id(&self) -> u16 {
        self.vbucket_id
    }

    /// Returns the vbucket UUID.
    pub fn vbucket_uuid(&self) -> u64 {
        self.vbucket_uuid
    }

    /// Returns the sequence number of the mutation.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }
}

/// A set of mutation tokens a query must observe before it executes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    tokens: Vec<MutationToken>,
}

impl MutationState {
    /// Creates an empty mutation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tokens to the state.
    pub fn add(&mut self, tokens: impl IntoIterator<Item = MutationToken>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Returns the tokens in insertion order.
    pub fn tokens(&self) -> &[MutationToken] {
        &self.tokens
    }

    /// Returns true if no tokens were added.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Renders the state as search consistency vectors.
    ///
    /// The result maps each bucket to an object keyed by `"<vbid>/<vbuuid>"`
    /// whose values are sequence numbers. If a vbucket appears more than once,
    /// the highest sequence number is kept.
    pub fn to_search_vectors(&self) -> Value {
        let mut buckets: BTreeMap<&str, BTreeMap<String, u64>> = BTreeMap::new();
        for token in &self.tokens {
            let key = format!("{}/{}", token.vbucket_id, token.vbucket_uuid);
            let seqno = buckets
                .entry(token.bucket_name.as_str())
                .or_default()
                .entry(key)
                .or_insert(token.sequence_number);
            *seqno = (*seqno).max(token.sequence_number);
        }

        let vectors: Map<String, Value> = buckets
            .into_iter()
            .map(|(bucket, entries)| {
                let entries: Map<String, Value> = entries
                    .into_iter()
                    .map(|(key, seqno)| (key, Value::from(seqno)))
                    .collect();
                (bucket.to_string(), Value::Object(entries))
            })
            .collect();
        Value::Object(vectors)
    }
}

impl FromIterator<MutationToken> for MutationState {
    fn from_iter<T: IntoIterator<Item = MutationToken>>(iter: T) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
