use crate::filter::{FilterLeaf, FilterNode, FilterValue};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

///
/// FilterFingerprint
///
/// Structural SHA-256 digest of a filter tree, used to key compiled
/// predicate caches. Identical trees always produce identical digests.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FilterFingerprint([u8; 32]);

impl FilterFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for FilterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Fingerprint one filter tree.
#[must_use]
pub fn fingerprint(node: &FilterNode) -> FilterFingerprint {
    let mut hasher = Sha256::new();
    hash_node(&mut hasher, node);

    FilterFingerprint(hasher.finalize().into())
}

/// Hash filter structure into the fingerprint stream.
fn hash_node(hasher: &mut Sha256, node: &FilterNode) {
    match node {
        FilterNode::Group {
            conjunction,
            children,
        } => {
            write_tag(hasher, 0x21);
            write_tag(hasher, conjunction.tag());
            write_len_u32(hasher, children.len());
            for child in children {
                hash_node(hasher, child);
            }
        }
        FilterNode::Leaf(leaf) => hash_leaf(hasher, leaf),
    }
}

fn hash_leaf(hasher: &mut Sha256, leaf: &FilterLeaf) {
    write_tag(hasher, 0x22);
    write_str(hasher, &leaf.field_id);
    write_tag(hasher, leaf.operator.tag());

    match &leaf.value {
        FilterValue::Literal(value) => {
            write_tag(hasher, 0x31);
            write_value(hasher, value);
        }
        FilterValue::FieldRef(target) => {
            write_tag(hasher, 0x32);
            write_str(hasher, target);
        }
        FilterValue::Null => write_tag(hasher, 0x33),
    }

    match &leaf.sub_key {
        Some(key) => {
            write_tag(hasher, 0x41);
            write_str(hasher, key);
        }
        None => write_tag(hasher, 0x40),
    }
}

///
/// Encode one JSON literal into the fingerprint stream.
///
/// `serde_json` objects keep keys sorted, so the encoding is canonical.
///

fn write_value(hasher: &mut Sha256, value: &Value) {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            write_len_u32(hasher, bytes.len());
            hasher.update(bytes);
        }
        Err(err) => {
            write_tag(hasher, 0xEE);
            write_str(hasher, &err.to_string());
        }
    }
}

///
/// Encode one string with length prefix into the fingerprint stream.
///

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
