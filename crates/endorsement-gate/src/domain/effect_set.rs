//! # Effect Set Extraction
//!
//! Decodes a proposal response payload down to its read/write set and maps
//! it onto the JSON document the decision service consumes.
//!
//! ## Decoding Chain
//!
//! ```text
//! ProposalResponsePayload.extension
//!   → ChaincodeAction.results
//!     → TxReadWriteSet.ns_rwset[*]
//!       ├─ .rwset                          → KvRwSet
//!       └─ .collection_hashed_rwset[*]
//!            └─ .hashed_rwset              → HashedRwSet
//! ```
//!
//! ## Canonical JSON
//!
//! Top-level and per-namespace keys use the field names the decision service
//! has always received (`NsRwSets`, `NameSpace`, `KvRwSet`,
//! `CollHashedRwSets`); the inner key/value records use their protobuf field
//! names. Zero values are omitted, byte strings are standard base64, and
//! every list keeps wire order.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Serialize, Serializer};
use shared_types::{
    decode_message, range_query_info, ChaincodeAction, CollectionHashedReadWriteSet, HashedRwSet,
    KvMetadataEntry, KvMetadataWrite, KvMetadataWriteHash, KvRead, KvReadHash, KvRwSet, KvWrite,
    KvWriteHash, NsReadWriteSet, ProposalResponsePayload, QueryReads, QueryReadsMerkleSummary,
    RangeQueryInfo, TxReadWriteSet, Version, WireError,
};
use std::fmt;

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn as_base64_list<S: Serializer>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(list.iter().map(|bytes| STANDARD.encode(bytes)))
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// JSON Document
// =============================================================================

/// The effect set of one proposed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EffectSet {
    /// One entry per chaincode namespace, in wire order.
    #[serde(rename = "NsRwSets")]
    pub ns_rw_sets: Vec<NsEffects>,
}

/// Effects within one namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NsEffects {
    /// Chaincode namespace.
    #[serde(rename = "NameSpace")]
    pub namespace: String,
    /// Public key/value reads and writes.
    #[serde(rename = "KvRwSet")]
    pub kv_rw_set: KvEffects,
    /// Hashed effects on private data collections.
    #[serde(rename = "CollHashedRwSets")]
    pub coll_hashed_rw_sets: Vec<CollectionEffects>,
}

/// Public key/value effects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct KvEffects {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reads: Vec<ReadEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub range_queries_info: Vec<RangeQueryEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub writes: Vec<WriteEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata_writes: Vec<MetadataWriteEntry>,
}

/// A key read, with the committed version observed (absent if the key did not exist).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct ReadEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionEntry>,
}

/// Block/transaction height of a committed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct VersionEntry {
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub block_num: u64,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub tx_num: u64,
}

/// A key written or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct WriteEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_delete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub value: Vec<u8>,
}

/// Metadata written for a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct MetadataWriteEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<MetadataEntry>,
}

/// Named metadata value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct MetadataEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub value: Vec<u8>,
}

/// A range query executed during simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct RangeQueryEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_key: String,
    #[serde(skip_serializing_if = "is_false")]
    pub itr_exhausted: bool,
    #[serde(rename = "ReadsInfo", skip_serializing_if = "Option::is_none")]
    pub reads_info: Option<RangeReadsEntry>,
}

/// How a range query's results were recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum RangeReadsEntry {
    RawReads {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        kv_reads: Vec<ReadEntry>,
    },
    ReadsMerkleHashes {
        #[serde(skip_serializing_if = "is_zero_u32")]
        max_degree: u32,
        #[serde(skip_serializing_if = "is_zero_u32")]
        max_level: u32,
        #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64_list")]
        max_level_hashes: Vec<Vec<u8>>,
    },
}

/// Hashed effects on one private data collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct CollectionEffects {
    #[serde(rename = "CollectionName")]
    pub collection_name: String,
    #[serde(rename = "HashedRwSet")]
    pub hashed_rw_set: HashedEffects,
    #[serde(rename = "PvtRwSetHash", serialize_with = "as_base64")]
    pub pvt_rw_set_hash: Vec<u8>,
}

/// Hashed reads and writes of a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct HashedEffects {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hashed_reads: Vec<HashedReadEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hashed_writes: Vec<HashedWriteEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata_writes: Vec<HashedMetadataWriteEntry>,
}

/// Hash of a private key read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct HashedReadEntry {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub key_hash: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionEntry>,
}

/// Hash of a private key/value write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct HashedWriteEntry {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub key_hash: Vec<u8>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_delete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub value_hash: Vec<u8>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_purge: bool,
}

/// Metadata written for a hashed private key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct HashedMetadataWriteEntry {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_base64")]
    pub key_hash: Vec<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<MetadataEntry>,
}

// =============================================================================
// Wire → JSON Mapping
// =============================================================================

impl From<&Version> for VersionEntry {
    fn from(version: &Version) -> Self {
        Self {
            block_num: version.block_num,
            tx_num: version.tx_num,
        }
    }
}

impl From<&KvRead> for ReadEntry {
    fn from(read: &KvRead) -> Self {
        Self {
            key: read.key.clone(),
            version: read.version.as_ref().map(VersionEntry::from),
        }
    }
}

impl From<&KvWrite> for WriteEntry {
    fn from(write: &KvWrite) -> Self {
        Self {
            key: write.key.clone(),
            is_delete: write.is_delete,
            value: write.value.clone(),
        }
    }
}

impl From<&KvMetadataEntry> for MetadataEntry {
    fn from(entry: &KvMetadataEntry) -> Self {
        Self {
            name: entry.name.clone(),
            value: entry.value.clone(),
        }
    }
}

impl From<&KvMetadataWrite> for MetadataWriteEntry {
    fn from(write: &KvMetadataWrite) -> Self {
        Self {
            key: write.key.clone(),
            entries: write.entries.iter().map(MetadataEntry::from).collect(),
        }
    }
}

impl From<&QueryReads> for RangeReadsEntry {
    fn from(reads: &QueryReads) -> Self {
        RangeReadsEntry::RawReads {
            kv_reads: reads.kv_reads.iter().map(ReadEntry::from).collect(),
        }
    }
}

impl From<&QueryReadsMerkleSummary> for RangeReadsEntry {
    fn from(summary: &QueryReadsMerkleSummary) -> Self {
        RangeReadsEntry::ReadsMerkleHashes {
            max_degree: summary.max_degree,
            max_level: summary.max_level,
            max_level_hashes: summary.max_level_hashes.clone(),
        }
    }
}

impl From<&RangeQueryInfo> for RangeQueryEntry {
    fn from(info: &RangeQueryInfo) -> Self {
        let reads_info = info.reads_info.as_ref().map(|reads| match reads {
            range_query_info::ReadsInfo::RawReads(raw) => RangeReadsEntry::from(raw),
            range_query_info::ReadsInfo::ReadsMerkleHashes(merkle) => RangeReadsEntry::from(merkle),
        });
        Self {
            start_key: info.start_key.clone(),
            end_key: info.end_key.clone(),
            itr_exhausted: info.itr_exhausted,
            reads_info,
        }
    }
}

impl From<&KvRwSet> for KvEffects {
    fn from(set: &KvRwSet) -> Self {
        Self {
            reads: set.reads.iter().map(ReadEntry::from).collect(),
            range_queries_info: set.range_queries_info.iter().map(RangeQueryEntry::from).collect(),
            writes: set.writes.iter().map(WriteEntry::from).collect(),
            metadata_writes: set.metadata_writes.iter().map(MetadataWriteEntry::from).collect(),
        }
    }
}

impl From<&KvReadHash> for HashedReadEntry {
    fn from(read: &KvReadHash) -> Self {
        Self {
            key_hash: read.key_hash.clone(),
            version: read.version.as_ref().map(VersionEntry::from),
        }
    }
}

impl From<&KvWriteHash> for HashedWriteEntry {
    fn from(write: &KvWriteHash) -> Self {
        Self {
            key_hash: write.key_hash.clone(),
            is_delete: write.is_delete,
            value_hash: write.value_hash.clone(),
            is_purge: write.is_purge,
        }
    }
}

impl From<&KvMetadataWriteHash> for HashedMetadataWriteEntry {
    fn from(write: &KvMetadataWriteHash) -> Self {
        Self {
            key_hash: write.key_hash.clone(),
            entries: write.entries.iter().map(MetadataEntry::from).collect(),
        }
    }
}

impl From<&HashedRwSet> for HashedEffects {
    fn from(set: &HashedRwSet) -> Self {
        Self {
            hashed_reads: set.hashed_reads.iter().map(HashedReadEntry::from).collect(),
            hashed_writes: set.hashed_writes.iter().map(HashedWriteEntry::from).collect(),
            metadata_writes: set
                .metadata_writes
                .iter()
                .map(HashedMetadataWriteEntry::from)
                .collect(),
        }
    }
}

fn decode_collection(
    collection: &CollectionHashedReadWriteSet,
) -> Result<CollectionEffects, WireError> {
    let hashed: HashedRwSet = decode_message(&collection.hashed_rwset, "HashedRWSet")?;
    Ok(CollectionEffects {
        collection_name: collection.collection_name.clone(),
        hashed_rw_set: HashedEffects::from(&hashed),
        pvt_rw_set_hash: collection.pvt_rwset_hash.clone(),
    })
}

fn decode_namespace(ns: &NsReadWriteSet) -> Result<NsEffects, WireError> {
    let kv: KvRwSet = decode_message(&ns.rwset, "KVRWSet")?;
    let collections = ns
        .collection_hashed_rwset
        .iter()
        .map(decode_collection)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NsEffects {
        namespace: ns.namespace.clone(),
        kv_rw_set: KvEffects::from(&kv),
        coll_hashed_rw_sets: collections,
    })
}

/// Decode `outcome` (an encoded `ProposalResponsePayload`) into its effect set.
///
/// # Errors
/// Any layer failing to decode yields `WireError::Decode` naming that layer.
pub fn extract_effect_set(outcome: &[u8]) -> Result<EffectSet, WireError> {
    let payload: ProposalResponsePayload = decode_message(outcome, "ProposalResponsePayload")?;
    let action: ChaincodeAction = decode_message(&payload.extension, "ChaincodeAction")?;
    let tx_rwset: TxReadWriteSet = decode_message(&action.results, "TxReadWriteSet")?;

    let ns_rw_sets = tx_rwset
        .ns_rwset
        .iter()
        .map(decode_namespace)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EffectSet { ns_rw_sets })
}

// =============================================================================
// Serialization & Summary
// =============================================================================

impl EffectSet {
    /// Serialize to the canonical JSON document sent for evaluation.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Counts for logging.
    pub fn summary(&self) -> EffectSetSummary {
        let mut summary = EffectSetSummary {
            namespaces: self.ns_rw_sets.len(),
            ..Default::default()
        };
        for ns in &self.ns_rw_sets {
            summary.reads += ns.kv_rw_set.reads.len();
            summary.writes += ns.kv_rw_set.writes.len();
            summary.range_queries += ns.kv_rw_set.range_queries_info.len();
            summary.collections += ns.coll_hashed_rw_sets.len();
        }
        summary
    }
}

/// Size of an effect set, for logs and metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct EffectSetSummary {
    pub namespaces: usize,
    pub reads: usize,
    pub writes: usize,
    pub range_queries: usize,
    pub collections: usize,
}

impl fmt::Display for EffectSetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} namespaces, {} reads, {} writes, {} range queries, {} collections",
            self.namespaces, self.reads, self.writes, self.range_queries, self.collections
        )
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Outcome builders shared by the gate's tests.
#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use prost::Message;

    /// Encode a proposal response payload whose read/write set is `namespaces`.
    pub fn encode_outcome(namespaces: Vec<(&str, KvRwSet)>) -> Vec<u8> {
        let tx_rwset = TxReadWriteSet {
            data_model: 0,
            ns_rwset: namespaces
                .into_iter()
                .map(|(namespace, kv)| NsReadWriteSet {
                    namespace: namespace.to_string(),
                    rwset: kv.encode_to_vec(),
                    collection_hashed_rwset: vec![],
                })
                .collect(),
        };
        encode_outcome_with_rwset(&tx_rwset)
    }

    /// Encode a proposal response payload around an arbitrary read/write set.
    pub fn encode_outcome_with_rwset(tx_rwset: &TxReadWriteSet) -> Vec<u8> {
        let action = ChaincodeAction {
            results: tx_rwset.encode_to_vec(),
            ..Default::default()
        };
        ProposalResponsePayload {
            proposal_hash: vec![0xAA; 32],
            extension: action.encode_to_vec(),
        }
        .encode_to_vec()
    }

    /// A namespace that reads `key` at version (1, 0) and writes `value` to it.
    pub fn read_write(key: &str, value: &[u8]) -> KvRwSet {
        KvRwSet {
            reads: vec![KvRead {
                key: key.to_string(),
                version: Some(Version {
                    block_num: 1,
                    tx_num: 0,
                }),
            }],
            writes: vec![KvWrite {
                key: key.to_string(),
                is_delete: false,
                value: value.to_vec(),
            }],
            ..Default::default()
        }
    }
}
