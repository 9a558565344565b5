//! Binary save/load with breadth-first node numbering
//!
//! On-disk layout (all integers little-endian, fixed for cross-platform
//! exchange):
//!
//! ```text
//! Header:  u32 magic=0x41544C35, u32 version=1, u32 nodeCount
//! Record[nodeCount], in breadth-first id order:
//!   u8  isQuestion (1 or 0)
//!   u32 textLen
//!   u8[textLen] text  (no terminator)
//!   i32 yesId (-1 if absent)
//!   i32 noId  (-1 if absent)
//! ```
//!
//! Breadth-first numbering starts at 0 for the root and assigns each
//! discovered `yes` child the next id, then the `no` child, so a parent's id
//! is always smaller than either child's.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::integrity;
use crate::queue::BfsQueue;
use crate::tree::{Branch, DecisionTree, NodeId};
use crate::KbError;

/// File magic: "5LTA" little-endian ("ATL5" read big-endian)
pub const MAGIC: u32 = 0x4154_4C35;

/// Current format version
pub const VERSION: u32 = 1;

/// Upper bound on a single record's text length
pub const MAX_TEXT_LEN: u32 = 10_000;

/// Sentinel child id for "absent"
const NO_CHILD: i32 = -1;

/// Write the tree to `path`, returning the number of nodes written
///
/// Fails with [`KbError::EmptyTree`] when the root is absent. Any write
/// failure aborts the whole save; no partially written file is reported as
/// success.
pub fn save(tree: &DecisionTree, path: &Path) -> Result<u32, KbError> {
    let root = tree.root().ok_or(KbError::EmptyTree)?;

    // Breadth-first id assignment: root = 0, then yes child, then no child
    let mut order: Vec<NodeId> = Vec::new();
    let mut ids: HashMap<NodeId, i32> = HashMap::new();
    let mut queue = BfsQueue::new();
    order.push(root);
    ids.insert(root, 0);
    queue.push_back(root, 0);
    let mut next_id: i32 = 1;

    while let Some((current, _)) = queue.pop_front() {
        let node = tree.node(current)?;
        for child in [node.yes(), node.no()].into_iter().flatten() {
            ids.insert(child, next_id);
            order.push(child);
            queue.push_back(child, next_id as u32);
            next_id += 1;
        }
    }

    // Enforce the record limit before touching the file: a tree that cannot
    // be loaded back must not save successfully either.
    for id in &order {
        let len = tree.node(*id)?.text().len();
        if len > MAX_TEXT_LEN as usize {
            return Err(KbError::TextTooLong {
                len: len as u32,
                max: MAX_TEXT_LEN,
            });
        }
    }

    let count = order.len() as u32;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&MAGIC.to_le_bytes())?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&count.to_le_bytes())?;

    for id in &order {
        let node = tree.node(*id)?;
        let text = node.text().as_bytes();
        writer.write_all(&[u8::from(node.is_question())])?;
        writer.write_all(&(text.len() as u32).to_le_bytes())?;
        writer.write_all(text)?;
        let yes_id = node.yes().map_or(NO_CHILD, |c| ids[&c]);
        let no_id = node.no().map_or(NO_CHILD, |c| ids[&c]);
        writer.write_all(&yes_id.to_le_bytes())?;
        writer.write_all(&no_id.to_le_bytes())?;
    }
    writer.flush()?;

    info!(path = %path.display(), nodes = count, "saved tree");
    Ok(count)
}

/// Read a tree from `path`
///
/// Builds the result into a fresh arena and hands it back only once every
/// record has been read, validated, linked, and the reconstructed tree has
/// passed the integrity sweep. On any failure the fresh arena is dropped
/// wholesale; the caller's live tree is never touched.
pub fn load(path: &Path) -> Result<DecisionTree, KbError> {
    let mut reader = BufReader::new(File::open(path)?);

    let magic = read_u32(&mut reader)?;
    if magic != MAGIC {
        return Err(KbError::BadMagic { found: magic });
    }
    let version = read_u32(&mut reader)?;
    if version != VERSION {
        return Err(KbError::BadVersion { found: version });
    }
    let count = read_u32(&mut reader)?;

    let mut tree = DecisionTree::new();
    if count == 0 {
        return Ok(tree);
    }

    // Pass 1: allocate one node per record, remembering raw child ids
    let mut nodes: Vec<NodeId> = Vec::with_capacity(count as usize);
    let mut child_ids: Vec<(i32, i32)> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let is_question = read_u8(&mut reader)? != 0;
        let text_len = read_u32(&mut reader)?;
        if text_len > MAX_TEXT_LEN {
            return Err(KbError::TextTooLong {
                len: text_len,
                max: MAX_TEXT_LEN,
            });
        }
        let mut buf = vec![0u8; text_len as usize];
        reader.read_exact(&mut buf)?;
        let text = String::from_utf8(buf).map_err(|_| KbError::TextNotUtf8)?;

        let yes_id = read_i32(&mut reader)?;
        let no_id = read_i32(&mut reader)?;
        for id in [yes_id, no_id] {
            if id < NO_CHILD || id >= count as i32 {
                return Err(KbError::BadChildId { id, count });
            }
        }

        let node = if is_question {
            tree.make_question(&text)?
        } else {
            tree.make_leaf(&text)?
        };
        nodes.push(node);
        child_ids.push((yes_id, no_id));
    }

    // Pass 2: link children now that every node exists. Each non-root record
    // must be referenced exactly once, and the root never - otherwise the
    // file encodes a DAG or an orphan, not a tree.
    let mut referenced = vec![false; count as usize];
    for (record, &(yes_id, no_id)) in nodes.iter().zip(child_ids.iter()) {
        for (branch, id) in [(Branch::Yes, yes_id), (Branch::No, no_id)] {
            if id == NO_CHILD {
                continue;
            }
            if id == 0 || referenced[id as usize] {
                warn!(id, "child id referenced twice or points at the root");
                return Err(KbError::CorruptTree);
            }
            referenced[id as usize] = true;
            tree.set_branch(*record, branch, Some(nodes[id as usize]))?;
        }
    }
    if referenced.iter().skip(1).any(|seen| !seen) {
        warn!("record unreachable from the root");
        return Err(KbError::CorruptTree);
    }

    tree.set_root(Some(nodes[0]))?;
    if !integrity::check(&tree) {
        return Err(KbError::CorruptTree);
    }

    info!(path = %path.display(), nodes = count, "loaded tree");
    Ok(tree)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, KbError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, KbError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, KbError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
