//! Phase 1: scans every physical page, filters bad blocks and erased pages,
//! parses OOB tags, and builds the Page Index and Object Table, resolving
//! log-structured overwrites by sequence number.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read, Seek};

use log::{info, warn};

use crate::bytes::read_u32_le;
use crate::classify::{classify, is_bad_block, PageKind};
use crate::geometry::Geometry;
use crate::page_source::PageSource;

/// One record per physical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRecord {
    pub seq_num: u32,
    pub obj_id: u16,
    pub is_header: bool,
    /// 1-based chunk index within the owning object; unused for headers.
    pub chunk_id: u16,
    pub valid: bool,
}

/// One record per logical object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub exists: bool,
    pub header_page_addr: u32,
    pub seq_num: u32,
    /// `1` = regular file, `3` = directory, `4` = accepted but unused.
    pub obj_type: u16,
    pub parent_id: u32,
    /// The name as stored, already split at the first NUL byte.
    pub name: Vec<u8>,
}

/// A candidate replica for one chunk of one file, recorded during Phase 1
/// so the Extractor doesn't have to re-scan the whole Page Index per file
/// (see SPEC_FULL.md's "secondary chunk index" supplement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCandidate {
    pub chunk_id: u16,
    pub seq_num: u32,
    pub page_addr: u32,
}

/// The Page Index and Object Table produced by Phase 1.
#[derive(Debug, Default)]
pub struct Index {
    pub pages: HashMap<u32, PageRecord>,
    pub objects: HashMap<u16, ObjectRecord>,
    chunk_candidates: HashMap<u16, BTreeMap<u16, Vec<ChunkCandidate>>>,
    pub pages_scanned: u32,
    pub header_updates: u32,
}

impl Index {
    pub fn object(&self, obj_id: u16) -> Option<&ObjectRecord> {
        self.objects.get(&obj_id)
    }

    /// Candidate replicas for `obj_id`, grouped by chunk id in ascending order.
    pub fn chunks_of(&self, obj_id: u16) -> Option<&BTreeMap<u16, Vec<ChunkCandidate>>> {
        self.chunk_candidates.get(&obj_id)
    }
}

/// Runs Phase 1 to completion (until a short read ends the scan or
/// `geometry.max_pages` is reached).
pub fn build_index<D: Read + Seek, O: Read + Seek>(
    source: &mut PageSource<D, O>,
) -> io::Result<Index> {
    let geometry: Geometry = *source.geometry();
    let mut index = Index::default();
    let mut p: u32 = 0;

    info!("phase 1: scanning nand (index building)");

    while p < geometry.max_pages {
        if geometry.is_block_boundary(p) {
            let Some(oob) = source.read_oob(p)? else {
                break;
            };
            if is_bad_block(&oob) {
                warn!("bad block at page {p}, skipping {} pages", geometry.block_pages);
                p += geometry.block_pages as u32;
                continue;
            }
        }

        let Some(oob) = source.read_oob(p)? else {
            break;
        };
        index.pages_scanned += 1;

        match classify(&oob) {
            PageKind::Erased | PageKind::SentinelObjId => {}

            PageKind::Header { seq_num, obj_id } if obj_id as u32 >= geometry.max_objects => {
                warn!(
                    "header at page {p} names obj_id {obj_id} >= max_objects {}, skipping",
                    geometry.max_objects
                );
            }

            PageKind::Data { obj_id, .. } if obj_id as u32 >= geometry.max_objects => {
                warn!(
                    "data page at page {p} names obj_id {obj_id} >= max_objects {}, skipping",
                    geometry.max_objects
                );
            }

            PageKind::Header { seq_num, obj_id } => {
                let Some(data) = source.read_data(p)? else {
                    break;
                };

                let obj_type = read_u32_le(&data, 0);
                if !matches!(obj_type, 1 | 3 | 4) {
                    warn!("corrupt header at page {p}: unrecognized obj_type {obj_type}");
                } else {
                    index.pages.insert(
                        p,
                        PageRecord {
                            seq_num,
                            obj_id,
                            is_header: true,
                            chunk_id: 0,
                            valid: true,
                        },
                    );

                    let update_needed = match index.objects.get(&obj_id) {
                        None => true,
                        Some(existing) => seq_num >= existing.seq_num,
                    };
                    if update_needed {
                        let parent_id = read_u32_le(&data, 4);
                        let name = read_name(&data);
                        index.objects.insert(
                            obj_id,
                            ObjectRecord {
                                exists: true,
                                header_page_addr: p,
                                seq_num,
                                obj_type: obj_type as u16,
                                parent_id,
                                name,
                            },
                        );
                        index.header_updates += 1;
                    }
                }
            }

            PageKind::Data {
                seq_num,
                obj_id,
                chunk_id,
            } => {
                index.pages.insert(
                    p,
                    PageRecord {
                        seq_num,
                        obj_id,
                        is_header: false,
                        chunk_id,
                        valid: true,
                    },
                );
                index
                    .chunk_candidates
                    .entry(obj_id)
                    .or_default()
                    .entry(chunk_id)
                    .or_default()
                    .push(ChunkCandidate {
                        chunk_id,
                        seq_num,
                        page_addr: p,
                    });
            }
        }

        p += 1;
    }

    info!(
        "phase 1 complete: {} pages scanned, {} valid headers found",
        index.pages_scanned, index.header_updates
    );

    Ok(index)
}

/// Extracts the null-terminated name starting at offset 10 of a header
/// page's data payload, capped at 255 bytes per the spec's data layout.
fn read_name(data: &[u8]) -> Vec<u8> {
    const NAME_OFFSET: usize = 10;
    const NAME_MAX: usize = 255;

    let start = NAME_OFFSET.min(data.len());
    let end = (start + NAME_MAX).min(data.len());
    let raw = &data[start..end];
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..len].to_vec()
}
