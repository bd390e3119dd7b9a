//! Phase 2 (per file): enumerates an object's data pages, groups them by
//! chunk id, selects the winning replica for each chunk, and emits the
//! reconstructed byte stream.

use std::io::{self, Read, Seek};

use log::{debug, warn};

use crate::index::{ChunkCandidate, Index};
use crate::page_source::PageSource;

/// Chunk ids at or above this are treated as corrupt and ignored when
/// determining a file's extent (see the spec's extent-scan rule).
const MAX_PLAUSIBLE_CHUNK_ID: u16 = 60_000;

/// Result of extracting one file.
pub struct ExtractedFile {
    pub bytes: Vec<u8>,
    pub chunks_total: u32,
    pub chunks_missing: u32,
}

/// Reconstructs object `obj_id`'s byte stream: empty if it has no data
/// pages, otherwise `max_chunk * page_size` bytes with `0xFF` padding for
/// any chunk that has no surviving replica.
pub fn extract_file<D: Read + Seek, O: Read + Seek>(
    source: &mut PageSource<D, O>,
    index: &Index,
    obj_id: u16,
) -> io::Result<ExtractedFile> {
    let page_size = source.geometry().page_size;

    let max_chunk = index
        .chunks_of(obj_id)
        .and_then(|chunks| {
            chunks
                .keys()
                .copied()
                .filter(|&c| c < MAX_PLAUSIBLE_CHUNK_ID)
                .max()
        })
        .unwrap_or(0);

    if max_chunk == 0 {
        return Ok(ExtractedFile {
            bytes: Vec::new(),
            chunks_total: 0,
            chunks_missing: 0,
        });
    }

    let mut bytes = Vec::with_capacity(max_chunk as usize * page_size);
    let mut chunks_missing = 0;

    for chunk_id in 1..=max_chunk {
        let winner = index
            .chunks_of(obj_id)
            .and_then(|chunks| chunks.get(&chunk_id))
            .and_then(|candidates| select_winner(candidates));

        match winner {
            Some(candidate) => {
                debug!(
                    "  chunk {chunk_id}: selected page {} (seq {})",
                    candidate.page_addr, candidate.seq_num
                );
                match source.read_data(candidate.page_addr)? {
                    Some(page) => bytes.extend_from_slice(&page),
                    None => {
                        // The page that the index points at no longer reads back
                        // (dump truncated after Phase 1 built its index in memory);
                        // treat exactly like a missing chunk.
                        warn!("  chunk {chunk_id}: selected page {} unreadable, padding", candidate.page_addr);
                        bytes.extend(std::iter::repeat(0xFFu8).take(page_size));
                        chunks_missing += 1;
                    }
                }
            }
            None => {
                warn!("  chunk {chunk_id}: missing, padding with 0xFF");
                bytes.extend(std::iter::repeat(0xFFu8).take(page_size));
                chunks_missing += 1;
            }
        }
    }

    Ok(ExtractedFile {
        bytes,
        chunks_total: max_chunk as u32,
        chunks_missing,
    })
}

/// Highest `seq_num` wins; ties go to the larger physical page address.
fn select_winner(candidates: &[ChunkCandidate]) -> Option<&ChunkCandidate> {
    candidates
        .iter()
        .max_by(|a, b| a.seq_num.cmp(&b.seq_num).then(a.page_addr.cmp(&b.page_addr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(chunk_id: u16, seq_num: u32, page_addr: u32) -> ChunkCandidate {
        ChunkCandidate {
            chunk_id,
            seq_num,
            page_addr,
        }
    }

    #[test]
    fn winner_is_highest_seq_num() {
        let candidates = vec![candidate(1, 100, 10), candidate(1, 200, 20)];
        let w = select_winner(&candidates).unwrap();
        assert_eq!(w.page_addr, 20);
    }

    #[test]
    fn tie_goes_to_larger_page_address() {
        let candidates = vec![candidate(1, 100, 30), candidate(1, 100, 10)];
        let w = select_winner(&candidates).unwrap();
        assert_eq!(w.page_addr, 30);
    }

    #[test]
    fn no_candidates_is_none() {
        assert!(select_winner(&[]).is_none());
    }
}
