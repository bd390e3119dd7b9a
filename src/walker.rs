//! Phase 2: walks the Object Table by parent link starting from the root,
//! creating directories and delegating file objects to the Extractor.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::extractor::extract_file;
use crate::index::Index;
use crate::page_source::PageSource;
use crate::sanitize::sanitize_name;

const ROOT_OBJ_ID: u32 = 1;
const OBJ_TYPE_FILE: u16 = 1;
const OBJ_TYPE_DIR: u16 = 3;

/// Counters the CLI reports after a run finishes.
#[derive(Debug, Default)]
pub struct WalkSummary {
    pub directories_created: u32,
    pub files_extracted: u32,
    pub chunks_padded: u32,
}

/// Runs Phase 2: creates `output_root` and recreates the reachable subtree
/// of the Object Table under it.
pub fn walk_and_extract<D: Read + Seek, O: Read + Seek>(
    source: &mut PageSource<D, O>,
    index: &Index,
    output_root: &Path,
) -> io::Result<WalkSummary> {
    if index.object(1).is_none() {
        warn!("object 1 (root) not found in the index; walking from id 1 anyway");
    }

    let children = children_by_parent(index);

    let mut summary = WalkSummary::default();
    let mut visited = HashSet::new();
    let mut stack = vec![(ROOT_OBJ_ID, output_root.to_path_buf())];

    while let Some((current_id, current_path)) = stack.pop() {
        if !visited.insert(current_id) {
            warn!("parent cycle detected at object {current_id}, aborting this subtree");
            continue;
        }

        let Some(kids) = children.get(&current_id) else {
            continue;
        };

        for &child_id in kids {
            let obj = index
                .object(child_id)
                .expect("children index is derived from existing objects only");
            let name = sanitize_name(&obj.name, child_id);
            let child_path = current_path.join(&name);

            match obj.obj_type {
                OBJ_TYPE_DIR => match fs::create_dir_all(&child_path) {
                    Ok(()) => {
                        summary.directories_created += 1;
                        stack.push((child_id as u32, child_path));
                    }
                    Err(e) => {
                        warn!(
                            "cannot create output directory {}: {e}, skipping subtree",
                            child_path.display()
                        );
                    }
                },
                OBJ_TYPE_FILE => {
                    info!("extracting file: {} (obj {child_id})", child_path.display());
                    let extracted = extract_file(source, index, child_id)?;
                    match fs::File::create(&child_path) {
                        Ok(mut f) => {
                            f.write_all(&extracted.bytes)?;
                            summary.files_extracted += 1;
                            summary.chunks_padded += extracted.chunks_missing;
                        }
                        Err(e) => {
                            warn!("cannot create output file {}: {e}", child_path.display());
                        }
                    }
                }
                other => {
                    // obj_type == 4 ("recognized but unused") and anything else
                    // is accepted by the parser but not emitted.
                    warn!("object {child_id} has non-emittable type {other}, skipping");
                }
            }
        }
    }

    Ok(summary)
}

/// `parent_id -> [obj_id, ...]`, built once from the Object Table so the
/// walker doesn't rescan every object per directory (see the source spec's
/// "Recursive tree walk → explicit stack" redesign flag).
fn children_by_parent(index: &Index) -> HashMap<u32, Vec<u16>> {
    let mut children: HashMap<u32, Vec<u16>> = HashMap::new();
    for (&obj_id, obj) in &index.objects {
        children.entry(obj.parent_id).or_default().push(obj_id);
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::index::{build_index, ObjectRecord};
    use std::io::Cursor;

    fn empty_source() -> PageSource<Cursor<Vec<u8>>, Cursor<Vec<u8>>> {
        PageSource::new(Cursor::new(Vec::new()), Cursor::new(Vec::new()), Geometry::default())
    }

    fn object(obj_type: u16, parent_id: u32, name: &[u8]) -> ObjectRecord {
        ObjectRecord {
            exists: true,
            header_page_addr: 0,
            seq_num: 1,
            obj_type,
            parent_id,
            name: name.to_vec(),
        }
    }

    #[test]
    fn creates_empty_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = Index::default();
        index.objects.insert(2, object(OBJ_TYPE_DIR, 1, b"dir"));

        let mut source = empty_source();
        let summary = walk_and_extract(&mut source, &index, tmp.path()).unwrap();

        assert_eq!(summary.directories_created, 1);
        assert!(tmp.path().join("dir").is_dir());
    }

    #[test]
    fn missing_root_still_runs_without_error() {
        let tmp = tempfile::tempdir().unwrap();
        let index = Index::default();
        let mut source = empty_source();
        let summary = walk_and_extract(&mut source, &index, tmp.path()).unwrap();
        assert_eq!(summary.directories_created, 0);
        assert_eq!(summary.files_extracted, 0);
    }

    #[test]
    fn self_referencing_object_does_not_infinite_loop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = Index::default();
        // Object 1 claims itself as its own parent.
        index.objects.insert(1, object(OBJ_TYPE_DIR, 1, b"self"));

        let mut source = empty_source();
        let summary = walk_and_extract(&mut source, &index, tmp.path()).unwrap();
        // The cycle is caught after the first (and only) visit to id 1.
        assert_eq!(summary.directories_created, 1);
    }

    #[test]
    fn ignores_unrecognized_object_type() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = Index::default();
        index.objects.insert(2, object(4, 1, b"blob"));
        let mut source = empty_source();
        let summary = walk_and_extract(&mut source, &index, tmp.path()).unwrap();
        assert_eq!(summary.directories_created, 0);
        assert_eq!(summary.files_extracted, 0);
        assert!(!tmp.path().join("blob").exists());
    }
}
