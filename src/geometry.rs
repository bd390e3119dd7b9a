//! Flash geometry: the constants the original tool baked in as `#define`s,
//! promoted to a runtime value so a dump from a device with a different
//! page/OOB/block layout doesn't need a recompile.

use serde::{Deserialize, Serialize};

/// Flash layout parameters for a single reconstruction run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Bytes of data payload per page.
    pub page_size: usize,
    /// Bytes of out-of-band metadata per page.
    pub oob_size: usize,
    /// Pages per erase block.
    pub block_pages: usize,
    /// Upper bound on pages scanned.
    pub max_pages: u32,
    /// Upper bound on logical object ids.
    pub max_objects: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            page_size: 2048,
            oob_size: 64,
            block_pages: 64,
            max_pages: 131_072,
            max_objects: 65_536,
        }
    }
}

impl Geometry {
    /// `true` when `page_addr` is the first page of an erase block.
    pub fn is_block_boundary(&self, page_addr: u32) -> bool {
        page_addr as usize % self.block_pages == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_table() {
        let g = Geometry::default();
        assert_eq!(g.page_size, 2048);
        assert_eq!(g.oob_size, 64);
        assert_eq!(g.block_pages, 64);
        assert_eq!(g.max_pages, 131_072);
        assert_eq!(g.max_objects, 65_536);
    }

    #[test]
    fn block_boundary_respects_override() {
        let g = Geometry {
            block_pages: 16,
            ..Geometry::default()
        };
        assert!(g.is_block_boundary(0));
        assert!(g.is_block_boundary(16));
        assert!(!g.is_block_boundary(15));
    }
}
