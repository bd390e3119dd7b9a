//! Random-access reads of page data and OOB areas from the two dump streams.
//!
//! `PageSource` is generic over any `Read + Seek`, not just `File`, so unit
//! and integration tests can drive it from an in-memory `Cursor<Vec<u8>>`
//! instead of writing temporary files to disk.

use std::io::{self, Read, Seek, SeekFrom};

use crate::geometry::Geometry;

/// Positioned reader over a data dump and an OOB dump sharing one [`Geometry`].
pub struct PageSource<D, O> {
    data: D,
    oob: O,
    geometry: Geometry,
}

impl<D: Read + Seek, O: Read + Seek> PageSource<D, O> {
    pub fn new(data: D, oob: O, geometry: Geometry) -> Self {
        PageSource { data, oob, geometry }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Reads the `page_size`-byte data payload of `page_addr`.
    ///
    /// Returns `Ok(None)` on a short read, which the caller treats as
    /// end-of-stream (see the spec's Phase 1 termination rule).
    pub fn read_data(&mut self, page_addr: u32) -> io::Result<Option<Vec<u8>>> {
        let offset = page_addr as u64 * self.geometry.page_size as u64;
        read_at(&mut self.data, offset, self.geometry.page_size)
    }

    /// Reads the `oob_size`-byte out-of-band area of `page_addr`.
    pub fn read_oob(&mut self, page_addr: u32) -> io::Result<Option<Vec<u8>>> {
        let offset = page_addr as u64 * self.geometry.oob_size as u64;
        read_at(&mut self.oob, offset, self.geometry.oob_size)
    }
}

fn read_at<S: Read + Seek>(stream: &mut S, offset: u64, len: usize) -> io::Result<Option<Vec<u8>>> {
    stream.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    match stream.read_exact(&mut buf) {
        Ok(()) => Ok(Some(buf)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(
        page_size: usize,
        oob_size: usize,
        data: Vec<u8>,
        oob: Vec<u8>,
    ) -> PageSource<Cursor<Vec<u8>>, Cursor<Vec<u8>>> {
        let geometry = Geometry {
            page_size,
            oob_size,
            ..Geometry::default()
        };
        PageSource::new(Cursor::new(data), Cursor::new(oob), geometry)
    }

    #[test]
    fn reads_page_at_offset() {
        let mut data = vec![0u8; 8];
        data[4..8].copy_from_slice(&[1, 2, 3, 4]);
        let mut src = source(4, 2, data, vec![0u8; 4]);
        assert_eq!(src.read_data(1).unwrap(), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn short_read_is_none() {
        let mut src = source(4, 2, vec![0u8; 4], vec![0u8; 4]);
        assert_eq!(src.read_data(5).unwrap(), None);
    }

    #[test]
    fn oob_and_data_are_independent_streams() {
        let mut src = source(2, 2, vec![0xaa; 4], vec![0xbb; 4]);
        assert_eq!(src.read_data(0).unwrap(), Some(vec![0xaa, 0xaa]));
        assert_eq!(src.read_oob(0).unwrap(), Some(vec![0xbb, 0xbb]));
    }
}
