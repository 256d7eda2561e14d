//! STL (Stereolithography) file format support.
//!
//! Reads binary and ASCII STL into triangle records and writes binary STL.
//!
//! # Format Detection
//!
//! - Binary when the byte length is exactly `84 + 50 * count` for the
//!   count stored after the header. This wins even if the header happens
//!   to start with "solid".
//! - Otherwise ASCII when the content starts with "solid" (after optional
//!   whitespace).
//! - Otherwise binary, and a length mismatch is reported as an error.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use mesh_types::{Mesh, MeshResult, Point3, TriangleRecord, TriangleSource, Vector3};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
pub const TRIANGLE_SIZE: usize = 50;

const COUNT_OFFSET: usize = HEADER_SIZE + 4;

#[derive(Debug, Clone)]
enum StlInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A [`TriangleSource`] backed by an STL file or an in-memory buffer.
///
/// # Example
///
/// ```no_run
/// use mesh_io::StlReader;
/// use mesh_types::Mesh;
///
/// let mut reader = StlReader::from_path("part.stl");
/// let mesh = Mesh::from_source(&mut reader).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct StlReader {
    input: StlInput,
}

impl StlReader {
    /// Read from a file on disk. The file is opened lazily on each read.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            input: StlInput::Path(path.as_ref().to_path_buf()),
        }
    }

    /// Read from bytes already in memory.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            input: StlInput::Bytes(bytes.into()),
        }
    }

    /// Decode the STL into triangle records.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid STL.
    pub fn read(&self) -> IoResult<Vec<TriangleRecord>> {
        match &self.input {
            StlInput::Bytes(bytes) => parse_stl(bytes),
            StlInput::Path(path) => {
                let mut file =
                    File::open(path).map_err(|e| IoError::from_open(e, path.clone()))?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                debug!(path = %path.display(), bytes = bytes.len(), "Read STL file");
                parse_stl(&bytes)
            }
        }
    }
}

impl TriangleSource for StlReader {
    fn read_triangles(&mut self) -> MeshResult<Vec<TriangleRecord>> {
        Ok(self.read()?)
    }
}

/// Load and weld a mesh from an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid STL, or holds
/// no triangles.
pub fn load_stl<P: AsRef<Path>>(path: P) -> MeshResult<Mesh> {
    Mesh::from_source(&mut StlReader::from_path(path))
}

/// Decode STL bytes, detecting binary or ASCII.
///
/// A binary file declaring zero triangles decodes to an empty list; the
/// mesh loader rejects it.
///
/// # Errors
///
/// Returns an error if the content is truncated or not valid STL.
pub fn parse_stl(bytes: &[u8]) -> IoResult<Vec<TriangleRecord>> {
    if let Some(count) = exact_binary_count(bytes) {
        return parse_binary(bytes, count);
    }

    if looks_ascii(bytes) {
        return parse_ascii(std::str::from_utf8(bytes)?);
    }

    if bytes.len() < COUNT_OFFSET {
        return Err(IoError::InvalidHeader {
            expected: COUNT_OFFSET,
            got: bytes.len(),
        });
    }
    parse_binary(bytes, read_count(bytes))
}

/// Text STL starts with `solid`, but so do many binary headers. A binary
/// file never spells out a facet, so a `solid` header with no `facet` or
/// `endsolid` keyword and room for a triangle count is read as binary.
fn looks_ascii(bytes: &[u8]) -> bool {
    let lead = &bytes[..bytes.len().min(HEADER_SIZE)];
    if !String::from_utf8_lossy(lead).trim_start().starts_with("solid") {
        return false;
    }
    bytes.len() < COUNT_OFFSET
        || bytes[HEADER_SIZE..].windows(5).any(|w| w.eq_ignore_ascii_case(b"facet"))
        || bytes.windows(8).any(|w| w.eq_ignore_ascii_case(b"endsolid"))
}

fn read_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

/// The declared count, if the buffer length matches it exactly.
fn exact_binary_count(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < COUNT_OFFSET {
        return None;
    }
    let count = read_count(bytes);
    let expected = (count as usize)
        .checked_mul(TRIANGLE_SIZE)?
        .checked_add(COUNT_OFFSET)?;
    (expected == bytes.len()).then_some(count)
}

fn parse_binary(bytes: &[u8], count: u32) -> IoResult<Vec<TriangleRecord>> {
    let body = &bytes[COUNT_OFFSET..];
    let available = body.len() / TRIANGLE_SIZE;

    if available < count as usize {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: available < count, which is a u32
        let got = available as u32;
        return Err(IoError::InvalidFaceCount {
            expected: count,
            got,
        });
    }

    let records = body
        .chunks_exact(TRIANGLE_SIZE)
        .take(count as usize)
        .map(|chunk| {
            TriangleRecord::new(
                read_vec3(&chunk[0..12]),
                [
                    Point3::from(read_vec3(&chunk[12..24])),
                    Point3::from(read_vec3(&chunk[24..36])),
                    Point3::from(read_vec3(&chunk[36..48])),
                ],
            )
        })
        .collect();

    Ok(records)
}

/// Read 3 little-endian f32s.
fn read_vec3(buf: &[u8]) -> Vector3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vector3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn parse_triple<'a>(mut parts: impl Iterator<Item = &'a str>) -> IoResult<Vector3<f64>> {
    let mut next = || {
        parts
            .next()
            .ok_or_else(|| IoError::invalid_content("expected three coordinates"))
    };
    let x: f64 = next()?.parse()?;
    let y: f64 = next()?.parse()?;
    let z: f64 = next()?.parse()?;
    Ok(Vector3::new(x, y, z))
}

fn parse_ascii(text: &str) -> IoResult<Vec<TriangleRecord>> {
    let mut records = Vec::new();
    let mut normal: Option<Vector3<f64>> = None;
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "facet" => {
                // "facet normal nx ny nz"
                let _ = parts.next();
                normal = Some(parse_triple(parts)?);
                corners.clear();
            }
            "vertex" => {
                if normal.is_none() {
                    return Err(IoError::invalid_content("vertex outside of facet"));
                }
                corners.push(Point3::from(parse_triple(parts)?));
            }
            "endfacet" => {
                let (Some(n), [a, b, c]) = (normal.take(), corners.as_slice()) else {
                    return Err(IoError::invalid_content(format!(
                        "facet {} does not have exactly 3 vertices",
                        records.len()
                    )));
                };
                records.push(TriangleRecord::new(n, [*a, *b, *c]));
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    if normal.is_some() {
        return Err(IoError::invalid_content("unterminated facet"));
    }

    Ok(records)
}

/// Save a mesh as binary STL.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl_binary(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as binary STL to any writer.
///
/// Each face is written with its stored normal, so supplied normals
/// survive a round-trip.
///
/// # Errors
///
/// Returns an error if writing fails or the mesh has more than `u32::MAX`
/// triangles.
pub fn write_stl_binary<W: Write>(mesh: &Mesh, mut writer: W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.faces().len())
        .map_err(|_| IoError::invalid_content("too many triangles for STL"))?;
    writer.write_all(&count.to_le_bytes())?;

    for (face, tri) in mesh.faces().iter().zip(mesh.triangles()) {
        write_vec3(&mut writer, &face.normal)?;
        write_vec3(&mut writer, &tri.v0.coords)?;
        write_vec3(&mut writer, &tri.v1.coords)?;
        write_vec3(&mut writer, &tri.v2.coords)?;
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn write_vec3<W: Write>(writer: &mut W, v: &Vector3<f64>) -> IoResult<()> {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: STL stores f32
    {
        writer.write_all(&(v.x as f32).to_le_bytes())?;
        writer.write_all(&(v.y as f32).to_le_bytes())?;
        writer.write_all(&(v.z as f32).to_le_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::{MeshBounds, MeshError, MeshTopology, primitives};

    fn binary_triangle(normal: [f32; 3], vertices: [[f32; 3]; 3]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        for v in std::iter::once(normal).chain(vertices) {
            for c in v {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes
    }

    #[test]
    fn binary_single_triangle() {
        let bytes = binary_triangle(
            [0.0, 0.0, -1.0],
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        );
        let records = parse_stl(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].normal, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(records[0].vertices[1], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn binary_header_starting_with_solid() {
        let mut bytes = binary_triangle(
            [0.0, 0.0, 1.0],
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        );
        bytes[..5].copy_from_slice(b"solid");
        assert_eq!(parse_stl(&bytes).unwrap().len(), 1);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut bytes = binary_triangle(
            [0.0, 0.0, 1.0],
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        );
        bytes[HEADER_SIZE..COUNT_OFFSET].copy_from_slice(&3u32.to_le_bytes());

        let err = parse_stl(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidFaceCount {
                expected: 3,
                got: 1
            }
        ));

        let err = Mesh::from_source(&mut StlReader::from_bytes(bytes)).unwrap_err();
        assert!(matches!(err, MeshError::Truncated { .. }));
    }

    #[test]
    fn truncated_binary_with_solid_header_is_rejected() {
        let mut bytes = binary_triangle(
            [0.0, 0.0, 1.0],
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        );
        let header = format!("{:<80}", "solid part exported by a slicer");
        bytes[..HEADER_SIZE].copy_from_slice(header.as_bytes());
        assert!(parse_stl(&bytes).is_ok());

        bytes[HEADER_SIZE..COUNT_OFFSET].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            parse_stl(&bytes).unwrap_err(),
            IoError::InvalidFaceCount {
                expected: 2,
                got: 1
            }
        ));

        let err = Mesh::from_source(&mut StlReader::from_bytes(bytes)).unwrap_err();
        assert!(matches!(
            err,
            MeshError::Truncated {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn zero_count_binary_is_empty() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert!(parse_stl(&bytes).unwrap().is_empty());

        let err = Mesh::from_source(&mut StlReader::from_bytes(bytes)).unwrap_err();
        assert!(matches!(err, MeshError::EmptySource));
    }

    #[test]
    fn short_buffer_is_invalid_header() {
        let err = parse_stl(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, IoError::InvalidHeader { got: 20, .. }));
    }

    #[test]
    fn ascii_parsing_keeps_normals() {
        let ascii = br"solid test
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  FACET NORMAL 0 0 1
    OUTER LOOP
      VERTEX 0 0 1
      VERTEX 1 0 1
      VERTEX 0 1 1
    ENDLOOP
  ENDFACET
endsolid test";

        let records = parse_stl(ascii).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].normal.z, -1.0);
        assert_eq!(records[1].vertices[2], Point3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn ascii_bad_number_is_rejected() {
        let ascii = b"solid t\nfacet normal 0 0 1\nvertex 0 zero 0\nendfacet\nendsolid t";
        assert!(matches!(
            parse_stl(ascii).unwrap_err(),
            IoError::ParseFloat(_)
        ));
    }

    #[test]
    fn ascii_short_facet_is_rejected() {
        let ascii = b"solid t\nfacet normal 0 0 1\nvertex 0 0 0\nvertex 1 0 0\nendfacet\nendsolid t";
        assert!(matches!(
            parse_stl(ascii).unwrap_err(),
            IoError::InvalidContent { .. }
        ));
    }

    #[test]
    fn write_then_read_preserves_geometry() {
        let mesh = Mesh::from_source(&mut primitives::cuboid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 4.0, 8.0),
        ))
        .unwrap();

        let mut bytes = Vec::new();
        write_stl_binary(&mesh, &mut bytes).unwrap();
        assert_eq!(bytes.len(), COUNT_OFFSET + 12 * TRIANGLE_SIZE);

        let reloaded = Mesh::from_source(&mut StlReader::from_bytes(bytes)).unwrap();
        assert_eq!(reloaded.triangle_count(), 12);
        assert_eq!(reloaded.vertex_count(), 8);
        assert_eq!(reloaded.bounds(), mesh.bounds());
        for (a, b) in mesh.faces().iter().zip(reloaded.faces()) {
            assert!((a.normal - b.normal).norm() < 1e-6);
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let reader = StlReader::from_path("does_not_exist_8d1f.stl");
        assert!(matches!(
            reader.read().unwrap_err(),
            IoError::FileNotFound { .. }
        ));
    }
}
