//! Wavefront OBJ geometry reader.
//!
//! Faces are not triangulated and vertices are not deduplicated: every
//! face-vertex token becomes one emitted vertex, and `indices` is `0..n`.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{ObjError, ObjResult},
    lines::ContentLines,
    mesh::Mesh,
};

/// What to emit for a face-vertex whose texcoord/normal reference is absent,
/// zero or out of range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributePolicy {
    /// Append nothing. Attribute streams may end up shorter than `positions`.
    #[default]
    Drop,
    /// Append a zero vector so every stream stays parallel to `indices`.
    ZeroFill,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjOptions {
    pub attributes: AttributePolicy,
}

impl ObjOptions {
    pub fn zero_fill() -> Self {
        Self {
            attributes: AttributePolicy::ZeroFill,
        }
    }
}

/// Parse an OBJ file with the default (drop) attribute policy.
///
/// A file that cannot be opened is logged and yields an empty [`Mesh`].
pub fn parse_obj(path: impl AsRef<Path>) -> ObjResult<Mesh> {
    parse_obj_with(path, &ObjOptions::default())
}

pub fn parse_obj_with(path: impl AsRef<Path>, options: &ObjOptions) -> ObjResult<Mesh> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("Cannot open OBJ file {}: {}", path.display(), e);
            return Ok(Mesh::default());
        }
    };
    let mesh = parse_obj_reader(BufReader::new(file), options)?;
    log::debug!(
        "Loaded OBJ {}: {} vertices, {} texcoords, {} normals",
        path.display(),
        mesh.positions.len(),
        mesh.texcoords.len(),
        mesh.normals.len()
    );
    Ok(mesh)
}

/// Convenience helper to parse an OBJ string literal.
pub fn parse_obj_str(contents: &str, options: &ObjOptions) -> ObjResult<Mesh> {
    parse_obj_reader(io::Cursor::new(contents), options)
}

pub fn parse_obj_reader<R: BufRead>(reader: R, options: &ObjOptions) -> ObjResult<Mesh> {
    let mut pools = Pools::default();
    let mut mesh = Mesh::default();

    for entry in ContentLines::new(reader) {
        let (line_no, line) = entry?;
        let line = line.as_str();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "vertex x")?;
                let y = parse_f32(parts.next(), line_no, "vertex y")?;
                let z = parse_f32(parts.next(), line_no, "vertex z")?;
                pools.positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "texcoord u")?;
                let v = parse_f32(parts.next(), line_no, "texcoord v")?;
                pools.texcoords.push([u, v]);
            }
            "vn" => {
                let x = parse_f32(parts.next(), line_no, "normal x")?;
                let y = parse_f32(parts.next(), line_no, "normal y")?;
                let z = parse_f32(parts.next(), line_no, "normal z")?;
                pools.normals.push([x, y, z]);
            }
            "mtllib" => {
                mesh.material_lib = Some(directive_value(line, tag, line_no, "mtllib")?);
            }
            "usemtl" => {
                mesh.active_material = Some(directive_value(line, tag, line_no, "usemtl")?);
            }
            "f" => {
                for token in parts {
                    let face_vertex = parse_face_vertex(token, line_no)?;
                    pools.emit(&mut mesh, face_vertex, options.attributes, line_no)?;
                }
            }
            other => {
                log::trace!("OBJ line {}: ignoring directive '{}'", line_no, other);
            }
        }
    }

    Ok(mesh)
}

/// Raw 1-based references of one face-vertex token. Zero means absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FaceVertex {
    position: usize,
    texcoord: usize,
    normal: usize,
}

/// Scratch attribute pools, discarded when the parse returns.
#[derive(Default)]
struct Pools {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

impl Pools {
    fn emit(
        &self,
        mesh: &mut Mesh,
        fv: FaceVertex,
        policy: AttributePolicy,
        line_no: usize,
    ) -> ObjResult<()> {
        if let Some(p) = lookup(&self.positions, fv.position) {
            mesh.positions.push(p);
        }

        match (lookup(&self.texcoords, fv.texcoord), policy) {
            (Some(t), _) => mesh.texcoords.push(t),
            (None, AttributePolicy::ZeroFill) => mesh.texcoords.push([0.0; 2]),
            (None, AttributePolicy::Drop) => {}
        }

        match (lookup(&self.normals, fv.normal), policy) {
            (Some(n), _) => mesh.normals.push(n),
            (None, AttributePolicy::ZeroFill) => mesh.normals.push([0.0; 3]),
            (None, AttributePolicy::Drop) => {}
        }

        let next = u32::try_from(mesh.indices.len())
            .map_err(|_| ObjError::TooManyVertices { line: line_no })?;
        mesh.indices.push(next);
        Ok(())
    }
}

/// Valid iff `1 <= index <= pool.len()`.
fn lookup<T: Copy>(pool: &[T], index: usize) -> Option<T> {
    index.checked_sub(1).and_then(|i| pool.get(i).copied())
}

fn directive_value(
    line: &str,
    tag: &str,
    line_no: usize,
    directive: &'static str,
) -> ObjResult<String> {
    let value = line[tag.len()..].trim();
    if value.is_empty() {
        return Err(ObjError::MissingValue {
            line: line_no,
            directive,
        });
    }
    Ok(value.to_string())
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &'static str) -> ObjResult<f32> {
    let token = value.ok_or(ObjError::MissingComponent {
        line: line_no,
        what,
    })?;
    token.parse::<f32>().map_err(|_| ObjError::InvalidFloat {
        line: line_no,
        what,
        token: token.to_string(),
    })
}

/// `V`, `V/T`, `V/T/N` or `V//N`.
fn parse_face_vertex(token: &str, line_no: usize) -> ObjResult<FaceVertex> {
    let mut fields = token.split('/');
    let position = fields.next().unwrap_or_default();
    let texcoord = fields.next().unwrap_or_default();
    let normal = fields.next().unwrap_or_default();
    if fields.next().is_some() {
        return Err(ObjError::InvalidFaceVertex {
            line: line_no,
            token: token.to_string(),
        });
    }

    if position.is_empty() {
        return Err(ObjError::InvalidIndex {
            line: line_no,
            what: "position",
            token: token.to_string(),
        });
    }

    Ok(FaceVertex {
        position: parse_index(position, line_no, "position")?,
        texcoord: parse_index(texcoord, line_no, "texcoord")?,
        normal: parse_index(normal, line_no, "normal")?,
    })
}

fn parse_index(raw: &str, line_no: usize, what: &'static str) -> ObjResult<usize> {
    if raw.is_empty() {
        return Ok(0);
    }
    let parsed = raw.parse::<i64>().map_err(|_| ObjError::InvalidIndex {
        line: line_no,
        what,
        token: raw.to_string(),
    })?;
    if parsed < 0 {
        return Err(ObjError::NegativeIndex {
            line: line_no,
            what,
            token: raw.to_string(),
        });
    }
    usize::try_from(parsed).map_err(|_| ObjError::InvalidIndex {
        line: line_no,
        what,
        token: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse(src: &str) -> Mesh {
        parse_obj_str(src, &ObjOptions::default()).expect("parse obj")
    }

    #[test]
    fn parse_single_triangle() {
        let mesh = parse(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );
        assert_eq!(
            mesh.positions,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.texcoords.is_empty());
        assert!(mesh.normals.is_empty());
    }

    #[test]
    fn parse_full_face_references() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = parse(src);
        assert_eq!(mesh.texcoords, vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert!(mesh.has_parallel_streams());
    }

    #[test]
    fn indices_count_every_face_token() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            f 1 2 3 4
            f 1 2 3
            f 4 3 2 1 4
        "#;
        let mesh = parse(src);
        assert_eq!(mesh.indices.len(), 4 + 3 + 5);
        assert!(mesh.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i));
        assert_eq!(mesh.positions.len(), 12);
    }

    #[test]
    fn face_index_retrieves_matching_pool_slot() {
        let src = "v 1 1 1\nv 2 2 2\nv 3 3 3\nf 3 1 2\n";
        let mesh = parse(src);
        assert_eq!(
            mesh.positions,
            vec![[3.0, 3.0, 3.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]
        );
    }

    #[test]
    fn inline_comments_are_stripped() {
        let a = parse("v 1 2 3 # note\nf 1 1 1 # face\n");
        let b = parse("v 1 2 3\nf 1 1 1\n");
        assert_eq!(a, b);
        assert_eq!(a.positions[0], [1.0, 2.0, 3.0]);
    }

    #[test]
    fn latin1_comment_does_not_abort() {
        let src: &[u8] = b"# caf\xE9 model\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3 # d\xE9j\xE0\n";
        let mesh = parse_obj_reader(io::Cursor::new(src), &ObjOptions::default())
            .expect("parse obj");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions.len(), 3);
    }

    #[test]
    fn non_utf8_content_is_a_format_error() {
        let src: &[u8] = b"v 0 0 0\nusemtl caf\xE9\n";
        let err = parse_obj_reader(io::Cursor::new(src), &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidUtf8 { line: 2 }));
    }

    #[test]
    fn crlf_line_endings() {
        let mesh = parse("mtllib cube.mtl\r\nv 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n");
        assert_eq!(mesh.material_lib.as_deref(), Some("cube.mtl"));
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn normal_only_references() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2//1 3//1\n";
        let mesh = parse(src);
        assert!(mesh.texcoords.is_empty());
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn zero_and_out_of_range_indices_are_dropped() {
        let src = r#"
            v 0 0 0
            v 1 0 0
            vt 0.5 0.5
            f 1/0 2/7 9/1
        "#;
        let mesh = parse(src);
        assert_eq!(mesh.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert_eq!(mesh.texcoords, vec![[0.5, 0.5]]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn zero_fill_keeps_streams_parallel() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 1 1\nf 1/1 2 3//4\n";
        let mesh = parse_obj_str(src, &ObjOptions::zero_fill()).expect("parse obj");
        assert!(mesh.has_parallel_streams());
        assert_eq!(mesh.texcoords, vec![[1.0, 1.0], [0.0, 0.0], [0.0, 0.0]]);
        assert_eq!(mesh.normals, vec![[0.0; 3]; 3]);
    }

    #[test]
    fn material_directives_are_recorded() {
        let src = "mtllib cube.mtl\nusemtl first\nusemtl Second Mat\n";
        let mesh = parse(src);
        assert_eq!(mesh.material_lib.as_deref(), Some("cube.mtl"));
        assert_eq!(mesh.active_material.as_deref(), Some("Second Mat"));
        assert!(mesh.is_empty());
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let mesh = parse("o Cube\ng part\ns off\nv 0 0 0\nf 1 1 1\n");
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn malformed_float_aborts_the_parse() {
        let err = parse_obj_str("v 1 oops 3\n", &ObjOptions::default()).unwrap_err();
        match err {
            ObjError::InvalidFloat { line, token, .. } => {
                assert_eq!(line, 1);
                assert_eq!(token, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_component_is_an_error() {
        let err = parse_obj_str("v 1 2\n", &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::MissingComponent { line: 1, .. }));
    }

    #[test]
    fn malformed_index_aborts_the_parse() {
        let src = "v 0 0 0\nf 1 x 1\n";
        let err = parse_obj_str(src, &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidIndex { line: 2, .. }));

        let err = parse_obj_str("v 0 0 0\nf /1/1\n", &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidIndex { what: "position", .. }));
    }

    #[test]
    fn negative_indices_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let err = parse_obj_str(src, &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::NegativeIndex { line: 4, .. }));
    }

    #[test]
    fn too_many_face_fields_is_an_error() {
        let err =
            parse_obj_str("v 0 0 0\nf 1/1/1/1\n", &ObjOptions::default()).unwrap_err();
        assert!(matches!(err, ObjError::InvalidFaceVertex { .. }));
    }

    #[test]
    fn missing_file_yields_empty_mesh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mesh = parse_obj(dir.path().join("absent.obj")).expect("missing file is not fatal");
        assert_eq!(mesh, Mesh::default());
    }

    #[test]
    fn parse_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").expect("write obj");
        let mesh = parse_obj(file.path()).expect("parse obj file");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }
}
