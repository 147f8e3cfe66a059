//! Wavefront MTL material library reader.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{MtlError, MtlResult},
    lines::ContentLines,
    mesh::{IlluminationModel, Material},
};

/// One recognised MTL statement.
#[derive(Clone, Debug, PartialEq)]
pub enum MtlDirective {
    NewMaterial(String),
    Ambient([f32; 3]),
    Diffuse([f32; 3]),
    Specular([f32; 3]),
    Shininess(f32),
    Transparency(f32),
    Illumination(i32),
    DiffuseMap(String),
    SpecularMap(String),
    NormalMap(String),
}

impl MtlDirective {
    /// Parse one comment-stripped, trimmed, non-empty line.
    /// Returns `Ok(None)` for directives the viewer does not use.
    pub fn parse(line: &str, line_no: usize) -> MtlResult<Option<Self>> {
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            return Ok(None);
        };
        let rest = line[tag.len()..].trim();

        let directive = match tag {
            "newmtl" => Self::NewMaterial(required(rest, tag, line_no)?),
            "Ka" => Self::Ambient(parse_rgb(&mut parts, tag, line_no)?),
            "Kd" => Self::Diffuse(parse_rgb(&mut parts, tag, line_no)?),
            "Ks" => Self::Specular(parse_rgb(&mut parts, tag, line_no)?),
            "Ns" => Self::Shininess(parse_f32(parts.next(), tag, line_no)?),
            "d" | "Tr" => Self::Transparency(parse_f32(parts.next(), tag, line_no)?),
            "illum" => Self::Illumination(parse_i32(parts.next(), tag, line_no)?),
            "map_Kd" => Self::DiffuseMap(required(rest, tag, line_no)?),
            "map_Ks" => Self::SpecularMap(required(rest, tag, line_no)?),
            "bump" | "map_Bump" => Self::NormalMap(required(rest, tag, line_no)?),
            other => {
                log::trace!("MTL line {}: ignoring directive '{}'", line_no, other);
                return Ok(None);
            }
        };
        Ok(Some(directive))
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Building(Material),
}

/// Folds directives into finished materials, one per `newmtl` block.
#[derive(Debug, Default)]
pub struct MtlReducer {
    state: State,
    finished: Vec<Material>,
}

impl MtlReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, directive: MtlDirective) {
        use MtlDirective as D;

        match (directive, &mut self.state) {
            (D::NewMaterial(name), state) => {
                let next = State::Building(Material::named(name));
                if let State::Building(done) = std::mem::replace(state, next) {
                    self.finished.push(done);
                }
            }
            (directive, State::Idle) => {
                log::debug!("MTL property {:?} before any newmtl; ignored", directive);
            }
            (D::Ambient(rgb), State::Building(m)) => m.ambient = rgb,
            (D::Diffuse(rgb), State::Building(m)) => m.diffuse = rgb,
            (D::Specular(rgb), State::Building(m)) => m.specular = rgb,
            (D::Shininess(ns), State::Building(m)) => m.shininess = ns,
            (D::Transparency(d), State::Building(m)) => m.transparency = d,
            (D::Illumination(illum), State::Building(m)) => m.illum = IlluminationModel(illum),
            (D::DiffuseMap(path), State::Building(m)) => m.diffuse_map = Some(path),
            (D::SpecularMap(path), State::Building(m)) => m.specular_map = Some(path),
            (D::NormalMap(path), State::Building(m)) => m.normal_map = Some(path),
        }
    }

    /// End of input: the last block has no following `newmtl` to close it.
    pub fn finish(mut self) -> Vec<Material> {
        self.finalize();
        self.finished
    }

    fn finalize(&mut self) {
        if let State::Building(material) = std::mem::take(&mut self.state) {
            self.finished.push(material);
        }
    }
}

/// Parse a material library. A file that cannot be opened is logged and
/// yields no materials.
pub fn parse_mtl(path: impl AsRef<Path>) -> MtlResult<Vec<Material>> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::error!("Cannot open MTL file {}: {}", path.display(), e);
            return Ok(Vec::new());
        }
    };
    let materials = parse_mtl_reader(BufReader::new(file))?;
    log::debug!(
        "Loaded MTL {}: {} material(s)",
        path.display(),
        materials.len()
    );
    Ok(materials)
}

pub fn parse_mtl_str(contents: &str) -> MtlResult<Vec<Material>> {
    parse_mtl_reader(io::Cursor::new(contents))
}

pub fn parse_mtl_reader<R: BufRead>(reader: R) -> MtlResult<Vec<Material>> {
    let mut reducer = MtlReducer::new();

    for entry in ContentLines::new(reader) {
        let (line_no, line) = entry?;
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = MtlDirective::parse(&line, line_no)? {
            reducer.apply(directive);
        }
    }

    Ok(reducer.finish())
}

fn required(value: &str, directive: &str, line_no: usize) -> MtlResult<String> {
    if value.is_empty() {
        return Err(MtlError::MissingValue {
            line: line_no,
            directive: directive.to_string(),
        });
    }
    Ok(value.to_string())
}

fn parse_rgb<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    directive: &str,
    line_no: usize,
) -> MtlResult<[f32; 3]> {
    let r = parse_f32(parts.next(), directive, line_no)?;
    let g = parse_f32(parts.next(), directive, line_no)?;
    let b = parse_f32(parts.next(), directive, line_no)?;
    Ok([r, g, b])
}

fn parse_f32(value: Option<&str>, directive: &str, line_no: usize) -> MtlResult<f32> {
    let token = value.ok_or_else(|| MtlError::MissingValue {
        line: line_no,
        directive: directive.to_string(),
    })?;
    token.parse::<f32>().map_err(|_| MtlError::InvalidFloat {
        line: line_no,
        directive: directive.to_string(),
        token: token.to_string(),
    })
}

fn parse_i32(value: Option<&str>, directive: &str, line_no: usize) -> MtlResult<i32> {
    let token = value.ok_or_else(|| MtlError::MissingValue {
        line: line_no,
        directive: directive.to_string(),
    })?;
    token.parse::<i32>().map_err(|_| MtlError::InvalidInt {
        line: line_no,
        directive: directive.to_string(),
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MATERIALS: &str = r#"
        # exported by hand
        newmtl Red
        Ka 0.1 0.0 0.0
        Kd 0.8 0.0 0.0
        Ks 0.5 0.5 0.5
        Ns 32
        d 0.75
        illum 2
        map_Kd red.png

        newmtl Blue
        Kd 0.0 0.0 0.9   # inline comment
        Tr 0.25
        map_Ks blue_spec.png
        map_Bump blue normal.png
    "#;

    #[test]
    fn two_blocks_in_file_order() {
        let mats = parse_mtl_str(TWO_MATERIALS).expect("parse mtl");
        assert_eq!(mats.len(), 2);

        let red = &mats[0];
        assert_eq!(red.name, "Red");
        assert_eq!(red.ambient, [0.1, 0.0, 0.0]);
        assert_eq!(red.diffuse, [0.8, 0.0, 0.0]);
        assert_eq!(red.specular, [0.5, 0.5, 0.5]);
        assert_eq!(red.shininess, 32.0);
        assert_eq!(red.transparency, 0.75);
        assert_eq!(red.illum, IlluminationModel::HIGHLIGHT);
        assert_eq!(red.diffuse_map.as_deref(), Some("red.png"));
        assert_eq!(red.normal_map, None);

        let blue = &mats[1];
        assert_eq!(blue.name, "Blue");
        assert_eq!(blue.diffuse, [0.0, 0.0, 0.9]);
        assert_eq!(blue.transparency, 0.25);
        assert_eq!(blue.specular_map.as_deref(), Some("blue_spec.png"));
        assert_eq!(blue.normal_map.as_deref(), Some("blue normal.png"));
        assert_eq!(blue.diffuse_map, None);
    }

    #[test]
    fn trailing_block_is_finalized() {
        let mats = parse_mtl_str("newmtl only\nKd 1 1 1").expect("parse mtl");
        assert_eq!(mats.len(), 1);
        assert_eq!(mats[0].name, "only");
    }

    #[test]
    fn properties_before_newmtl_are_dropped() {
        let mats = parse_mtl_str("Kd 0 1 0\nbump stray.png\nnewmtl a\n").expect("parse mtl");
        assert_eq!(mats, vec![Material::named("a")]);
    }

    #[test]
    fn reducer_emits_on_newmtl_and_finish() {
        let mut reducer = MtlReducer::new();
        reducer.apply(MtlDirective::NewMaterial("a".into()));
        reducer.apply(MtlDirective::Shininess(4.0));
        reducer.apply(MtlDirective::NewMaterial("b".into()));
        reducer.apply(MtlDirective::NormalMap("n.png".into()));
        let mats = reducer.finish();

        assert_eq!(mats.len(), 2);
        assert_eq!(mats[0].shininess, 4.0);
        assert_eq!(mats[1].normal_map.as_deref(), Some("n.png"));
    }

    #[test]
    fn plain_bump_sets_normal_map() {
        let mats = parse_mtl_str("newmtl a\nbump n.png\n").expect("parse mtl");
        assert_eq!(mats[0].normal_map.as_deref(), Some("n.png"));
    }

    #[test]
    fn crlf_line_endings() {
        let mats = parse_mtl_str("newmtl Crate\r\nNs 16\r\nmap_Kd crate.png\r\n").expect("parse mtl");
        assert_eq!(mats.len(), 1);
        assert_eq!(mats[0].name, "Crate");
        assert_eq!(mats[0].shininess, 16.0);
        assert_eq!(mats[0].diffuse_map.as_deref(), Some("crate.png"));
    }

    #[test]
    fn latin1_comment_does_not_abort() {
        let src: &[u8] = b"# r\xE9alis\xE9 \xE0 la main\nnewmtl a # \xFF\nKd 0 1 0\n";
        let mats = parse_mtl_reader(io::Cursor::new(src)).expect("parse mtl");
        assert_eq!(mats.len(), 1);
        assert_eq!(mats[0].diffuse, [0.0, 1.0, 0.0]);

        let err = parse_mtl_reader(io::Cursor::new(&b"newmtl caf\xE9\n"[..])).unwrap_err();
        assert!(matches!(err, MtlError::InvalidUtf8 { line: 1 }));
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let mats = parse_mtl_str("newmtl a\nNi 1.45\nKe 0 0 0\nmap_d alpha.png\n")
            .expect("parse mtl");
        assert_eq!(mats.len(), 1);
    }

    #[test]
    fn malformed_numbers_abort_the_parse() {
        let err = parse_mtl_str("newmtl a\nNs shiny\n").unwrap_err();
        assert!(matches!(err, MtlError::InvalidFloat { line: 2, .. }));

        let err = parse_mtl_str("newmtl a\nillum 2.5\n").unwrap_err();
        assert!(matches!(err, MtlError::InvalidInt { line: 2, .. }));

        let err = parse_mtl_str("newmtl a\nKd 1 1\n").unwrap_err();
        assert!(matches!(err, MtlError::MissingValue { line: 2, .. }));
    }

    #[test]
    fn newmtl_requires_a_name() {
        let err = parse_mtl_str("newmtl\n").unwrap_err();
        assert!(matches!(err, MtlError::MissingValue { line: 1, .. }));
    }

    #[test]
    fn missing_file_yields_no_materials() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mats = parse_mtl(dir.path().join("absent.mtl")).expect("missing file is not fatal");
        assert!(mats.is_empty());
    }
}
