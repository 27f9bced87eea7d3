//! Line tokenizer and record parser for the supported OBJ subset.

use glam::Vec4;

use crate::resources::{
    COLOR_SLOT, GENERIC1_SLOT, GENERIC2_SLOT, GENERIC3_SLOT, GENERIC4_SLOT, NORMAL_SLOT,
    POSITION_SLOT, TEXCOORD_SLOT,
};

/// Records that change the properties of the next surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    Group,
    Object,
    Smoothing,
    Material,
    MaterialLibrary,
}

impl StateKey {
    pub const ALL: [StateKey; 5] = [
        StateKey::Group,
        StateKey::Object,
        StateKey::Smoothing,
        StateKey::Material,
        StateKey::MaterialLibrary,
    ];

    /// The OBJ keyword, also used as the surface property key
    pub fn keyword(&self) -> &'static str {
        match self {
            StateKey::Group => "g",
            StateKey::Object => "o",
            StateKey::Smoothing => "s",
            StateKey::Material => "usemtl",
            StateKey::MaterialLibrary => "mtllib",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.keyword() == keyword)
    }
}

/// One `v/vt/vn` reference of a face, still in OBJ numbering.
///
/// `None` means the field was absent, empty or not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceRef {
    pub vertex: Option<i64>,
    pub texcoord: Option<i64>,
    pub normal: Option<i64>,
}

impl FaceRef {
    /// Parse `v`, `v/n`, `v/t/n`, `v//n` and `v/t/`.
    ///
    /// A reference with two fields is read as (vertex, normal).
    pub fn parse(token: &str) -> Self {
        let fields: Vec<Option<i64>> = token.split('/').map(parse_index).collect();
        match fields.as_slice() {
            [vertex] => FaceRef {
                vertex: *vertex,
                ..Default::default()
            },
            [vertex, normal] => FaceRef {
                vertex: *vertex,
                normal: *normal,
                ..Default::default()
            },
            [vertex, texcoord, normal, ..] => FaceRef {
                vertex: *vertex,
                texcoord: *texcoord,
                normal: *normal,
            },
            [] => FaceRef::default(),
        }
    }
}

fn parse_index(field: &str) -> Option<i64> {
    if field.is_empty() {
        return None;
    }
    match field.parse::<i64>() {
        Ok(index) => Some(index),
        Err(_) => {
            log::warn!("invalid OBJ face index {field:?}");
            None
        }
    }
}

/// Resolve an OBJ index against a table holding `len` rows.
///
/// Positive indices are 1-based, negative ones count back from the end of the
/// table as it is at this point of the file. Returns `None` for 0 and for
/// negative indices reaching before the first row. Positive indices past the
/// end are returned unchanged and fail at lookup.
pub fn resolve_index(index: Option<i64>, len: usize) -> Option<usize> {
    match index? {
        0 => None,
        k if k > 0 => usize::try_from(k - 1).ok(),
        k => {
            let back = usize::try_from(k.unsigned_abs()).ok()?;
            len.checked_sub(back)
        }
    }
}

/// A parsed OBJ line
#[derive(Debug, Clone, PartialEq)]
pub enum ObjRecord<'a> {
    /// `v`, `vn`, `vc`, `vt`, `va1`..`va4`: a row for the table feeding `slot`
    Attribute {
        slot: usize,
        value: Vec4,
        invalid_numbers: usize,
    },
    /// `f`
    Face(Vec<FaceRef>),
    /// `g`, `o`, `s`, `usemtl`, `mtllib` with their first argument
    State { key: StateKey, value: &'a str },
    /// Any other keyword
    Unknown(&'a str),
}

/// Slot fed by an attribute keyword
fn attribute_slot(keyword: &str) -> Option<usize> {
    let slot = match keyword {
        "v" => POSITION_SLOT,
        "vn" => NORMAL_SLOT,
        "vc" => COLOR_SLOT,
        "vt" => TEXCOORD_SLOT,
        "va1" => GENERIC1_SLOT,
        "va2" => GENERIC2_SLOT,
        "va3" => GENERIC3_SLOT,
        "va4" => GENERIC4_SLOT,
        _ => return None,
    };
    Some(slot)
}

/// Read up to four components, defaulting to `(0, 0, 0, 1)`.
///
/// Numbers that fail to parse read as 0; the second value counts them.
pub fn parse_vec4<'a>(args: impl IntoIterator<Item = &'a str>) -> (Vec4, usize) {
    let mut value = [0.0, 0.0, 0.0, 1.0];
    let mut invalid = 0;
    for (component, token) in value.iter_mut().zip(args) {
        *component = match token.parse::<f32>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("invalid OBJ number {token:?}, using 0");
                invalid += 1;
                0.0
            }
        };
    }
    (Vec4::from_array(value), invalid)
}

/// Parse one line. Blank lines and comments yield `None`.
///
/// A `#` token ends the line, so trailing comments are not read as data.
pub fn parse_line(line: &str) -> Option<ObjRecord<'_>> {
    let mut tokens = line
        .split_whitespace()
        .take_while(|token| !token.starts_with('#'));
    let keyword = tokens.next()?;

    if let Some(slot) = attribute_slot(keyword) {
        let (value, invalid_numbers) = parse_vec4(tokens);
        return Some(ObjRecord::Attribute {
            slot,
            value,
            invalid_numbers,
        });
    }
    if keyword == "f" {
        return Some(ObjRecord::Face(tokens.map(FaceRef::parse).collect()));
    }
    if let Some(key) = StateKey::from_keyword(keyword) {
        return Some(ObjRecord::State {
            key,
            value: tokens.next().unwrap_or(""),
        });
    }
    Some(ObjRecord::Unknown(keyword))
}

/// Split text on `\r\n`, `\r` and `\n` and parse every meaningful line.
pub fn parse_records(text: &str) -> impl Iterator<Item = ObjRecord<'_>> {
    text.split(['\r', '\n']).filter_map(parse_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_defaults() {
        assert_eq!(
            parse_line("v 1 2"),
            Some(ObjRecord::Attribute {
                slot: POSITION_SLOT,
                value: Vec4::new(1.0, 2.0, 0.0, 1.0),
                invalid_numbers: 0,
            })
        );
        assert_eq!(
            parse_line("va3 1 2 3 4 5"),
            Some(ObjRecord::Attribute {
                slot: GENERIC3_SLOT,
                value: Vec4::new(1.0, 2.0, 3.0, 4.0),
                invalid_numbers: 0,
            })
        );
    }

    #[test]
    fn bad_numbers_read_as_zero() {
        let (value, invalid) = parse_vec4(["1.5", "abc", "-2"]);
        assert_eq!(value, Vec4::new(1.5, 0.0, -2.0, 1.0));
        assert_eq!(invalid, 1);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \t "), None);
        assert_eq!(parse_line("# v 1 2 3"), None);
        assert_eq!(parse_line("#comment"), None);
    }

    #[test]
    fn trailing_comments_are_ignored() {
        assert_eq!(
            parse_line("v 0 0 0 # corner"),
            Some(ObjRecord::Attribute {
                slot: POSITION_SLOT,
                value: Vec4::new(0.0, 0.0, 0.0, 1.0),
                invalid_numbers: 0,
            })
        );
        assert!(matches!(
            parse_line("f 1 2 3 #tri"),
            Some(ObjRecord::Face(refs)) if refs.len() == 3
        ));
        assert_eq!(
            parse_line("usemtl #none"),
            Some(ObjRecord::State {
                key: StateKey::Material,
                value: ""
            })
        );
    }

    #[test]
    fn state_records() {
        assert_eq!(
            parse_line("usemtl brass extra"),
            Some(ObjRecord::State {
                key: StateKey::Material,
                value: "brass"
            })
        );
        assert_eq!(
            parse_line("g"),
            Some(ObjRecord::State {
                key: StateKey::Group,
                value: ""
            })
        );
        assert_eq!(parse_line("curv 0 1"), Some(ObjRecord::Unknown("curv")));
    }

    #[test]
    fn face_reference_forms() {
        assert_eq!(
            FaceRef::parse("7"),
            FaceRef {
                vertex: Some(7),
                ..Default::default()
            }
        );
        assert_eq!(
            FaceRef::parse("7/3"),
            FaceRef {
                vertex: Some(7),
                texcoord: None,
                normal: Some(3),
            }
        );
        assert_eq!(
            FaceRef::parse("7/2/3"),
            FaceRef {
                vertex: Some(7),
                texcoord: Some(2),
                normal: Some(3),
            }
        );
        assert_eq!(
            FaceRef::parse("-1//-2"),
            FaceRef {
                vertex: Some(-1),
                texcoord: None,
                normal: Some(-2),
            }
        );
        assert_eq!(FaceRef::parse("x").vertex, None);
    }

    #[test]
    fn index_resolution() {
        assert_eq!(resolve_index(Some(1), 4), Some(0));
        assert_eq!(resolve_index(Some(9), 4), Some(8));
        assert_eq!(resolve_index(Some(-1), 4), Some(3));
        assert_eq!(resolve_index(Some(-4), 4), Some(0));
        assert_eq!(resolve_index(Some(-5), 4), None);
        assert_eq!(resolve_index(Some(0), 4), None);
        assert_eq!(resolve_index(None, 4), None);
    }

    #[test]
    fn every_line_ending_splits() {
        let records: Vec<_> = parse_records("v 0 0 0\r\nv 1 0 0\rv 0 1 0\nf 1 2 3").collect();
        assert_eq!(records.len(), 4);
        assert!(matches!(&records[3], ObjRecord::Face(refs) if refs.len() == 3));
    }
}
