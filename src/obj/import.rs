use glam::Vec4;

use crate::backend::PrimitiveTopology;
use crate::resources::{
    IndexRef, IndexedGeometryMesh, PendingVertex, SurfaceId, ATTRIB_SLOT_COUNT, DEFAULT_MATERIAL,
    NORMAL_SLOT, POSITION_SLOT, TEXCOORD_SLOT,
};

use super::parser::{parse_records, resolve_index, FaceRef, ObjRecord, StateKey};
use super::{ImportOptions, ImportReport, UNKNOWN_OBJECT};

/// A face reference resolved to 0-based table rows
#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: Option<usize>,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

impl Corner {
    /// Row read from the table feeding `slot`
    fn row(&self, slot: usize) -> Option<usize> {
        match slot {
            NORMAL_SLOT => self.normal,
            TEXCOORD_SLOT => self.texcoord,
            _ => self.vertex,
        }
    }
}

/// Per-parse state: the attribute tables and the pending surface properties.
struct Importer<'m> {
    mesh: &'m mut IndexedGeometryMesh,
    tables: [Vec<Vec4>; ATTRIB_SLOT_COUNT],
    state: [(StateKey, String); 5],
    surface: Option<SurfaceId>,
    faces_in_run: usize,
    report: ImportReport,
    /// Material name the mesh had before the import, restored at the end
    caller_material: String,
}

impl<'m> Importer<'m> {
    fn new(mesh: &'m mut IndexedGeometryMesh) -> Self {
        let caller_material = mesh.material_name().to_string();
        Self {
            mesh,
            tables: Default::default(),
            state: StateKey::ALL.map(|key| (key, String::new())),
            surface: None,
            faces_in_run: 0,
            report: ImportReport::default(),
            caller_material,
        }
    }

    fn pending_state(&self, key: StateKey) -> &str {
        self.state
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    fn set_state(&mut self, key: StateKey, value: &str) {
        if let Some((_, slot)) = self.state.iter_mut().find(|(k, _)| *k == key) {
            *slot = value.to_string();
        }
        self.flush();
    }

    /// Close the current face run, if any.
    fn flush(&mut self) {
        if self.faces_in_run == 0 {
            return;
        }
        if let Some(surface) = self.surface.take() {
            self.mesh.end_surface(surface);
        }
        self.faces_in_run = 0;
    }

    /// Open a triangle surface tagged with the pending properties.
    fn begin_run(&mut self) -> SurfaceId {
        let material = match self.pending_state(StateKey::Material) {
            "" => DEFAULT_MATERIAL.to_string(),
            name => name.to_string(),
        };
        self.mesh.set_material_name(material);
        let id = self.mesh.begin_surface(PrimitiveTopology::Triangles);
        if let Some(surface) = self.mesh.surface_mut(id) {
            for (key, value) in &self.state {
                surface.set_property(key.keyword(), value.as_str());
            }
        }
        self.report.surfaces += 1;
        self.surface = Some(id);
        id
    }

    /// Which tables contribute to the vertices of the next face
    fn present_tables(&self) -> [bool; ATTRIB_SLOT_COUNT] {
        let positions = self.tables[POSITION_SLOT].len();
        let mut present = [false; ATTRIB_SLOT_COUNT];
        for (slot, table) in self.tables.iter().enumerate() {
            present[slot] = match slot {
                POSITION_SLOT => true,
                NORMAL_SLOT | TEXCOORD_SLOT => !table.is_empty(),
                _ => !table.is_empty() && table.len() == positions,
            };
        }
        present
    }

    fn assemble(&mut self, corner: &Corner, present: &[bool; ATTRIB_SLOT_COUNT]) -> PendingVertex {
        let mut vertex = PendingVertex::filled(Vec4::W);
        for slot in (0..ATTRIB_SLOT_COUNT).rev() {
            if !present[slot] {
                continue;
            }
            let value = match corner.row(slot).and_then(|row| self.tables[slot].get(row)) {
                Some(value) => *value,
                None => {
                    log::warn!(
                        "OBJ face references missing row {:?} of table {}",
                        corner.row(slot),
                        slot
                    );
                    self.report.missing_lookups += 1;
                    Vec4::ZERO
                }
            };
            vertex.set(slot, value);
        }
        vertex
    }

    fn face(&mut self, refs: &[FaceRef]) {
        if refs.len() < 3 {
            log::debug!("skipping OBJ face with {} references", refs.len());
            self.report.skipped_faces += 1;
            return;
        }

        let surface = match self.surface {
            Some(surface) if self.faces_in_run > 0 => surface,
            _ => self.begin_run(),
        };

        let corners: Vec<Corner> = refs
            .iter()
            .map(|r| Corner {
                vertex: resolve_index(r.vertex, self.tables[POSITION_SLOT].len()),
                texcoord: resolve_index(r.texcoord, self.tables[TEXCOORD_SLOT].len()),
                normal: resolve_index(r.normal, self.tables[NORMAL_SLOT].len()),
            })
            .collect();
        let present = self.present_tables();

        for k in 1..corners.len() - 1 {
            let mut committed = [None; 3];
            for (slot, corner) in committed.iter_mut().zip([0, k, k + 1]) {
                let vertex = self.assemble(&corners[corner], &present);
                *slot = self.mesh.commit(&vertex);
            }
            for index in committed {
                self.mesh
                    .add_index(surface, index.map_or(IndexRef::Sequential, IndexRef::Vertex));
            }
            self.report.triangles += 1;
        }

        self.faces_in_run += 1;
        self.report.faces += 1;
    }

    fn record(&mut self, record: ObjRecord<'_>) {
        match record {
            ObjRecord::Attribute {
                slot,
                value,
                invalid_numbers,
            } => {
                self.tables[slot].push(value);
                self.report.invalid_numbers += invalid_numbers;
            }
            ObjRecord::Face(refs) => self.face(&refs),
            ObjRecord::State { key, value } => self.set_state(key, value),
            ObjRecord::Unknown(keyword) => {
                log::trace!("ignoring OBJ record {keyword:?}");
                self.report.unknown_records += 1;
            }
        }
    }

    fn finish(mut self) -> ImportReport {
        self.flush();
        self.mesh
            .set_material_name(std::mem::take(&mut self.caller_material));
        self.report.vertices = self.mesh.vertex_count();
        self.report.indices = self.mesh.index_count();
        self.report
    }
}

/// Parse OBJ `text` into `mesh`.
///
/// Unless `options` say otherwise the mesh is reset first. Every triangle
/// corner is committed as a new vertex and indexed once, in one triangle
/// surface per run of faces between state records. Malformed content never
/// fails the import; it is counted in the returned report.
pub fn import_obj(mesh: &mut IndexedGeometryMesh, text: &str, options: &ImportOptions) -> ImportReport {
    if text == UNKNOWN_OBJECT {
        log::debug!("nothing to import");
        return ImportReport {
            skipped: true,
            ..Default::default()
        };
    }

    if options.reset_mesh {
        mesh.reset();
    }

    let mut importer = Importer::new(mesh);
    for record in parse_records(text) {
        importer.record(record);
    }
    let report = importer.finish();

    log::info!(
        "Loaded OBJ file with {}/{} vertices/indices in {} surfaces",
        report.vertices,
        report.indices,
        report.surfaces
    );
    report
}
