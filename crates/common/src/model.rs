use std::path::Path;

use super::color::Color;
use super::math::*;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("could not load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
    #[error("{0} contains no meshes")]
    Empty(String),
}

/// Surface colors read from the model's material library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialData {
    /// RGB specular color; alpha carries the shininess exponent.
    pub specular: Color,
    pub diffuse: Color,
    pub ambient: Color,
}

impl MaterialData {
    fn from_mtl(material: &tobj::Material) -> Self {
        let rgb = |c: Option<[f32; 3]>, alpha: f32| match c {
            Some([r, g, b]) => Color::new(r, g, b, alpha),
            None => Color::new(0.0, 0.0, 0.0, 1.0),
        };

        Self {
            specular: rgb(material.specular, 1.0).with_alpha(material.shininess.unwrap_or(0.0)),
            diffuse: rgb(material.diffuse, material.dissolve.unwrap_or(1.0)),
            ambient: rgb(material.ambient, 1.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub material: Option<MaterialData>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Loads every mesh of an OBJ file, triangulated and with a single index per vertex.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<MeshData>, ModelError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let (models, materials) =
        tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| ModelError::Load {
            path: display.clone(),
            source,
        })?;

    let materials = materials
        .inspect_err(|e| log::warn!("No usable material library for {display}: {e}"))
        .unwrap_or_default();

    if models.is_empty() {
        return Err(ModelError::Empty(display));
    }

    let meshes = models
        .into_iter()
        .map(|model| {
            let name = if model.name.is_empty() {
                display.clone()
            } else {
                format!("{display}:{}", model.name)
            };

            let mesh = model.mesh;
            let positions: Vec<Vec3> = mesh.positions.chunks_exact(3).map(Vec3::from_slice).collect();

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals.chunks_exact(3).map(Vec3::from_slice).collect()
            } else {
                log::debug!("{name} has no normals, generating smooth normals");
                smooth_normals(&positions, &mesh.indices)
            };

            let texcoords = if mesh.texcoords.len() / 2 == positions.len() {
                mesh.texcoords.chunks_exact(2).map(Vec2::from_slice).collect()
            } else {
                vec![Vec2::ZERO; positions.len()]
            };

            let material = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(MaterialData::from_mtl);

            MeshData {
                name,
                positions,
                normals,
                texcoords,
                indices: mesh.indices,
                material,
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "Loaded {display}: {} meshes, {} vertices in the first",
        meshes.len(),
        meshes[0].vertex_count()
    );

    Ok(meshes)
}

/// Area-weighted vertex normals.
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
