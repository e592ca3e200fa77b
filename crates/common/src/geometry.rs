//! Procedural meshes for debug objects.
//!
//! Triangles are wound clockwise when seen from outside, which is what the
//! Direct3D rasterizer treats as front facing by default.

use std::collections::HashMap;
use std::f32::consts::PI;

use super::math::*;
use super::model::MeshData;

pub fn icosphere(subdivisions: u32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    #[rustfmt::skip]
    let mut positions: Vec<Vec3> = [
        (-1.0,  t, 0.0), ( 1.0,  t, 0.0), (-1.0, -t, 0.0), ( 1.0, -t, 0.0),
        ( 0.0, -1.0,  t), ( 0.0,  1.0,  t), ( 0.0, -1.0, -t), ( 0.0,  1.0, -t),
        (  t, 0.0, -1.0), (  t, 0.0,  1.0), ( -t, 0.0, -1.0), ( -t, 0.0,  1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    #[rustfmt::skip]
    let mut triangles: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints = HashMap::new();
        let mut midpoint = |a: u32, b: u32| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let p = (positions[a as usize] + positions[b as usize]).normalize();
                positions.push(p);
                positions.len() as u32 - 1
            })
        };

        triangles = triangles
            .iter()
            .flat_map(|&[a, b, c]| {
                let ab = midpoint(a, b);
                let bc = midpoint(b, c);
                let ca = midpoint(c, a);
                [[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]
            })
            .collect();
    }

    let texcoords = positions
        .iter()
        .map(|p| Vec2::new(0.5 + p.z.atan2(p.x) / (2.0 * PI), 0.5 - p.y.asin() / PI))
        .collect();

    let mut mesh = MeshData {
        name: format!("icosphere{subdivisions}"),
        normals: positions.clone(),
        positions,
        texcoords,
        indices: triangles.into_iter().flatten().collect(),
        material: None,
    };
    orient_clockwise(&mut mesh);
    mesh
}

/// Axis-aligned cube spanning `[-1, 1]` with one normal per face.
pub fn cube() -> MeshData {
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
        (Vec3::Z, Vec3::Y, Vec3::NEG_X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut mesh = MeshData {
        name: "cube".to_string(),
        ..Default::default()
    };

    for (normal, up, side) in FACES {
        let base = mesh.positions.len() as u32;
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let offset = side * (2.0 * u - 1.0) + up * (1.0 - 2.0 * v);
            mesh.positions.push(normal + offset);
            mesh.normals.push(normal);
            mesh.texcoords.push(Vec2::new(u, v));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }

    orient_clockwise(&mut mesh);
    mesh
}

/// Flips any triangle whose geometric normal disagrees with its vertex normals.
fn orient_clockwise(mesh: &mut MeshData) {
    for triangle in mesh.indices.chunks_exact_mut(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face = (mesh.positions[b] - mesh.positions[a])
            .cross(mesh.positions[c] - mesh.positions[a]);
        let outward = mesh.normals[a] + mesh.normals[b] + mesh.normals[c];
        if face.dot(outward) < 0.0 {
            triangle.swap(1, 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_faces_outward(mesh: &MeshData) {
        for triangle in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| mesh.positions[i as usize]);
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(centroid) > 0.0, "inward triangle {triangle:?}");
        }
    }

    #[test]
    fn icosahedron_counts() {
        let mesh = icosphere(0);
        assert_eq!(mesh.positions.len(), 12);
        assert_eq!(mesh.indices.len(), 60);
        assert_faces_outward(&mesh);
    }

    #[test]
    fn subdivision_shares_midpoints() {
        let mesh = icosphere(2);
        // V = 10 * 4^n + 2, F = 20 * 4^n
        assert_eq!(mesh.positions.len(), 162);
        assert_eq!(mesh.indices.len(), 320 * 3);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.texcoords.len(), mesh.positions.len());
        assert!(mesh
            .positions
            .iter()
            .all(|p| (p.length() - 1.0).abs() < 1e-5));
        assert_faces_outward(&mesh);
    }

    #[test]
    fn cube_has_flat_faces() {
        let mesh = cube();
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh
            .positions
            .iter()
            .all(|p| p.abs().max_element() == 1.0));
        assert_faces_outward(&mesh);
    }
}
