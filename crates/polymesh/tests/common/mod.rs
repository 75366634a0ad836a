//! Mesh generators shared by the integration and property tests.

#![allow(dead_code)]

use nalgebra::Point3;
use polymesh::{Face, RawBoundary, RawMesh};

/// A structured block of `nx * ny * nz` unit hexahedra in reader layout.
///
/// Boundary faces come first (one patch per side), internal faces last, so
/// that the builder's reversal puts internal faces first. Each face normal
/// points along +x, +y or +z; the cell on the positive side references it
/// as inward (negative).
pub fn hex_grid(nx: usize, ny: usize, nz: usize) -> RawMesh {
    let p = |i: usize, j: usize, k: usize| (i + (nx + 1) * (j + (ny + 1) * k)) as u32;
    let c = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(Point3::new(i as f64, j as f64, k as f64));
            }
        }
    }

    let x_face = |i: usize, j: usize, k: usize| {
        Face::from([p(i, j, k), p(i, j + 1, k), p(i, j + 1, k + 1), p(i, j, k + 1)])
    };
    let y_face = |i: usize, j: usize, k: usize| {
        Face::from([p(i, j, k), p(i, j, k + 1), p(i + 1, j, k + 1), p(i + 1, j, k)])
    };
    let z_face = |i: usize, j: usize, k: usize| {
        Face::from([p(i, j, k), p(i + 1, j, k), p(i + 1, j + 1, k), p(i, j + 1, k)])
    };

    let mut faces = Vec::new();
    let mut cells = vec![Vec::new(); nx * ny * nz];
    let mut boundaries = Vec::new();

    // (face, cell below, cell above)
    let add = |faces: &mut Vec<Face>,
                   cells: &mut Vec<Vec<i64>>,
                   face: Face,
                   below: Option<usize>,
                   above: Option<usize>| {
        faces.push(face);
        let value = faces.len() as i64;
        if let Some(cell) = below {
            cells[cell].push(value);
        }
        if let Some(cell) = above {
            cells[cell].push(-value);
        }
        value
    };

    let mut patch = |name: &str, values: Vec<i64>| {
        boundaries.push(RawBoundary {
            name: name.to_string(),
            faces: values,
        });
    };

    let mut values = Vec::new();
    for k in 0..nz {
        for j in 0..ny {
            values.push(add(&mut faces, &mut cells, x_face(0, j, k), None, Some(c(0, j, k))));
        }
    }
    patch("xmin", std::mem::take(&mut values));
    for k in 0..nz {
        for j in 0..ny {
            values.push(add(&mut faces, &mut cells, x_face(nx, j, k), Some(c(nx - 1, j, k)), None));
        }
    }
    patch("xmax", std::mem::take(&mut values));
    for k in 0..nz {
        for i in 0..nx {
            values.push(add(&mut faces, &mut cells, y_face(i, 0, k), None, Some(c(i, 0, k))));
        }
    }
    patch("ymin", std::mem::take(&mut values));
    for k in 0..nz {
        for i in 0..nx {
            values.push(add(&mut faces, &mut cells, y_face(i, ny, k), Some(c(i, ny - 1, k)), None));
        }
    }
    patch("ymax", std::mem::take(&mut values));
    for j in 0..ny {
        for i in 0..nx {
            values.push(add(&mut faces, &mut cells, z_face(i, j, 0), None, Some(c(i, j, 0))));
        }
    }
    patch("zmin", std::mem::take(&mut values));
    for j in 0..ny {
        for i in 0..nx {
            values.push(add(&mut faces, &mut cells, z_face(i, j, nz), Some(c(i, j, nz - 1)), None));
        }
    }
    patch("zmax", std::mem::take(&mut values));

    for k in 0..nz {
        for j in 0..ny {
            for i in 1..nx {
                add(&mut faces, &mut cells, x_face(i, j, k), Some(c(i - 1, j, k)), Some(c(i, j, k)));
            }
        }
    }
    for k in 0..nz {
        for j in 1..ny {
            for i in 0..nx {
                add(&mut faces, &mut cells, y_face(i, j, k), Some(c(i, j - 1, k)), Some(c(i, j, k)));
            }
        }
    }
    for k in 1..nz {
        for j in 0..ny {
            for i in 0..nx {
                add(&mut faces, &mut cells, z_face(i, j, k), Some(c(i, j, k - 1)), Some(c(i, j, k)));
            }
        }
    }

    RawMesh {
        points,
        faces,
        cells,
        boundaries,
    }
}

/// Reader ids of the faces referenced by two cells.
pub fn internal_faces(raw: &RawMesh) -> Vec<usize> {
    let mut count = vec![0usize; raw.faces.len()];
    for refs in &raw.cells {
        for &v in refs {
            count[(v.unsigned_abs() - 1) as usize] += 1;
        }
    }
    (0..raw.faces.len()).filter(|&f| count[f] == 2).collect()
}

/// Split quad `face` into two triangles along its first diagonal.
///
/// The second triangle is appended as a new face and referenced by the same
/// two cells with the same signs, which makes that cell pair multiply
/// connected.
pub fn split_internal_face(raw: &mut RawMesh, face: usize) {
    let ring = raw.faces[face].as_slice().to_vec();
    assert_eq!(ring.len(), 4, "only quads can be split");
    let (a, b, c, d) = (ring[0], ring[1], ring[2], ring[3]);

    raw.faces[face] = Face::from([a, b, c]);
    raw.faces.push(Face::from([a, c, d]));

    let old_value = face as i64 + 1;
    let new_value = raw.faces.len() as i64;
    for refs in &mut raw.cells {
        if let Some(&v) = refs.iter().find(|v| v.abs() == old_value) {
            refs.push(v.signum() * new_value);
        }
    }
}

/// Internal faces as `(sorted points, owner, neighbour)`, sorted.
///
/// Two meshes with the same connectivity but different face numbering or
/// ring rotation compare equal.
pub fn internal_signature(mesh: &polymesh::PolyMesh) -> Vec<(Vec<u32>, usize, usize)> {
    let mut sig: Vec<_> = (0..mesh.internal_face_count())
        .map(|f| {
            let mut pts = mesh.faces[f].as_slice().to_vec();
            pts.sort_unstable();
            (pts, mesh.owner[f], mesh.neighbour[f])
        })
        .collect();
    sig.sort();
    sig
}
