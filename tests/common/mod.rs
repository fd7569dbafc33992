//! Mesh generators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use nalgebra::Point3;
use proxima::mesh::TriangleMesh;

/// Unit icosphere, outward wound.
pub fn icosphere(subdivisions: usize) -> TriangleMesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = 1.0 / (1.0 + phi * phi).sqrt();

    let mut vertices = vec![
        Point3::new(-1.0, phi, 0.0) * scale,
        Point3::new(1.0, phi, 0.0) * scale,
        Point3::new(-1.0, -phi, 0.0) * scale,
        Point3::new(1.0, -phi, 0.0) * scale,
        Point3::new(0.0, -1.0, phi) * scale,
        Point3::new(0.0, 1.0, phi) * scale,
        Point3::new(0.0, -1.0, -phi) * scale,
        Point3::new(0.0, 1.0, -phi) * scale,
        Point3::new(phi, 0.0, -1.0) * scale,
        Point3::new(phi, 0.0, 1.0) * scale,
        Point3::new(-phi, 0.0, -1.0) * scale,
        Point3::new(-phi, 0.0, 1.0) * scale,
    ];

    let mut triangles = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_triangles = Vec::with_capacity(triangles.len() * 4);
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for tri in &triangles {
            let mut mids = [0usize; 3];
            for i in 0..3 {
                let v0 = tri[i];
                let v1 = tri[(i + 1) % 3];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                mids[i] = *edge_midpoints.entry(key).or_insert_with(|| {
                    let mid = (vertices[v0].coords + vertices[v1].coords) / 2.0;
                    vertices.push(Point3::from(mid.normalize()));
                    vertices.len() - 1
                });
            }
            new_triangles.push([tri[0], mids[0], mids[2]]);
            new_triangles.push([tri[1], mids[1], mids[0]]);
            new_triangles.push([tri[2], mids[2], mids[1]]);
            new_triangles.push([mids[0], mids[1], mids[2]]);
        }
        triangles = new_triangles;
    }

    TriangleMesh::new(vertices, triangles).unwrap()
}

/// Prism over a counter-clockwise polygon in the XY plane, spanning `z0..z1`,
/// outward wound.
///
/// The caps are fanned from `fan_apex`, which must see the whole polygon.
pub fn extrude(polygon: &[(f64, f64)], fan_apex: usize, z0: f64, z1: f64) -> TriangleMesh {
    let n = polygon.len();
    let mut vertices: Vec<Point3<f64>> = polygon.iter().map(|&(x, y)| Point3::new(x, y, z0)).collect();
    vertices.extend(polygon.iter().map(|&(x, y)| Point3::new(x, y, z1)));

    let bottom = |i: usize| i % n;
    let top = |i: usize| n + i % n;

    let mut triangles = Vec::with_capacity(4 * n - 4);
    for k in 1..n - 1 {
        let (a, b, c) = (fan_apex, fan_apex + k, fan_apex + k + 1);
        triangles.push([top(a), top(b), top(c)]);
        triangles.push([bottom(a), bottom(c), bottom(b)]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push([bottom(i), bottom(j), top(j)]);
        triangles.push([bottom(i), top(j), top(i)]);
    }

    TriangleMesh::new(vertices, triangles).unwrap()
}

/// Axis-aligned box centered at the origin.
pub fn cuboid(size: f64) -> TriangleMesh {
    let h = size / 2.0;
    extrude(&[(-h, -h), (h, -h), (h, h), (-h, h)], 0, -h, h)
}

/// L-shaped prism: the square `[-2, 2]²` minus the quadrant `x < 0, y > 0`,
/// over `z` in `[-1, 1]`. The reflex corner sits on the z axis.
pub fn l_prism() -> TriangleMesh {
    extrude(
        &[(-2.0, -2.0), (2.0, -2.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0), (-2.0, 0.0)],
        4,
        -1.0,
        1.0,
    )
}

/// Triangular prism with a sharp vertical ridge along `x = 0, y = 3`.
pub fn ridge_prism() -> TriangleMesh {
    extrude(&[(-1.0, 0.0), (1.0, 0.0), (0.0, 3.0)], 0, 0.0, 4.0)
}

/// The same mesh with every vertex multiplied by `factor`.
pub fn scaled(mesh: &TriangleMesh, factor: f64) -> TriangleMesh {
    let vertices = mesh.vertices().iter().map(|p| p * factor).collect();
    TriangleMesh::new(vertices, mesh.triangles().to_vec()).unwrap()
}

/// The same surface with its triangle list reversed.
pub fn reversed(mesh: &TriangleMesh) -> TriangleMesh {
    let mut triangles = mesh.triangles().to_vec();
    triangles.reverse();
    TriangleMesh::new(mesh.vertices().to_vec(), triangles).unwrap()
}

/// `count` points spread evenly over a sphere of the given radius.
pub fn fibonacci_sphere(count: usize, radius: f64) -> Vec<Point3<f64>> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            Point3::new(r * theta.cos(), y, r * theta.sin()) * radius
        })
        .collect()
}
