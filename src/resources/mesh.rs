use cgmath::{InnerSpace, Vector2, Vector3, Vector4};

use crate::data_structures::model::ModelVertex;

/**
 * Not every exported glTF primitive comes with tangents, so they have to be
 * calculated for normal maps to work correctly.
 */
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];

    // Calculate tangents and bitangents. We're going to
    // use the triangles, so we need to loop through the
    // indices in chunks of 3
    for c in indices.chunks_exact(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let v0 = vertices[i0];
        let v1 = vertices[i1];
        let v2 = vertices[i2];

        let pos0: Vector3<_> = v0.position.into();
        let pos1: Vector3<_> = v1.position.into();
        let pos2: Vector3<_> = v2.position.into();

        let uv0: Vector2<_> = v0.tex_coords.into();
        let uv1: Vector2<_> = v1.tex_coords.into();
        let uv2: Vector2<_> = v2.tex_coords.into();

        // Calculate the edges of the triangle
        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;

        // This will give us a direction to calculate the
        // tangent and bitangent
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // Solving the following system of equations will
        // give us the tangent and bitangent.
        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            // degenerate UVs, nothing to solve for
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // We flip the bitangent to enable right-handed normal
        // maps with wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        // We'll use the same tangent/bitangent for each vertex in the triangle
        for i in [i0, i1, i2] {
            vertices[i].tangent = (tangent + Vector3::from(vertices[i].tangent)).into();
            vertices[i].bitangent = (bitangent + Vector3::from(vertices[i].bitangent)).into();
            // Used to average the tangents/bitangents
            triangles_included[i] += 1;
        }
    }

    // Average the tangents/bitangents
    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        let v = &mut vertices[i];
        v.tangent = (Vector3::from(v.tangent) * denom).into();
        v.bitangent = (Vector3::from(v.bitangent) * denom).into();
    }
}

/// glTF stores tangents as vec4 where the 4th component is the bitangent sign.
pub fn apply_gltf_tangent(vertex: &mut ModelVertex, tangent: [f32; 4]) {
    let tangent: Vector4<f32> = tangent.into();
    let normal: Vector3<f32> = vertex.normal.into();
    vertex.tangent = tangent.truncate().into();
    let bitangent = normal.cross(tangent.truncate()) * tangent.w;
    vertex.bitangent = bitangent.into();
}

/// Unit normals where the asset has none, pointing along +Y.
pub fn ensure_normals(vertices: &mut [ModelVertex]) {
    for v in vertices.iter_mut() {
        let n = Vector3::from(v.normal);
        v.normal = if n.magnitude2() > 0.0 {
            n.normalize().into()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}
