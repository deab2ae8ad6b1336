//! OBJ import

use std::path::Path;

use crate::error::AssetError;

use super::object::{Mesh, Object};

/// Loads every model in an OBJ file into one object named after the file.
pub fn load_obj(path: &Path) -> Result<Object, AssetError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    if materials.is_err() {
        log::debug!("No MTL file for {}, using scene materials", path.display());
    }

    let meshes = models
        .into_iter()
        .map(|model| mesh_from_tobj(&model.mesh))
        .collect();

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let object =
        Object::from_meshes(name, meshes).ok_or_else(|| AssetError::EmptyModel(path.to_path_buf()))?;
    log::info!(
        "Loaded {} ({} meshes, bounds {:?})",
        path.display(),
        object.meshes().len(),
        object.bounding_box()
    );
    Ok(object)
}

/// Converts one imported mesh. Normals are generated when missing and V is
/// flipped for a top-left texture origin.
pub fn mesh_from_tobj(mesh: &tobj::Mesh) -> Mesh {
    let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
        mesh.normals.clone()
    } else {
        Mesh::calculate_normals(&mesh.positions, &mesh.indices)
    };

    let tex_coords: Vec<f32> = mesh
        .texcoords
        .chunks_exact(2)
        .flat_map(|uv| [uv[0], 1.0 - uv[1]])
        .collect();

    Mesh::from_arrays(&mesh.positions, &normals, &tex_coords, mesh.indices.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_without_normals() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.25, 0.0, 1.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        };

        let converted = mesh_from_tobj(&mesh);
        let vertices = converted.vertices();

        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].tex_coords, [0.0, 1.0]);
        assert_eq!(vertices[1].tex_coords, [1.0, 0.75]);
        assert_eq!(converted.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_obj(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
    }
}
