use crate::galaxy::{generate, GalaxySlot, GalaxyTarget, GeneratedGalaxy};
use crate::prelude::*;
use bevy::{
    color::ColorToComponents,
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::{Indices, MeshVertexBufferLayoutRef},
        render_asset::RenderAssetUsages,
        render_resource::{
            AsBindGroup, PrimitiveTopology, RenderPipelineDescriptor, ShaderRef,
            SpecializedMeshPipelineError,
        },
        view::NoFrustumCulling,
    },
};

const SHADER_ASSET_PATH: &str = "shaders/point_cloud.wgsl";

// uv per billboard corner
const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

pub struct PointCloudPlugin;

impl Plugin for PointCloudPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<PointCloudMaterial>::default())
            .init_resource::<PointCloudSlot>()
            .add_systems(PostUpdate, regenerate_galaxy);
    }
}

#[derive(Resource, Default)]
struct PointCloudSlot(GalaxySlot<PointCloudAttachment>);

struct PointCloudAttachment {
    entity: Entity,
    mesh: Handle<Mesh>,
    material: Handle<PointCloudMaterial>,
}

#[derive(Component)]
struct GalaxyPoints;

/// The scene as seen by the galaxy slot.
/// Spawns and despawns go through `Commands`, so a replace lands in a single flush.
struct SceneTarget<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<PointCloudMaterial>,
}

impl GalaxyTarget for SceneTarget<'_, '_, '_> {
    type Attachment = PointCloudAttachment;

    fn attach(&mut self, galaxy: GeneratedGalaxy, point_size: f32) -> PointCloudAttachment {
        let mesh = self.meshes.add(build_point_mesh(&galaxy));
        let material = self.materials.add(PointCloudMaterial {
            point_size,
            alpha_mode: AlphaMode::Add,
        });

        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::default(),
                // billboards reach past the mesh aabb
                NoFrustumCulling,
                GalaxyPoints,
            ))
            .id();

        PointCloudAttachment {
            entity,
            mesh,
            material,
        }
    }

    fn release(&mut self, attachment: PointCloudAttachment) {
        self.commands.entity(attachment.entity).despawn();
        self.meshes.remove(&attachment.mesh);
        self.materials.remove(&attachment.material);
    }
}

/// Rebuilds the point cloud whenever the config generation moves on
fn regenerate_galaxy(
    mut commands: Commands,
    galaxy_config: Res<GalaxyConfig>,
    mut slot: ResMut<PointCloudSlot>,
    mut point_count: ResMut<PointCount>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<PointCloudMaterial>>,
) {
    if !slot.0.is_stale(galaxy_config.generation) {
        return;
    }

    let params = &galaxy_config.params;
    let galaxy = match generate(params, &mut rand::rng()) {
        Ok(galaxy) => galaxy,
        Err(e) => {
            error!("Galaxy generation {} failed: {}", galaxy_config.generation, e);
            slot.0.skip(galaxy_config.generation);
            return;
        }
    };

    if galaxy.is_empty() {
        warn!("Galaxy generation {} has no points", galaxy_config.generation);
    }
    info!(
        "Galaxy config updated, regenerating {} points (generation {})",
        galaxy.len(),
        galaxy_config.generation
    );
    point_count.count = galaxy.len();

    let mut target = SceneTarget {
        commands: &mut commands,
        meshes: &mut *meshes,
        materials: &mut *materials,
    };
    slot.0
        .replace(&mut target, galaxy_config.generation, galaxy, params.size);
}

/// One quad per point, 4 vertices sharing the point position and expanded in the vertex shader.
fn build_point_mesh(galaxy: &GeneratedGalaxy) -> Mesh {
    let vertex_count = galaxy.len() * 4;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(galaxy.len() * 6);

    let points = galaxy
        .flat_positions()
        .chunks_exact(3)
        .zip(galaxy.flat_colors().chunks_exact(3));
    for (i, (position, color)) in points.enumerate() {
        let position = [position[0], position[1], position[2]];
        let linear = LinearRgba::from(Srgba::rgb(color[0], color[1], color[2])).to_f32_array();
        for corner in CORNERS {
            positions.push(position);
            uvs.push(corner);
            colors.push(linear);
        }

        let base = (i * 4) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
    .with_inserted_indices(Indices::U32(indices))
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
struct PointCloudMaterial {
    #[uniform(0)]
    point_size: f32,
    alpha_mode: AlphaMode,
}

impl Material for PointCloudMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_mesh_has_quad_per_point() {
        let params = GalaxyParams {
            count: 128,
            ..default()
        };
        let galaxy = generate(&params, &mut StdRng::seed_from_u64(9)).unwrap();
        let mesh = build_point_mesh(&galaxy);

        assert_eq!(mesh.count_vertices(), 128 * 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(128 * 6));
        let Some(bevy::render::mesh::VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        // every corner of a quad sits on its point
        let points: &[[f32; 3]] = bytemuck::cast_slice(galaxy.flat_positions());
        for (i, point) in points.iter().enumerate() {
            for corner in 0..4 {
                assert_eq!(positions[i * 4 + corner], *point);
            }
        }
    }

    fn regenerate_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GalaxyConfig::default())
            .init_resource::<PointCount>()
            .init_resource::<PointCloudSlot>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<PointCloudMaterial>>()
            .add_systems(Update, regenerate_galaxy);
        app
    }

    fn commit_count(app: &mut App, count: u32) {
        let mut config = app.world_mut().resource_mut::<GalaxyConfig>();
        let params = GalaxyParams {
            count,
            ..config.params.clone()
        };
        config.commit(params).unwrap();
    }

    fn galaxy_entities(app: &mut App) -> usize {
        let mut query = app
            .world_mut()
            .query_filtered::<Entity, With<GalaxyPoints>>();
        query.iter(app.world()).count()
    }

    #[test]
    fn test_regenerate_replaces_point_cloud() {
        let mut app = regenerate_app();

        commit_count(&mut app, 500);
        app.update();
        assert_eq!(galaxy_entities(&mut app), 1);

        commit_count(&mut app, 800);
        app.update();
        assert_eq!(galaxy_entities(&mut app), 1);

        let meshes = app.world().resource::<Assets<Mesh>>();
        assert_eq!(meshes.len(), 1);
        let (_, mesh) = meshes.iter().next().unwrap();
        assert_eq!(mesh.count_vertices(), 800 * 4);
        assert_eq!(app.world().resource::<Assets<PointCloudMaterial>>().len(), 1);
        assert_eq!(app.world().resource::<PointCount>().count, 800);

        // nothing new to build
        app.update();
        assert_eq!(galaxy_entities(&mut app), 1);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 1);
    }

    #[test]
    fn test_failed_generation_keeps_previous_cloud() {
        let mut app = regenerate_app();
        commit_count(&mut app, 300);
        app.update();

        {
            // bypasses commit validation
            let mut config = app.world_mut().resource_mut::<GalaxyConfig>();
            config.params.branches = 0;
            config.generation += 1;
        }
        app.update();
        app.update();

        assert_eq!(galaxy_entities(&mut app), 1);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 1);
        assert_eq!(app.world().resource::<PointCount>().count, 300);
        let generation = app.world().resource::<GalaxyConfig>().generation;
        assert!(!app.world().resource::<PointCloudSlot>().0.is_stale(generation));
    }

    #[test]
    fn test_empty_galaxy_mesh() {
        let mesh = build_point_mesh(&GeneratedGalaxy::default());
        assert_eq!(mesh.count_vertices(), 0);
    }
}
