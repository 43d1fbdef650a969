//! Drops an impact on a terrain every half second.

use core::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use craterfield::{Terrain, TerrainConfig};

#[derive(Component)]
struct Crater {
    terrain: Terrain,
    mesh: Handle<Mesh>,
}

#[derive(Resource)]
struct ImpactTimer(Timer);

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(ImpactTimer(Timer::from_seconds(0.5, TimerMode::Repeating)))
        .add_systems(Startup, setup)
        .add_systems(Update, bombard)
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let terrain = Terrain::generate(TerrainConfig {
        x_size: 64,
        y_size: 64,
        scale: 10.0,
        z_multiplier: 40.0,
        ..default()
    });
    let mesh = meshes.add(terrain.to_mesh());

    commands.spawn((
        Mesh3d(mesh.clone()),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.4, 0.6, 0.3),
            cull_mode: None,
            double_sided: true,
            ..default()
        })),
        // The terrain is z up.
        Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
        Crater { terrain, mesh },
    ));
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(320.0, 500.0, 500.0).looking_at(Vec3::new(320.0, 0.0, -320.0), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(0.0, 100.0, 0.0).looking_at(Vec3::new(200.0, 0.0, -300.0), Vec3::Y),
    ));
}

fn bombard(
    time: Res<Time>,
    mut timer: ResMut<ImpactTimer>,
    mut craters: Query<(&mut Crater, &GlobalTransform)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    let t = time.elapsed_secs();
    for (mut crater, transform) in &mut craters {
        let Crater { terrain, mesh } = &mut *crater;
        let Some(surface) = meshes.get_mut(mesh.id()) else {
            continue;
        };

        let affine = transform.affine();
        let local = Vec3::new((t * 97.0) % 640.0, (t * 53.0) % 640.0, 0.0);
        let report = terrain.apply_impact(affine.transform_point3(local), &affine, surface);
        info!(lowered = report.lowered.len(), "impact");
    }
}
