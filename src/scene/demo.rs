//! Ready made scenes for the binaries, benchmarks and tests.

use std::sync::Arc;

use rand::{Rng as _, SeedableRng as _, rngs::SmallRng};

use crate::geometry::{Axis, Color, TexturePoint, WorldPoint, WorldVector};

use super::{
    Cone, Cylinder, Material, Pattern, Polygon, Primitive, Projection, Sphere, Texture,
    TextureMapping, Transmission,
};

/// Closed box room with a few spheres, a mirror cylinder and a cone.
/// If `floor_texture` is given, it is painted onto a patch of the striped floor.
pub fn room(floor_texture: Option<Arc<Texture>>) -> Vec<Primitive> {
    let mut ret = Vec::new();
    let mut add = |geometry: crate::scene::Geometry, material: Material| {
        ret.push(Primitive::new(ret.len() as u32, geometry, material));
    };

    add(
        Sphere::new(WorldPoint::new(-5.0, 0.0, -90.0), 15.0).into(),
        Material::builder()
            .color(Color::new(0.0, 0.0, 1.0))
            .reflectivity(0.5)
            .build(),
    );
    add(
        Sphere::new(WorldPoint::new(10.0, 10.0, -60.0), 3.0).into(),
        Material::builder()
            .color(Color::new(0.0, 1.0, 1.0))
            .shininess(5.0)
            .build(),
    );
    add(
        Sphere::new(WorldPoint::new(5.0, 5.0, -70.0), 5.0).into(),
        Material::builder()
            .color(Color::new(1.0, 0.0, 0.0))
            .shininess(100.0)
            .transmission(Transmission::Transparent { coefficient: 0.3 })
            .build(),
    );
    add(
        Sphere::new(WorldPoint::new(5.0, -10.0, -60.0), 5.0).into(),
        Material::builder()
            .color(Color::new(0.0, 1.0, 0.0))
            .specular(false)
            .transmission(Transmission::Refractive {
                coefficient: 0.1,
                refractive_index: 1.1,
            })
            .build(),
    );
    add(
        Cylinder::new(WorldPoint::new(10.0, -15.0, -40.0), 2.0, 10.0).into(),
        Material::builder()
            .color(Color::new(0.0, 1.0, 1.0))
            .reflectivity(0.9)
            .build(),
    );
    add(
        Cone::new(WorldPoint::new(-12.0, -15.0, -55.0), 3.0, 8.0).into(),
        Material::builder()
            .color(Color::new(1.0, 0.5, 0.0))
            .shininess(20.0)
            .build(),
    );

    let floor = Polygon::quad(
        WorldPoint::new(-40.0, -15.0, 20.0),
        WorldPoint::new(40.0, -15.0, 20.0),
        WorldPoint::new(40.0, -15.0, -200.0),
        WorldPoint::new(-40.0, -15.0, -200.0),
    );
    add(
        floor.into(),
        Material::builder()
            .color(Color::new(0.8, 0.8, 0.0))
            .specular(false)
            .pattern(Pattern::Stripes {
                width: 5.0,
                direction: WorldVector::new(0.0, 0.0, 1.0),
                colors: vec![Color::new(0.0, 1.0, 0.0), Color::new(1.0, 1.0, 0.5)],
            })
            .maybe_texture(floor_texture.map(|texture| TextureMapping {
                texture,
                projection: Projection::Planar {
                    u_axis: Axis::X,
                    v_axis: Axis::Z,
                    min: TexturePoint::new(-15.0, -60.0),
                    max: TexturePoint::new(5.0, -90.0),
                },
            }))
            .build(),
    );

    let back_wall = Polygon::quad(
        WorldPoint::new(-40.0, -15.0, -200.0),
        WorldPoint::new(40.0, -15.0, -200.0),
        WorldPoint::new(40.0, 40.0, -200.0),
        WorldPoint::new(-40.0, 40.0, -200.0),
    );
    let axes = back_wall.edge_axes();
    add(
        back_wall.into(),
        Material::builder()
            .color(Color::new(0.8, 0.8, 0.8))
            .specular(false)
            .pattern(Pattern::Checkered {
                width: 2.0,
                axes,
                colors: [Color::zeros(), Color::new(1.0, 1.0, 1.0)],
            })
            .build(),
    );

    add(
        Polygon::quad(
            WorldPoint::new(-50.0, 40.0, 20.0),
            WorldPoint::new(-50.0, 40.0, -200.0),
            WorldPoint::new(50.0, 40.0, -200.0),
            WorldPoint::new(50.0, 40.0, 20.0),
        )
        .into(),
        Material::builder()
            .color(Color::new(0.8, 0.8, 0.8))
            .specular(false)
            .reflectivity(0.7)
            .build(),
    );

    let walls = [
        (
            [
                [-40.0, -15.0, 20.0],
                [-40.0, -15.0, -200.0],
                [-40.0, 40.0, -200.0],
                [-40.0, 40.0, 20.0],
            ],
            Color::new(1.0, 0.0, 0.0),
        ),
        (
            [
                [40.0, -15.0, 20.0],
                [40.0, 40.0, 20.0],
                [40.0, 40.0, -200.0],
                [40.0, -15.0, -200.0],
            ],
            Color::new(0.0, 0.5, 1.0),
        ),
        (
            [
                [-40.0, -15.0, 20.0],
                [-40.0, 40.0, 20.0],
                [40.0, 40.0, 20.0],
                [40.0, -15.0, 20.0],
            ],
            Color::new(0.8, 0.8, 0.8),
        ),
    ];
    for ([a, b, c, d], color) in walls {
        add(
            Polygon::quad(a.into(), b.into(), c.into(), d.into()).into(),
            Material::builder().color(color).specular(false).build(),
        );
    }

    ret
}

/// `n` x `n` x `n` spheres on a regular grid centered on the origin.
pub fn sphere_grid(n: usize, spacing: f32) -> Vec<Primitive> {
    let offset = (n as f32 - 1.0) * spacing / 2.0;
    let radius = spacing * 0.3;

    itertools::iproduct!(0..n, 0..n, 0..n)
        .enumerate()
        .map(|(id, (i, j, k))| {
            let center = WorldPoint::new(
                i as f32 * spacing - offset,
                j as f32 * spacing - offset,
                k as f32 * spacing - offset,
            );
            let color = Color::new(
                i as f32 / n as f32,
                j as f32 / n as f32,
                k as f32 / n as f32,
            );
            Primitive::new(
                id as u32,
                Sphere::new(center, radius),
                Material::builder().color(color).build(),
            )
        })
        .collect()
}

/// Randomly placed spheres of various sizes in a 24 unit cube around the origin.
/// Same seed gives the same scene.
pub fn sphere_cluster(count: usize, seed: u64) -> Vec<Primitive> {
    let mut rng = SmallRng::seed_from_u64(seed);

    (0..count)
        .map(|id| {
            let center = WorldPoint::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
            );
            let radius = rng.random_range(0.3..1.2);
            let color = Color::new(rng.random(), rng.random(), rng.random());
            let mut material = Material::builder().color(color).build();
            if rng.random_bool(0.2) {
                material.reflectivity = Some(0.5);
            }
            Primitive::new(id as u32, Sphere::new(center, radius), material)
        })
        .collect()
}
