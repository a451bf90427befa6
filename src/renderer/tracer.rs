use nalgebra::Unit;

use crate::geometry::{Color, EPSILON, FloatType, Ray, WorldVector, reflect, refract};
use crate::renderer::RenderSettings;
use crate::renderer::lighting::phong;
use crate::scene::{AIR_REFRACTIVE_INDEX, Hit, PrimitiveIdx, QueryStats, Scene, StackCache, Transmission};
use crate::util::Stats;

/// What the shadow ray towards the light found.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Shadow {
    Lit,
    /// Occluded by a see-through surface, lit color is multiplied by the factor.
    Attenuated(FloatType),
    /// Only ambient light reaches the point.
    Full,
}

/// Recursive Whitted style tracer for a single thread.
pub struct Tracer<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
    stack: &'a mut StackCache,

    query_stats: QueryStats,
    deepest_depth: u32,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings, stack: &'a mut StackCache) -> Self {
        Tracer {
            scene,
            settings,
            stack,
            query_stats: QueryStats::default(),
            deepest_depth: 0,
        }
    }

    /// Color seen along a primary ray. Work done by the whole ray tree is added to `stats`.
    pub fn trace_primary(&mut self, ray: &Ray, stats: &mut TraceStats) -> Color {
        self.query_stats = QueryStats::default();
        self.deepest_depth = 0;

        let color = self.trace(ray, AIR_REFRACTIVE_INDEX, 0);

        stats.add_ray(self.query_stats, self.deepest_depth);
        color
    }

    /// Color seen along `ray`, travelling through a medium with `incident_index`.
    /// `depth` is 0 for primary rays; secondary rays are only spawned below `max_bounces`.
    pub fn trace(&mut self, ray: &Ray, incident_index: FloatType, depth: u32) -> Color {
        self.deepest_depth = self.deepest_depth.max(depth);

        let Some(hit) = self
            .scene
            .closest_hit(ray, self.stack, &mut self.query_stats)
        else {
            return self.settings.background;
        };

        let primitive = self.scene.primitive(hit.primitive);
        let material = &primitive.material;
        let normal = primitive.normal(&hit.point);
        let surface_color = primitive.surface_color(&hit.point);

        let to_light = self.scene.light().position - hit.point;
        let (lighting, shadow) = match Unit::try_new(to_light, EPSILON) {
            Some(to_light_unit) => (
                phong(&surface_color, material, &normal, &to_light_unit, &ray.direction),
                self.shadow(&hit, &normal, to_light),
            ),
            // Light sits right on the surface
            None => (
                phong(&surface_color, material, &normal, &normal, &ray.direction),
                Shadow::Lit,
            ),
        };

        let mut color = match shadow {
            Shadow::Lit => lighting.ambient + lighting.diffuse,
            Shadow::Attenuated(factor) => (lighting.ambient + lighting.diffuse) * factor,
            Shadow::Full => lighting.ambient,
        };

        let can_bounce = depth < self.settings.max_bounces;
        let facing = ray.direction.dot(&normal) < 0.0;

        if let Some(reflectivity) = material.reflectivity {
            if can_bounce && facing {
                let reflected = Ray::leaving(&hit.point, &normal, reflect(&ray.direction, &normal));
                let reflected_color = self.trace(&reflected, incident_index, depth + 1);
                color = color * (1.0 - reflectivity) + reflected_color * reflectivity;
            }
        }

        if can_bounce {
            match material.transmission {
                Transmission::Opaque => {}
                Transmission::Transparent { coefficient } => {
                    let through = Ray::leaving(&hit.point, &normal, ray.direction);
                    let transmitted = self.trace(&through, incident_index, depth + 1);
                    color = color * coefficient + transmitted * (1.0 - coefficient);
                }
                Transmission::Refractive {
                    coefficient,
                    refractive_index,
                } => {
                    let (direction, next_index) = refracted_direction(
                        &ray.direction,
                        &normal,
                        incident_index,
                        refractive_index,
                    );
                    let bent = Ray::leaving(&hit.point, &normal, direction);
                    let transmitted = self.trace(&bent, next_index, depth + 1);
                    color = color * coefficient + transmitted * (1.0 - coefficient);
                }
            }
        }

        if shadow == Shadow::Lit {
            color += lighting.specular;
        }

        color
    }

    fn shadow(&mut self, hit: &Hit, normal: &Unit<WorldVector>, to_light: WorldVector) -> Shadow {
        let light_distance = to_light.norm();
        let shadow_ray = Ray::leaving(&hit.point, normal, to_light);

        let Some(occluder) = self
            .scene
            .closest_hit(&shadow_ray, self.stack, &mut self.query_stats)
        else {
            return Shadow::Lit;
        };

        if occluder.t >= light_distance {
            return Shadow::Lit;
        }

        if occluder.primitive == hit.primitive {
            // Far side of the same surface
            return Shadow::Full;
        }

        occluder_shadow(self.scene, occluder.primitive)
    }
}

fn occluder_shadow(scene: &Scene, occluder: PrimitiveIdx) -> Shadow {
    match scene.primitive(occluder).material.transmission.shadow_attenuation() {
        Some(factor) => Shadow::Attenuated(factor),
        None => Shadow::Full,
    }
}

/// Direction continuing through a refractive surface and the refractive index of the medium it
/// continues in. Falls back to mirror reflection on total internal reflection.
fn refracted_direction(
    direction: &WorldVector,
    normal: &Unit<WorldVector>,
    incident_index: FloatType,
    object_index: FloatType,
) -> (WorldVector, FloatType) {
    let entering = direction.dot(normal) < 0.0;
    let (normal, eta, next_index) = if entering {
        (*normal, incident_index / object_index, object_index)
    } else {
        (-*normal, object_index / AIR_REFRACTIVE_INDEX, AIR_REFRACTIVE_INDEX)
    };

    match refract(direction, &normal, eta) {
        Some(refracted) => (refracted, next_index),
        None => (reflect(direction, &normal), incident_index),
    }
}

/// Intersection work of a batch of primary rays, including all their secondary rays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceStats {
    pub primary_rays: usize,

    /// Box and primitive tests of the whole ray tree, per primary ray.
    pub tests_per_ray: Stats,

    pub totals: QueryStats,

    pub deepest_depth: u32,
}

impl TraceStats {
    fn add_ray(&mut self, query_stats: QueryStats, depth: u32) {
        self.primary_rays += 1;
        self.tests_per_ray.add_sample(query_stats.total_tests());
        self.totals += query_stats;
        self.deepest_depth = self.deepest_depth.max(depth);
    }

    pub fn merge(&self, other: &Self) -> Self {
        let mut totals = self.totals;
        totals += other.totals;
        TraceStats {
            primary_rays: self.primary_rays + other.primary_rays,
            tests_per_ray: self.tests_per_ray.merge(&other.tests_per_ray),
            totals,
            deepest_depth: self.deepest_depth.max(other.deepest_depth),
        }
    }
}
