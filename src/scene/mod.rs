pub mod bvh;
pub mod demo;
mod material;
mod primitives;
mod surface;
mod texture;

use bon::Builder;
use index_vec::{IndexSlice, IndexVec};

use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};

pub use bvh::{Bvh, DEFAULT_LEAF_SIZE, QueryStats, StackCache};
pub use material::{AIR_REFRACTIVE_INDEX, Material, Transmission};
pub use primitives::{Cone, Cylinder, Geometry, Polygon, Primitive, PrimitiveIdx, Shape, Sphere};
pub use surface::{Pattern, Projection, TextureMapping};
pub use texture::{Texture, TextureError};

/// Point light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub position: WorldPoint,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            position: WorldPoint::new(10.0, 30.0, -3.0),
        }
    }
}

/// How closest hit queries find their primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueryMode {
    /// Test every primitive.
    Linear,

    /// Traverse the BVH.
    Bvh,

    /// Use the BVH once the scene has at least `crossover` primitives.
    Auto { crossover: usize },
}

impl Default for QueryMode {
    fn default() -> Self {
        QueryMode::Auto { crossover: 32 }
    }
}

impl QueryMode {
    /// Turn `Auto` into one of the concrete modes.
    fn resolve(self, primitive_count: usize) -> QueryMode {
        match self {
            QueryMode::Auto { crossover } if primitive_count >= crossover => QueryMode::Bvh,
            QueryMode::Auto { .. } => QueryMode::Linear,
            concrete => concrete,
        }
    }
}

#[derive(Clone, Debug, Builder)]
pub struct SceneSettings {
    #[builder(default)]
    pub query_mode: QueryMode,

    /// Largest number of primitives in a BVH leaf.
    #[builder(default = DEFAULT_LEAF_SIZE)]
    pub leaf_size: usize,

    #[builder(default)]
    pub light: Light,
}

impl Default for SceneSettings {
    fn default() -> Self {
        SceneSettings::builder().build()
    }
}

/// Nearest intersection of a ray with the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub t: FloatType,
    pub point: WorldPoint,
    pub primitive: PrimitiveIdx,
}

/// Primitives, their BVH and the light.
/// Read only while rendering; edits go through `Scene::edit`, which rebuilds the hierarchy.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: IndexVec<PrimitiveIdx, Primitive>,
    bvh: Bvh,
    settings: SceneSettings,
    query_mode: QueryMode,
}

impl Scene {
    pub fn new(primitives: Vec<Primitive>, settings: SceneSettings) -> Scene {
        let mut scene = Scene {
            primitives: IndexVec::from_vec(primitives),
            bvh: Bvh::default(),
            query_mode: QueryMode::Linear,
            settings,
        };
        scene.rebuild();
        scene
    }

    fn rebuild(&mut self) {
        self.bvh = Bvh::build(&mut self.primitives, self.settings.leaf_size);
        self.query_mode = self.settings.query_mode.resolve(self.primitives.len());

        log::debug!(
            "Scene has {} primitives, using {:?} queries",
            self.primitives.len(),
            self.query_mode
        );
        self.bvh.print_tree();
    }

    /// Modify the primitive list and rebuild the BVH.
    /// Primitive indices change, identities (`Primitive::id`) stay.
    pub fn edit(&mut self, f: impl FnOnce(&mut Vec<Primitive>)) {
        let mut primitives = std::mem::take(&mut self.primitives).raw;
        f(&mut primitives);
        self.primitives = IndexVec::from_vec(primitives);
        self.rebuild();
    }

    pub fn primitives(&self) -> &IndexSlice<PrimitiveIdx, [Primitive]> {
        &self.primitives
    }

    pub fn primitive(&self, index: PrimitiveIdx) -> &Primitive {
        &self.primitives[index]
    }

    /// Current index of the primitive with the given id.
    pub fn index_of(&self, id: u32) -> Option<PrimitiveIdx> {
        self.primitives.position(|p| p.id == id)
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn light(&self) -> &Light {
        &self.settings.light
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// The query mode in effect, never `Auto`.
    pub fn query_mode(&self) -> QueryMode {
        self.query_mode
    }

    /// Nearest hit using the scene's query mode.
    pub fn closest_hit(
        &self,
        ray: &Ray,
        stack: &mut StackCache,
        stats: &mut QueryStats,
    ) -> Option<Hit> {
        match self.query_mode {
            QueryMode::Bvh => self.closest_hit_bvh(ray, stack, stats),
            _ => self.closest_hit_linear(ray, stats),
        }
    }

    /// Nearest hit testing every primitive; of several primitives at the same distance,
    /// the first one wins.
    pub fn closest_hit_linear(&self, ray: &Ray, stats: &mut QueryStats) -> Option<Hit> {
        if ray.direction == WorldVector::zeros() {
            return None;
        }

        let mut best: Option<(PrimitiveIdx, FloatType)> = None;
        for (index, primitive) in self.primitives.iter_enumerated() {
            stats.primitive_tests += 1;
            if let Some(t) = primitive.intersect(ray) {
                if best.is_none_or(|(_, best_t)| t < best_t) {
                    best = Some((index, t));
                }
            }
        }

        best.map(|(primitive, t)| self.make_hit(ray, primitive, t))
    }

    pub fn closest_hit_bvh(
        &self,
        ray: &Ray,
        stack: &mut StackCache,
        stats: &mut QueryStats,
    ) -> Option<Hit> {
        if ray.direction == WorldVector::zeros() {
            return None;
        }

        self.bvh
            .closest_hit(&self.primitives, ray, stack, stats)
            .map(|(primitive, t)| self.make_hit(ray, primitive, t))
    }

    fn make_hit(&self, ray: &Ray, primitive: PrimitiveIdx, t: FloatType) -> Hit {
        Hit {
            t,
            point: ray.point_at(t),
            primitive,
        }
    }
}
