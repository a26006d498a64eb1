use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::config::AppConfig;
use crate::light::{Light, LightKind, ProjectionKind, LIGHT_COUNT};
use crate::tuning::{LightTuning, SceneTunables};

pub const TERRAIN_RESOLUTION: u32 = 100;
pub const SPHERE_RESOLUTION: u32 = 20;

/// Which of the renderer's meshes an object draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Terrain,
    Model,
    Cube,
    Sphere,
}

/// Tells the vertex shaders whether to displace by the height map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Terrain,
    Solid,
}

impl GeometryType {
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Terrain => 0.0,
            Self::Solid => 1.0,
        }
    }
}

/// A lit, shadow-casting object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub mesh: MeshKind,
    pub texture: &'static str,
    pub transform: Mat4,
    /// World matrix used when rendering into the shadow maps.
    pub shadow_transform: Mat4,
    pub geometry: GeometryType,
    pub terrain_resolution: f32,
}

impl SceneObject {
    fn solid(name: &'static str, mesh: MeshKind, texture: &'static str, transform: Mat4) -> Self {
        Self {
            name,
            mesh,
            texture,
            transform,
            shadow_transform: transform,
            geometry: GeometryType::Solid,
            terrain_resolution: 0.0,
        }
    }
}

/// Everything the frame pipeline reads and the debug panel edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub lights: Vec<Light>,
    pub tunables: SceneTunables,
    pub camera: Camera,
    pub objects: Vec<SceneObject>,
    /// Placement of the grass billboards; anchored on the terrain grid.
    pub grass_transform: Mat4,
    /// Area covered by orthographic shadow projections.
    pub scene_extent: Vec2,
}

impl Scene {
    /// The demo layout: displaced terrain, the model, a cube, a sphere and four lights.
    pub fn demo(config: &AppConfig) -> Self {
        let terrain_transform = Mat4::from_translation(Vec3::new(-50.0, 0.0, -10.0));
        // Translation is applied before the scale, so both offsets are halved.
        let model_transform =
            Mat4::from_scale(Vec3::splat(0.5)) * Mat4::from_translation(Vec3::new(0.0, 10.0, 5.0));
        let model_shadow_transform =
            Mat4::from_scale(Vec3::splat(0.5)) * Mat4::from_translation(Vec3::new(0.0, 7.0, 5.0));

        let objects = vec![
            SceneObject {
                name: "terrain",
                mesh: MeshKind::Terrain,
                texture: "dirt",
                transform: terrain_transform,
                shadow_transform: terrain_transform,
                geometry: GeometryType::Terrain,
                terrain_resolution: TERRAIN_RESOLUTION as f32,
            },
            SceneObject {
                shadow_transform: model_shadow_transform,
                ..SceneObject::solid("model", MeshKind::Model, "wood", model_transform)
            },
            SceneObject::solid(
                "cube",
                MeshKind::Cube,
                "wood",
                Mat4::from_translation(Vec3::new(12.0, 10.0, 3.0)),
            ),
            SceneObject::solid(
                "sphere",
                MeshKind::Sphere,
                "wood",
                Mat4::from_translation(Vec3::new(-12.0, 10.0, 2.0)),
            ),
        ];

        let mut scene = Self {
            lights: initial_lights(),
            tunables: SceneTunables::default(),
            camera: Camera::default(),
            objects,
            grass_transform: Mat4::from_translation(Vec3::new(-50.0, 1.0, -10.0)),
            scene_extent: Vec2::from(config.scene_extent),
        };
        for index in 0..scene.lights.len() {
            scene.refresh_light(index);
        }
        scene
    }

    pub fn light_tuning(&mut self, index: usize) -> Option<LightTuning<'_>> {
        self.lights.get_mut(index).map(LightTuning::new)
    }

    /// Regenerates a light's view matrix and its selected shadow projection.
    pub fn refresh_light(&mut self, index: usize) {
        let extent = self.scene_extent;
        if let Some(light) = self.lights.get_mut(index) {
            light.refresh_shadow_matrices(extent.x, extent.y);
        }
    }
}

pub fn gizmo_transform(light: &Light) -> Mat4 {
    Mat4::from_translation(light.position())
}

fn initial_lights() -> Vec<Light> {
    let grey = |value: f32| Vec4::new(value, value, value, 1.0);

    let mut sun = Light::new(LightKind::Directional);
    sun.set_ambient(grey(0.2));
    sun.set_diffuse(grey(0.2));
    sun.set_specular(grey(0.1));
    sun.set_direction(Vec3::new(0.0, -1.0, 1.0));
    sun.set_position(Vec3::new(0.0, 15.0, 0.0));
    sun.shadow_mut().bias = 0.002;
    sun.shadow_mut().soften = true;

    let mut point = Light::new(LightKind::Point);
    point.set_diffuse(Vec4::new(0.15, 0.4, 0.35, 1.0));
    point.set_position(Vec3::new(6.0, 12.0, 20.0));
    point.set_range(10.0);

    let spot = |diffuse: Vec4, position: Vec3| {
        let mut light = Light::new(LightKind::Spot);
        light.set_diffuse(diffuse);
        light.set_position(position);
        light.set_exponent(1.0);
        light.set_range(25.0);
        light.shadow_mut().projection = ProjectionKind::Perspective;
        light
    };

    let lights = vec![
        sun,
        point,
        spot(Vec4::new(0.6, 0.2, 0.2, 1.0), Vec3::new(6.0, 14.0, 2.0)),
        spot(Vec4::new(0.2, 0.6, 0.2, 1.0), Vec3::new(-10.0, 12.0, 3.0)),
    ];
    debug_assert_eq!(lights.len(), LIGHT_COUNT);
    lights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_has_one_light_per_slot() {
        let scene = Scene::demo(&AppConfig::default());
        assert_eq!(scene.lights.len(), LIGHT_COUNT);
        assert_eq!(scene.objects.len(), 4);
        let kinds: Vec<_> = scene.lights.iter().map(Light::kind).collect();
        assert_eq!(
            kinds,
            vec![LightKind::Directional, LightKind::Point, LightKind::Spot, LightKind::Spot]
        );
    }

    #[test]
    fn objects_use_their_textures() {
        let scene = Scene::demo(&AppConfig::default());
        let textures: Vec<_> = scene
            .objects
            .iter()
            .map(|object| (object.name, object.texture))
            .collect();
        assert_eq!(
            textures,
            vec![("terrain", "dirt"), ("model", "wood"), ("cube", "wood"), ("sphere", "wood")]
        );
    }

    #[test]
    fn spot_light_scenario() {
        let mut scene = Scene::demo(&AppConfig::default());
        {
            let mut tuning = scene.light_tuning(2).unwrap();
            tuning.set_attenuation(Vec3::new(1.0, 0.0, 0.0));
            tuning.set_range(25.0);
            tuning.set_exponent(1.0);
            tuning.set_shadow_planes(30.0, 30.0);
        }
        scene.refresh_light(2);

        let light = &scene.lights[2];
        assert_eq!(light.position(), Vec3::new(6.0, 14.0, 2.0));
        assert_eq!(light.look_at_target(), light.position() + light.direction());

        let shadow = light.shadow();
        assert!(shadow.near_plane < shadow.far_plane);
        assert!((shadow.near_plane - 29.9).abs() < 1e-4);
        assert!((shadow.far_plane - 30.0).abs() < 1e-4);

        let projection = light.shadow_projection();
        let near = projection.project_point3(Vec3::new(0.0, 0.0, -shadow.near_plane));
        let far = projection.project_point3(Vec3::new(0.0, 0.0, -shadow.far_plane));
        assert!(near.z.abs() < 1e-3);
        assert!((far.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn model_is_placed_after_scaling() {
        let scene = Scene::demo(&AppConfig::default());
        let model = &scene.objects[1];
        let origin = model.transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 5.0, 2.5)).length() < 1e-5);
    }
}
