use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::error::{ Error, Result };
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::color::Color;
use crate::canvas::Canvas;
use crate::pattern::{ Pattern, Texture, UvMapping };
use crate::material::Material;
use crate::light::{ PointLight, AreaLight };
use crate::shape::Shape;
use crate::world::World;
use crate::camera::Camera;
use crate::imageio;

/// A camera and the world it looks at, ready to render.
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Parses a JSON scene description.
    ///
    /// Relative texture image paths are resolved against the current
    /// directory.
    pub fn from_json(json: &str) -> Result<Scene> {
        Scene::parse(json, Path::new(""))
    }

    /// Loads a JSON scene description from a file.
    ///
    /// Relative texture image paths are resolved against the directory the
    /// scene file is in.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        Scene::parse(&json, base)
    }

    fn parse(json: &str, base: &Path) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        scene_json.build(base)
    }
}

fn point(p: [f64; 3]) -> Tuple4D {
    Tuple4D::point(p[0], p[1], p[2])
}

fn vector(v: [f64; 3]) -> Tuple4D {
    Tuple4D::vector(v[0], v[1], v[2])
}

fn white() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn black() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}

fn two() -> usize {
    2
}

#[derive(Deserialize)]
struct SceneJson {
    camera: CameraJson,

    #[serde(default)]
    lights: LightsJson,

    #[serde(default)]
    textures: Vec<TextureJson>,

    #[serde(default)]
    materials: Vec<MaterialJson>,

    #[serde(default)]
    shapes: ShapesJson,
}

#[derive(Deserialize)]
struct CameraJson {
    width: usize,
    height: usize,
    fov: f64,
    from: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LightsJson {
    #[serde(default)]
    point_lights: Vec<PointLightJson>,

    #[serde(default)]
    area_lights: Vec<AreaLightJson>,
}

#[derive(Deserialize)]
struct PointLightJson {
    position: [f64; 3],
    intensity: [f64; 3],
}

/// `uvec` and `vvec` are the full edges of the rectangle.
#[derive(Deserialize)]
struct AreaLightJson {
    corner: [f64; 3],
    intensity: [f64; 3],
    uvec: [f64; 3],
    usteps: usize,
    vvec: [f64; 3],
    vsteps: usize,

    #[serde(default)]
    jitter: bool,
}

/// Optional scaling, rotation (radians about X, Y, Z) and translation,
/// applied in that order.
#[derive(Default, Deserialize)]
struct TransformJson {
    scaling: Option<[f64; 3]>,
    rotation: Option<[f64; 3]>,
    translation: Option<[f64; 3]>,
}

impl TransformJson {
    fn matrix(&self) -> Matrix4D {
        let mut m = Matrix4D::identity();

        if let Some(s) = self.scaling {
            m = Matrix4D::scaling(s[0], s[1], s[2]) * m;
        }

        if let Some(r) = self.rotation {
            m = Matrix4D::rotation_z(r[2])
                * Matrix4D::rotation_y(r[1])
                * Matrix4D::rotation_x(r[0])
                * m;
        }

        if let Some(t) = self.translation {
            m = Matrix4D::translation(t[0], t[1], t[2]) * m;
        }

        m
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PatternKind {
    Image,
    Stripe,
    Gradient,
    Ring,
    Checkers,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MappingKind {
    Sphere,
    Plane,
    Cubic,
}

impl From<MappingKind> for UvMapping {
    fn from(kind: MappingKind) -> UvMapping {
        match kind {
            MappingKind::Sphere => UvMapping::Spherical,
            MappingKind::Plane => UvMapping::Planar,
            MappingKind::Cubic => UvMapping::Cubic,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextureJson {
    name: String,
    pattern: PatternKind,
    mapping: MappingKind,

    #[serde(default = "white")]
    color1: [f64; 3],

    #[serde(default = "black")]
    color2: [f64; 3],

    #[serde(default = "two")]
    width: usize,

    #[serde(default = "two")]
    height: usize,

    image_path: Option<String>,

    #[serde(flatten)]
    transform: TransformJson,
}

impl TextureJson {
    fn build(&self, base: &Path) -> Result<Texture> {
        let a = Color::from(self.color1);
        let b = Color::from(self.color2);

        let pattern = match self.pattern {
            PatternKind::Stripe => Pattern::stripe(a, b),
            PatternKind::Gradient => Pattern::gradient(a, b),
            PatternKind::Ring => Pattern::ring(a, b),
            PatternKind::Checkers => Pattern::checkers(self.width, self.height, a, b),
            PatternKind::Image => {
                let path = self.image_path.as_ref()
                    .ok_or_else(|| Error::MissingImagePath(self.name.clone()))?;
                let canvas: Canvas = imageio::load(base.join(path))?;
                Pattern::image(Arc::new(canvas))?
            },
        };

        let mut texture = Texture::new(pattern, self.mapping.into());
        texture.set_transform(self.transform.matrix())?;
        Ok(texture)
    }
}

/// Coefficients left out fall back to `Material::default`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialJson {
    name: String,
    color: Option<[f64; 3]>,
    texture: Option<String>,

    ambient: Option<f64>,
    diffuse: Option<f64>,
    specular: Option<f64>,
    shininess: Option<f64>,
    reflective: Option<f64>,
    transparency: Option<f64>,
    refractive_index: Option<f64>,
}

impl MaterialJson {
    fn build(&self, textures: &HashMap<String, Arc<Texture>>) -> Result<Material> {
        let d = Material::default();

        let texture = match &self.texture {
            Some(name) => Some(Arc::clone(textures.get(name)
                .ok_or_else(|| Error::UnknownTexture(name.clone()))?)),
            None => None,
        };

        Ok(Material {
            color: self.color.map(Color::from).unwrap_or(d.color),
            texture,
            ambient: self.ambient.unwrap_or(d.ambient),
            diffuse: self.diffuse.unwrap_or(d.diffuse),
            specular: self.specular.unwrap_or(d.specular),
            shininess: self.shininess.unwrap_or(d.shininess),
            reflective: self.reflective.unwrap_or(d.reflective),
            transparency: self.transparency.unwrap_or(d.transparency),
            refractive_index: self.refractive_index.unwrap_or(d.refractive_index),
        })
    }
}

#[derive(Default, Deserialize)]
struct ShapesJson {
    #[serde(default)]
    spheres: Vec<ShapeJson>,

    #[serde(default)]
    planes: Vec<ShapeJson>,

    #[serde(default)]
    cubes: Vec<ShapeJson>,
}

#[derive(Deserialize)]
struct ShapeJson {
    material: Option<String>,

    #[serde(flatten)]
    transform: TransformJson,
}

impl ShapeJson {
    fn build(&self, mut shape: Shape, materials: &HashMap<String, Material>)
        -> Result<Shape> {
        if let Some(name) = &self.material {
            shape.material = materials.get(name)
                .ok_or_else(|| Error::UnknownMaterial(name.clone()))?
                .clone();
        }

        shape.with_transform(self.transform.matrix())
    }
}

impl SceneJson {
    fn build(self, base: &Path) -> Result<Scene> {
        let c = &self.camera;
        let mut camera = Camera::new(c.width, c.height, c.fov)?;
        camera.set_transform(Matrix4D::view_transform(
            point(c.from), point(c.to), vector(c.up)
        ))?;

        let mut world = World::new();

        for l in self.lights.point_lights.iter() {
            world.add_light(PointLight::new(l.intensity.into(), point(l.position)));
        }

        for l in self.lights.area_lights.iter() {
            world.add_light(AreaLight::new(
                l.intensity.into(),
                point(l.corner),
                vector(l.uvec), l.usteps,
                vector(l.vvec), l.vsteps,
                l.jitter
            )?);
        }

        let mut textures = HashMap::new();
        for t in self.textures.iter() {
            textures.insert(t.name.clone(), Arc::new(t.build(base)?));
        }

        let mut materials = HashMap::new();
        for m in self.materials.iter() {
            materials.insert(m.name.clone(), m.build(&textures)?);
        }

        for s in self.shapes.spheres.iter() {
            world.add_shape(s.build(Shape::sphere(), &materials)?);
        }

        for s in self.shapes.planes.iter() {
            world.add_shape(s.build(Shape::plane(), &materials)?);
        }

        for s in self.shapes.cubes.iter() {
            world.add_shape(s.build(Shape::cube(), &materials)?);
        }

        debug!("scene: {}x{} camera, {} shapes, {} point lights, {} area lights, \
            {} textures, {} materials",
            camera.hsize, camera.vsize, world.shapes().len(),
            world.point_lights().len(), world.area_lights().len(),
            textures.len(), materials.len());

        Ok(Scene { world, camera })
    }
}

#[cfg(test)]
use crate::shape::{ ShapeId, ShapeType };

#[cfg(test)]
const FULL_SCENE: &str = r#"{
    "camera": {
        "width": 40, "height": 20, "fov": 1.0471975512,
        "from": [0, 1.5, -5], "to": [0, 1, 0], "up": [0, 1, 0]
    },
    "lights": {
        "pointLights": [
            { "position": [-10, 10, -10], "intensity": [1, 1, 1] }
        ],
        "areaLights": [
            {
                "corner": [-1, 5, -1], "intensity": [0.5, 0.5, 0.5],
                "uvec": [2, 0, 0], "usteps": 4,
                "vvec": [0, 0, 2], "vsteps": 2,
                "jitter": true
            }
        ]
    },
    "textures": [
        {
            "name": "floor", "pattern": "checkers", "mapping": "plane",
            "width": 4, "height": 4,
            "color1": [1, 1, 1], "color2": [0, 0, 0],
            "scaling": [0.5, 0.5, 0.5]
        }
    ],
    "materials": [
        { "name": "checked", "texture": "floor", "specular": 0 },
        {
            "name": "glass", "color": [0.1, 0.1, 0.1],
            "ambient": 0, "diffuse": 0.1, "specular": 1, "shininess": 300,
            "reflective": 0.9, "transparency": 0.9, "refractiveIndex": 1.5
        }
    ],
    "shapes": {
        "spheres": [
            { "material": "glass", "translation": [0, 1, 0] }
        ],
        "planes": [
            { "material": "checked" }
        ],
        "cubes": [
            {
                "scaling": [0.5, 0.5, 0.5],
                "rotation": [0, 0.7853981634, 0],
                "translation": [2, 0.5, 1]
            }
        ]
    }
}"#;

#[test]
fn parse_full_scene() {
    let scene = Scene::from_json(FULL_SCENE).unwrap();
    let w = &scene.world;

    assert_eq!(scene.camera.hsize, 40);
    assert_eq!(scene.camera.vsize, 20);
    assert_eq!(*scene.camera.transform().matrix(), Matrix4D::view_transform(
        Tuple4D::point(0.0, 1.5, -5.0),
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    ));

    assert_eq!(w.point_lights().len(), 1);
    assert_eq!(w.area_lights().len(), 1);
    let area = w.area_lights()[0];
    assert_eq!(area.samples(), 8);
    assert_eq!(area.uvec, Tuple4D::vector(0.5, 0.0, 0.0));
    assert!(area.jitter);

    // Spheres, then planes, then cubes
    let kinds: Vec<ShapeType> = w.shapes().iter().map(|s| s.ty).collect();
    assert_eq!(kinds, vec![ShapeType::Sphere, ShapeType::Plane, ShapeType::Cube]);
}

#[test]
fn materials_and_textures_are_resolved() {
    let scene = Scene::from_json(FULL_SCENE).unwrap();
    let w = &scene.world;

    let glass = &w.shape(ShapeId(0)).unwrap().material;
    assert_eq!(glass.color, Color::rgb(0.1, 0.1, 0.1));
    assert_eq!(glass.refractive_index, 1.5);
    assert_eq!(glass.transparency, 0.9);
    assert_eq!(glass.shininess, 300.0);

    let checked = &w.shape(ShapeId(1)).unwrap().material;
    assert_eq!(checked.specular, 0.0);
    assert_eq!(checked.diffuse, Material::default().diffuse);
    let texture = checked.texture.as_ref().unwrap();
    assert_eq!(texture.mapping, UvMapping::Planar);
    assert_eq!(texture.pattern,
        Pattern::checkers(4, 4, Color::white(), Color::black()));
    assert_eq!(*texture.transform().matrix(), Matrix4D::scaling(0.5, 0.5, 0.5));

    // No material given
    assert_eq!(w.shape(ShapeId(2)).unwrap().material, Material::default());
}

#[test]
fn shape_transforms_compose_scale_rotate_translate() {
    let scene = Scene::from_json(FULL_SCENE).unwrap();
    let cube = scene.world.shape(ShapeId(2)).unwrap();

    let expected = Matrix4D::translation(2.0, 0.5, 1.0)
        * Matrix4D::rotation_z(0.0)
        * Matrix4D::rotation_y(0.7853981634)
        * Matrix4D::rotation_x(0.0)
        * Matrix4D::scaling(0.5, 0.5, 0.5);
    assert_eq!(*cube.transform().matrix(), expected);

    let sphere = scene.world.shape(ShapeId(0)).unwrap();
    assert_eq!(*sphere.transform().matrix(), Matrix4D::translation(0.0, 1.0, 0.0));
}

#[test]
fn sections_other_than_camera_are_optional() {
    let scene = Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        }
    }"#).unwrap();

    assert!(scene.world.shapes().is_empty());
    assert_eq!(scene.world.lights().count(), 0);
}

#[test]
fn unknown_material_is_an_error() {
    let res = Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "shapes": { "spheres": [ { "material": "chrome" } ] }
    }"#);

    assert!(matches!(res, Err(Error::UnknownMaterial(ref name)) if name == "chrome"));
}

#[test]
fn unknown_texture_is_an_error() {
    let res = Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "materials": [ { "name": "wood", "texture": "grain" } ]
    }"#);

    assert!(matches!(res, Err(Error::UnknownTexture(ref name)) if name == "grain"));
}

#[test]
fn singular_shape_transform_is_an_error() {
    let res = Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "shapes": { "cubes": [ { "scaling": [1, 0, 1] } ] }
    }"#);

    assert!(matches!(res, Err(Error::NonInvertible)));
}

#[test]
fn image_texture_needs_a_path() {
    let res = Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "textures": [ { "name": "earth", "pattern": "image", "mapping": "sphere" } ]
    }"#);

    assert!(matches!(res, Err(Error::MissingImagePath(ref name)) if name == "earth"));
}

#[test]
fn malformed_json_is_an_error() {
    assert!(matches!(Scene::from_json("{ \"camera\": "), Err(Error::Json(_))));
    assert!(matches!(Scene::from_json(r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "textures": [ { "name": "t", "pattern": "plaid", "mapping": "plane" } ]
    }"#), Err(Error::Json(_))));
}

#[test]
fn image_texture_is_loaded_relative_to_scene_file() {
    let dir = std::env::temp_dir()
        .join(format!("whitted-scene-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let mut tex = Canvas::new(2, 2);
    tex.write_pixel(0, 0, &Color::rgb(1.0, 0.0, 0.0));
    imageio::save(&tex, dir.join("tex.png")).unwrap();

    let scene_path = dir.join("scene.json");
    fs::write(&scene_path, r#"{
        "camera": {
            "width": 4, "height": 4, "fov": 1.5,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        },
        "textures": [
            { "name": "t", "pattern": "image", "mapping": "plane",
              "imagePath": "tex.png" }
        ],
        "materials": [ { "name": "m", "texture": "t" } ],
        "shapes": { "planes": [ { "material": "m" } ] }
    }"#).unwrap();

    let scene = Scene::load(&scene_path);
    fs::remove_dir_all(&dir).ok();
    let scene = scene.unwrap();

    let material = &scene.world.shape(ShapeId(0)).unwrap().material;
    match &material.texture.as_ref().unwrap().pattern {
        Pattern::Image(canvas) => {
            assert_eq!((canvas.width, canvas.height), (2, 2));
            assert_eq!(canvas.read_pixel(0, 0), Some(Color::rgb(1.0, 0.0, 0.0)));
        },
        other => panic!("expected an image pattern, got {:?}", other),
    }
}
