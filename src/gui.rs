//! egui tuning panel.
//!
//! Six collapsing sections mirror the live tunables. Which widgets a light
//! shows comes from [`light_fields`] and [`shadow_fields`], and every edit is
//! routed through the clamping setters in [`crate::tuning`].

use std::fmt;
use std::ops::RangeInclusive;

use glam::{Vec3, Vec4};

use crate::light::{Light, LightKind, ProjectionKind, LIGHT_COUNT};
use crate::scene::Scene;
use crate::tuning::{RenderMode, MAX_FAR_PLANE, MIN_NEAR_PLANE, PLANE_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    General,
    VertexManipulation,
    Lighting,
    Shadows,
    PostProcessing,
    Billboarding,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::General,
        Section::VertexManipulation,
        Section::Lighting,
        Section::Shadows,
        Section::PostProcessing,
        Section::Billboarding,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::VertexManipulation => "Vertex Manipulation",
            Self::Lighting => "Lighting",
            Self::Shadows => "Shadows",
            Self::PostProcessing => "Post Processing",
            Self::Billboarding => "Billboarding",
        }
    }

    /// Sections that edit the light picked by the selector.
    pub fn per_light(self) -> bool {
        matches!(self, Self::Lighting | Self::Shadows)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One editable value. Indexed variants carry the colour channel or vector axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CameraSpeed,
    Gizmos,
    Wireframe,
    Amplitude,
    RenderMode,
    LightEnabled,
    LightKind,
    Ambient(usize),
    Diffuse(usize),
    Specular(usize),
    SpecularPower,
    Position(usize),
    Direction(usize),
    Attenuation(usize),
    Exponent,
    Range,
    Shadows,
    ShadowBias,
    NearPlane,
    FarPlane,
    Soften,
    SoftenRadius,
    Projection,
    Bloom,
    BloomThreshold,
    BloomIntensity,
    BloomSaturation,
    SceneIntensity,
    SceneSaturation,
    Grass,
}

const CHANNELS: [&str; 3] = ["r", "g", "b"];
const AXES: [&str; 3] = ["x", "y", "z"];

impl Field {
    /// Slider increment.
    pub fn step(self) -> f32 {
        match self {
            Self::Ambient(_) | Self::Diffuse(_) | Self::Specular(_) => 0.01,
            Self::Position(_) | Self::Range | Self::Amplitude | Self::CameraSpeed => 0.1,
            Self::Direction(_) | Self::SpecularPower | Self::Exponent => 0.01,
            Self::Attenuation(_) | Self::BloomThreshold => 0.001,
            Self::ShadowBias => 0.0001,
            Self::NearPlane | Self::FarPlane => PLANE_STEP,
            Self::SoftenRadius => 1.0,
            _ => 0.01,
        }
    }

    /// Slider bounds; these match the clamps applied by the setters.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Self::CameraSpeed => 0.1..=15.0,
            Self::Amplitude => 0.1..=50.0,
            Self::SpecularPower => 0.01..=10.0,
            Self::Position(_) => -100.0..=100.0,
            Self::Direction(_) => -1.0..=1.0,
            Self::Exponent => 0.1..=10.0,
            Self::Range => 1.0..=100.0,
            Self::ShadowBias => 0.0001..=0.05,
            Self::NearPlane | Self::FarPlane => MIN_NEAR_PLANE..=MAX_FAR_PLANE,
            Self::SoftenRadius => 1.0..=25.0,
            Self::BloomThreshold => 0.001..=1.0,
            Self::BloomIntensity => 0.01..=10.0,
            Self::BloomSaturation | Self::SceneIntensity | Self::SceneSaturation => 0.01..=5.0,
            _ => 0.0..=1.0,
        }
    }

    /// Entries of a combo box field; empty for sliders and checkboxes.
    pub fn options(self) -> Vec<&'static str> {
        match self {
            Self::RenderMode => RenderMode::ALL.iter().map(|mode| mode.label()).collect(),
            Self::LightKind => LightKind::ALL.iter().map(|kind| kind.label()).collect(),
            Self::Projection => ProjectionKind::ALL.iter().map(|kind| kind.label()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn label(self) -> String {
        let indexed = |name: &str, labels: [&str; 3], index: usize| {
            format!("{name}.{}", labels.get(index).copied().unwrap_or("?"))
        };
        match self {
            Self::CameraSpeed => "camera speed".into(),
            Self::Gizmos => "light gizmos".into(),
            Self::Wireframe => "wireframe".into(),
            Self::Amplitude => "amplitude".into(),
            Self::RenderMode => "render mode".into(),
            Self::LightEnabled => "enabled".into(),
            Self::LightKind => "type".into(),
            Self::Ambient(channel) => indexed("ambient", CHANNELS, channel),
            Self::Diffuse(channel) => indexed("diffuse", CHANNELS, channel),
            Self::Specular(channel) => indexed("specular", CHANNELS, channel),
            Self::SpecularPower => "specular power".into(),
            Self::Position(axis) => indexed("position", AXES, axis),
            Self::Direction(axis) => indexed("direction", AXES, axis),
            Self::Attenuation(axis) => indexed("attenuation", AXES, axis),
            Self::Exponent => "exponent".into(),
            Self::Range => "range".into(),
            Self::Shadows => "shadows".into(),
            Self::ShadowBias => "bias".into(),
            Self::NearPlane => "near plane".into(),
            Self::FarPlane => "far plane".into(),
            Self::Soften => "soften".into(),
            Self::SoftenRadius => "soften radius".into(),
            Self::Projection => "projection".into(),
            Self::Bloom => "bloom".into(),
            Self::BloomThreshold => "bloom threshold".into(),
            Self::BloomIntensity => "bloom intensity".into(),
            Self::BloomSaturation => "bloom saturation".into(),
            Self::SceneIntensity => "scene intensity".into(),
            Self::SceneSaturation => "scene saturation".into(),
            Self::Grass => "grass".into(),
        }
    }
}

/// Current state of a field, in the shape of the widget that edits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f32),
    Flag(bool),
    Choice(usize),
}

/// Fields shown for a light in the Lighting section, by kind and enabled state.
pub fn light_fields(light: &Light) -> Vec<Field> {
    let mut fields = vec![Field::LightEnabled];
    if !light.is_enabled() {
        return fields;
    }
    fields.push(Field::LightKind);
    fields.extend((0..3).map(Field::Ambient));
    fields.extend((0..3).map(Field::Diffuse));
    fields.extend((0..3).map(Field::Specular));
    fields.push(Field::SpecularPower);
    fields.extend((0..3).map(Field::Position));
    let kind = light.kind();
    if kind.uses_direction() {
        fields.extend((0..3).map(Field::Direction));
    }
    if kind.uses_attenuation() {
        fields.extend((0..3).map(Field::Attenuation));
    }
    if kind.uses_cone() {
        fields.extend([Field::Exponent, Field::Range]);
    }
    fields
}

/// Fields shown in the Shadows section; per-light settings hide while the light is off.
pub fn shadow_fields(light: &Light) -> Vec<Field> {
    let mut fields = vec![Field::Shadows];
    if !light.is_enabled() {
        return fields;
    }
    fields.extend([Field::ShadowBias, Field::NearPlane, Field::FarPlane, Field::Soften]);
    if light.shadow().soften {
        fields.push(Field::SoftenRadius);
    }
    fields.push(Field::Projection);
    fields
}

/// The overlay window. Holds only the light the per-light sections edit;
/// everything else is read from and written back to the [`Scene`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuningPanel {
    light: usize,
}

impl TuningPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_light(&self) -> usize {
        self.light
    }

    pub fn select_light(&mut self, index: usize) {
        self.light = index.min(LIGHT_COUNT - 1);
    }

    pub fn fields(&self, scene: &Scene, section: Section) -> Vec<Field> {
        let light = scene.lights.get(self.light);
        match section {
            Section::General => vec![Field::CameraSpeed, Field::Gizmos, Field::Wireframe],
            Section::VertexManipulation => vec![Field::Amplitude, Field::RenderMode],
            Section::Lighting => light.map(light_fields).unwrap_or_default(),
            Section::Shadows => light.map(shadow_fields).unwrap_or_else(|| vec![Field::Shadows]),
            Section::PostProcessing => vec![
                Field::Bloom,
                Field::BloomThreshold,
                Field::BloomIntensity,
                Field::BloomSaturation,
                Field::SceneIntensity,
                Field::SceneSaturation,
            ],
            Section::Billboarding => vec![Field::Grass],
        }
    }

    /// Reads a field; `None` when it belongs to a light the scene lacks.
    pub fn value(&self, scene: &Scene, field: Field) -> Option<Value> {
        let tunables = &scene.tunables;
        let bloom = tunables.bloom();
        let scene_value = match field {
            Field::CameraSpeed => Some(Value::Number(scene.camera.speed())),
            Field::Gizmos => Some(Value::Flag(tunables.gizmos_enabled())),
            Field::Wireframe => Some(Value::Flag(tunables.wireframe())),
            Field::Amplitude => Some(Value::Number(tunables.amplitude())),
            Field::RenderMode => Some(Value::Choice(tunables.render_mode().index() as usize)),
            Field::Shadows => Some(Value::Flag(tunables.shadows_enabled())),
            Field::Bloom => Some(Value::Flag(tunables.bloom_enabled())),
            Field::BloomThreshold => Some(Value::Number(bloom.threshold)),
            Field::BloomIntensity => Some(Value::Number(bloom.intensity)),
            Field::BloomSaturation => Some(Value::Number(bloom.saturation)),
            Field::SceneIntensity => Some(Value::Number(bloom.scene_intensity)),
            Field::SceneSaturation => Some(Value::Number(bloom.scene_saturation)),
            Field::Grass => Some(Value::Flag(tunables.grass_enabled())),
            _ => None,
        };
        if scene_value.is_some() {
            return scene_value;
        }

        let light = scene.lights.get(self.light)?;
        let shadow = light.shadow();
        let at4 = |values: Vec4, index: usize| values.to_array().get(index).copied();
        let at3 = |values: Vec3, index: usize| values.to_array().get(index).copied();
        let number = match field {
            Field::LightEnabled => return Some(Value::Flag(light.is_enabled())),
            Field::Soften => return Some(Value::Flag(shadow.soften)),
            Field::LightKind => {
                return LightKind::ALL
                    .iter()
                    .position(|kind| *kind == light.kind())
                    .map(Value::Choice)
            }
            Field::Projection => {
                return ProjectionKind::ALL
                    .iter()
                    .position(|kind| *kind == shadow.projection)
                    .map(Value::Choice)
            }
            Field::Ambient(channel) => at4(light.ambient(), channel),
            Field::Diffuse(channel) => at4(light.diffuse(), channel),
            Field::Specular(channel) => at4(light.specular(), channel),
            Field::SpecularPower => Some(light.specular_power()),
            Field::Position(axis) => at3(light.position(), axis),
            Field::Direction(axis) => at3(light.direction(), axis),
            Field::Attenuation(axis) => at3(light.attenuation(), axis),
            Field::Exponent => Some(light.exponent()),
            Field::Range => Some(light.range()),
            Field::ShadowBias => Some(shadow.bias),
            Field::NearPlane => Some(shadow.near_plane),
            Field::FarPlane => Some(shadow.far_plane),
            Field::SoftenRadius => Some(shadow.soften_radius as f32),
            _ => None,
        };
        number.map(Value::Number)
    }

    /// Writes a widget's new value through the matching setter. Mismatched
    /// field and value shapes are ignored.
    pub fn apply(&self, scene: &mut Scene, field: Field, value: Value) {
        let tunables = &mut scene.tunables;
        match (field, value) {
            (Field::CameraSpeed, Value::Number(speed)) => scene.camera.set_speed(speed),
            (Field::Gizmos, Value::Flag(on)) => tunables.set_gizmos_enabled(on),
            (Field::Wireframe, Value::Flag(on)) => tunables.set_wireframe(on),
            (Field::Amplitude, Value::Number(amplitude)) => tunables.set_amplitude(amplitude),
            (Field::RenderMode, Value::Choice(index)) => {
                tunables.set_render_mode_index(i64::try_from(index).unwrap_or(i64::MAX))
            }
            (Field::Shadows, Value::Flag(on)) => tunables.set_shadows_enabled(on),
            (Field::Bloom, Value::Flag(on)) => tunables.set_bloom_enabled(on),
            (Field::BloomThreshold, Value::Number(v)) => tunables.set_bloom_threshold(v),
            (Field::BloomIntensity, Value::Number(v)) => tunables.set_bloom_intensity(v),
            (Field::BloomSaturation, Value::Number(v)) => tunables.set_bloom_saturation(v),
            (Field::SceneIntensity, Value::Number(v)) => tunables.set_scene_intensity(v),
            (Field::SceneSaturation, Value::Number(v)) => tunables.set_scene_saturation(v),
            (Field::Grass, Value::Flag(on)) => tunables.set_grass_enabled(on),
            _ => self.apply_light(scene, field, value),
        }
    }

    fn apply_light(&self, scene: &mut Scene, field: Field, value: Value) {
        let Some(mut tuning) = scene.light_tuning(self.light) else {
            return;
        };
        let light = tuning.light().clone();
        let with4 = |mut colour: Vec4, index: usize, v: f32| {
            if index < 3 {
                colour[index] = v;
            }
            colour
        };
        let with3 = |mut vector: Vec3, index: usize, v: f32| {
            if index < 3 {
                vector[index] = v;
            }
            vector
        };
        match (field, value) {
            (Field::LightEnabled, Value::Flag(on)) => tuning.set_enabled(on),
            (Field::LightKind, Value::Choice(index)) => {
                let kind = LightKind::ALL.get(index).copied();
                tuning.select_kind(
                    kind == Some(LightKind::Directional),
                    kind == Some(LightKind::Point),
                    kind == Some(LightKind::Spot),
                );
            }
            (Field::Ambient(c), Value::Number(v)) => tuning.set_ambient(with4(light.ambient(), c, v)),
            (Field::Diffuse(c), Value::Number(v)) => tuning.set_diffuse(with4(light.diffuse(), c, v)),
            (Field::Specular(c), Value::Number(v)) => {
                tuning.set_specular(with4(light.specular(), c, v))
            }
            (Field::SpecularPower, Value::Number(v)) => tuning.set_specular_power(v),
            (Field::Position(a), Value::Number(v)) => tuning.set_position(with3(light.position(), a, v)),
            (Field::Direction(a), Value::Number(v)) => {
                tuning.set_direction(with3(light.direction(), a, v))
            }
            (Field::Attenuation(a), Value::Number(v)) => {
                tuning.set_attenuation(with3(light.attenuation(), a, v))
            }
            (Field::Exponent, Value::Number(v)) => tuning.set_exponent(v),
            (Field::Range, Value::Number(v)) => tuning.set_range(v),
            (Field::ShadowBias, Value::Number(v)) => tuning.set_shadow_bias(v),
            (Field::NearPlane, Value::Number(v)) => tuning.set_near_plane(v),
            (Field::FarPlane, Value::Number(v)) => tuning.set_far_plane(v),
            (Field::Soften, Value::Flag(on)) => tuning.set_soften(on),
            (Field::SoftenRadius, Value::Number(v)) => tuning.set_soften_radius(v.round() as i64),
            (Field::Projection, Value::Choice(index)) => match ProjectionKind::ALL.get(index) {
                Some(projection) => tuning.set_projection(*projection),
                None => return,
            },
            _ => return,
        }
        scene.refresh_light(self.light);
    }

    /// One-line summary shown at the top of the panel and in the window title.
    pub fn status_line(&self, scene: &Scene, fps: f32) -> String {
        let camera = scene.camera.position();
        format!(
            "{fps:.0} fps | camera ({:.1}, {:.1}, {:.1}) | light {}",
            camera.x,
            camera.y,
            camera.z,
            self.light + 1
        )
    }

    /// Lays out the panel for this frame. Returns true when a tunable changed.
    pub fn show(&mut self, ctx: &egui::Context, scene: &mut Scene, fps: f32) -> bool {
        let mut changed = false;
        egui::Window::new("Tuning")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.label(self.status_line(scene, fps));
                for section in Section::ALL {
                    egui::CollapsingHeader::new(section.label())
                        .default_open(section == Section::General)
                        .show(ui, |ui| {
                            if section.per_light() {
                                self.light_selector(ui);
                            }
                            for field in self.fields(scene, section) {
                                changed |= self.field_widget(ui, scene, field);
                            }
                        });
                }
            });
        changed
    }

    fn light_selector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("light");
            for index in 0..LIGHT_COUNT {
                ui.selectable_value(&mut self.light, index, (index + 1).to_string());
            }
        });
    }

    fn field_widget(&self, ui: &mut egui::Ui, scene: &mut Scene, field: Field) -> bool {
        let Some(value) = self.value(scene, field) else {
            return false;
        };
        let label = field.label();
        let edited = match value {
            Value::Flag(mut on) => ui.checkbox(&mut on, label).changed().then_some(Value::Flag(on)),
            Value::Number(mut number) => ui
                .add(
                    egui::Slider::new(&mut number, field.range())
                        .text(label)
                        .step_by(f64::from(field.step())),
                )
                .changed()
                .then_some(Value::Number(number)),
            Value::Choice(mut index) => {
                let options = field.options();
                let selected = options.get(index).copied().unwrap_or_default();
                let picked = egui::ComboBox::from_label(label)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        let mut picked = false;
                        for (option, text) in options.iter().enumerate() {
                            picked |= ui.selectable_value(&mut index, option, *text).changed();
                        }
                        picked
                    })
                    .inner
                    .unwrap_or(false);
                picked.then_some(Value::Choice(index))
            }
        };
        match edited {
            Some(value) => {
                self.apply(scene, field, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn demo() -> Scene {
        Scene::demo(&AppConfig::default())
    }

    fn number(panel: &TuningPanel, scene: &Scene, field: Field) -> f32 {
        match panel.value(scene, field) {
            Some(Value::Number(value)) => value,
            other => panic!("{field:?} is not numeric: {other:?}"),
        }
    }

    #[test]
    fn six_sections_in_panel_order() {
        let labels: Vec<_> = Section::ALL.iter().map(|section| section.label()).collect();
        assert_eq!(
            labels,
            [
                "General",
                "Vertex Manipulation",
                "Lighting",
                "Shadows",
                "Post Processing",
                "Billboarding"
            ]
        );
        assert!(Section::Shadows.per_light());
        assert!(!Section::PostProcessing.per_light());
    }

    #[test]
    fn lighting_fields_follow_kind_and_enabled() {
        let scene = demo();
        let directional = light_fields(&scene.lights[0]);
        assert!(directional.contains(&Field::Direction(1)));
        assert!(!directional.contains(&Field::Attenuation(0)));
        assert!(!directional.contains(&Field::Exponent));

        let point = light_fields(&scene.lights[1]);
        assert!(point.contains(&Field::Attenuation(2)));
        assert!(!point.contains(&Field::Direction(0)));
        assert!(!point.contains(&Field::Range));

        let spot = light_fields(&scene.lights[2]);
        for field in [Field::Direction(0), Field::Attenuation(0), Field::Exponent, Field::Range] {
            assert!(spot.contains(&field), "{field:?}");
        }

        let mut off = scene.lights[3].clone();
        off.set_enabled(false);
        assert_eq!(light_fields(&off), vec![Field::LightEnabled]);
        assert_eq!(shadow_fields(&off), vec![Field::Shadows]);
    }

    #[test]
    fn soften_radius_only_shows_when_softening() {
        let scene = demo();
        assert!(shadow_fields(&scene.lights[0]).contains(&Field::SoftenRadius));
        assert!(!shadow_fields(&scene.lights[2]).contains(&Field::SoftenRadius));
    }

    #[test]
    fn per_light_sections_follow_the_selector() {
        let mut scene = demo();
        let mut panel = TuningPanel::new();
        assert!(!panel.fields(&scene, Section::Lighting).contains(&Field::Exponent));
        panel.select_light(2);
        assert!(panel.fields(&scene, Section::Lighting).contains(&Field::Exponent));

        panel.apply(&mut scene, Field::LightEnabled, Value::Flag(false));
        assert!(!scene.lights[2].is_enabled());
        assert_eq!(panel.fields(&scene, Section::Lighting), vec![Field::LightEnabled]);
        assert_eq!(panel.fields(&scene, Section::Shadows), vec![Field::Shadows]);

        panel.select_light(9);
        assert_eq!(panel.selected_light(), LIGHT_COUNT - 1);
    }

    #[test]
    fn edits_are_clamped_by_the_setters() {
        let mut scene = demo();
        let mut panel = TuningPanel::new();
        panel.select_light(2);

        panel.apply(&mut scene, Field::FarPlane, Value::Number(500.0));
        assert_eq!(scene.lights[2].shadow().far_plane, 100.0);
        panel.apply(&mut scene, Field::NearPlane, Value::Number(500.0));
        let shadow = scene.lights[2].shadow();
        assert!(shadow.near_plane < shadow.far_plane);

        panel.apply(&mut scene, Field::Diffuse(0), Value::Number(7.0));
        assert_eq!(scene.lights[2].diffuse().x, 1.0);
        panel.apply(&mut scene, Field::BloomThreshold, Value::Number(0.0));
        assert_eq!(scene.tunables.bloom().threshold, 0.001);
        panel.apply(&mut scene, Field::SoftenRadius, Value::Number(3.6));
        assert_eq!(scene.lights[2].shadow().soften_radius, 4);
    }

    #[test]
    fn slider_ranges_match_setter_clamps() {
        let mut scene = demo();
        let panel = TuningPanel::new();
        for section in Section::ALL {
            for field in panel.fields(&scene, section) {
                if !matches!(panel.value(&scene, field), Some(Value::Number(_))) {
                    continue;
                }
                let range = field.range();
                panel.apply(&mut scene, field, Value::Number(1.0e6));
                assert!(number(&panel, &scene, field) <= *range.end() + 1e-4, "{field:?}");
                panel.apply(&mut scene, field, Value::Number(-1.0e6));
                assert!(number(&panel, &scene, field) >= *range.start() - 1e-4, "{field:?}");
            }
        }
    }

    #[test]
    fn combo_boxes_pick_kind_projection_and_mode() {
        let mut scene = demo();
        let mut panel = TuningPanel::new();
        panel.select_light(1);
        assert_eq!(panel.value(&scene, Field::LightKind), Some(Value::Choice(1)));
        assert_eq!(Field::LightKind.options(), ["directional", "point", "spot"]);

        panel.apply(&mut scene, Field::LightKind, Value::Choice(2));
        assert_eq!(scene.lights[1].kind(), LightKind::Spot);
        panel.apply(&mut scene, Field::LightKind, Value::Choice(7));
        assert_eq!(scene.lights[1].kind(), LightKind::Spot);

        panel.apply(&mut scene, Field::Projection, Value::Choice(1));
        assert_eq!(scene.lights[1].shadow().projection, ProjectionKind::Perspective);

        panel.apply(&mut scene, Field::RenderMode, Value::Choice(3));
        assert_eq!(scene.tunables.render_mode(), RenderMode::NormalsPerVertex);
        assert_eq!(panel.value(&scene, Field::RenderMode), Some(Value::Choice(3)));
    }

    #[test]
    fn light_edits_refresh_shadow_matrices() {
        let mut scene = demo();
        let panel = TuningPanel::new();
        let before = scene.lights[0].view_matrix();
        panel.apply(&mut scene, Field::Position(0), Value::Number(12.0));
        assert_eq!(scene.lights[0].position().x, 12.0);
        assert_ne!(scene.lights[0].view_matrix(), before);
    }

    #[test]
    fn mismatched_values_are_ignored() {
        let mut scene = demo();
        let panel = TuningPanel::new();
        let before = scene.tunables.clone();
        panel.apply(&mut scene, Field::Bloom, Value::Number(1.0));
        panel.apply(&mut scene, Field::BloomIntensity, Value::Flag(true));
        assert_eq!(scene.tunables, before);
    }

    #[test]
    fn panel_lays_out_without_a_gpu() {
        let mut scene = demo();
        let mut panel = TuningPanel::new();
        let ctx = egui::Context::default();
        let mut changed = false;
        let mut run = || {
            ctx.run(egui::RawInput::default(), |ctx| {
                changed |= panel.show(ctx, &mut scene, 60.0);
            })
        };
        // The first frame only sizes the window.
        run();
        let output = run();
        assert!(!changed);
        assert!(!output.shapes.is_empty());
        assert!(!ctx.tessellate(output.shapes, output.pixels_per_point).is_empty());
    }

    #[test]
    fn status_line_shows_fps_camera_and_light() {
        let scene = demo();
        let mut panel = TuningPanel::new();
        panel.select_light(3);
        assert_eq!(
            panel.status_line(&scene, 59.6),
            "60 fps | camera (0.0, 18.0, -30.0) | light 4"
        );
    }
}
