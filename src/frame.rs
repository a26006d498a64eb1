//! The per-frame pass sequence, decided on the CPU before any GPU work.
//!
//! [`FramePlan::build`] turns the tunables and lights into an ordered list of
//! passes with explicit inputs and outputs. The renderer executes the list
//! verbatim, so routing decisions (where the scene goes when bloom is off,
//! which target each blur reads) live here and are unit tested.

use std::fmt;

use crate::light::Light;
use crate::tuning::SceneTunables;

pub const CLEAR_COLOUR: [f64; 4] = [0.35, 0.35, 0.35, 1.0];

/// A surface a pass reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    BackBuffer,
    Scene,
    BloomExtract,
    HorizontalBlur,
    VerticalBlur,
    BloomComposite,
    ShadowMap(usize),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackBuffer => f.write_str("back-buffer"),
            Self::Scene => f.write_str("scene"),
            Self::BloomExtract => f.write_str("bloom-extract"),
            Self::HorizontalBlur => f.write_str("horizontal-blur"),
            Self::VerticalBlur => f.write_str("vertical-blur"),
            Self::BloomComposite => f.write_str("bloom-composite"),
            Self::ShadowMap(index) => write!(f, "shadow-map-{index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

/// How grass billboards are composited. Blending is skipped when the scene
/// feeds the bloom chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillboardBlend {
    AlphaBlended,
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Scene {
        billboards: Option<BillboardBlend>,
        /// Lights that get a debug sphere.
        gizmos: Vec<usize>,
        sample_shadows: bool,
    },
    Shadow {
        light: usize,
    },
    BloomExtract,
    Blur(BlurAxis),
    BloomComposite,
    Final {
        /// Whether the bloom composite is drawn over the back buffer.
        composite: bool,
    },
    /// The tuning panel, drawn over whatever the back buffer holds.
    Overlay,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene { .. } => "scene",
            Self::Shadow { .. } => "shadow",
            Self::BloomExtract => "bloom-extract",
            Self::Blur(BlurAxis::Horizontal) => "horizontal-blur",
            Self::Blur(BlurAxis::Vertical) => "vertical-blur",
            Self::BloomComposite => "bloom-composite",
            Self::Final { .. } => "final",
            Self::Overlay => "overlay",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPlan {
    pub stage: Stage,
    pub output: Target,
    pub inputs: Vec<Target>,
    /// Whether the output is cleared before drawing.
    pub clear: bool,
}

impl fmt::Display for PassPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stage.name())?;
        if let Stage::Shadow { light } = self.stage {
            write!(f, "[{light}]")?;
        }
        if !self.inputs.is_empty() {
            let inputs: Vec<String> = self.inputs.iter().map(Target::to_string).collect();
            write!(f, " <- {}", inputs.join(", "))?;
        }
        write!(f, " -> {}", self.output)?;
        if self.clear {
            f.write_str(" [clear]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub passes: Vec<PassPlan>,
}

impl FramePlan {
    pub fn build(tunables: &SceneTunables, lights: &[Light]) -> Self {
        let bloom = tunables.bloom_enabled();
        let shadows = tunables.shadows_enabled();
        let mut passes = Vec::with_capacity(7 + lights.len());

        let billboards = tunables.grass_enabled().then_some(if bloom {
            BillboardBlend::Opaque
        } else {
            BillboardBlend::AlphaBlended
        });
        let gizmos = if tunables.gizmos_enabled() {
            lights
                .iter()
                .enumerate()
                .filter(|(_, light)| light.is_enabled())
                .map(|(index, _)| index)
                .collect()
        } else {
            Vec::new()
        };
        passes.push(PassPlan {
            stage: Stage::Scene {
                billboards,
                gizmos,
                sample_shadows: shadows,
            },
            output: if bloom { Target::Scene } else { Target::BackBuffer },
            inputs: if shadows {
                (0..lights.len()).map(Target::ShadowMap).collect()
            } else {
                Vec::new()
            },
            clear: true,
        });

        if shadows {
            passes.extend((0..lights.len()).map(|light| PassPlan {
                stage: Stage::Shadow { light },
                output: Target::ShadowMap(light),
                inputs: Vec::new(),
                clear: true,
            }));
        }

        // The bloom chain runs every frame; with bloom off its result is simply unused.
        passes.push(PassPlan {
            stage: Stage::BloomExtract,
            output: Target::BloomExtract,
            inputs: vec![Target::Scene],
            clear: true,
        });
        passes.push(PassPlan {
            stage: Stage::Blur(BlurAxis::Horizontal),
            output: Target::HorizontalBlur,
            inputs: vec![Target::BloomExtract],
            clear: true,
        });
        passes.push(PassPlan {
            stage: Stage::Blur(BlurAxis::Vertical),
            output: Target::VerticalBlur,
            inputs: vec![Target::HorizontalBlur],
            clear: true,
        });
        passes.push(PassPlan {
            stage: Stage::BloomComposite,
            output: Target::BloomComposite,
            inputs: vec![Target::Scene, Target::VerticalBlur],
            clear: true,
        });
        passes.push(PassPlan {
            stage: Stage::Final { composite: bloom },
            output: Target::BackBuffer,
            inputs: if bloom {
                vec![Target::BloomComposite]
            } else {
                Vec::new()
            },
            clear: bloom,
        });
        passes.push(PassPlan {
            stage: Stage::Overlay,
            output: Target::BackBuffer,
            inputs: Vec::new(),
            clear: false,
        });

        Self { passes }
    }

    pub fn pass(&self, predicate: impl Fn(&Stage) -> bool) -> Option<&PassPlan> {
        self.passes.iter().find(|pass| predicate(&pass.stage))
    }

    pub fn writes(&self, target: Target) -> bool {
        self.passes.iter().any(|pass| pass.output == target)
    }

    pub fn shadow_pass_count(&self) -> usize {
        self.passes
            .iter()
            .filter(|pass| matches!(pass.stage, Stage::Shadow { .. }))
            .count()
    }
}

impl fmt::Display for FramePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, pass) in self.passes.iter().enumerate() {
            writeln!(f, "{:>2}. {pass}", index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::scene::Scene;

    fn plan_with(configure: impl FnOnce(&mut Scene)) -> FramePlan {
        let mut scene = Scene::demo(&AppConfig::default());
        configure(&mut scene);
        FramePlan::build(&scene.tunables, &scene.lights)
    }

    fn scene_pass(plan: &FramePlan) -> &PassPlan {
        plan.pass(|stage| matches!(stage, Stage::Scene { .. })).unwrap()
    }

    fn final_pass(plan: &FramePlan) -> &PassPlan {
        plan.pass(|stage| matches!(stage, Stage::Final { .. })).unwrap()
    }

    #[test]
    fn bloom_off_renders_straight_to_back_buffer() {
        let plan = plan_with(|scene| scene.tunables.set_bloom_enabled(false));
        assert_eq!(scene_pass(&plan).output, Target::BackBuffer);
        let last = final_pass(&plan);
        assert_eq!(last.stage, Stage::Final { composite: false });
        assert!(last.inputs.is_empty());
        assert!(!last.clear);
    }

    #[test]
    fn bloom_on_presents_the_composite() {
        let plan = plan_with(|scene| scene.tunables.set_bloom_enabled(true));
        assert_eq!(scene_pass(&plan).output, Target::Scene);
        let last = final_pass(&plan);
        assert_eq!(last.inputs, vec![Target::BloomComposite]);
        assert!(!last.inputs.contains(&Target::Scene));
        assert!(last.clear);
    }

    #[test]
    fn overlay_is_always_the_last_pass() {
        for bloom in [false, true] {
            let plan = plan_with(|scene| scene.tunables.set_bloom_enabled(bloom));
            let last = plan.passes.last().unwrap();
            assert_eq!(last.stage, Stage::Overlay);
            assert_eq!(last.output, Target::BackBuffer);
            assert!(last.inputs.is_empty());
            assert!(!last.clear);
        }
    }

    #[test]
    fn blur_passes_chain() {
        let plan = plan_with(|_| {});
        let horizontal = plan
            .pass(|stage| *stage == Stage::Blur(BlurAxis::Horizontal))
            .unwrap();
        let vertical = plan
            .pass(|stage| *stage == Stage::Blur(BlurAxis::Vertical))
            .unwrap();
        assert_eq!(horizontal.inputs, vec![Target::BloomExtract]);
        assert_eq!(horizontal.output, Target::HorizontalBlur);
        assert_eq!(vertical.inputs, vec![Target::HorizontalBlur]);
        assert_eq!(vertical.output, Target::VerticalBlur);
        let composite = plan.pass(|stage| *stage == Stage::BloomComposite).unwrap();
        assert_eq!(composite.inputs, vec![Target::Scene, Target::VerticalBlur]);
    }

    #[test]
    fn stage_order_is_fixed() {
        let plan = plan_with(|scene| scene.tunables.set_bloom_enabled(true));
        let names: Vec<&str> = plan.passes.iter().map(|pass| pass.stage.name()).collect();
        assert_eq!(
            names,
            vec![
                "scene",
                "shadow",
                "shadow",
                "shadow",
                "shadow",
                "bloom-extract",
                "horizontal-blur",
                "vertical-blur",
                "bloom-composite",
                "final",
                "overlay",
            ]
        );
    }

    #[test]
    fn shadows_off_writes_no_shadow_map() {
        let plan = plan_with(|scene| scene.tunables.set_shadows_enabled(false));
        assert_eq!(plan.shadow_pass_count(), 0);
        for index in 0..4 {
            assert!(!plan.writes(Target::ShadowMap(index)));
        }
        let scene = scene_pass(&plan);
        assert!(scene.inputs.is_empty());
        assert!(matches!(
            scene.stage,
            Stage::Scene {
                sample_shadows: false,
                ..
            }
        ));
    }

    #[test]
    fn shadows_on_writes_every_map() {
        let plan = plan_with(|_| {});
        assert_eq!(plan.shadow_pass_count(), 4);
        assert!(plan.writes(Target::ShadowMap(3)));
    }

    #[test]
    fn billboards_blend_only_without_bloom() {
        let plan = plan_with(|_| {});
        assert!(matches!(
            scene_pass(&plan).stage,
            Stage::Scene {
                billboards: Some(BillboardBlend::AlphaBlended),
                ..
            }
        ));
        let plan = plan_with(|scene| scene.tunables.set_bloom_enabled(true));
        assert!(matches!(
            scene_pass(&plan).stage,
            Stage::Scene {
                billboards: Some(BillboardBlend::Opaque),
                ..
            }
        ));
        let plan = plan_with(|scene| scene.tunables.set_grass_enabled(false));
        assert!(matches!(
            scene_pass(&plan).stage,
            Stage::Scene {
                billboards: None,
                ..
            }
        ));
    }

    #[test]
    fn gizmos_skip_disabled_lights() {
        let plan = plan_with(|scene| {
            scene.tunables.set_gizmos_enabled(true);
            scene.lights[0].set_enabled(false);
        });
        assert!(matches!(
            &scene_pass(&plan).stage,
            Stage::Scene { gizmos, .. } if gizmos == &vec![1, 2, 3]
        ));
    }

    #[test]
    fn plan_prints_one_line_per_pass() {
        let plan = plan_with(|scene| scene.tunables.set_shadows_enabled(false));
        let text = plan.to_string();
        assert_eq!(text.lines().count(), plan.passes.len());
        assert!(text.contains("horizontal-blur <- bloom-extract -> horizontal-blur"));
    }
}
