//! Shader interface table: the named uniforms and attributes a particle
//! program must expose, and their locations once resolved.

use particles_config::schema::ShaderSlotsConfig;

use crate::backend::{GpuBackend, Location};

/// A logical slot in the particle program's interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderSlot {
    ModelviewMatrix,
    ProjectionMatrix,
    /// Per-instance color, fed from the instance record.
    ColorArray,
    Position,
    Texcoord,
    InstanceIndex,
    /// First of four consecutive column locations.
    InstanceTransform,
}

impl ShaderSlot {
    pub const ALL: [ShaderSlot; 7] = [
        ShaderSlot::ModelviewMatrix,
        ShaderSlot::ProjectionMatrix,
        ShaderSlot::ColorArray,
        ShaderSlot::Position,
        ShaderSlot::Texcoord,
        ShaderSlot::InstanceIndex,
        ShaderSlot::InstanceTransform,
    ];

    pub fn is_uniform(self) -> bool {
        matches!(self, ShaderSlot::ModelviewMatrix | ShaderSlot::ProjectionMatrix)
    }

    pub fn is_required(self) -> bool {
        !matches!(self, ShaderSlot::ColorArray)
    }

    /// Canonical upper-case slot name, used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderSlot::ModelviewMatrix => "MODELVIEW_MATRIX",
            ShaderSlot::ProjectionMatrix => "PROJECTION_MATRIX",
            ShaderSlot::ColorArray => "COLOR_ARRAY",
            ShaderSlot::Position => "POSITION",
            ShaderSlot::Texcoord => "TEXCOORD",
            ShaderSlot::InstanceIndex => "INSTANCE_INDEX",
            ShaderSlot::InstanceTransform => "INSTANCE_TRANSFORM",
        }
    }
}

/// Per-manager mapping from slot to the name looked up in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInterface {
    slots: ShaderSlotsConfig,
}

impl Default for ShaderInterface {
    fn default() -> Self {
        Self::new(ShaderSlotsConfig::default())
    }
}

impl From<&ShaderSlotsConfig> for ShaderInterface {
    fn from(config: &ShaderSlotsConfig) -> Self {
        Self::new(config.clone())
    }
}

impl ShaderInterface {
    pub fn new(slots: ShaderSlotsConfig) -> Self {
        Self { slots }
    }

    /// Name the program is expected to use for `slot`.
    pub fn name(&self, slot: ShaderSlot) -> &str {
        match slot {
            ShaderSlot::ModelviewMatrix => &self.slots.modelview_matrix,
            ShaderSlot::ProjectionMatrix => &self.slots.projection_matrix,
            ShaderSlot::ColorArray => &self.slots.color,
            ShaderSlot::Position => &self.slots.position,
            ShaderSlot::Texcoord => &self.slots.texcoord,
            ShaderSlot::InstanceIndex => &self.slots.instance_index,
            ShaderSlot::InstanceTransform => &self.slots.instance_transform,
        }
    }

    /// Look up every slot in `program`.
    ///
    /// Fails with a message listing all required slots the program lacks.
    pub fn resolve<B: GpuBackend>(
        &self,
        backend: &B,
        program: &B::Program,
    ) -> Result<ShaderLocations, String> {
        let lookup = |slot: ShaderSlot| {
            let name = self.name(slot);
            if slot.is_uniform() {
                backend.uniform_location(program, name)
            } else {
                backend.attribute_location(program, name)
            }
        };

        let mut missing = Vec::new();
        let mut required = |slot: ShaderSlot| -> Location {
            lookup(slot).unwrap_or_else(|| {
                missing.push(format!("{} ({:?})", slot.as_str(), self.name(slot)));
                0
            })
        };

        let locations = ShaderLocations {
            modelview_matrix: required(ShaderSlot::ModelviewMatrix),
            projection_matrix: required(ShaderSlot::ProjectionMatrix),
            position: required(ShaderSlot::Position),
            texcoord: required(ShaderSlot::Texcoord),
            instance_index: required(ShaderSlot::InstanceIndex),
            instance_transform: required(ShaderSlot::InstanceTransform),
            color: lookup(ShaderSlot::ColorArray),
        };

        if missing.is_empty() {
            Ok(locations)
        } else {
            Err(format!("program is missing {}", missing.join(", ")))
        }
    }
}

/// Locations cached by a manager after its program is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderLocations {
    pub modelview_matrix: Location,
    pub projection_matrix: Location,
    pub color: Option<Location>,
    pub position: Location,
    pub texcoord: Location,
    pub instance_index: Location,
    pub instance_transform: Location,
}

impl ShaderLocations {
    pub fn get(&self, slot: ShaderSlot) -> Option<Location> {
        match slot {
            ShaderSlot::ModelviewMatrix => Some(self.modelview_matrix),
            ShaderSlot::ProjectionMatrix => Some(self.projection_matrix),
            ShaderSlot::ColorArray => self.color,
            ShaderSlot::Position => Some(self.position),
            ShaderSlot::Texcoord => Some(self.texcoord),
            ShaderSlot::InstanceIndex => Some(self.instance_index),
            ShaderSlot::InstanceTransform => Some(self.instance_transform),
        }
    }

    /// Locations of the four transform columns.
    pub fn transform_columns(&self) -> [Location; 4] {
        let base = self.instance_transform;
        [base, base + 1, base + 2, base + 3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{ProgramDesc, RecordingBackend};

    fn full_program_desc() -> ProgramDesc {
        ProgramDesc::linked()
            .uniform("modelview_matrix", 0)
            .uniform("projection_matrix", 64)
            .attribute("position", 0)
            .attribute("texcoord", 1)
            .attribute("transform_col0", 2)
            .attribute("color", 6)
            .attribute("instance_index", 7)
    }

    #[test]
    fn slot_names_are_canonical() {
        let names: Vec<&str> = ShaderSlot::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            [
                "MODELVIEW_MATRIX",
                "PROJECTION_MATRIX",
                "COLOR_ARRAY",
                "POSITION",
                "TEXCOORD",
                "INSTANCE_INDEX",
                "INSTANCE_TRANSFORM",
            ]
        );
    }

    #[test]
    fn only_color_is_optional() {
        let optional: Vec<ShaderSlot> =
            ShaderSlot::ALL.into_iter().filter(|s| !s.is_required()).collect();
        assert_eq!(optional, [ShaderSlot::ColorArray]);
    }

    #[test]
    fn resolves_all_slots() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(full_program_desc());

        let locations = ShaderInterface::default().resolve(&backend, &program).unwrap();
        assert_eq!(locations.modelview_matrix, 0);
        assert_eq!(locations.projection_matrix, 64);
        assert_eq!(locations.position, 0);
        assert_eq!(locations.texcoord, 1);
        assert_eq!(locations.transform_columns(), [2, 3, 4, 5]);
        assert_eq!(locations.color, Some(6));
        assert_eq!(locations.instance_index, 7);
        assert_eq!(locations.get(ShaderSlot::ColorArray), Some(6));
    }

    #[test]
    fn color_slot_is_optional() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(
            ProgramDesc::linked()
                .uniform("modelview_matrix", 0)
                .uniform("projection_matrix", 64)
                .attribute("position", 0)
                .attribute("texcoord", 1)
                .attribute("transform_col0", 2)
                .attribute("instance_index", 6),
        );

        let locations = ShaderInterface::default().resolve(&backend, &program).unwrap();
        assert_eq!(locations.color, None);
    }

    #[test]
    fn missing_required_slots_are_listed() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(
            ProgramDesc::linked()
                .uniform("modelview_matrix", 0)
                .attribute("position", 0),
        );

        let err = ShaderInterface::default()
            .resolve(&backend, &program)
            .unwrap_err();
        assert!(err.contains("PROJECTION_MATRIX"));
        assert!(err.contains("TEXCOORD"));
        assert!(err.contains("INSTANCE_INDEX"));
        assert!(err.contains("INSTANCE_TRANSFORM"));
        assert!(!err.contains("MODELVIEW_MATRIX"));
        assert!(!err.contains("COLOR_ARRAY"));
    }

    #[test]
    fn uniform_slots_do_not_match_attributes() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(
            ProgramDesc::linked()
                .attribute("modelview_matrix", 0)
                .uniform("projection_matrix", 64)
                .attribute("position", 0)
                .attribute("texcoord", 1)
                .attribute("transform_col0", 2)
                .attribute("instance_index", 6),
        );

        let err = ShaderInterface::default()
            .resolve(&backend, &program)
            .unwrap_err();
        assert!(err.contains("MODELVIEW_MATRIX"));
    }

    #[test]
    fn custom_names_come_from_config() {
        let slots = ShaderSlotsConfig {
            modelview_matrix: "u_mv".into(),
            position: "a_pos".into(),
            ..ShaderSlotsConfig::default()
        };
        let interface = ShaderInterface::from(&slots);
        assert_eq!(interface.name(ShaderSlot::ModelviewMatrix), "u_mv");
        assert_eq!(interface.name(ShaderSlot::Position), "a_pos");
        assert_eq!(interface.name(ShaderSlot::Texcoord), "texcoord");
    }
}
