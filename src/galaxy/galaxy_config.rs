use bevy::prelude::*;
use std::fmt;

/// Snapshot of every tunable generation input.
#[derive(Clone, Debug, PartialEq)]
pub struct GalaxyParams {
    pub count: u32,
    /// Only used by the renderer
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Srgba,
    pub outside_color: Srgba,
}

impl GalaxyParams {
    pub const MIN: Self = Self {
        count: 100,
        size: 0.001,
        radius: 0.01,
        branches: 3,
        spin: -5.0,
        randomness: 0.0,
        randomness_power: 1.0,
        inside_color: Srgba::BLACK,
        outside_color: Srgba::BLACK,
    };
    pub const MAX: Self = Self {
        count: 300_000,
        size: 1.0,
        radius: 20.0,
        branches: 10,
        spin: 5.0,
        randomness: 2.0,
        randomness_power: 10.0,
        inside_color: Srgba::WHITE,
        outside_color: Srgba::WHITE,
    };

    /// Checks every field against the editing domain.
    pub fn validate(&self) -> Result<(), GalaxyConfigError> {
        self.check_generatable()?;

        let (min, max) = (&Self::MIN, &Self::MAX);
        check_range("count", self.count as f32, min.count as f32, max.count as f32)?;
        check_range("size", self.size, min.size, max.size)?;
        check_range("radius", self.radius, min.radius, max.radius)?;
        check_range(
            "branches",
            self.branches as f32,
            min.branches as f32,
            max.branches as f32,
        )?;
        check_range("spin", self.spin, min.spin, max.spin)?;
        check_range("randomness", self.randomness, min.randomness, max.randomness)?;
        check_range(
            "randomness_power",
            self.randomness_power,
            min.randomness_power,
            max.randomness_power,
        )?;
        for (field, color) in [
            ("inside_color", self.inside_color),
            ("outside_color", self.outside_color),
        ] {
            for channel in [color.red, color.green, color.blue] {
                check_range(field, channel, 0.0, 1.0)?;
            }
        }
        Ok(())
    }

    /// The weaker check `generate` relies on: any finite values, at least one branch.
    pub fn check_generatable(&self) -> Result<(), GalaxyConfigError> {
        if self.branches == 0 {
            return Err(GalaxyConfigError::ZeroBranches);
        }
        for (field, value) in [
            ("size", self.size),
            ("radius", self.radius),
            ("spin", self.spin),
            ("randomness", self.randomness),
            ("randomness_power", self.randomness_power),
        ] {
            if !value.is_finite() {
                return Err(GalaxyConfigError::NonFinite { field });
            }
        }
        for (field, color) in [
            ("inside_color", self.inside_color),
            ("outside_color", self.outside_color),
        ] {
            if ![color.red, color.green, color.blue].iter().all(|c| c.is_finite()) {
                return Err(GalaxyConfigError::NonFinite { field });
            }
        }
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), GalaxyConfigError> {
    if !value.is_finite() {
        return Err(GalaxyConfigError::NonFinite { field });
    }
    if value < min || value > max {
        return Err(GalaxyConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            count: 24000,
            size: 0.005,
            radius: 3.5,
            branches: 5,
            spin: 1.68,
            randomness: 1.336,
            randomness_power: 5.6,
            inside_color: Srgba::rgb_u8(0xa4, 0x50, 0x32),
            outside_color: Srgba::rgb_u8(0x1b, 0x39, 0x84),
        }
    }
}

/// Invalid galaxy configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum GalaxyConfigError {
    /// Points are distributed round-robin over the arms, so there must be at least one.
    ZeroBranches,
    NonFinite {
        field: &'static str,
    },
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

impl fmt::Display for GalaxyConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalaxyConfigError::ZeroBranches => write!(f, "Galaxy needs at least one branch"),
            GalaxyConfigError::NonFinite { field } => {
                write!(f, "Galaxy parameter `{}` is not a finite number", field)
            }
            GalaxyConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "Galaxy parameter `{}` = {} is outside [{}, {}]",
                field, value, min, max
            ),
        }
    }
}

impl std::error::Error for GalaxyConfigError {}

/// The committed parameters. `generation` is bumped on every accepted commit,
/// consumers rebuild whenever it moves past what they last built.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct GalaxyConfig {
    pub generation: u32,
    pub params: GalaxyParams,
}

impl GalaxyConfig {
    /// Installs `params` if they validate. On error the current config is kept as is.
    pub fn commit(&mut self, params: GalaxyParams) -> Result<(), GalaxyConfigError> {
        params.validate()?;
        self.params = params;
        self.generation += 1;
        Ok(())
    }
}

pub struct GalaxyConfigPlugin;

impl Plugin for GalaxyConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GalaxyConfig::default())
            .insert_resource(super::PresetStore::default())
            .insert_resource(super::PointCount::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert_eq!(GalaxyParams::default().validate(), Ok(()));
        assert_eq!(GalaxyParams::MIN.validate(), Ok(()));
        assert_eq!(GalaxyParams::MAX.validate(), Ok(()));
    }

    #[test]
    fn test_zero_branches_rejected() {
        let params = GalaxyParams {
            branches: 0,
            ..default()
        };
        assert_eq!(params.check_generatable(), Err(GalaxyConfigError::ZeroBranches));
        assert_eq!(params.validate(), Err(GalaxyConfigError::ZeroBranches));
    }

    #[test]
    fn test_out_of_domain_rejected() {
        let params = GalaxyParams {
            radius: 25.0,
            ..default()
        };
        match params.validate() {
            Err(GalaxyConfigError::OutOfRange { field, .. }) => assert_eq!(field, "radius"),
            other => panic!("unexpected result {:?}", other),
        }
        // still fine for the generator itself
        assert_eq!(params.check_generatable(), Ok(()));
    }

    #[test]
    fn test_non_finite_rejected() {
        let params = GalaxyParams {
            spin: f32::NAN,
            ..default()
        };
        assert_eq!(
            params.check_generatable(),
            Err(GalaxyConfigError::NonFinite { field: "spin" })
        );
    }

    #[test]
    fn test_non_finite_color_rejected() {
        let params = GalaxyParams {
            inside_color: Srgba::rgb(f32::NAN, 0.0, 0.0),
            ..default()
        };
        assert_eq!(
            params.check_generatable(),
            Err(GalaxyConfigError::NonFinite {
                field: "inside_color"
            })
        );

        let params = GalaxyParams {
            outside_color: Srgba::rgb(0.0, 0.0, f32::INFINITY),
            ..default()
        };
        assert_eq!(
            params.check_generatable(),
            Err(GalaxyConfigError::NonFinite {
                field: "outside_color"
            })
        );
    }

    #[test]
    fn test_commit_bumps_generation() {
        let mut config = GalaxyConfig::default();
        let params = GalaxyParams {
            count: 500,
            ..default()
        };
        config.commit(params.clone()).unwrap();
        assert_eq!(config.generation, 1);
        assert_eq!(config.params, params);

        // identical values still count as an edit
        config.commit(params).unwrap();
        assert_eq!(config.generation, 2);
    }

    #[test]
    fn test_rejected_commit_keeps_config() {
        let mut config = GalaxyConfig::default();
        let before = config.clone();
        let result = config.commit(GalaxyParams {
            branches: 0,
            ..default()
        });
        assert!(result.is_err());
        assert_eq!(config, before);
    }
}
