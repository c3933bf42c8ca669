use crate::{
    module::common::{AxisRange, PITCH_RANGE, ROLL_RANGE, YAW_RANGE},
    Error, Result,
};

pub const GIMBAL_PITCH_ANGLE_CONVERTOR: UnitConvertor = UnitConvertor {
    range: Some(PITCH_RANGE),
    scale: 100.0,
    rounding: Rounding::Truncate,
    unit: "°",
};

pub const GIMBAL_ROLL_ANGLE_CONVERTOR: UnitConvertor = UnitConvertor {
    range: Some(ROLL_RANGE),
    scale: 100.0,
    rounding: Rounding::Truncate,
    unit: "°",
};

pub const GIMBAL_YAW_ANGLE_CONVERTOR: UnitConvertor = UnitConvertor {
    range: Some(YAW_RANGE),
    scale: 100.0,
    rounding: Rounding::Truncate,
    unit: "°",
};

// speeds are passed through unclamped, the i16 field is the only bound
pub const GIMBAL_SPEED_CONVERTOR: UnitConvertor = UnitConvertor {
    range: None,
    scale: 10.0,
    rounding: Rounding::Truncate,
    unit: "°/s",
};

pub const GIMBAL_VOLTAGE_CONVERTOR: UnitConvertor = UnitConvertor {
    range: None,
    scale: 1000.0,
    rounding: Rounding::Truncate,
    unit: "V",
};

/// Percent of full speed to a pulse offset from center, 5µs per percent.
pub const SERVO_SPEED_CONVERTOR: UnitConvertor = UnitConvertor {
    range: Some(AxisRange::new(-100.0, 100.0)),
    scale: 5.0,
    rounding: Rounding::Nearest,
    unit: "%",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// toward zero
    Truncate,
    Nearest,
}

#[derive(Debug, Clone, Copy)]
pub struct UnitConvertor {
    range: Option<AxisRange>,
    scale: f32,
    rounding: Rounding,
    unit: &'static str,
}

impl UnitConvertor {
    pub fn check(&self, v: f32) -> f32 {
        match self.range {
            Some(range) => range.clamp(v),
            None => v,
        }
    }

    pub fn val2proto(&self, v: f32) -> Result<i16> {
        if v.is_nan() {
            return Err(Error::InvalidData(
                format!("NaN is not a valid value in {}", self.unit).into(),
            ));
        }

        let scaled = self.check(v) * self.scale;
        let scaled = match self.rounding {
            Rounding::Truncate => scaled.trunc(),
            Rounding::Nearest => scaled.round(),
        };

        if scaled < i16::MIN as f32 || scaled > i16::MAX as f32 {
            return Err(Error::InvalidData(
                format!("{}{} does not fit in a 16-bit field", v, self.unit).into(),
            ));
        }

        Ok(scaled as i16)
    }

    pub fn proto2val(&self, pv: i16) -> f32 {
        pv as f32 / self.scale
    }

    pub fn proto2val_unsigned(&self, pv: u16) -> f32 {
        pv as f32 / self.scale
    }
}
