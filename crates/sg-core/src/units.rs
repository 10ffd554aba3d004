// sg-core/src/units.rs

use crate::numeric::Real;
use uom::si::f64::{
    ElectricPotential as UomElectricPotential, Frequency as UomFrequency, Power as UomPower,
};

// Public canonical unit types (SI, f64).
//
// Apparent power is carried as uom `Power`: volt-amperes and watts share the
// same dimension, only the interpretation differs.
pub type Power = UomPower;
pub type Voltage = UomElectricPotential;
pub type Frequency = UomFrequency;

#[inline]
pub fn va(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn mva(v: f64) -> Power {
    use uom::si::power::megawatt;
    Power::new::<megawatt>(v)
}

#[inline]
pub fn volt(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn kv(v: f64) -> Voltage {
    use uom::si::electric_potential::kilovolt;
    Voltage::new::<kilovolt>(v)
}

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

/// Per-unit base quantities of a three-phase machine.
///
/// Built from rated apparent power and rated line-line voltage; everything a
/// per-unit model needs to go back to SI hangs off these two.
#[derive(Clone, Copy, Debug)]
pub struct PerUnitBase {
    pub s_base: Power,
    pub v_base: Voltage,
}

impl PerUnitBase {
    pub fn new(s_base: Power, v_base: Voltage) -> Self {
        Self { s_base, v_base }
    }

    /// Base impedance in ohms: V_base² / S_base.
    pub fn z_base_ohm(&self) -> Real {
        let v = self.v_base.value;
        let s = self.s_base.value;
        v * v / s
    }

    /// Base line current in amperes: S_base / (√3 · V_base).
    pub fn i_base_amp(&self) -> Real {
        let v = self.v_base.value;
        let s = self.s_base.value;
        s / (3.0_f64.sqrt() * v)
    }
}

/// Synchronous mechanical speed in rpm for a machine with `poles` poles.
pub fn sync_speed_rpm(f: Frequency, poles: u32) -> Real {
    120.0 * f.value / poles as Real
}
