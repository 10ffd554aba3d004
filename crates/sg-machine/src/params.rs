//! Machine parameter record and its physical validation.

use crate::error::{MachineError, MachineResult};
use core::fmt;
use sg_core::numeric::{Real, ensure_finite};
use sg_core::units::{Frequency, PerUnitBase, Power, Voltage, sync_speed_rpm};

/// Fraction of the smaller subtransient reactance used to estimate leakage
/// reactance when no explicit value is supplied.
const LEAKAGE_FRACTION: Real = 0.15;

/// Smallest acceptable magnitude for the reactance differences that appear as
/// denominators in the stator current solve.
pub(crate) const DENOM_EPS: Real = 1e-9;

/// Rated and per-unit constants of a synchronous machine.
///
/// Immutable once validated; [`crate::SynchronousMachine::new`] runs
/// [`MachineParams::validate`] and rejects any physically inconsistent set
/// before a single equation is evaluated.
///
/// Naming: `_p` marks transient ("prime") and `_pp` subtransient
/// ("double-prime") quantities, so `xd_p` is Xd′ and `td0_pp` is Tdo″.
///
/// Reactance ordering is physical and load-bearing: differences of these
/// values appear in denominators of the dynamic model:
///
/// ```text
/// Xd ≥ Xd′ ≥ Xd″ > Xl > 0      Xq ≥ Xq′ ≥ Xq″ > Xl > 0
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MachineParams {
    /// Rated apparent power (three-phase)
    pub rated_power: Power,
    /// Rated line-line voltage
    pub rated_voltage: Voltage,
    /// Rated electrical frequency
    pub rated_frequency: Frequency,
    /// Pole count, even and ≥ 2
    pub poles: u32,

    /// Stator resistance (pu)
    pub rs: Real,
    /// d-axis synchronous reactance (pu)
    pub xd: Real,
    /// q-axis synchronous reactance (pu)
    pub xq: Real,
    /// d-axis transient reactance (pu)
    pub xd_p: Real,
    /// q-axis transient reactance (pu)
    pub xq_p: Real,
    /// d-axis subtransient reactance (pu)
    pub xd_pp: Real,
    /// q-axis subtransient reactance (pu)
    pub xq_pp: Real,
    /// Leakage reactance (pu). `None` derives 0.15·min(Xd″, Xq″) on demand.
    pub xl: Option<Real>,

    /// d-axis transient open-circuit time constant (s)
    pub td0_p: Real,
    /// q-axis transient open-circuit time constant (s)
    pub tq0_p: Real,
    /// d-axis subtransient open-circuit time constant (s)
    pub td0_pp: Real,
    /// q-axis subtransient open-circuit time constant (s)
    pub tq0_pp: Real,

    /// Inertia constant H (s)
    pub h: Real,
    /// Damping coefficient D (pu torque per pu speed deviation), ≥ 0
    pub damping: Real,
}

impl MachineParams {
    /// Documented default parameter set: a typical 100 MVA, 13.8 kV, 60 Hz,
    /// 4-pole machine.
    ///
    /// This is the explicit replacement for the source system's silent
    /// zero-argument fallback; callers who want defaults must name them.
    pub fn typical_100mva() -> Self {
        Self {
            rated_power: sg_core::units::mva(100.0),
            rated_voltage: sg_core::units::kv(13.8),
            rated_frequency: sg_core::units::hz(60.0),
            poles: 4,
            rs: 0.003,
            xd: 1.8,
            xq: 1.7,
            xd_p: 0.3,
            xq_p: 0.55,
            xd_pp: 0.25,
            xq_pp: 0.25,
            xl: None,
            td0_p: 5.0,
            tq0_p: 0.8,
            td0_pp: 0.03,
            tq0_pp: 0.04,
            h: 3.0,
            damping: 2.0,
        }
    }

    /// Effective leakage reactance (pu): the explicit value when supplied,
    /// else 0.15·min(Xd″, Xq″). Recomputed on demand, never stored.
    pub fn leakage_reactance(&self) -> Real {
        self.xl
            .unwrap_or_else(|| LEAKAGE_FRACTION * self.xd_pp.min(self.xq_pp))
    }

    /// Denominator of the d-axis stator current solve:
    /// Xd″ − (Xd″ − Xd′)² / (Xd″ − Xl).
    pub(crate) fn d_axis_denominator(&self) -> Real {
        let xl = self.leakage_reactance();
        let dx = self.xd_pp - self.xd_p;
        self.xd_pp - dx * dx / (self.xd_pp - xl)
    }

    /// Per-unit base quantities from the machine ratings.
    pub fn base(&self) -> PerUnitBase {
        PerUnitBase::new(self.rated_power, self.rated_voltage)
    }

    /// Check every invariant of the record.
    ///
    /// # Errors
    /// `Domain` naming the first violated constraint.
    pub fn validate(&self) -> MachineResult<()> {
        for (v, what) in [
            (self.rated_power.value, "rated power"),
            (self.rated_voltage.value, "rated voltage"),
            (self.rated_frequency.value, "rated frequency"),
            (self.rs, "stator resistance"),
            (self.xd, "Xd"),
            (self.xq, "Xq"),
            (self.xd_p, "Xd'"),
            (self.xq_p, "Xq'"),
            (self.xd_pp, "Xd''"),
            (self.xq_pp, "Xq''"),
            (self.td0_p, "Tdo'"),
            (self.tq0_p, "Tqo'"),
            (self.td0_pp, "Tdo''"),
            (self.tq0_pp, "Tqo''"),
            (self.h, "inertia constant"),
            (self.damping, "damping coefficient"),
        ] {
            ensure_finite(v, what)?;
        }
        if let Some(xl) = self.xl {
            ensure_finite(xl, "leakage reactance")?;
        }

        if self.rated_power.value <= 0.0 {
            return Err(MachineError::Domain {
                what: "rated power must be positive",
            });
        }
        if self.rated_voltage.value <= 0.0 {
            return Err(MachineError::Domain {
                what: "rated voltage must be positive",
            });
        }
        if self.rated_frequency.value <= 0.0 {
            return Err(MachineError::Domain {
                what: "rated frequency must be positive",
            });
        }
        if self.poles < 2 || self.poles % 2 != 0 {
            return Err(MachineError::Domain {
                what: "pole count must be even and at least 2",
            });
        }
        if self.rs < 0.0 {
            return Err(MachineError::Domain {
                what: "stator resistance cannot be negative",
            });
        }

        if self.xd_pp <= 0.0 || !(self.xd >= self.xd_p && self.xd_p >= self.xd_pp) {
            return Err(MachineError::Domain {
                what: "d-axis reactances must satisfy Xd >= Xd' >= Xd'' > 0",
            });
        }
        if self.xq_pp <= 0.0 || !(self.xq >= self.xq_p && self.xq_p >= self.xq_pp) {
            return Err(MachineError::Domain {
                what: "q-axis reactances must satisfy Xq >= Xq' >= Xq'' > 0",
            });
        }

        if self.td0_p <= 0.0
            || self.tq0_p <= 0.0
            || self.td0_pp <= 0.0
            || self.tq0_pp <= 0.0
        {
            return Err(MachineError::Domain {
                what: "all open-circuit time constants must be positive",
            });
        }
        if self.h <= 0.0 {
            return Err(MachineError::Domain {
                what: "inertia constant must be positive",
            });
        }
        if self.damping < 0.0 {
            return Err(MachineError::Domain {
                what: "damping coefficient cannot be negative",
            });
        }

        let xl = self.leakage_reactance();
        if xl <= 0.0 {
            return Err(MachineError::Domain {
                what: "leakage reactance must be positive",
            });
        }
        // Xd''−Xl and Xq''−Xl divide the stator current solve; require Xl
        // strictly below both subtransient reactances.
        if self.xd_pp - xl < DENOM_EPS || self.xq_pp - xl < DENOM_EPS {
            return Err(MachineError::Domain {
                what: "leakage reactance must be strictly below both subtransient reactances",
            });
        }
        if self.d_axis_denominator().abs() < DENOM_EPS {
            return Err(MachineError::Domain {
                what: "d-axis current-solve denominator vanishes for these reactances",
            });
        }

        Ok(())
    }
}

impl fmt::Display for MachineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use uom::si::electric_potential::kilovolt;
        use uom::si::frequency::hertz;
        use uom::si::power::megawatt;

        let base = self.base();
        writeln!(f, "Synchronous machine parameters")?;
        writeln!(
            f,
            "  rated apparent power  {:10.3} MVA",
            self.rated_power.get::<megawatt>()
        )?;
        writeln!(
            f,
            "  rated line voltage    {:10.3} kV",
            self.rated_voltage.get::<kilovolt>()
        )?;
        writeln!(
            f,
            "  rated frequency       {:10.3} Hz",
            self.rated_frequency.get::<hertz>()
        )?;
        writeln!(
            f,
            "  poles                 {:10}    ({:.0} rpm synchronous)",
            self.poles,
            sync_speed_rpm(self.rated_frequency, self.poles)
        )?;
        writeln!(f, "  Rs                    {:10.4} pu", self.rs)?;
        writeln!(f, "  Xd / Xq               {:10.4} / {:.4} pu", self.xd, self.xq)?;
        writeln!(
            f,
            "  Xd' / Xq'             {:10.4} / {:.4} pu",
            self.xd_p, self.xq_p
        )?;
        writeln!(
            f,
            "  Xd'' / Xq''           {:10.4} / {:.4} pu",
            self.xd_pp, self.xq_pp
        )?;
        writeln!(
            f,
            "  Tdo' / Tqo'           {:10.3} / {:.3} s",
            self.td0_p, self.tq0_p
        )?;
        writeln!(
            f,
            "  Tdo'' / Tqo''         {:10.3} / {:.3} s",
            self.td0_pp, self.tq0_pp
        )?;
        writeln!(f, "  H                     {:10.3} s", self.h)?;
        writeln!(f, "  D                     {:10.3} pu", self.damping)?;
        writeln!(f, "  derived:")?;
        writeln!(f, "  base impedance        {:10.4} ohm", base.z_base_ohm())?;
        writeln!(f, "  base current          {:10.1} A", base.i_base_amp())?;
        write!(
            f,
            "  leakage reactance Xl  {:10.4} pu",
            self.leakage_reactance()
        )
    }
}
