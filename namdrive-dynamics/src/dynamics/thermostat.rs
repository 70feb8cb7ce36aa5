use crate::constants::K_BOLTZMANN;
use crate::initialization::{ControlParameters, EnsembleType, ThermostatType};
use ndarray::prelude::*;

/// Coupling of the momenta of a set of DOFs of one trajectory to a bath
pub trait Thermostat {
    /// Scale the momenta `p` of the thermostat DOFs and account for the energy
    /// exchanged with the bath
    fn scale_momenta(&mut self, p: ArrayViewMut1<f64>, i_m: ArrayView1<f64>);
    fn get_temperature(&self, kinetic_energy: f64) -> f64;
    /// Energy that has been transferred into the bath so far
    fn energy(&self) -> f64;
}

fn kinetic_energy(p: ArrayView1<f64>, i_m: ArrayView1<f64>, dofs: &[usize]) -> f64 {
    0.5 * dofs.iter().map(|dof| p[*dof] * p[*dof] * i_m[*dof]).sum::<f64>()
}

/// Temperature of `nf` classical DOFs with the kinetic energy `kinetic_energy`
fn temperature(kinetic_energy: f64, nf: usize) -> f64 {
    if nf == 0 {
        return 0.0;
    }
    2.0 * kinetic_energy / (nf as f64 * K_BOLTZMANN)
}

pub struct NullThermostat {
    pub dofs: Vec<usize>,
}

impl NullThermostat {
    pub fn new(dofs: Vec<usize>) -> Self {
        NullThermostat { dofs }
    }
}

impl Thermostat for NullThermostat {
    fn scale_momenta(&mut self, _p: ArrayViewMut1<f64>, _i_m: ArrayView1<f64>) {}

    fn get_temperature(&self, kinetic_energy: f64) -> f64 {
        temperature(kinetic_energy, self.dofs.len())
    }

    fn energy(&self) -> f64 {
        0.0
    }
}

/// Berendsen weak coupling, the momenta are scaled by
/// `sqrt(1 + dt/tau (T0/T - 1))`
pub struct BerendsenThermostat {
    pub tau: f64,
    pub dt: f64,
    pub target_temperature: f64,
    pub dofs: Vec<usize>,
    bath_energy: f64,
}

impl BerendsenThermostat {
    pub fn new(tau: f64, dt: f64, temperature: f64, dofs: Vec<usize>) -> Self {
        BerendsenThermostat {
            tau,
            dt,
            target_temperature: temperature,
            dofs,
            bath_energy: 0.0,
        }
    }
}

impl Thermostat for BerendsenThermostat {
    fn get_temperature(&self, kinetic_energy: f64) -> f64 {
        temperature(kinetic_energy, self.dofs.len())
    }

    fn scale_momenta(&mut self, mut p: ArrayViewMut1<f64>, i_m: ArrayView1<f64>) {
        let ekin: f64 = kinetic_energy(p.view(), i_m, &self.dofs);
        let current_temperature: f64 = self.get_temperature(ekin);
        if !(current_temperature > 0.0) {
            return;
        }

        let scaling_factor: f64 = (1.0
            + (self.dt / self.tau) * (self.target_temperature / current_temperature - 1.0))
            .max(0.0)
            .sqrt();

        for dof in self.dofs.iter() {
            p[*dof] *= scaling_factor;
        }
        self.bath_energy += ekin * (1.0 - scaling_factor.powi(2));
    }

    fn energy(&self) -> f64 {
        self.bath_energy
    }
}

/// Nose-Hoover chain of `nhc_size` thermostats with the masses
/// `Q_1 = Nf kT tau^2` and `Q_j = kT tau^2`. The chain is advanced over one
/// nuclear step by a symmetric Trotter splitting; the conserved bath energy is
/// `sum_j Q_j v_j^2 / 2 + Nf kT xi_1 + kT sum_{j>1} xi_j`.
pub struct NoseHooverChain {
    pub dt: f64,
    pub target_temperature: f64,
    pub dofs: Vec<usize>,
    masses: Vec<f64>,
    positions: Vec<f64>,
    velocities: Vec<f64>,
}

impl NoseHooverChain {
    pub fn new(tau: f64, dt: f64, temperature: f64, nhc_size: usize, dofs: Vec<usize>) -> Self {
        let kt: f64 = K_BOLTZMANN * temperature;
        let nf: f64 = dofs.len() as f64;
        let masses: Vec<f64> = (0..nhc_size)
            .map(|j| if j == 0 { nf * kt * tau * tau } else { kt * tau * tau })
            .collect();
        NoseHooverChain {
            dt,
            target_temperature: temperature,
            dofs,
            masses,
            positions: vec![0.0; nhc_size],
            velocities: vec![0.0; nhc_size],
        }
    }

    fn kt(&self) -> f64 {
        K_BOLTZMANN * self.target_temperature
    }

    /// Force on the chain element `j`; the first element is driven by the
    /// kinetic energy of the coupled DOFs
    fn chain_force(&self, j: usize, ekin: f64) -> f64 {
        let kt: f64 = self.kt();
        if j == 0 {
            (2.0 * ekin - self.dofs.len() as f64 * kt) / self.masses[0]
        } else {
            (self.masses[j - 1] * self.velocities[j - 1].powi(2) - kt) / self.masses[j]
        }
    }

    fn update_velocity(&mut self, j: usize, ekin: f64, h: f64) {
        let damping: f64 = match self.velocities.get(j + 1) {
            Some(outer) => (-outer * 0.25 * h).exp(),
            None => 1.0,
        };
        self.velocities[j] *= damping;
        self.velocities[j] += self.chain_force(j, ekin) * 0.5 * h;
        self.velocities[j] *= damping;
    }

    /// Advance the chain by `h` and return the momentum scaling factor
    fn integrate(&mut self, mut ekin: f64, h: f64) -> f64 {
        let size: usize = self.masses.len();
        for j in (0..size).rev() {
            self.update_velocity(j, ekin, h);
        }
        for (xi, v) in self.positions.iter_mut().zip(self.velocities.iter()) {
            *xi += v * h;
        }
        let scaling_factor: f64 = (-self.velocities[0] * h).exp();
        ekin *= scaling_factor.powi(2);
        for j in 0..size {
            self.update_velocity(j, ekin, h);
        }
        scaling_factor
    }
}

impl Thermostat for NoseHooverChain {
    fn get_temperature(&self, kinetic_energy: f64) -> f64 {
        temperature(kinetic_energy, self.dofs.len())
    }

    fn scale_momenta(&mut self, mut p: ArrayViewMut1<f64>, i_m: ArrayView1<f64>) {
        if self.masses.is_empty() {
            return;
        }
        let ekin: f64 = kinetic_energy(p.view(), i_m, &self.dofs);
        let scaling_factor: f64 = self.integrate(ekin, self.dt);
        for dof in self.dofs.iter() {
            p[*dof] *= scaling_factor;
        }
    }

    fn energy(&self) -> f64 {
        let kt: f64 = self.kt();
        let kinetic: f64 = self
            .masses
            .iter()
            .zip(self.velocities.iter())
            .map(|(q, v)| 0.5 * q * v * v)
            .sum::<f64>();
        let potential: f64 = self
            .positions
            .iter()
            .enumerate()
            .map(|(j, xi)| if j == 0 { self.dofs.len() as f64 * kt * xi } else { kt * xi })
            .sum::<f64>();
        kinetic + potential
    }
}

/// One thermostat per trajectory for NVT runs, none for NVE runs. Without
/// thermostat DOFs the bath is not coupled to anything.
pub fn create_thermostats(control: &ControlParameters, ntraj: usize) -> Vec<Box<dyn Thermostat>> {
    if control.ensemble == EnsembleType::Nve {
        return Vec::new();
    }
    (0..ntraj)
        .map(|_| -> Box<dyn Thermostat> {
            if control.thermostat_dofs.is_empty() {
                return Box::new(NullThermostat::new(Vec::new()));
            }
            match control.thermostat_type {
                ThermostatType::NoseHooverChain => Box::new(NoseHooverChain::new(
                    control.thermostat_tau,
                    control.dt,
                    control.temperature,
                    control.nhc_size,
                    control.thermostat_dofs.clone(),
                )),
                ThermostatType::Berendsen => Box::new(BerendsenThermostat::new(
                    control.thermostat_tau,
                    control.dt,
                    control.temperature,
                    control.thermostat_dofs.clone(),
                )),
            }
        })
        .collect()
}
