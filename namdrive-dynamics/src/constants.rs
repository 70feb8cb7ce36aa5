// Boltzmann constant in hartree per kelvin
pub const K_BOLTZMANN: f64 = 3.166811563e-6;
