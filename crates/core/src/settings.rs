//! Global numerical settings shared by every simulation variant.

/// Rule governing field behavior at grid edges.
///
/// The discrete index matches the value uploaded to the compute kernels
/// (0 = Dirichlet, 1 = Neumann, 2 = Periodic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Fixed value (zero) outside the grid
    #[default]
    Dirichlet,
    /// Zero gradient at the edges (indices clamped)
    Neumann,
    /// Wraparound at the edges
    Periodic,
}

impl BoundaryCondition {
    /// Human-readable labels in kernel-index order, for dropdown UIs
    pub const LABELS: [&str; 3] = ["Dirichlet", "Neumann", "Periodic"];

    /// Kernel-side discriminant
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Dirichlet => 0,
            Self::Neumann => 1,
            Self::Periodic => 2,
        }
    }
}

/// Numerical settings a variant recommends for stable integration.
///
/// Returned by [`crate::sim::Simulation::recommended_settings`] as a plain
/// value; the sandbox controller decides when to apply it. Variants differ
/// deliberately here: the wave equation needs a much smaller time step
/// than heat diffusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Space step (dx)
    pub space_step: f32,
    /// Time step (dt)
    pub time_step: f32,
    /// Boundary condition
    pub boundary: BoundaryCondition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_condition_indices() {
        assert_eq!(BoundaryCondition::Dirichlet.index(), 0);
        assert_eq!(BoundaryCondition::Neumann.index(), 1);
        assert_eq!(BoundaryCondition::Periodic.index(), 2);
    }

    #[test]
    fn test_default_boundary_is_dirichlet() {
        assert_eq!(BoundaryCondition::default(), BoundaryCondition::Dirichlet);
    }
}
