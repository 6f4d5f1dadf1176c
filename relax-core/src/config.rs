use crate::error::{MeshError, Result};

/// How the engine's stored displacement scalar is updated by each call.
///
/// The value *returned* by a driver call is always that call's own total
/// displacement; the policy only affects [`crate::engine::Relaxer::last_displacement`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplacementPolicy {
    /// Every call overwrites the stored value with the summed displacement
    /// of all meshes it relaxed.
    #[default]
    PerCall,
    /// Batch calls reset the stored value to zero, then a simple step
    /// overwrites it with each mesh's displacement (the last mesh wins) while
    /// a full step adds each mesh's displacement to it. Single-mesh full
    /// steps keep adding across calls.
    Legacy,
}

/// Which step the convergence driver runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepMode {
    /// Position-only smoothing.
    Simple,
    /// Position plus arm length and angle.
    #[default]
    Full,
    /// `warmup_iterations` simple steps, then full steps.
    SimpleThenFull,
}

/// Relaxation engine configuration.
#[derive(Clone, Copy, Debug)]
pub struct RelaxConfig {
    pub displacement: DisplacementPolicy,
    /// Compute per-vertex updates on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// The convergence driver stops once a step moves the mesh by at most this much.
    pub tolerance: f32,
    pub max_iterations: usize,
    /// Number of leading simple steps in [`StepMode::SimpleThenFull`].
    pub warmup_iterations: usize,
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            displacement: DisplacementPolicy::PerCall,
            parallel: true,
            tolerance: 1e-4,
            max_iterations: 1000,
            warmup_iterations: 10,
        }
    }
}

impl RelaxConfig {
    pub fn with_displacement(mut self, displacement: DisplacementPolicy) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Single-threaded execution.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_warmup_iterations(mut self, warmup_iterations: usize) -> Self {
        self.warmup_iterations = warmup_iterations;
        self
    }

    /// Checks that the stopping criteria can be met.
    ///
    /// ### Errors
    /// [`MeshError::InvalidParameter`] for a negative or NaN tolerance, or
    /// for `max_iterations == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(MeshError::invalid_param(
                "tolerance",
                self.tolerance,
                "must be a non-negative number",
            ));
        }
        if self.max_iterations == 0 {
            return Err(MeshError::invalid_param(
                "max_iterations",
                self.max_iterations,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
