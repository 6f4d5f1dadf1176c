//! Batch drivers and convergence loop around the single-mesh steps.
//!
//! The typical caller loop looks like:
//! 1. Build a collection of [`QuadMesh`]es (kite meshes and others).
//! 2. Call [`Relaxer::relax_simple`] or [`Relaxer::relax_full`] once per
//!    frame / iteration, or hand the whole loop to [`Relaxer::run`].
//! 3. Read vertex positions back for drawing and
//!    [`Relaxer::last_displacement`] for a convergence readout.

use tracing::{debug, info, trace};

use crate::{
    config::{DisplacementPolicy, RelaxConfig, StepMode},
    error::Result,
    mesh::QuadMesh,
    relax::Step,
};

/// Outcome of [`Relaxer::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    /// Number of batch steps executed.
    pub iterations: usize,
    /// Displacement of the last executed step.
    pub final_displacement: f32,
    /// Whether the last step moved the meshes by at most the tolerance.
    pub converged: bool,
}

/// Relaxation engine: configuration plus the last-iteration displacement.
///
/// The displacement starts at `f32::MAX` ("not converged yet") and is
/// updated by every driver call according to [`RelaxConfig::displacement`].
/// The engine never reads it back itself.
#[derive(Debug)]
pub struct Relaxer {
    config: RelaxConfig,
    last_displacement: f32,
}

impl Default for Relaxer {
    fn default() -> Self {
        Self {
            config: RelaxConfig::default(),
            last_displacement: f32::MAX,
        }
    }
}

impl Relaxer {
    /// Creates an engine after checking `config` with [`RelaxConfig::validate`].
    pub fn new(config: RelaxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_displacement: f32::MAX,
        })
    }

    pub fn config(&self) -> &RelaxConfig {
        &self.config
    }

    /// Total displacement recorded by the most recent driver call(s).
    pub fn last_displacement(&self) -> f32 {
        self.last_displacement
    }

    /// Runs one simple step on every kite mesh in `meshes`.
    ///
    /// Meshes of other kinds are left untouched.
    ///
    /// ### Returns
    /// The summed displacement of all relaxed meshes.
    pub fn relax_simple(&mut self, meshes: &mut [QuadMesh]) -> f32 {
        self.relax_batch(meshes, Step::Simple)
    }

    /// Runs one full step on every kite mesh in `meshes`.
    ///
    /// Meshes of other kinds are left untouched.
    ///
    /// ### Returns
    /// The summed displacement of all relaxed meshes.
    pub fn relax_full(&mut self, meshes: &mut [QuadMesh]) -> f32 {
        self.relax_batch(meshes, Step::Full)
    }

    /// Runs one simple step on `mesh`, whatever its kind.
    pub fn relax_simple_mesh(&mut self, mesh: &mut QuadMesh) -> f32 {
        self.relax_single(mesh, Step::Simple)
    }

    /// Runs one full step on `mesh`, whatever its kind.
    pub fn relax_full_mesh(&mut self, mesh: &mut QuadMesh) -> f32 {
        self.relax_single(mesh, Step::Full)
    }

    /// Repeats batch steps until one of them moves the meshes by at most
    /// [`RelaxConfig::tolerance`], or [`RelaxConfig::max_iterations`] steps
    /// have run.
    ///
    /// In [`StepMode::SimpleThenFull`] the first
    /// [`RelaxConfig::warmup_iterations`] steps are simple steps and cannot
    /// end the run on their own.
    pub fn run(&mut self, meshes: &mut [QuadMesh], mode: StepMode) -> Convergence {
        let final_step = step_for(mode, usize::MAX, self.config.warmup_iterations);
        let mut outcome = Convergence {
            iterations: 0,
            final_displacement: f32::MAX,
            converged: false,
        };

        while outcome.iterations < self.config.max_iterations {
            let step = step_for(mode, outcome.iterations, self.config.warmup_iterations);
            let displacement = self.relax_batch(meshes, step);
            outcome.iterations += 1;
            outcome.final_displacement = displacement;
            debug!(
                iteration = outcome.iterations,
                ?step,
                displacement,
                "relaxation step"
            );

            // Warmup steps never end the run.
            if step == final_step && displacement <= self.config.tolerance {
                outcome.converged = true;
                break;
            }
        }

        if outcome.converged {
            info!(
                iterations = outcome.iterations,
                displacement = outcome.final_displacement,
                "relaxation converged"
            );
        } else {
            info!(
                iterations = outcome.iterations,
                displacement = outcome.final_displacement,
                tolerance = self.config.tolerance,
                "relaxation stopped at iteration cap"
            );
        }
        outcome
    }

    fn relax_batch(&mut self, meshes: &mut [QuadMesh], step: Step) -> f32 {
        let legacy = self.config.displacement == DisplacementPolicy::Legacy;
        // Legacy batches start from zero and let each mesh update the value.
        if legacy {
            self.last_displacement = 0.0;
        }

        let mut total = 0.0;
        let mut relaxed = 0usize;
        for (i, mesh) in meshes.iter_mut().enumerate() {
            // Only kite meshes carry a plus-sign stencil.
            if !mesh.kind.is_relaxable() {
                trace!(mesh = i, kind = ?mesh.kind, "skipping mesh");
                continue;
            }
            let d = step.apply(mesh, self.config.parallel);
            if legacy {
                self.record_legacy(step, d);
            }
            total += d;
            relaxed += 1;
        }

        if !legacy {
            self.last_displacement = total;
        }
        debug!(?step, meshes = relaxed, displacement = total, "batch step");
        total
    }

    fn relax_single(&mut self, mesh: &mut QuadMesh, step: Step) -> f32 {
        let d = step.apply(mesh, self.config.parallel);
        match self.config.displacement {
            DisplacementPolicy::PerCall => self.last_displacement = d,
            DisplacementPolicy::Legacy => self.record_legacy(step, d),
        }
        d
    }

    /// Simple steps overwrite, full steps accumulate.
    fn record_legacy(&mut self, step: Step, d: f32) {
        match step {
            Step::Simple => self.last_displacement = d,
            Step::Full => self.last_displacement += d,
        }
    }
}

fn step_for(mode: StepMode, iteration: usize, warmup: usize) -> Step {
    match mode {
        StepMode::Simple => Step::Simple,
        StepMode::Full => Step::Full,
        StepMode::SimpleThenFull if iteration < warmup => Step::Simple,
        StepMode::SimpleThenFull => Step::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{border::Border, mesh::MeshKind};
    use glam::Vec2;

    const EPS: f32 = 1e-5;

    /// 3 x 3 unit grid with only the centre movable, displaced by `offset`.
    fn displaced_centre(kind: MeshKind, offset: Vec2) -> QuadMesh {
        let border = Border::rect(Vec2::ZERO, Vec2::splat(2.0));
        let mut mesh = QuadMesh::from_border(kind, border, 3, 3).unwrap();
        mesh.fix_outline();
        mesh.set_position((1, 1), Vec2::ONE + offset).unwrap();
        mesh
    }

    fn sequential(policy: DisplacementPolicy) -> Relaxer {
        Relaxer::new(
            RelaxConfig::default()
                .sequential()
                .with_displacement(policy),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(Relaxer::new(RelaxConfig::default().with_max_iterations(0)).is_err());
        assert_eq!(Relaxer::default().last_displacement(), f32::MAX);
    }

    #[test]
    fn batch_skips_non_kite_meshes() {
        let mut meshes = vec![
            displaced_centre(MeshKind::Other, Vec2::new(0.4, 0.0)),
            displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0)),
        ];
        let other_before = meshes[0].grid().clone();

        let mut relaxer = sequential(DisplacementPolicy::PerCall);
        let d = relaxer.relax_simple(&mut meshes);

        assert!((d - 0.4).abs() < EPS);
        assert_eq!(meshes[0].grid(), &other_before);
        assert_eq!(meshes[1].vertex((1, 1)).unwrap().position, Vec2::ONE);
    }

    #[test]
    fn single_mesh_driver_ignores_kind() {
        let mut mesh = displaced_centre(MeshKind::Other, Vec2::new(0.0, 0.3));
        let d = sequential(DisplacementPolicy::PerCall).relax_full_mesh(&mut mesh);
        assert!((d - 0.3).abs() < EPS);
    }

    #[test]
    fn per_call_policy_sums_meshes_and_resets_each_call() {
        let mut meshes = vec![
            displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0)),
            displaced_centre(MeshKind::Kite, Vec2::new(0.0, 0.2)),
        ];
        let mut relaxer = sequential(DisplacementPolicy::PerCall);

        let d = relaxer.relax_simple(&mut meshes);
        assert!((d - 0.6).abs() < EPS);
        assert!((relaxer.last_displacement() - 0.6).abs() < EPS);

        // Already at rest: the next call reports zero, not an accumulation.
        assert_eq!(relaxer.relax_full(&mut meshes), 0.0);
        assert_eq!(relaxer.last_displacement(), 0.0);
    }

    #[test]
    fn legacy_policy_simple_batch_keeps_last_mesh_only() {
        let mut meshes = vec![
            displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0)),
            displaced_centre(MeshKind::Kite, Vec2::new(0.0, 0.2)),
        ];
        let mut relaxer = sequential(DisplacementPolicy::Legacy);

        let d = relaxer.relax_simple(&mut meshes);
        assert!((d - 0.6).abs() < EPS);
        assert!((relaxer.last_displacement() - 0.2).abs() < EPS);
    }

    #[test]
    fn legacy_policy_full_batch_accumulates_meshes() {
        let mut meshes = vec![
            displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0)),
            displaced_centre(MeshKind::Kite, Vec2::new(0.0, 0.2)),
        ];
        let mut relaxer = sequential(DisplacementPolicy::Legacy);

        relaxer.relax_full(&mut meshes);
        assert!((relaxer.last_displacement() - 0.6).abs() < EPS);
    }

    #[test]
    fn legacy_policy_single_full_steps_accumulate_across_calls() {
        let mut a = displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0));
        let mut b = displaced_centre(MeshKind::Kite, Vec2::new(0.0, 0.2));

        let mut legacy = sequential(DisplacementPolicy::Legacy);
        legacy.relax_simple_mesh(&mut a.clone());
        assert!((legacy.last_displacement() - 0.4).abs() < EPS);
        legacy.relax_full_mesh(&mut a);
        legacy.relax_full_mesh(&mut b);
        assert!((legacy.last_displacement() - 1.0).abs() < EPS);

        let mut a = displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0));
        let mut b = displaced_centre(MeshKind::Kite, Vec2::new(0.0, 0.2));
        let mut per_call = sequential(DisplacementPolicy::PerCall);
        per_call.relax_full_mesh(&mut a);
        per_call.relax_full_mesh(&mut b);
        assert!((per_call.last_displacement() - 0.2).abs() < EPS);
    }

    #[test]
    fn run_stops_when_displacement_reaches_tolerance() {
        let mut meshes = vec![displaced_centre(MeshKind::Kite, Vec2::new(0.4, 0.0))];
        let mut relaxer = sequential(DisplacementPolicy::PerCall);

        let outcome = relaxer.run(&mut meshes, StepMode::Simple);
        // First step moves the centre home, the second observes zero movement.
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.converged);
        assert_eq!(outcome.final_displacement, 0.0);
    }

    #[test]
    fn run_stops_at_iteration_cap() {
        let border = Border::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 6.0),
            Vec2::new(7.0, 0.5),
            Vec2::new(8.0, 7.0),
        );
        let mut meshes = vec![QuadMesh::from_border(MeshKind::Kite, border, 8, 8).unwrap()];
        meshes[0].set_position((3, 3), Vec2::new(5.0, 1.0)).unwrap();

        let mut relaxer = Relaxer::new(
            RelaxConfig::default()
                .sequential()
                .with_tolerance(0.0)
                .with_max_iterations(3),
        )
        .unwrap();
        let outcome = relaxer.run(&mut meshes, StepMode::Full);
        assert_eq!(outcome.iterations, 3);
        assert!(!outcome.converged);
        assert!(outcome.final_displacement > 0.0);
    }

    #[test]
    fn run_without_kite_meshes_converges_immediately() {
        let mut meshes = vec![displaced_centre(MeshKind::Other, Vec2::new(0.4, 0.0))];
        let outcome = sequential(DisplacementPolicy::PerCall).run(&mut meshes, StepMode::Full);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged);
        assert_eq!(outcome.final_displacement, 0.0);
    }

    #[test]
    fn warmup_steps_cannot_end_the_run() {
        let mut meshes = vec![displaced_centre(MeshKind::Kite, Vec2::ZERO)];
        let mut relaxer = Relaxer::new(
            RelaxConfig::default()
                .sequential()
                .with_warmup_iterations(4),
        )
        .unwrap();

        let outcome = relaxer.run(&mut meshes, StepMode::SimpleThenFull);
        assert_eq!(outcome.iterations, 5);
        assert!(outcome.converged);
        assert!(meshes[0].vertex((1, 1)).unwrap().arm_length > 0.0);
    }

    #[test]
    fn step_for_switches_after_warmup() {
        assert_eq!(step_for(StepMode::Simple, 100, 0), Step::Simple);
        assert_eq!(step_for(StepMode::Full, 0, 10), Step::Full);
        assert_eq!(step_for(StepMode::SimpleThenFull, 2, 3), Step::Simple);
        assert_eq!(step_for(StepMode::SimpleThenFull, 3, 3), Step::Full);
    }
}
