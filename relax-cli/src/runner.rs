//! Headless relaxation session driven from the command line.
//!
//! [`Runner`] owns the mesh collection and the [`Relaxer`]. It builds a kite
//! mesh from the border corners given on the command line, optionally
//! shakes it off its rest state, and runs the convergence loop.

use std::io::{self, Write};

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use relax_core::{
    border::Border,
    config::{DisplacementPolicy, RelaxConfig, StepMode},
    engine::{Convergence, Relaxer},
    mesh::{MeshKind, QuadMesh},
};
use tracing::info;

/// Relax a kite mesh towards a locally conformal layout.
#[derive(Parser, Debug)]
#[command(name = "kite-relax", version, about, long_about = None)]
pub struct Args {
    /// Number of grid columns
    #[arg(long, default_value_t = 9)]
    pub width: usize,

    /// Number of grid rows
    #[arg(long, default_value_t = 9)]
    pub height: usize,

    /// Border corners as x/y pairs: left-start, left-end, right-start, right-end
    #[arg(
        long,
        num_args = 8,
        allow_negative_numbers = true,
        value_names = ["LSX", "LSY", "LEX", "LEY", "RSX", "RSY", "REX", "REY"],
        default_values_t = [0.0, 0.0, 2.0, 10.0, 10.0, -1.0, 12.0, 9.0]
    )]
    pub border: Vec<f32>,

    /// Relaxation step to iterate
    #[arg(short, long, value_enum, default_value_t = Mode::Full)]
    pub mode: Mode,

    /// Maximum number of steps
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: usize,

    /// Stop once a step moves the mesh by at most this much in total
    #[arg(long, default_value_t = 1e-4, allow_negative_numbers = true)]
    pub tolerance: f32,

    /// Simple steps before switching to full steps in simple-then-full mode
    #[arg(long, default_value_t = 10)]
    pub warmup: usize,

    /// Maximum random offset applied to movable vertices before relaxing
    #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
    pub jitter: f32,

    /// Seed for the jitter (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep every outline vertex fixed, not just the corners
    #[arg(long)]
    pub fix_outline: bool,

    /// Report displacement the way the original drawing tool did
    #[arg(long)]
    pub legacy_displacement: bool,

    /// Use single-threaded execution
    #[arg(long)]
    pub sequential: bool,

    /// Print the final vertex positions as `col row x y` lines
    #[arg(long)]
    pub print_grid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Simple,
    Full,
    SimpleThenFull,
}

impl From<Mode> for StepMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => StepMode::Simple,
            Mode::Full => StepMode::Full,
            Mode::SimpleThenFull => StepMode::SimpleThenFull,
        }
    }
}

impl Args {
    fn border(&self) -> Result<Border> {
        ensure!(
            self.border.len() == 8,
            "--border takes 8 values, got {}",
            self.border.len()
        );
        let p = |i: usize| Vec2::new(self.border[2 * i], self.border[2 * i + 1]);
        Ok(Border::new(p(0), p(1), p(2), p(3)))
    }

    fn config(&self) -> RelaxConfig {
        let displacement = if self.legacy_displacement {
            DisplacementPolicy::Legacy
        } else {
            DisplacementPolicy::PerCall
        };
        RelaxConfig::default()
            .with_displacement(displacement)
            .with_parallel(!self.sequential)
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_warmup_iterations(self.warmup)
    }
}

/// One relaxation session.
///
/// ### Fields
/// - `meshes` - Mesh collection handed to the engine (a single kite mesh).
/// - `relaxer` - The engine and its displacement bookkeeping.
/// - `mode` - Which step the convergence loop runs.
pub struct Runner {
    meshes: Vec<QuadMesh>,
    relaxer: Relaxer,
    mode: StepMode,
}

impl Runner {
    /// Builds the mesh and engine described by `args`.
    ///
    /// The mesh corners are always fixed so the outline keeps its shape;
    /// `--fix-outline` pins the remaining border vertices as well.
    pub fn new(args: &Args) -> Result<Self> {
        let relaxer = Relaxer::new(args.config()).context("invalid relaxation settings")?;
        ensure!(
            args.jitter.is_finite(),
            "--jitter must be a finite number, got {}",
            args.jitter
        );

        let mut mesh = QuadMesh::from_border(MeshKind::Kite, args.border()?, args.width, args.height)
            .context("cannot build kite mesh")?;
        mesh.fix_corners();
        if args.fix_outline {
            mesh.fix_outline();
        }

        let seed = args.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        mesh.jitter(args.jitter, &mut rng);

        info!(
            width = args.width,
            height = args.height,
            mode = ?args.mode,
            jitter = args.jitter,
            seed,
            "kite mesh ready"
        );

        Ok(Self {
            meshes: vec![mesh],
            relaxer,
            mode: args.mode.into(),
        })
    }

    /// Runs the convergence loop.
    pub fn run(&mut self) -> Convergence {
        self.relaxer.run(&mut self.meshes, self.mode)
    }

    pub fn mesh(&self) -> &QuadMesh {
        &self.meshes[0]
    }

    pub fn last_displacement(&self) -> f32 {
        self.relaxer.last_displacement()
    }

    /// Writes one `col row x y` line per vertex, in grid storage order.
    pub fn write_grid(&self, out: &mut impl Write) -> io::Result<()> {
        for ((col, row), pos) in self.mesh().positions() {
            writeln!(out, "{col} {row} {} {}", pos.x, pos.y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["kite-relax"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_parse() {
        let a = args(&[]);
        assert_eq!(a.width, 9);
        assert_eq!(a.height, 9);
        assert_eq!(a.border.len(), 8);
        assert_eq!(a.mode, Mode::Full);
        assert!(a.seed.is_none());
    }

    #[test]
    fn border_accepts_negative_coordinates() {
        let a = args(&["--border", "-1", "-1", "-1", "1", "1", "-1", "1", "1"]);
        let b = a.border().unwrap();
        assert_eq!(b.left_start, Vec2::new(-1.0, -1.0));
        assert_eq!(b.left_end, Vec2::new(-1.0, 1.0));
        assert_eq!(b.right_start, Vec2::new(1.0, -1.0));
        assert_eq!(b.right_end, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn border_requires_eight_values() {
        let argv = ["kite-relax", "--border", "0", "0", "1"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn flags_map_onto_config() {
        let a = args(&[
            "--legacy-displacement",
            "--sequential",
            "--tolerance",
            "0.01",
            "--mode",
            "simple-then-full",
        ]);
        let cfg = a.config();
        assert_eq!(cfg.displacement, DisplacementPolicy::Legacy);
        assert!(!cfg.parallel);
        assert_eq!(cfg.tolerance, 0.01);
        assert_eq!(StepMode::from(a.mode), StepMode::SimpleThenFull);
    }

    #[test]
    fn new_builds_a_kite_mesh_with_fixed_corners() {
        let runner = Runner::new(&args(&["--width", "4", "--height", "3", "--seed", "1"])).unwrap();
        let mesh = runner.mesh();
        assert_eq!(mesh.kind, MeshKind::Kite);
        assert_eq!((mesh.width(), mesh.height()), (4, 3));
        for cell in [(0, 0), (3, 0), (0, 2), (3, 2)] {
            assert!(!mesh.vertex(cell).unwrap().should_move, "{cell:?}");
        }
        assert!(mesh.vertex((1, 1)).unwrap().should_move);
    }

    #[test]
    fn new_rejects_empty_grid_and_bad_tolerance() {
        let err = Runner::new(&args(&["--width", "0"])).err().unwrap();
        assert!(err.to_string().contains("kite mesh"), "{err:#}");

        let a = args(&["--tolerance", "-0.5"]);
        assert_eq!(a.tolerance, -0.5);
        let err = Runner::new(&a).err().unwrap();
        assert!(err.to_string().contains("relaxation settings"), "{err:#}");
    }

    #[test]
    fn jitter_must_be_finite() {
        assert!(Runner::new(&args(&["--jitter", "inf"])).is_err());
        assert!(Runner::new(&args(&["--jitter", "NaN"])).is_err());
    }

    #[test]
    fn negative_jitter_is_accepted_as_no_jitter() {
        let a = args(&["--jitter", "-1", "--width", "3", "--height", "2"]);
        assert_eq!(a.jitter, -1.0);
        let runner = Runner::new(&a).unwrap();
        let mut out = Vec::new();
        runner.write_grid(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next(), Some("0 0 0 0"));
    }

    #[test]
    fn same_seed_gives_same_start() {
        let a = Runner::new(&args(&["--seed", "9"])).unwrap();
        let b = Runner::new(&args(&["--seed", "9"])).unwrap();
        assert_eq!(a.mesh().grid(), b.mesh().grid());
    }

    #[test]
    fn simple_mode_settles_small_mesh() {
        let mut runner = Runner::new(&args(&[
            "--width",
            "4",
            "--height",
            "4",
            "--mode",
            "simple",
            "--tolerance",
            "0.001",
            "--max-iterations",
            "5000",
            "--seed",
            "3",
            "--sequential",
        ]))
        .unwrap();

        let outcome = runner.run();
        assert!(outcome.converged, "{outcome:?}");
        assert_eq!(runner.last_displacement(), outcome.final_displacement);
    }

    #[test]
    fn write_grid_prints_one_line_per_vertex() {
        let runner = Runner::new(&args(&["--width", "3", "--height", "2", "--jitter", "0"])).unwrap();
        let mut out = Vec::new();
        runner.write_grid(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "0 0 0 0");
        assert!(lines.iter().all(|l| l.split_whitespace().count() == 4));
    }
}
