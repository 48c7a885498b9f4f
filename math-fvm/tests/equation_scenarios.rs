//! End-to-end assembly and solution of small transport problems

use approx::assert_relative_eq;
use fvm::fvm::{ddt, div, laplacian, sp, su, susp};
use fvm::{
    BoundaryFace, DdtScheme, FvMatrix, FvSolution, FvmError, InterpolationScheme, InternalFace,
    MeshRef, PatchField, PolyMesh, SurfaceField, TimeState, VolField, box_mesh, fvc, line_mesh,
};
use solvers::{SolverControls, SolverRegistry};
use std::sync::Arc;
use vector_space::{Dimensioned, Vector, Zero, ZeroField, si};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pcg() -> SolverControls {
    SolverControls::new("PCG").with_tolerance(1e-12, 0.0)
}

fn conductivity() -> Dimensioned<f64> {
    Dimensioned::new("k", si::DIFFUSIVITY, 1.0)
}

fn solve<T: vector_space::FieldType>(eqn: &mut FvMatrix<T>, psi: &mut VolField<T>) {
    let perf = eqn
        .solve_with_controls(psi, &pcg(), &SolverRegistry::new())
        .unwrap();
    assert!(perf.converged, "{perf}");
}

fn end_values(mesh: MeshRef, left: f64, right: f64) -> VolField<f64> {
    VolField::uniform("T", mesh, si::TEMPERATURE, 0.0)
        .with_patch("left", PatchField::fixed_value(vec![left]))
        .unwrap()
        .with_patch("right", PatchField::fixed_value(vec![right]))
        .unwrap()
}

/// Three unit cells whose boundary faces sit one cell spacing away
fn three_cell_chain() -> MeshRef {
    let centres = (0..3).map(|i| Vector::new(i as f64 + 0.5, 0.0, 0.0)).collect();
    let faces = (0..2)
        .map(|i| InternalFace {
            owner: i,
            neighbour: i + 1,
            area: Vector::new(1.0, 0.0, 0.0),
            centre: Vector::new(i as f64 + 1.0, 0.0, 0.0),
        })
        .collect();
    let boundary = vec![
        (
            "left".to_string(),
            vec![BoundaryFace {
                cell: 0,
                area: Vector::new(-1.0, 0.0, 0.0),
                centre: Vector::new(-0.5, 0.0, 0.0),
            }],
        ),
        (
            "right".to_string(),
            vec![BoundaryFace {
                cell: 2,
                area: Vector::new(1.0, 0.0, 0.0),
                centre: Vector::new(3.5, 0.0, 0.0),
            }],
        ),
    ];
    Arc::new(PolyMesh::new(centres, vec![1.0; 3], faces, boundary).unwrap())
}

#[test]
fn steady_conduction_gives_linear_profile() {
    init_logging();
    let mut t = end_values(three_cell_chain(), 0.0, 10.0);
    let mut eqn = laplacian(conductivity(), &t).unwrap();
    solve(&mut eqn, &mut t);
    for (value, expected) in t.internal().iter().zip([2.5, 5.0, 7.5]) {
        assert_relative_eq!(*value, expected, epsilon = 1e-9);
    }

    // Boundary faces on the bar ends instead
    let mut t = end_values(Arc::new(line_mesh(3, 3.0).unwrap()), 0.0, 10.0);
    let mut eqn = laplacian(conductivity(), &t).unwrap();
    solve(&mut eqn, &mut t);
    for (value, expected) in t.internal().iter().zip([10.0 / 6.0, 5.0, 50.0 / 6.0]) {
        assert_relative_eq!(*value, expected, epsilon = 1e-9);
    }
}

#[test]
fn diffusivity_forms_give_the_same_solution() {
    let mesh: MeshRef = Arc::new(box_mesh([4, 3, 1], [1.0, 1.0, 1.0]).unwrap());
    let base = VolField::uniform("T", mesh.clone(), si::TEMPERATURE, 0.0)
        .with_patch("xMin", PatchField::fixed_value(vec![1.0; 3]))
        .unwrap()
        .with_patch("yMax", PatchField::fixed_value(vec![3.0; 4]))
        .unwrap();
    let cell = VolField::uniform("k", mesh.clone(), si::DIFFUSIVITY, 1.0);
    let face = SurfaceField::uniform("k", mesh, si::DIFFUSIVITY, 1.0);

    let mut solutions = Vec::new();
    for form in 0..3 {
        let mut t = base.clone();
        let mut eqn = match form {
            0 => laplacian(conductivity(), &t),
            1 => laplacian(&cell, &t),
            _ => laplacian(&face, &t),
        }
        .unwrap();
        solve(&mut eqn, &mut t);
        solutions.push(t.internal().to_vec());
    }
    for other in &solutions[1..] {
        for (a, b) in solutions[0].iter().zip(other) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }
}

#[test]
fn uniform_field_is_in_the_null_space() {
    let mesh: MeshRef = Arc::new(box_mesh([3, 3, 2], [1.0, 2.0, 1.0]).unwrap());
    let u = VolField::uniform("U", mesh.clone(), si::VELOCITY, Vector::new(0.4, 0.1, -0.3));
    let phi = fvc::flux(&u);
    let t = VolField::uniform("T", mesh, si::DIMLESS, 5.0);
    let nu = Dimensioned::new("nu", si::DIFFUSIVITY, 0.01);

    let eqn = div(&phi, &t, InterpolationScheme::Upwind).unwrap() - laplacian(nu, &t).unwrap();
    for r in eqn.residual(&t).unwrap() {
        assert_relative_eq!(r, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn transient_conduction_approaches_steady_state() {
    init_logging();
    let mesh: MeshRef = Arc::new(line_mesh(10, 1.0).unwrap());
    let mut t = end_values(mesh.clone(), 0.0, 1.0);
    let mut time = TimeState::new(0.0, 0.01);

    assert!(matches!(
        ddt(&t, &time, DdtScheme::Euler),
        Err(FvmError::MissingOldTime(_))
    ));

    for _ in 0..400 {
        t.store_old_time();
        let mut eqn = ddt(&t, &time, DdtScheme::Backward).unwrap()
            - laplacian(conductivity(), &t).unwrap();
        solve(&mut eqn, &mut t);
        time.advance();
    }

    assert_eq!(time.time_index, 400);
    for (value, centre) in t.internal().iter().zip(mesh.cell_centres()) {
        assert_relative_eq!(*value, centre.x(), epsilon = 1e-6);
    }
}

#[test]
fn relaxation_leaves_a_converged_solution_unchanged() {
    let mesh: MeshRef = Arc::new(box_mesh([4, 4, 1], [1.0, 1.0, 1.0]).unwrap());
    let mut t = VolField::uniform("T", mesh.clone(), si::TEMPERATURE, 1.0)
        .with_patch("xMax", PatchField::fixed_value(vec![2.0; 4]))
        .unwrap();
    t.store_old_time();
    let time = TimeState::new(0.0, 0.05);
    let heat = VolField::uniform("q", mesh, si::TEMPERATURE / si::TIME, 3.0);

    let assemble = |t: &VolField<f64>| {
        ddt(t, &time, DdtScheme::Euler).unwrap() - laplacian(conductivity(), t).unwrap() - &heat
    };

    let mut eqn = assemble(&t);
    solve(&mut eqn, &mut t);
    let converged = t.internal().to_vec();

    let mut relaxed = assemble(&t);
    relaxed.relax(&t, 0.3).unwrap();
    for r in relaxed.residual(&t).unwrap() {
        assert!(r.abs() < 1e-9);
    }
    solve(&mut relaxed, &mut t);
    for (a, b) in t.internal().iter().zip(&converged) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn zero_tags_vanish_from_equations() {
    let mesh: MeshRef = Arc::new(line_mesh(4, 1.0).unwrap());
    let t = end_values(mesh, 1.0, 2.0);

    let plain = laplacian(conductivity(), &t).unwrap();
    let tagged = laplacian(conductivity(), &t).unwrap() + su(Zero, &t) - sp(ZeroField, &t)
        + susp(Zero, &t);
    assert_eq!(plain.diag(), tagged.diag());
    assert_eq!(plain.source(), tagged.source());
    assert_eq!(plain.boundary_coeffs(), tagged.boundary_coeffs());
}

#[test]
fn susp_matches_sp_once_converged() {
    let mesh: MeshRef = Arc::new(line_mesh(8, 1.0).unwrap());

    // Positive coefficient: both forms are identical
    let t = end_values(mesh.clone(), 0.0, 1.0);
    let decay = Dimensioned::new("c", si::INV_TIME, 2.0);
    let a = sp(&decay, &t).unwrap();
    let b = susp(&decay, &t).unwrap();
    assert_eq!(a.diag(), b.diag());
    assert_eq!(a.source(), b.source());

    // Negative coefficient: lagged in the source, converges by outer iteration
    let growth = Dimensioned::new("c", si::INV_TIME, -0.5);
    let mut implicit = end_values(mesh.clone(), 0.0, 1.0);
    let mut eqn = -laplacian(conductivity(), &implicit).unwrap() + sp(&growth, &implicit).unwrap();
    solve(&mut eqn, &mut implicit);

    let mut lagged = end_values(mesh, 0.0, 1.0);
    for _ in 0..30 {
        let mut eqn =
            -laplacian(conductivity(), &lagged).unwrap() + susp(&growth, &lagged).unwrap();
        assert!(eqn.diag().iter().all(|&d| d > 0.0));
        solve(&mut eqn, &mut lagged);
    }
    for (a, b) in lagged.internal().iter().zip(implicit.internal()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn combination_is_associative() {
    let mesh: MeshRef = Arc::new(box_mesh([3, 2, 1], [1.0, 1.0, 1.0]).unwrap());
    let mut t = VolField::uniform("T", mesh.clone(), si::DIMLESS, 1.0)
        .with_patch("xMin", PatchField::fixed_value(vec![0.5; 2]))
        .unwrap();
    t.store_old_time();
    let time = TimeState::new(0.0, 0.1);
    let u = VolField::uniform("U", mesh, si::VELOCITY, Vector::new(1.0, 0.2, 0.0));
    let phi = fvc::flux(&u);
    let nu = Dimensioned::new("nu", si::DIFFUSIVITY, 0.1);

    let a = ddt(&t, &time, DdtScheme::Euler).unwrap();
    let b = div(&phi, &t, InterpolationScheme::Linear).unwrap();
    let c = laplacian(nu, &t).unwrap();

    let left = (a.clone() + b.clone()) - c.clone();
    let right = a + (b - c);
    for (x, y) in [
        (left.diag(), right.diag()),
        (left.upper(), right.upper()),
        (left.lower(), right.lower()),
        (left.source(), right.source()),
    ] {
        for (p, q) in x.iter().zip(y) {
            assert_relative_eq!(*p, *q, epsilon = 1e-12);
        }
    }
}

#[test]
fn mismatched_dimensions_are_rejected() {
    let mesh: MeshRef = Arc::new(line_mesh(3, 1.0).unwrap());
    let mut t = end_values(mesh, 0.0, 1.0);
    t.store_old_time();
    let time = TimeState::new(0.0, 1.0);

    let mut eqn = ddt(&t, &time, DdtScheme::Euler).unwrap();
    // Diffusivity given as a plain number: dimensions differ from ddt
    let wrong = laplacian(Dimensioned::new("k", si::DIMLESS, 1.0), &t).unwrap();
    assert!(matches!(eqn.try_sub(&wrong), Err(FvmError::Dimensions(_))));
}

#[test]
fn pressure_equation_with_reference_is_conservative() {
    init_logging();
    let mesh: MeshRef = Arc::new(box_mesh([4, 3, 1], [1.0, 1.0, 1.0]).unwrap());
    let mut p = VolField::uniform("p", mesh.clone(), si::PRESSURE, 0.0);
    assert!(p.needs_reference());

    // Zero-mean divergence so the Neumann problem is compatible
    let n = mesh.n_cells();
    let values = (0..n).map(|c| if c < n / 2 { 1.0 } else { -1.0 }).collect();
    let div_u = VolField::new(
        "divU",
        mesh.clone(),
        si::INV_TIME,
        values,
        mesh.patches().iter().map(|patch| PatchField::zero_gradient(patch.size())).collect(),
    )
    .unwrap();
    let r_au = Dimensioned::new("rAU", si::TIME / si::DENSITY, 1.0);

    let mut eqn = laplacian(r_au, &p).unwrap() - &div_u;
    eqn.set_reference(&p, 0, 2.0).unwrap();
    assert!(matches!(
        eqn.set_reference(&p, 1, 2.0),
        Err(FvmError::ReferenceAlreadySet { cell: 0, .. })
    ));

    solve(&mut eqn, &mut p);
    assert_relative_eq!(p.internal()[0], 2.0, epsilon = 1e-8);

    let continuity = fvc::surface_integrate(&eqn.flux(&p).unwrap());
    assert_eq!(continuity.dimensions(), si::INV_TIME);
    for (a, b) in continuity.internal().iter().zip(div_u.internal()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8);
    }
}

#[test]
fn vector_equation_is_solved_per_component() {
    let mesh: MeshRef = Arc::new(line_mesh(4, 1.0).unwrap());
    let mut u = VolField::uniform("U", mesh.clone(), si::VELOCITY, Vector::ZERO)
        .with_patch("left", PatchField::fixed_value(vec![Vector::ZERO]))
        .unwrap()
        .with_patch("right", PatchField::fixed_value(vec![Vector::new(1.0, 2.0, 0.0)]))
        .unwrap();
    let nu = Dimensioned::new("nu", si::DIFFUSIVITY, 0.1);

    let mut eqn = laplacian(nu, &u).unwrap();
    let perf = eqn
        .solve_with_controls(&mut u, &pcg(), &SolverRegistry::new())
        .unwrap();
    assert_eq!(perf.field, "U");
    assert!(perf.converged);

    for (value, centre) in u.internal().iter().zip(mesh.cell_centres()) {
        assert_relative_eq!(value.x(), centre.x(), epsilon = 1e-9);
        assert_relative_eq!(value.y(), 2.0 * centre.x(), epsilon = 1e-9);
        assert_relative_eq!(value.z(), 0.0);
    }
}

#[test]
fn solution_controls_drive_the_solve() {
    let solution = FvSolution::from_json_str(
        r#"{
            "solvers": {
                "T": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-12, "relTol": 0.1 },
                "TFinal": { "solver": "PBiCGStab", "preconditioner": "DILU", "tolerance": 1e-12 }
            }
        }"#,
    )
    .unwrap();
    let mesh: MeshRef = Arc::new(line_mesh(5, 1.0).unwrap());
    let mut t = end_values(mesh.clone(), 0.0, 1.0);

    let mut eqn = laplacian(conductivity(), &t).unwrap();
    let first = eqn.solve(&mut t, &solution).unwrap();
    assert_eq!(first.solver, "PCG");
    assert!(matches!(
        eqn.solve(&mut t, &solution),
        Err(FvmError::InvalidTransition { .. })
    ));

    eqn.reset_state();
    let last = eqn.solve_final(&mut t, &solution).unwrap();
    assert_eq!(last.solver, "PBiCGStab");
    for (value, centre) in t.internal().iter().zip(mesh.cell_centres()) {
        assert_relative_eq!(*value, centre.x(), epsilon = 1e-9);
    }
}
