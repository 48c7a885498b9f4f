//! PBiCGStab (Preconditioned Bi-Conjugate Gradient Stabilized) solver
//!
//! Krylov method for asymmetric systems such as convection-dominated
//! transport equations. Right-preconditioned, started from a caller-supplied
//! guess.

use super::{ConvergenceCheck, KrylovConfig, KrylovSolution};
use crate::traits::{LinearOperator, Preconditioner, RealField};
use crate::vector_ops::{axpy, inner_product, norm_factor, sum_mag};
use ndarray::Array1;

/// Solve Ax = b using the preconditioned BiCGStab method
pub fn pbicgstab<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    x0: Array1<T>,
    config: &KrylovConfig<T>,
) -> KrylovSolution<T>
where
    T: RealField,
    A: LinearOperator<T> + ?Sized,
    P: Preconditioner<T> + ?Sized,
{
    let n = b.len();
    let mut x = x0;

    let ax = operator.apply(&x);
    let mut r = b - &ax;
    let norm = norm_factor(operator, &x, &ax, b);
    let check = ConvergenceCheck::new(config, sum_mag(&r) / norm);
    let mut residual = check.initial;

    let mut iterations = 0;
    let mut singular = false;

    if config.min_iterations > 0 || !check.reached(residual) {
        // Shadow residual
        let r0 = r.clone();

        let mut rho = T::zero();
        let mut alpha = T::zero();
        let mut omega = T::zero();

        let mut p = Array1::from_elem(n, T::zero());
        let mut v = Array1::from_elem(n, T::zero());

        loop {
            let rho_old = rho;
            rho = inner_product(&r0, &r);

            // Check for breakdown
            if rho.abs() / norm < T::VSMALL {
                singular = true;
                break;
            }

            if iterations == 0 {
                p = r.clone();
            } else {
                if omega.abs() < T::VSMALL {
                    singular = true;
                    break;
                }
                let beta = (rho / rho_old) * (alpha / omega);
                // p = r + beta * (p - omega * v)
                p = &r + &(&p - &v.mapv(|vi| vi * omega)).mapv(|pi| pi * beta);
            }

            // v = A * M^-1 p
            let y = precond.apply(&p);
            v = operator.apply(&y);

            let r0v = inner_product(&r0, &v);
            if r0v.abs() / norm < T::VSMALL {
                singular = true;
                break;
            }
            alpha = rho / r0v;

            // s = r - alpha * v
            let s = &r - &v.mapv(|vi| vi * alpha);
            residual = sum_mag(&s) / norm;

            // Check for early convergence
            if check.converged_at(residual, iterations + 1) {
                axpy(alpha, &y, &mut x);
                iterations += 1;
                break;
            }

            // t = A * M^-1 s
            let z = precond.apply(&s);
            let t = operator.apply(&z);

            let tt = inner_product(&t, &t);
            if tt.abs() < T::VSMALL {
                axpy(alpha, &y, &mut x);
                iterations += 1;
                singular = true;
                break;
            }
            omega = inner_product(&t, &s) / tt;

            // x = x + alpha * y + omega * z
            axpy(alpha, &y, &mut x);
            axpy(omega, &z, &mut x);

            // r = s - omega * t
            r = &s - &t.mapv(|ti| ti * omega);

            residual = sum_mag(&r) / norm;
            iterations += 1;

            if config.print_interval > 0 && iterations % config.print_interval == 0 {
                log::debug!(
                    "PBiCGStab iteration {}: residual = {:.6e}",
                    iterations,
                    residual.to_f64_lossy()
                );
            }

            if check.finished(residual, iterations) {
                break;
            }
        }
    }

    KrylovSolution {
        x,
        iterations,
        initial_residual: check.initial,
        residual,
        converged: check.reached(residual),
        singular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioners::DiagonalPreconditioner;
    use crate::sparse::CsrMatrix;
    use crate::traits::IdentityPreconditioner;
    use ndarray::array;

    #[test]
    fn test_pbicgstab_asymmetric() {
        let dense = array![[4.0_f64, -2.0, 0.0], [-0.5, 4.0, -2.0], [0.0, -0.5, 4.0]];

        let a = CsrMatrix::from_dense(&dense, 1e-15);
        let b = array![1.0_f64, 2.0, 3.0];

        let config = KrylovConfig {
            max_iterations: 100,
            tolerance: 1e-12,
            ..Default::default()
        };

        for solution in [
            pbicgstab(&a, &IdentityPreconditioner, &b, Array1::zeros(3), &config),
            pbicgstab(
                &a,
                &DiagonalPreconditioner::from_csr(&a),
                &b,
                Array1::zeros(3),
                &config,
            ),
        ] {
            assert!(solution.converged, "PBiCGStab should converge");
            let ax = a.matvec(&solution.x);
            let error: f64 = (&ax - &b).iter().map(|e| e * e).sum::<f64>().sqrt();
            assert!(error < 1e-8, "Solution should satisfy Ax = b");
        }
    }

    #[test]
    fn test_pbicgstab_rel_tol() {
        let dense = array![[3.0_f64, -1.0], [-2.0, 3.0]];
        let a = CsrMatrix::from_dense(&dense, 1e-15);
        let b = array![1.0_f64, 1.0];

        let config = KrylovConfig {
            max_iterations: 100,
            tolerance: 0.0,
            rel_tol: 0.5,
            ..Default::default()
        };
        let solution = pbicgstab(&a, &IdentityPreconditioner, &b, Array1::zeros(2), &config);

        assert!(solution.converged);
        assert!(solution.residual < 0.5 * solution.initial_residual);
    }
}
