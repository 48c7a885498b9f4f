//! PCG (Preconditioned Conjugate Gradient) solver
//!
//! The Conjugate Gradient method for symmetric positive definite systems,
//! started from a caller-supplied guess and measured in the normalised
//! L1 residual of [`crate::vector_ops::norm_factor`].

use super::{ConvergenceCheck, KrylovConfig, KrylovSolution};
use crate::traits::{LinearOperator, Preconditioner, RealField};
use crate::vector_ops::{axpy, inner_product, norm_factor, sum_mag};
use ndarray::Array1;

/// Solve Ax = b using the preconditioned Conjugate Gradient method
///
/// Note: This method is only correct for symmetric positive definite matrices.
/// For asymmetric systems, use [`super::pbicgstab`] instead.
pub fn pcg<T, A, P>(
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
    let mut x = x0;

    let ax = operator.apply(&x);
    let mut r = b - &ax;
    let norm = norm_factor(operator, &x, &ax, b);
    let check = ConvergenceCheck::new(config, sum_mag(&r) / norm);
    let mut residual = check.initial;

    let mut iterations = 0;
    let mut singular = false;

    if config.min_iterations > 0 || !check.reached(residual) {
        let mut p = Array1::from_elem(b.len(), T::zero());
        let mut wr_old = T::zero();

        loop {
            // w = M^-1 r
            let w = precond.apply(&r);
            let wr = inner_product(&w, &r);

            if iterations == 0 {
                p = w;
            } else {
                let beta = wr / wr_old;
                p = &w + &p.mapv(|pi| pi * beta);
            }
            wr_old = wr;

            // q = A * p
            let q = operator.apply(&p);
            let pq = inner_product(&p, &q);
            if pq.abs() / norm < T::VSMALL {
                singular = true;
                break;
            }

            let alpha = wr / pq;
            axpy(alpha, &p, &mut x);
            axpy(-alpha, &q, &mut r);

            residual = sum_mag(&r) / norm;
            iterations += 1;

            if config.print_interval > 0 && iterations % config.print_interval == 0 {
                log::debug!(
                    "PCG iteration {}: residual = {:.6e}",
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
