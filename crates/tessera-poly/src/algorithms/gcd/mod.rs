//! Multivariate GCD.
//!
//! `gcd` removes the monomial and coefficient contents, moves both
//! operands into a lexicographic context and hands them to the ring's
//! strategy list. A strategy either returns the primitive gcd or fails;
//! failures fall through to the next entry, and the dense strategy closes
//! every list.
//!
//! | Ring          | Strategies                                  |
//! |---------------|---------------------------------------------|
//! | `FiniteField` | dense, Brown, Zippel                        |
//! | `Z`           | dense, multi-prime with Brown/Zippel images |
//! | `Zn`          | dense, verified by trial division           |

mod brown;
mod dense;
mod linsolve;
mod modular;
mod zippel;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tessera_rings::{Field, FiniteField, Ring, Zn, Z};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{GcdConfig, GcdStrategy};
use crate::context::Context;
use crate::error::{PolyError, Result};
use crate::monomial::Exponents;
use crate::ordering::MonomialOrder;
use crate::sparse::SparsePoly;

/// Why one strategy gave up.
#[derive(Debug, Error)]
pub(crate) enum GcdFailure {
    /// Too many unlucky evaluation points or primes.
    #[error("too many unlucky reductions")]
    BadReduction,
    /// The strategy does not apply to these inputs.
    #[error("{0}")]
    Infeasible(String),
    /// An error no other strategy can recover from.
    #[error(transparent)]
    Fatal(#[from] PolyError),
}

pub(crate) type GcdResult<T> = std::result::Result<T, GcdFailure>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Strategy {
    Dense,
    Brown,
    Zippel,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for tessera_rings::FiniteField {}
    impl Sealed for tessera_rings::Z {}
    impl Sealed for tessera_rings::Zn {}
}

/// Coefficient rings with a multivariate GCD.
///
/// Implemented for [`Z`], [`FiniteField`] and [`Zn`]. The trait is sealed.
pub trait GcdRing: Ring + sealed::Sealed {
    /// GCD of two primitive polynomials in a lexicographic context, neither
    /// of them constant.
    #[doc(hidden)]
    fn gcd_lex(a: &SparsePoly<Self>, b: &SparsePoly<Self>) -> Result<SparsePoly<Self>>;
}

impl GcdRing for FiniteField {
    fn gcd_lex(a: &SparsePoly<Self>, b: &SparsePoly<Self>) -> Result<SparsePoly<Self>> {
        let config = &a.context().config().gcd;
        run_plan(&plan(a, b, config), |strategy| {
            let g = match strategy {
                Strategy::Dense => dense::gcd(a, b)?,
                Strategy::Brown => brown::gcd(a, b, config.seed)?,
                Strategy::Zippel => zippel::gcd(a, b, config.seed)?,
            };
            Ok(g.make_monic()?)
        })
    }
}

impl GcdRing for Z {
    fn gcd_lex(a: &SparsePoly<Self>, b: &SparsePoly<Self>) -> Result<SparsePoly<Self>> {
        let config = &a.context().config().gcd;
        run_plan(&plan(a, b, config), |strategy| {
            let g = match strategy {
                Strategy::Dense => dense::gcd(a, b)?,
                Strategy::Brown => modular::gcd(a, b, brown::gcd)?,
                Strategy::Zippel => modular::gcd(a, b, zippel::gcd)?,
            };
            Ok(g.primitive_part()?.unit_normalize())
        })
    }
}

impl GcdRing for Zn {
    fn gcd_lex(a: &SparsePoly<Self>, b: &SparsePoly<Self>) -> Result<SparsePoly<Self>> {
        // Evaluation needs a field; only the verified dense path applies.
        run_plan(&[Strategy::Dense], |_| dense::gcd(a, b))
    }
}

/// Strategies to try, in order.
pub(crate) fn plan<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>, config: &GcdConfig) -> Vec<Strategy> {
    match config.strategy {
        GcdStrategy::Dense => return vec![Strategy::Dense],
        GcdStrategy::Brown => return vec![Strategy::Brown, Strategy::Dense],
        GcdStrategy::Zippel => return vec![Strategy::Zippel, Strategy::Brown, Strategy::Dense],
        GcdStrategy::Auto => {}
    }

    let da = a.degrees().unwrap_or_default();
    let db = b.degrees().unwrap_or_default();
    let mut dense_size = 1usize;
    let mut active = 0usize;
    for (x, y) in da.iter().zip(&db) {
        let d = (*x).max(*y);
        if d > 0 {
            active += 1;
        }
        dense_size = dense_size.saturating_mul(usize::try_from(d).unwrap_or(usize::MAX).saturating_add(1));
    }
    let terms = a.term_count().max(b.term_count());
    let dense_ok = dense_size <= config.dense_ratio.saturating_mul(terms) && dense_size <= config.dense_limit;
    let sparse = active >= 3 && dense_size > terms.saturating_mul(64);
    debug!(dense_size, terms, active, dense_ok, sparse, "gcd plan");

    if dense_ok {
        vec![Strategy::Dense]
    } else if sparse {
        vec![Strategy::Zippel, Strategy::Brown, Strategy::Dense]
    } else {
        vec![Strategy::Brown, Strategy::Dense]
    }
}

fn run_plan<R: Ring>(
    plan: &[Strategy],
    mut attempt: impl FnMut(Strategy) -> GcdResult<SparsePoly<R>>,
) -> Result<SparsePoly<R>> {
    let mut last = String::from("no strategy applies");
    for &strategy in plan {
        match attempt(strategy) {
            Ok(g) => {
                debug!(?strategy, terms = g.term_count(), "gcd strategy succeeded");
                return Ok(g);
            }
            Err(GcdFailure::Fatal(err)) => return Err(err),
            Err(failure) => {
                warn!(?strategy, %failure, "gcd strategy failed, falling back");
                last = format!("{strategy:?}: {failure}");
            }
        }
    }
    Err(PolyError::Infeasible(last))
}

/// Variables that occur in `a` or `b`.
pub(crate) fn active_vars<R: Ring>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Vec<usize> {
    let da = a.degrees().unwrap_or_default();
    let db = b.degrees().unwrap_or_default();
    (0..a.nvars())
        .filter(|&v| da.get(v).is_some_and(|&d| d > 0) || db.get(v).is_some_and(|&d| d > 0))
        .collect()
}

/// Maps `f` over `items`, across the context's pool when it is parallel.
pub(crate) fn map_batch<R, T, U, F>(ctx: &Context<R>, items: Vec<T>, f: F) -> Vec<U>
where
    R: Ring,
    T: Send,
    U: Send,
    F: Fn(T) -> U + Send + Sync,
{
    if ctx.config().is_parallel() && items.len() > 1 {
        ctx.install(|| items.into_par_iter().map(f).collect())
    } else {
        items.into_iter().map(f).collect()
    }
}

/// Draws up to `count` fresh field elements satisfying `accept`, each paired
/// with a seed for the work done at that point.
///
/// Rejected elements are remembered in `used` too. Returns fewer points
/// when the field runs out.
pub(crate) fn draw_points(
    field: &FiniteField,
    rng: &mut ChaCha8Rng,
    used: &mut FxHashSet<u64>,
    count: usize,
    accept: impl Fn(u64) -> bool,
) -> Vec<(u64, u64)> {
    let order = field.order();
    let budget = count.saturating_mul(64).max(256);
    let mut points = Vec::with_capacity(count);
    let mut attempts = 0usize;
    while points.len() < count && attempts < budget && u64::try_from(used.len()).unwrap_or(u64::MAX) < order {
        attempts += 1;
        let alpha = field.element(rng.gen_range(0..order));
        if used.insert(alpha) && accept(alpha) {
            points.push((alpha, rng.gen()));
        }
    }
    points
}

/// GCD with the content and monomial content of both operands restored.
pub(crate) fn gcd<R: GcdRing>(a: &SparsePoly<R>, b: &SparsePoly<R>) -> Result<SparsePoly<R>> {
    a.check_compatible(b)?;
    if a.is_zero() {
        return Ok(b.unit_normalize());
    }
    if b.is_zero() {
        return Ok(a.unit_normalize());
    }

    let ctx = a.context();
    let ring = a.ring();
    let c = ring.gcd(&a.content(), &b.content());
    let c = ring.mul(&c, &ring.unit_normal(&c));
    let ma = a.monomial_content();
    let mb = b.monomial_content();
    let mg: Exponents = ma.iter().zip(&mb).map(|(x, y)| *x.min(y)).collect();
    let monomial = || SparsePoly::monomial(ctx, &mg, c.clone()).map(|m| m.unit_normalize());

    if a.is_monomial() || b.is_monomial() {
        return monomial();
    }

    let ones = vec![1; a.nvars()];
    let a1 = a.deflate(&ma, &ones)?.primitive_part()?;
    let b1 = b.deflate(&mb, &ones)?.primitive_part()?;
    if a1.is_constant() || b1.is_constant() {
        return monomial();
    }

    let g = if ctx.order() == MonomialOrder::Lex {
        R::gcd_lex(&a1, &b1)?
    } else {
        let lex = ctx.with_order(MonomialOrder::Lex);
        let g = R::gcd_lex(&a1.to_context(&lex)?, &b1.to_context(&lex)?)?;
        g.to_context(ctx)?
    };
    debug!(
        a_terms = a.term_count(),
        b_terms = b.term_count(),
        gcd_terms = g.term_count(),
        "gcd"
    );
    Ok(g.mul_monomial(&mg, &c)?.unit_normalize())
}
