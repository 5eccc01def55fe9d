//! The computation each consumer runs on a payload.
//!
//! Any pure, deterministic `u64 -> u64` function can drive the pipeline. The
//! reference workload is a deliberately slow recursive Fibonacci.

/// A pure function from payload to result.
///
/// Implementations must be deterministic and must not touch shared state:
/// consumers call `compute` concurrently without holding any lock.
pub trait Workload: Send + Sync {
    /// Computes the result for `payload`. May be arbitrarily expensive.
    fn compute(&self, payload: u64) -> u64;

    /// The value `compute(payload)` must return, evaluated single-threadedly.
    ///
    /// Verification uses this as its oracle. Override it when a cheaper
    /// equivalent exists.
    fn expected(&self, payload: u64) -> u64 {
        self.compute(payload)
    }
}

impl<F> Workload for F
where
    F: Fn(u64) -> u64 + Send + Sync,
{
    fn compute(&self, payload: u64) -> u64 {
        self(payload)
    }
}

/// Fibonacci by naive recursion, used to burn CPU time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fibonacci;

impl Workload for Fibonacci {
    fn compute(&self, payload: u64) -> u64 {
        fibonacci(payload)
    }

    fn expected(&self, payload: u64) -> u64 {
        fibonacci_iterative(payload)
    }
}

/// Exponential-time Fibonacci: `fib(0) = 0`, `fib(1) = fib(2) = 1`.
pub fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 | 2 => 1,
        n => fibonacci(n - 1) + fibonacci(n - 2),
    }
}

/// Largest `n` whose Fibonacci number fits in a `u64`.
pub const MAX_FIBONACCI_INPUT: u64 = 93;

/// Linear-time Fibonacci with the same indexing as [`fibonacci`].
///
/// Overflows for `n` above [`MAX_FIBONACCI_INPUT`]; see [`checked_fibonacci`].
pub fn fibonacci_iterative(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        let next = a + b;
        a = b;
        b = next;
    }
    b
}

/// Like [`fibonacci_iterative`], but `None` when the result does not fit in a `u64`.
pub fn checked_fibonacci(n: u64) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        let next = a.checked_add(b)?;
        a = b;
        b = next;
    }
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(2), 1);
        assert_eq!(fibonacci(10), 55);
        assert_eq!(fibonacci_iterative(30), 832_040);
        assert_eq!(fibonacci_iterative(31), 1_346_269);
        assert_eq!(fibonacci_iterative(44), 701_408_733);
    }

    #[test]
    fn test_largest_u64_fibonacci() {
        assert_eq!(fibonacci_iterative(0), 0);
        assert_eq!(fibonacci_iterative(92), 7_540_113_804_746_346_429);
        assert_eq!(
            fibonacci_iterative(MAX_FIBONACCI_INPUT),
            12_200_160_415_121_876_738
        );
        assert_eq!(
            checked_fibonacci(MAX_FIBONACCI_INPUT),
            Some(12_200_160_415_121_876_738)
        );
        assert_eq!(checked_fibonacci(MAX_FIBONACCI_INPUT + 1), None);
    }

    #[test]
    fn test_naive_matches_iterative() {
        for n in 0..=25 {
            assert_eq!(fibonacci(n), fibonacci_iterative(n), "fib({n})");
        }
    }

    #[test]
    fn test_fibonacci_workload_oracle() {
        assert_eq!(Fibonacci.compute(20), Fibonacci.expected(20));
    }

    #[test]
    fn test_closure_workload() {
        let square = |n: u64| n * n;
        assert_eq!(square.compute(12), 144);
        // The default oracle is the function itself.
        assert_eq!(square.expected(12), 144);
    }
}
