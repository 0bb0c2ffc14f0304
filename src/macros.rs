/// Assert that two `f32` values are equal within the given epsilon, which
/// defaults to `f32::EPSILON`.
#[cfg(test)]
macro_rules! assert_f32_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {{
        // Evaluate each expression once.
        let a: f32 = $a;
        let b: f32 = $b;
        let eps: f32 = $eps;
        let error = (a - b).abs();
        if error > eps {
            eprintln!("{:?}", $debug);
        }
        assert!(
            error <= eps,
            "Assertion failed: |({}) - ({})| = {:e} <= {:e}",
            a,
            b,
            error,
            eps
        );
    }};
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_f32_eq!($a, $b, $eps, "")
    };
    ($a:expr, $b:expr) => {
        $crate::macros::assert_f32_eq!($a, $b, f32::EPSILON)
    };
}

#[cfg(test)]
pub(crate) use assert_f32_eq;
