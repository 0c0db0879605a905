//! Purpose: Adapt fallible operations into the no-error convenience tier.
//! Exports: `or_default`.
//! Role: The single place where failures are swallowed; callers get `T::default()`.
//! Invariants: The wrapped result is never recomputed or re-derived here.
//! Invariants: Every swallowed failure is logged at debug level with the operation name.
use crate::core::error::Error;

pub fn or_default<T: Default>(op: &'static str, result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(op, error = %err, "returning default after failure");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::or_default;
    use crate::core::error::{Error, ErrorKind};

    #[test]
    fn ok_passes_through() {
        assert_eq!(or_default("test", Ok::<_, Error>(vec![1, 2])), vec![1, 2]);
    }

    #[test]
    fn err_becomes_default() {
        let result: Result<String, Error> = Err(Error::new(ErrorKind::Decode));
        assert_eq!(or_default("test", result), "");
    }
}
