//! Generation-number allocation.

use crate::errors::{CoreError, CoreResult, TokenError};

/// Return the smallest non-negative integer absent from `numbers`, which
/// must be the ascending sequence of live generation numbers for one
/// (role, user) pair.
///
/// Fast path: a gap-free sequence `0..len` grows by appending `len`.
/// Otherwise the first index where `numbers[i] != i` is the smallest free
/// number. The allocator therefore keeps the live range dense from zero
/// no matter how often a user logs in and out.
pub fn next_generation_number(numbers: &[i64]) -> CoreResult<i64> {
    if numbers.is_empty() {
        return Ok(0);
    }

    let len = numbers.len() as i64;
    if numbers[numbers.len() - 1] == len - 1 {
        return Ok(len);
    }

    for (i, n) in numbers.iter().enumerate() {
        if *n != i as i64 {
            return Ok(i as i64);
        }
    }

    // The fast path said there is a gap but the scan found none; the
    // partition is inconsistent and guessing a number is not an option.
    Err(CoreError::Token(TokenError::AllocationFailed))
}

#[cfg(test)]
mod tests {
    use super::next_generation_number;

    #[test]
    fn empty_sequence_allocates_zero() {
        assert_eq!(next_generation_number(&[]).unwrap(), 0);
    }

    #[test]
    fn dense_sequence_appends() {
        assert_eq!(next_generation_number(&[0]).unwrap(), 1);
        assert_eq!(next_generation_number(&[0, 1, 2]).unwrap(), 3);
    }

    #[test]
    fn first_gap_is_reused() {
        assert_eq!(next_generation_number(&[0, 2, 3]).unwrap(), 1);
        assert_eq!(next_generation_number(&[0, 1, 3]).unwrap(), 2);
    }

    #[test]
    fn gap_at_zero_is_reused() {
        assert_eq!(next_generation_number(&[1, 2]).unwrap(), 0);
        assert_eq!(next_generation_number(&[5]).unwrap(), 0);
    }
}
