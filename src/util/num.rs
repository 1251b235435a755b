use std::cmp::Ordering;

use serde_json::Number;

/// Orders two JSON numbers exactly on the integer fast paths and falls
/// back to f64 comparison for floats.
pub fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left.cmp(&right);
    }

    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left.cmp(&right);
    }

    if let (Some(left), Some(right)) = (left.as_i64(), right.as_u64()) {
        return if left.is_negative() {
            Ordering::Less
        } else {
            u64::try_from(left)
                .expect("non-negative i64 always fits into u64")
                .cmp(&right)
        };
    }

    if let (Some(left), Some(right)) = (left.as_u64(), right.as_i64()) {
        return if right.is_negative() {
            Ordering::Greater
        } else {
            left.cmp(&u64::try_from(right).expect("non-negative i64 always fits into u64"))
        };
    }

    left.as_f64()
        .and_then(|left| right.as_f64().and_then(|right| left.partial_cmp(&right)))
        .expect("serde_json::Number is always finite")
}
