//! Cursor movement shared by the list screens.
//!
//! Short pickers (transport, analysis type, city matches) wrap around;
//! long tables (datasets, clusters) stop at either end.

/// Rows skipped by PageUp / PageDown.
pub const PAGE_STEP: usize = 5;

pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + 1) % len
}

/// Moves `index` down by `step` rows, stopping on the last row.
pub const fn clamped_forward(index: usize, step: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = index.saturating_add(step);
    if target >= len {
        len - 1
    } else {
        target
    }
}

/// Moves `index` up by `step` rows, stopping on the first row.
pub const fn clamped_back(index: usize, step: usize) -> usize {
    index.saturating_sub(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_cycles_through_both_ends() {
        assert_eq!(wrap_decrement(0, 4), 3);
        assert_eq!(wrap_increment(3, 4), 0);
        assert_eq!(wrap_increment(0, 0), 0);
    }

    #[test]
    fn clamped_moves_stop_at_the_edges() {
        assert_eq!(clamped_forward(8, PAGE_STEP, 10), 9);
        assert_eq!(clamped_forward(2, 1, 10), 3);
        assert_eq!(clamped_forward(0, 1, 0), 0);
        assert_eq!(clamped_back(3, PAGE_STEP), 0);
    }
}
